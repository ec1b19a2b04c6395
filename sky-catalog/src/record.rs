//! The star entity produced by every catalog source.

use serde::Serialize;
use sky_core::{SkyError, SkyResult};

/// One row of the HYG star database.
///
/// Every column except `id` is optional: an empty catalog field is absent,
/// never zero. Records are built once by a
/// [`StarSource`](crate::source::StarSource) and then only read; the owning
/// [`CatalogStore`](crate::CatalogStore) hands out shared references.
///
/// `ra` is kept exactly as the catalog stores it (HYG uses hours); drawing
/// code works from `rarad`/`decrad`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StarRecord {
    /// Catalog identifier. Id 0 is the Sun placeholder in HYG.
    pub id: i64,
    /// Hipparcos number.
    pub hip: Option<i64>,
    /// Henry Draper number.
    pub hd: Option<i64>,
    /// Harvard Revised (Yale Bright Star) number.
    pub hr: Option<i64>,
    /// Gliese catalog designation.
    pub gl: Option<String>,
    /// Bayer/Flamsteed designation, e.g. `9Alp CMa`.
    pub bf: Option<String>,
    /// Common name, e.g. `Sirius`.
    pub proper: Option<String>,
    pub ra: Option<f64>,
    /// Declination, in degrees.
    pub dec: Option<f64>,
    /// Distance, in parsecs.
    pub dist: Option<f64>,
    /// Proper motion in right ascension, in mas/yr.
    pub pmra: Option<f64>,
    /// Proper motion in declination, in mas/yr.
    pub pmdec: Option<f64>,
    /// Radial velocity, in km/s.
    pub rv: Option<f64>,
    /// Apparent visual magnitude.
    pub mag: Option<f64>,
    /// Absolute visual magnitude.
    pub absmag: Option<f64>,
    /// Spectral type.
    pub spect: Option<String>,
    /// B-V color index.
    pub ci: Option<f64>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub vx: Option<f64>,
    pub vy: Option<f64>,
    pub vz: Option<f64>,
    /// Right ascension, in radians.
    pub rarad: Option<f64>,
    /// Declination, in radians.
    pub decrad: Option<f64>,
    pub pmrarad: Option<f64>,
    pub pmdecrad: Option<f64>,
    pub bayer: Option<String>,
    /// Flamsteed number.
    pub flam: Option<i64>,
    /// Constellation abbreviation.
    pub con: Option<String>,
    /// Component number within a multi-star system.
    pub comp: Option<i64>,
    /// Id of the primary component of the system.
    pub comp_primary: Option<i64>,
    /// Catalog id of the system, e.g. `Gl 244`.
    pub base: Option<String>,
    /// Luminosity relative to the Sun.
    pub lum: Option<f64>,
    /// Variable star type.
    pub var_type: Option<String>,
    pub var_min: Option<f64>,
    pub var_max: Option<f64>,
}

/// The subset of a record the projector needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyPosition {
    pub rarad: f64,
    pub decrad: f64,
    pub mag: f64,
}

impl StarRecord {
    /// Position and magnitude, or the name of the first missing field.
    ///
    /// # Errors
    /// Returns [`SkyError::UnprojectableStar`] when `rarad`, `decrad` or `mag`
    /// is absent.
    pub fn sky_position(&self) -> SkyResult<SkyPosition> {
        let rarad = self
            .rarad
            .ok_or_else(|| SkyError::unprojectable_star(self.id, "rarad"))?;
        let decrad = self
            .decrad
            .ok_or_else(|| SkyError::unprojectable_star(self.id, "decrad"))?;
        let mag = self
            .mag
            .ok_or_else(|| SkyError::unprojectable_star(self.id, "mag"))?;
        Ok(SkyPosition { rarad, decrad, mag })
    }

    pub fn is_projectable(&self) -> bool {
        self.sky_position().is_ok()
    }

    /// Best human-readable label: proper name, then Bayer/Flamsteed, then
    /// Gliese, then `HIP n`, then `#id`.
    pub fn display_name(&self) -> String {
        if let Some(name) = self.proper.as_deref().or(self.bf.as_deref()) {
            return name.to_string();
        }
        if let Some(gl) = &self.gl {
            return gl.clone();
        }
        match self.hip {
            Some(hip) => format!("HIP {}", hip),
            None => format!("#{}", self.id),
        }
    }
}
