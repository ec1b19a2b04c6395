//! Equatorial coordinates to chart coordinates.
//!
//! The chart is a zenithal equidistant-style disk: the visible pole sits at
//! the disk center and the equator on its rim. Distance from the center grows
//! linearly as |declination| falls from 90° to 0°,
//!
//! ```text
//! r = R · (1 − |δ|/90°)
//! x = cx + r · cos α
//! y = cy + r · sin α
//! ```
//!
//! so both hemispheres fold onto the same disk and the hemisphere filter has
//! to run before projection. No clamping is applied for |δ| > 90°.

use serde::Serialize;
use sky_catalog::{SkyPosition, StarRecord};
use sky_core::constants::{POLE_DECLINATION_DEG, RAD_TO_DEG};
use sky_core::{Point, SkyResult};

use crate::config::SceneConfig;

/// Projects `(rarad, decrad)` onto a sky disk of `sky_radius` around `sky_center`.
#[inline]
pub fn project(rarad: f64, decrad: f64, sky_radius: f64, sky_center: Point) -> Point {
    let dec_deg = decrad * RAD_TO_DEG;
    let r = sky_radius * (1.0 - dec_deg.abs() / POLE_DECLINATION_DEG);
    Point::polar(sky_center, r, rarad)
}

/// Size and brightness of a star marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StarAppearance {
    pub radius: f64,
    /// In `[0, 1]`.
    pub opacity: f64,
    /// Set for stars at or brighter than the glow magnitude.
    pub glow_width: Option<f64>,
}

/// [`project`] bound to one sky disk, plus the magnitude-to-marker mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CelestialProjector {
    sky_radius: f64,
    sky_center: Point,
    max_star_size: f64,
    magnitude_falloff: f64,
    glow_magnitude: f64,
}

impl CelestialProjector {
    pub fn new(sky_radius: f64, sky_center: Point, config: &SceneConfig) -> Self {
        Self {
            sky_radius,
            sky_center,
            max_star_size: config.max_star_size,
            magnitude_falloff: config.magnitude_falloff,
            glow_magnitude: config.glow_magnitude,
        }
    }

    pub fn sky_radius(&self) -> f64 {
        self.sky_radius
    }

    pub fn sky_center(&self) -> Point {
        self.sky_center
    }

    pub fn project(&self, position: &SkyPosition) -> Point {
        project(position.rarad, position.decrad, self.sky_radius, self.sky_center)
    }

    /// Marker for a star of magnitude `mag`.
    ///
    /// With `k = 1 − falloff·mag` the marker radius is `max(1, size·k) / 2`
    /// and the opacity `min(1, k)` clamped to `[0, 1]`; the glow width equals
    /// the radius.
    pub fn appearance(&self, mag: f64) -> StarAppearance {
        let k = 1.0 - mag * self.magnitude_falloff;
        let radius = (self.max_star_size * k).max(1.0) / 2.0;
        let opacity = k.min(1.0).clamp(0.0, 1.0);
        let glow_width = (mag <= self.glow_magnitude).then_some(radius);
        StarAppearance {
            radius,
            opacity,
            glow_width,
        }
    }

    /// Base (zoom 1) position and marker of a catalog record.
    ///
    /// # Errors
    /// Returns [`SkyError::UnprojectableStar`](sky_core::SkyError::UnprojectableStar)
    /// if the record lacks `rarad`, `decrad` or `mag`.
    pub fn project_star(&self, star: &StarRecord) -> SkyResult<(Point, StarAppearance)> {
        let position = star.sky_position()?;
        Ok((self.project(&position), self.appearance(position.mag)))
    }
}
