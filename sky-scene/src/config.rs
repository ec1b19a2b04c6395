//! Scene tuning knobs.
//!
//! Every field has a default, so a JSON file only needs the keys it changes:
//!
//! ```
//! use sky_scene::SceneConfig;
//!
//! let config = SceneConfig::from_json_str(r#"{ "max_zoom": 4.0 }"#)?;
//! assert_eq!(config.max_zoom, 4.0);
//! assert_eq!(config.margin, 10.0);
//! # Ok::<(), sky_core::SkyError>(())
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sky_core::constants::{PI, TWOPI};
use sky_core::{SkyError, SkyResult};

use crate::view::ZoomBounds;

/// Finest meridian or parallel spacing accepted; bounds the grid at a few
/// thousand lines.
pub const MIN_GRID_STEP: f64 = 1e-3;

/// Layout, gesture limits and star styling constants for a sky chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Gap between the sky disk and the shorter viewport edge.
    pub margin: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Angle between meridians, radians.
    pub meridian_step: f64,
    /// Spacing of parallels as a fraction of the sky radius.
    pub parallel_step: f64,
    /// Diameter of a magnitude 0 star.
    pub max_star_size: f64,
    /// Relative size lost per magnitude.
    pub magnitude_falloff: f64,
    /// Stars at or brighter than this magnitude get a glow.
    pub glow_magnitude: f64,
    pub default_magnitude_threshold: f64,
    pub grid_line_width: f64,
    pub grid_alpha: f64,
    /// Glow around the sky disk border.
    pub border_glow_width: f64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            margin: 10.0,
            min_zoom: 1.0,
            max_zoom: 8.0,
            meridian_step: PI / 6.0,
            parallel_step: 1.0 / 3.0,
            max_star_size: 6.0,
            magnitude_falloff: 0.125,
            glow_magnitude: 1.0,
            default_magnitude_threshold: 4.0,
            grid_line_width: 1.0,
            grid_alpha: 0.5,
            border_glow_width: 1.0,
        }
    }
}

impl SceneConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> SkyResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SkyError::invalid_config(format!("scene config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    ///
    /// # Errors
    /// Returns [`SkyError::InvalidConfig`] if the file cannot be read, is not
    /// valid JSON, or holds inconsistent values.
    pub fn from_json_file(path: impl AsRef<Path>) -> SkyResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| SkyError::invalid_config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&text)
    }

    /// Checks the values a scene cannot be built from.
    pub fn validate(&self) -> SkyResult<()> {
        let fields = [
            ("margin", self.margin),
            ("min_zoom", self.min_zoom),
            ("max_zoom", self.max_zoom),
            ("meridian_step", self.meridian_step),
            ("parallel_step", self.parallel_step),
            ("max_star_size", self.max_star_size),
            ("magnitude_falloff", self.magnitude_falloff),
            ("glow_magnitude", self.glow_magnitude),
            ("default_magnitude_threshold", self.default_magnitude_threshold),
            ("grid_line_width", self.grid_line_width),
            ("grid_alpha", self.grid_alpha),
            ("border_glow_width", self.border_glow_width),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(SkyError::invalid_config(format!("{} must be finite", name)));
        }

        self.zoom_bounds()?;
        if self.margin < 0.0 {
            return Err(SkyError::invalid_config("margin must not be negative"));
        }
        if !(MIN_GRID_STEP..=TWOPI).contains(&self.meridian_step) {
            return Err(SkyError::invalid_config(format!(
                "meridian_step must be in [{}, 2π], got {}",
                MIN_GRID_STEP, self.meridian_step
            )));
        }
        if !(MIN_GRID_STEP..=1.0).contains(&self.parallel_step) {
            return Err(SkyError::invalid_config(format!(
                "parallel_step must be in [{}, 1], got {}",
                MIN_GRID_STEP, self.parallel_step
            )));
        }
        if self.max_star_size <= 0.0 {
            return Err(SkyError::invalid_config("max_star_size must be positive"));
        }
        if !(0.0..=1.0).contains(&self.grid_alpha) {
            return Err(SkyError::invalid_config("grid_alpha must be within [0, 1]"));
        }
        if self.grid_line_width < 0.0 || self.border_glow_width < 0.0 {
            return Err(SkyError::invalid_config("line widths must not be negative"));
        }
        Ok(())
    }

    pub fn zoom_bounds(&self) -> SkyResult<ZoomBounds> {
        ZoomBounds::new(self.min_zoom, self.max_zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_are_valid() {
        let config = SceneConfig::default();
        config.validate().unwrap();
        assert_eq!(config.min_zoom, 1.0);
        assert_eq!(config.max_zoom, 8.0);
        assert_eq!(config.default_magnitude_threshold, 4.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SceneConfig::from_json_str(r#"{"margin": 20, "grid_alpha": 0.25}"#).unwrap();
        assert_eq!(config.margin, 20.0);
        assert_eq!(config.grid_alpha, 0.25);
        assert_eq!(config.parallel_step, 1.0 / 3.0);
    }

    #[test]
    fn test_rejects_inverted_zoom_bounds() {
        let err = SceneConfig::from_json_str(r#"{"min_zoom": 4, "max_zoom": 2}"#).unwrap_err();
        assert!(matches!(err, SkyError::InvalidConfig { .. }));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_rejects_bad_steps() {
        for json in [
            r#"{"meridian_step": 0}"#,
            r#"{"meridian_step": -0.5}"#,
            r#"{"parallel_step": 0}"#,
            r#"{"parallel_step": 1.5}"#,
            r#"{"grid_alpha": 2}"#,
            r#"{"margin": -1}"#,
        ] {
            assert!(SceneConfig::from_json_str(json).is_err(), "{}", json);
        }
    }

    #[test]
    fn test_rejects_grid_steps_below_minimum() {
        for json in [
            r#"{"meridian_step": 1e-300}"#,
            r#"{"parallel_step": 1e-300}"#,
            r#"{"meridian_step": 0.0009}"#,
            r#"{"parallel_step": 5e-324}"#,
        ] {
            let err = SceneConfig::from_json_str(json).unwrap_err();
            assert!(!err.is_recoverable(), "{}", json);
        }

        let finest = SceneConfig {
            meridian_step: MIN_GRID_STEP,
            parallel_step: MIN_GRID_STEP,
            ..Default::default()
        };
        assert!(finest.validate().is_ok());
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = SceneConfig::from_json_str("{ margin: 1 }").unwrap_err();
        assert!(err.to_string().contains("scene config"));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"max_zoom": 3.5}}"#).unwrap();
        file.flush().unwrap();

        let config = SceneConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.max_zoom, 3.5);

        let missing = SceneConfig::from_json_file("/nonexistent/scene.json");
        assert!(matches!(missing, Err(SkyError::InvalidConfig { .. })));
    }
}
