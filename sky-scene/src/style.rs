//! Colors and the chart color scheme.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sky_core::{SkyError, SkyResult};

/// RGBA color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    #[serde(default = "opaque")]
    pub a: f64,
}

fn opaque() -> f64 {
    1.0
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Components scaled to bytes, alpha dropped.
    pub fn to_rgb8(self) -> (u8, u8, u8) {
        let byte = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        (byte(self.r), byte(self.g), byte(self.b))
    }

    /// `#rrggbb`
    pub fn to_hex(self) -> String {
        let (r, g, b) = self.to_rgb8();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }

    fn is_valid(self) -> bool {
        [self.r, self.g, self.b, self.a]
            .iter()
            .all(|c| (0.0..=1.0).contains(c))
    }
}

/// Colors for each layer of the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorScheme {
    pub background: Color,
    pub sky: Color,
    pub sky_border: Color,
    pub sky_line: Color,
    pub star: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            background: Color::rgb(0.07, 0.27, 0.35),
            sky: Color::rgb(0.00, 0.09, 0.12),
            sky_border: Color::rgb(0.12, 0.10, 0.22),
            sky_line: Color::rgb(0.93, 0.95, 0.95),
            star: Color::WHITE,
        }
    }
}

impl ColorScheme {
    pub fn from_json_str(json: &str) -> SkyResult<Self> {
        let scheme: Self = serde_json::from_str(json)
            .map_err(|e| SkyError::invalid_config(format!("color scheme: {}", e)))?;
        scheme.validate()?;
        Ok(scheme)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> SkyResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| SkyError::invalid_config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> SkyResult<()> {
        let colors = [
            ("background", self.background),
            ("sky", self.sky),
            ("sky_border", self.sky_border),
            ("sky_line", self.sky_line),
            ("star", self.star),
        ];
        match colors.iter().find(|(_, c)| !c.is_valid()) {
            Some((name, _)) => Err(SkyError::invalid_config(format!(
                "color '{}' has a component outside [0, 1]",
                name
            ))),
            None => Ok(()),
        }
    }
}
