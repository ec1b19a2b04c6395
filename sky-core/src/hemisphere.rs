use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Half of the sky shown by the chart.
///
/// The celestial equator (`dec == 0`) belongs to both hemispheres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hemisphere {
    #[default]
    North,
    South,
}

impl Hemisphere {
    /// Returns `true` if a declination (degrees) lies in this hemisphere.
    #[inline]
    pub fn contains(self, dec_deg: f64) -> bool {
        match self {
            Hemisphere::North => dec_deg >= 0.0,
            Hemisphere::South => dec_deg <= 0.0,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Hemisphere::North => Hemisphere::South,
            Hemisphere::South => Hemisphere::North,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Hemisphere::North => "north",
            Hemisphere::South => "south",
        }
    }
}

impl fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Hemisphere {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "north" | "n" => Ok(Hemisphere::North),
            "south" | "s" => Ok(Hemisphere::South),
            other => Err(format!("unknown hemisphere '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_equator_in_both() {
        assert!(Hemisphere::North.contains(0.0));
        assert!(Hemisphere::South.contains(0.0));
    }

    #[test]
    fn test_contains_by_sign() {
        assert!(Hemisphere::North.contains(89.26));
        assert!(!Hemisphere::North.contains(-16.7));
        assert!(Hemisphere::South.contains(-52.7));
        assert!(!Hemisphere::South.contains(38.78));
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("North".parse::<Hemisphere>().unwrap(), Hemisphere::North);
        assert_eq!(" s ".parse::<Hemisphere>().unwrap(), Hemisphere::South);
        assert!("east".parse::<Hemisphere>().is_err());
        assert_eq!(Hemisphere::South.to_string(), "south");
        assert_eq!(Hemisphere::North.opposite(), Hemisphere::South);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Hemisphere::South).unwrap();
        assert_eq!(json, "\"south\"");
        let back: Hemisphere = serde_json::from_str("\"north\"").unwrap();
        assert_eq!(back, Hemisphere::North);
    }
}
