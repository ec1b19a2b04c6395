//! Brightness and hemisphere filter shared by every catalog backend.

use std::cmp::Ordering;

use sky_core::Hemisphere;

use crate::record::StarRecord;

/// Ids at or below this value are catalog placeholders (HYG id 0 is the Sun).
pub const PLACEHOLDER_MAX_ID: i64 = 0;

/// Selects stars strictly brighter than `max_magnitude`, optionally limited
/// to one hemisphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarQuery {
    /// Exclusive upper bound on apparent magnitude.
    pub max_magnitude: f64,
    /// If set, keep only stars whose declination lies in this hemisphere.
    pub hemisphere: Option<Hemisphere>,
}

impl StarQuery {
    pub fn new(max_magnitude: f64, hemisphere: Option<Hemisphere>) -> Self {
        Self {
            max_magnitude,
            hemisphere,
        }
    }

    /// Returns `true` if the record passes the filter.
    ///
    /// A record without `mag` never matches. A record without `dec` never
    /// matches a hemisphere restriction.
    pub fn matches(&self, star: &StarRecord) -> bool {
        if star.id <= PLACEHOLDER_MAX_ID {
            return false;
        }
        let Some(mag) = star.mag else {
            return false;
        };
        if mag.partial_cmp(&self.max_magnitude) != Some(Ordering::Less) {
            return false;
        }
        match self.hemisphere {
            None => true,
            Some(h) => star.dec.is_some_and(|dec| h.contains(dec)),
        }
    }
}

/// Orders records brightest first (ascending magnitude), then by id.
///
/// Records without a magnitude sort last.
pub fn magnitude_order(a: &StarRecord, b: &StarRecord) -> Ordering {
    let by_mag = match (a.mag, b.mag) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_mag.then(a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn star(id: i64, mag: Option<f64>, dec: Option<f64>) -> StarRecord {
        StarRecord {
            id,
            mag,
            dec,
            ..Default::default()
        }
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let q = StarQuery::new(5.0, None);
        assert!(q.matches(&star(1, Some(4.999), Some(10.0))));
        assert!(!q.matches(&star(2, Some(5.0), Some(10.0))));
        assert!(!q.matches(&star(3, Some(6.0), Some(10.0))));
    }

    #[test]
    fn test_placeholder_id_excluded() {
        let q = StarQuery::new(5.0, None);
        assert!(!q.matches(&star(0, Some(-26.7), Some(0.0))));
        assert!(!q.matches(&star(-3, Some(1.0), Some(0.0))));
    }

    #[test]
    fn test_missing_fields() {
        let q = StarQuery::new(5.0, None);
        assert!(!q.matches(&star(1, None, Some(10.0))));
        assert!(q.matches(&star(1, Some(1.0), None)));

        let north = StarQuery::new(5.0, Some(Hemisphere::North));
        assert!(!north.matches(&star(1, Some(1.0), None)));
    }

    #[test]
    fn test_hemisphere_filter() {
        let north = StarQuery::new(5.0, Some(Hemisphere::North));
        let south = StarQuery::new(5.0, Some(Hemisphere::South));
        let vega = star(91262, Some(0.03), Some(38.78));
        let canopus = star(30438, Some(-0.62), Some(-52.7));
        let equator = star(5, Some(3.0), Some(0.0));

        assert!(north.matches(&vega));
        assert!(!north.matches(&canopus));
        assert!(south.matches(&canopus));
        assert!(!south.matches(&vega));
        assert!(north.matches(&equator) && south.matches(&equator));
    }

    #[test]
    fn test_magnitude_order() {
        let mut stars = [
            star(3, Some(1.0), None),
            star(1, None, None),
            star(2, Some(-1.44), None),
            star(4, Some(1.0), None),
        ];
        stars.sort_by(magnitude_order);
        let ids: Vec<i64> = stars.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 3, 4, 1]);
    }
}
