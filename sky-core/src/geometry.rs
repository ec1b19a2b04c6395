use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// A point (or offset) on the drawing plane, in screen units.
///
/// The plane follows the scene convention: x grows to the right and y grows
/// upwards. Gesture deltas arrive in view coordinates, where y grows
/// downwards; the view transform does the flip.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point at `radius` from `center` along polar angle `angle` (radians).
    #[inline]
    pub fn polar(center: Point, radius: f64, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(center.x + radius * cos, center.y + radius * sin)
    }

    #[inline]
    pub fn distance_to(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Polar angle of `self` around `center`, in radians within (-π, π].
    #[inline]
    pub fn angle_from(&self, center: Point) -> f64 {
        (self.y - center.y).atan2(self.x - center.x)
    }
}

impl Add for Point {
    type Output = Point;

    #[inline]
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    #[inline]
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    #[inline]
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// Width and height of the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[inline]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    #[inline]
    pub fn min_side(&self) -> f64 {
        self.width.min(self.height)
    }
}
