//! Zoom and pan state driven by pinch and pan gestures.
//!
//! Geometry is always computed at zoom 1 and mapped to the screen with
//!
//! ```text
//! screen = center + (base − center − pan) · zoom
//! ```
//!
//! so only the two scalars (`zoom`, `pan`) carry state between frames. Each
//! gesture snapshots an anchor when it begins and updates relative to it.

use serde::Serialize;
use sky_core::{Point, SkyError, SkyResult};

/// Inclusive zoom range. Every zoom update is clamped into it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZoomBounds {
    min: f64,
    max: f64,
}

impl ZoomBounds {
    /// # Errors
    /// Returns [`SkyError::InvalidConfig`] unless `0 < min <= max`.
    pub fn new(min: f64, max: f64) -> SkyResult<Self> {
        if !(min.is_finite() && max.is_finite()) || min <= 0.0 || min > max {
            return Err(SkyError::invalid_config(format!(
                "zoom bounds must satisfy 0 < min <= max, got [{}, {}]",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    #[inline]
    pub fn clamp(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min, self.max)
    }
}

impl Default for ZoomBounds {
    fn default() -> Self {
        Self { min: 1.0, max: 8.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Gesture {
    Idle,
    Pinching,
    Panning,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewTransform {
    bounds: ZoomBounds,
    zoom: f64,
    pan: Point,
    zoom_anchor: f64,
    pan_anchor: Point,
    gesture: Gesture,
}

impl ViewTransform {
    /// Unzoomed, unpanned view; zoom starts at `bounds.min()` if that exceeds 1.
    pub fn new(bounds: ZoomBounds) -> Self {
        let zoom = bounds.clamp(1.0);
        Self {
            bounds,
            zoom,
            pan: Point::ORIGIN,
            zoom_anchor: zoom,
            pan_anchor: Point::ORIGIN,
            gesture: Gesture::Idle,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> Point {
        self.pan
    }

    pub fn bounds(&self) -> ZoomBounds {
        self.bounds
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    /// Replaces the zoom range and re-clamps the current zoom.
    pub fn set_bounds(&mut self, bounds: ZoomBounds) {
        self.bounds = bounds;
        self.zoom = bounds.clamp(self.zoom);
        self.zoom_anchor = bounds.clamp(self.zoom_anchor);
    }

    /// Back to zoom 1 (or the nearest allowed value) with no pan.
    pub fn reset(&mut self) {
        *self = Self::new(self.bounds);
    }

    pub fn begin_pinch(&mut self) {
        self.zoom_anchor = self.zoom;
        self.pan_anchor = self.pan;
        self.gesture = Gesture::Pinching;
    }

    /// Sets `zoom = clamp(anchor · scale)`.
    ///
    /// With a `focal` point (screen coordinates) the pan is adjusted so that
    /// the sky point under it when the pinch began stays under it. `center`
    /// is the pivot passed to [`apply`](Self::apply). A NaN scale is ignored.
    pub fn update_pinch(&mut self, scale: f64, focal: Option<Point>, center: Point) {
        if scale.is_nan() {
            return;
        }
        self.zoom = self.bounds.clamp(self.zoom_anchor * scale);
        if let Some(focal) = focal {
            let base = center + (focal - center) * (1.0 / self.zoom_anchor) + self.pan_anchor;
            self.pan = base - center - (focal - center) * (1.0 / self.zoom);
        }
    }

    /// Commits the current zoom as the anchor for the next pinch.
    pub fn end_pinch(&mut self) {
        self.zoom_anchor = self.zoom;
        self.pan_anchor = self.pan;
        self.gesture = Gesture::Idle;
    }

    pub fn begin_pan(&mut self) {
        self.pan_anchor = self.pan;
        self.gesture = Gesture::Panning;
    }

    /// `delta` is the gesture translation since [`begin_pan`](Self::begin_pan)
    /// in view coordinates (y down). Content follows the finger 1:1 on screen.
    pub fn update_pan(&mut self, delta: Point) {
        self.pan = self.pan_anchor + Point::new(-delta.x, delta.y) * (1.0 / self.zoom);
    }

    pub fn end_pan(&mut self) {
        self.pan_anchor = self.pan;
        self.gesture = Gesture::Idle;
    }

    /// Maps a zoom-1 chart point to the screen.
    #[inline]
    pub fn apply(&self, base: Point, center: Point) -> Point {
        center + (base - center - self.pan) * self.zoom
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::new(ZoomBounds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const CENTER: Point = Point { x: 200.0, y: 150.0 };

    fn pinch(view: &mut ViewTransform, scale: f64) {
        view.begin_pinch();
        view.update_pinch(scale, None, CENTER);
        view.end_pinch();
    }

    #[test]
    fn test_zoom_bounds_validation() {
        assert!(ZoomBounds::new(1.0, 8.0).is_ok());
        assert!(ZoomBounds::new(2.0, 2.0).is_ok());
        assert!(ZoomBounds::new(0.0, 8.0).is_err());
        assert!(ZoomBounds::new(4.0, 2.0).is_err());
        assert!(ZoomBounds::new(1.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_identity_when_untouched() {
        let view = ViewTransform::default();
        let p = Point::new(12.0, -7.5);
        assert_eq!(view.apply(p, CENTER), p);
        assert_eq!(view.gesture(), Gesture::Idle);
    }

    #[test]
    fn test_pinch_clamps_to_max_exactly() {
        let mut view = ViewTransform::default();
        view.begin_pinch();
        view.update_pinch(100.0, None, CENTER);
        assert_eq!(view.zoom(), 8.0);
        view.update_pinch(0.01, None, CENTER);
        assert_eq!(view.zoom(), 1.0);
        view.update_pinch(-3.0, None, CENTER);
        assert_eq!(view.zoom(), 1.0);
    }

    #[test]
    fn test_pinch_relative_to_anchor() {
        let mut view = ViewTransform::default();
        pinch(&mut view, 2.0);
        assert_eq!(view.zoom(), 2.0);

        view.begin_pinch();
        assert_eq!(view.gesture(), Gesture::Pinching);
        view.update_pinch(1.5, None, CENTER);
        assert_eq!(view.zoom(), 3.0);
        view.update_pinch(2.0, None, CENTER);
        assert_eq!(view.zoom(), 4.0);
        view.end_pinch();

        pinch(&mut view, 0.5);
        assert_eq!(view.zoom(), 2.0);
    }

    #[test]
    fn test_pinch_nan_ignored() {
        let mut view = ViewTransform::default();
        pinch(&mut view, 3.0);
        view.begin_pinch();
        view.update_pinch(f64::NAN, None, CENTER);
        assert_eq!(view.zoom(), 3.0);
    }

    #[test]
    fn test_apply_scales_about_center() {
        let mut view = ViewTransform::default();
        pinch(&mut view, 2.0);
        assert_eq!(view.apply(CENTER, CENTER), CENTER);
        let p = view.apply(Point::new(210.0, 140.0), CENTER);
        assert_eq!(p, Point::new(220.0, 130.0));
    }

    #[test]
    fn test_focal_point_stays_fixed() {
        let mut view = ViewTransform::default();
        let focal = Point::new(260.0, 90.0);
        // The chart point under the finger at zoom 1 is the focal point itself.
        let under_finger = focal;

        view.begin_pinch();
        view.update_pinch(3.0, Some(focal), CENTER);
        let moved = view.apply(under_finger, CENTER);
        assert_abs_diff_eq!(moved.x, focal.x, epsilon = 1e-9);
        assert_abs_diff_eq!(moved.y, focal.y, epsilon = 1e-9);
        view.end_pinch();

        // Second pinch around another point, starting zoomed and panned.
        let focal2 = Point::new(120.0, 220.0);
        let base = CENTER + (focal2 - CENTER) * (1.0 / view.zoom()) + view.pan();
        view.begin_pinch();
        view.update_pinch(2.0, Some(focal2), CENTER);
        assert_eq!(view.zoom(), 6.0);
        let moved = view.apply(base, CENTER);
        assert_abs_diff_eq!(moved.x, focal2.x, epsilon = 1e-9);
        assert_abs_diff_eq!(moved.y, focal2.y, epsilon = 1e-9);
    }

    #[test]
    fn test_pan_follows_gesture() {
        let mut view = ViewTransform::default();
        let p = Point::new(150.0, 150.0);

        view.begin_pan();
        view.update_pan(Point::new(30.0, 20.0));
        // x follows the finger, y is flipped from view to chart space
        assert_eq!(view.pan(), Point::new(-30.0, 20.0));
        assert_eq!(view.apply(p, CENTER), Point::new(180.0, 130.0));
        view.end_pan();

        view.begin_pan();
        view.update_pan(Point::new(10.0, 0.0));
        assert_eq!(view.pan(), Point::new(-40.0, 20.0));
        view.end_pan();
        assert_eq!(view.gesture(), Gesture::Idle);
    }

    #[test]
    fn test_pan_scaled_by_zoom() {
        let mut view = ViewTransform::default();
        pinch(&mut view, 4.0);
        let p = Point::new(210.0, 160.0);
        let before = view.apply(p, CENTER);

        view.begin_pan();
        view.update_pan(Point::new(40.0, -20.0));
        assert_eq!(view.pan(), Point::new(-10.0, -5.0));

        let after = view.apply(p, CENTER);
        assert_abs_diff_eq!(after.x - before.x, 40.0, epsilon = 1e-9);
        assert_abs_diff_eq!(after.y - before.y, 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_set_bounds_reclamps() {
        let mut view = ViewTransform::default();
        pinch(&mut view, 6.0);
        view.set_bounds(ZoomBounds::new(1.0, 4.0).unwrap());
        assert_eq!(view.zoom(), 4.0);
        view.reset();
        assert_eq!(view.zoom(), 1.0);
        assert_eq!(view.pan(), Point::ORIGIN);
    }
}
