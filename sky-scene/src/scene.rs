//! The sky chart model: catalog, layout, view state and the current frame.
//!
//! [`SkyRenderModel`] consumes user intents (hemisphere, magnitude limit,
//! pinch, pan, resize) and answers each one by rebuilding the whole
//! [`SkyFrame`] from zoom 1 geometry. Nothing is diffed or cached between
//! frames apart from the zoom and pan scalars held by [`ViewTransform`].

use serde::Serialize;
use sky_catalog::{CatalogStore, LoadReport, StarSource};
use sky_core::constants::{STEP_COUNT_EPSILON, TWOPI};
use sky_core::{Hemisphere, Point, SkyError, SkyResult, Size};
use tracing::{debug, warn};

use crate::config::SceneConfig;
use crate::primitives::{CirclePrimitive, CircleRole, LinePrimitive, Primitive, StarMarker, Stroke};
use crate::projector::CelestialProjector;
use crate::style::{Color, ColorScheme};
use crate::view::ViewTransform;

/// Meridian angles `i · step` for `i` in `0..=⌊2π/step⌋`.
pub fn meridian_angles(step: f64) -> Vec<f64> {
    let count = (TWOPI / step + STEP_COUNT_EPSILON).floor() as usize + 1;
    (0..count).map(|i| i as f64 * step).collect()
}

/// Parallel radius fractions `1 − i · step` for `i` in `0..=⌊1/step⌋`,
/// floored at 0.
pub fn parallel_fractions(step: f64) -> Vec<f64> {
    let count = (1.0 / step + STEP_COUNT_EPSILON).floor() as usize + 1;
    (0..count).map(|i| (1.0 - i as f64 * step).max(0.0)).collect()
}

/// Sky disk placement inside a viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SkyGeometry {
    pub center: Point,
    pub radius: f64,
}

impl SkyGeometry {
    /// Disk of radius `min(w, h) / 2 − margin` centered in the viewport.
    ///
    /// # Errors
    /// Returns [`SkyError::InvalidConfig`] if no positive radius fits.
    pub fn fit(size: Size, margin: f64) -> SkyResult<Self> {
        let radius = size.min_side() / 2.0 - margin;
        if !radius.is_finite() || radius <= 0.0 {
            return Err(SkyError::invalid_config(format!(
                "viewport {}x{} too small for margin {}",
                size.width, size.height, margin
            )));
        }
        Ok(Self {
            center: size.center(),
            radius,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FrameStats {
    pub parallels: usize,
    pub meridians: usize,
    pub stars: usize,
    /// Stars that passed the query but lacked a position or magnitude.
    pub skipped_unprojectable: usize,
}

/// One fully built chart: sky disk, parallels, meridians, then stars in
/// ascending magnitude order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkyFrame {
    pub size: Size,
    pub background: Color,
    pub hemisphere: Hemisphere,
    pub magnitude_threshold: f64,
    pub zoom: f64,
    pub pan: Point,
    pub stats: FrameStats,
    primitives: Vec<Primitive>,
}

impl SkyFrame {
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn circles(&self) -> impl Iterator<Item = &CirclePrimitive> {
        self.primitives.iter().filter_map(Primitive::as_circle)
    }

    pub fn lines(&self) -> impl Iterator<Item = &LinePrimitive> {
        self.primitives.iter().filter_map(Primitive::as_line)
    }

    pub fn stars(&self) -> impl Iterator<Item = &StarMarker> {
        self.primitives.iter().filter_map(Primitive::as_star)
    }

    /// The sky disk, always the first primitive.
    pub fn sky_disk(&self) -> Option<&CirclePrimitive> {
        self.primitives.first().and_then(Primitive::as_circle)
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}

/// Sky chart state and the frame built from it.
#[derive(Debug)]
pub struct SkyRenderModel {
    config: SceneConfig,
    colors: ColorScheme,
    catalog: CatalogStore,
    size: Size,
    geometry: SkyGeometry,
    meridians: Vec<f64>,
    parallels: Vec<f64>,
    hemisphere: Hemisphere,
    magnitude_threshold: f64,
    view: ViewTransform,
    frame: SkyFrame,
}

impl SkyRenderModel {
    /// Builds the model and its first frame.
    ///
    /// # Errors
    /// Returns [`SkyError::InvalidConfig`] if `config` or `colors` fail
    /// validation or the viewport cannot hold a sky disk.
    pub fn new(
        size: Size,
        config: SceneConfig,
        colors: ColorScheme,
        catalog: CatalogStore,
    ) -> SkyResult<Self> {
        config.validate()?;
        colors.validate()?;
        let geometry = SkyGeometry::fit(size, config.margin)?;
        let view = ViewTransform::new(config.zoom_bounds()?);

        let mut model = Self {
            meridians: meridian_angles(config.meridian_step),
            parallels: parallel_fractions(config.parallel_step),
            magnitude_threshold: config.default_magnitude_threshold,
            hemisphere: Hemisphere::default(),
            frame: SkyFrame {
                size,
                background: colors.background,
                hemisphere: Hemisphere::default(),
                magnitude_threshold: config.default_magnitude_threshold,
                zoom: view.zoom(),
                pan: view.pan(),
                stats: FrameStats::default(),
                primitives: Vec::new(),
            },
            config,
            colors,
            catalog,
            size,
            geometry,
            view,
        };
        model.rebuild();
        Ok(model)
    }

    /// Default config and colors.
    pub fn with_catalog(size: Size, catalog: CatalogStore) -> SkyResult<Self> {
        Self::new(size, SceneConfig::default(), ColorScheme::default(), catalog)
    }

    pub fn frame(&self) -> &SkyFrame {
        &self.frame
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn colors(&self) -> &ColorScheme {
        &self.colors
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn geometry(&self) -> SkyGeometry {
        self.geometry
    }

    pub fn hemisphere(&self) -> Hemisphere {
        self.hemisphere
    }

    pub fn magnitude_threshold(&self) -> f64 {
        self.magnitude_threshold
    }

    pub fn meridian_angles(&self) -> &[f64] {
        &self.meridians
    }

    pub fn parallel_fractions(&self) -> &[f64] {
        &self.parallels
    }

    /// Reloads the catalog and rebuilds.
    ///
    /// A failed load leaves an empty catalog; the frame is still rebuilt
    /// (without stars) before the error is returned.
    pub fn reload_catalog(&mut self, source: &dyn StarSource) -> SkyResult<LoadReport> {
        let result = self.catalog.load(source);
        if let Err(err) = &result {
            warn!("drawing without stars: {}", err);
        }
        self.rebuild();
        result
    }

    pub fn set_colors(&mut self, colors: ColorScheme) -> SkyResult<()> {
        colors.validate()?;
        self.colors = colors;
        self.rebuild();
        Ok(())
    }

    pub fn set_hemisphere(&mut self, hemisphere: Hemisphere) {
        self.hemisphere = hemisphere;
        self.rebuild();
    }

    pub fn set_magnitude_threshold(&mut self, magnitude: f64) {
        self.magnitude_threshold = magnitude;
        self.rebuild();
    }

    pub fn on_pinch_begin(&mut self) {
        self.view.begin_pinch();
        self.rebuild();
    }

    /// `focal` is the pinch center on screen, in the frame's coordinates
    /// (the space [`ViewTransform::apply`] maps to), if known.
    pub fn on_pinch_update(&mut self, scale: f64, focal: Option<Point>) {
        self.view.update_pinch(scale, focal, self.geometry.center);
        self.rebuild();
    }

    pub fn on_pinch_end(&mut self) {
        self.view.end_pinch();
        self.rebuild();
    }

    pub fn on_pan_begin(&mut self) {
        self.view.begin_pan();
        self.rebuild();
    }

    /// `delta` is the translation since the pan began, in view coordinates.
    pub fn on_pan_update(&mut self, delta: Point) {
        self.view.update_pan(delta);
        self.rebuild();
    }

    pub fn on_pan_end(&mut self) {
        self.view.end_pan();
        self.rebuild();
    }

    /// Refits the sky disk to a new viewport. Zoom and pan are kept.
    ///
    /// # Errors
    /// Returns [`SkyError::InvalidConfig`] if the viewport is too small; the
    /// previous layout and frame stay in place.
    pub fn resize(&mut self, size: Size) -> SkyResult<()> {
        self.geometry = SkyGeometry::fit(size, self.config.margin)?;
        self.size = size;
        self.rebuild();
        Ok(())
    }

    fn grid_stroke(&self) -> Stroke {
        Stroke {
            color: self.colors.sky_line,
            width: self.config.grid_line_width,
            alpha: self.config.grid_alpha,
        }
    }

    /// Recomputes every primitive from zoom 1 geometry.
    fn rebuild(&mut self) {
        let center = self.geometry.center;
        let sky_radius = self.geometry.radius;
        let zoom = self.view.zoom();
        let screen_center = self.view.apply(center, center);
        let grid = self.grid_stroke();

        let mut primitives =
            Vec::with_capacity(1 + self.parallels.len() + self.meridians.len());
        let mut stats = FrameStats::default();

        primitives.push(Primitive::Circle(CirclePrimitive {
            role: CircleRole::SkyDisk,
            center: screen_center,
            radius: sky_radius * zoom,
            fill: Some(self.colors.sky),
            stroke: Some(Stroke {
                color: self.colors.sky_border,
                width: self.config.grid_line_width,
                alpha: 1.0,
            }),
            glow_width: self.config.border_glow_width,
        }));

        for &fraction in &self.parallels {
            primitives.push(Primitive::Circle(CirclePrimitive {
                role: CircleRole::Parallel { fraction },
                center: screen_center,
                radius: sky_radius * zoom * fraction,
                fill: None,
                stroke: Some(grid),
                glow_width: 0.0,
            }));
        }
        stats.parallels = self.parallels.len();

        for &angle in &self.meridians {
            let rim = Point::polar(center, sky_radius, angle);
            primitives.push(Primitive::Line(LinePrimitive {
                right_ascension: angle,
                from: screen_center,
                to: self.view.apply(rim, center),
                stroke: grid,
            }));
        }
        stats.meridians = self.meridians.len();

        let projector = CelestialProjector::new(sky_radius, center, &self.config);
        for star in self
            .catalog
            .query(self.magnitude_threshold, Some(self.hemisphere))
        {
            match projector.project_star(star) {
                Ok((base, look)) => {
                    primitives.push(Primitive::Star(StarMarker {
                        id: star.id,
                        magnitude: star.mag.unwrap_or_default(),
                        center: self.view.apply(base, center),
                        radius: look.radius,
                        color: self.colors.star,
                        opacity: look.opacity,
                        glow_width: look.glow_width,
                    }));
                    stats.stars += 1;
                }
                Err(err) => {
                    debug!("{}", err);
                    stats.skipped_unprojectable += 1;
                }
            }
        }

        debug!(
            hemisphere = %self.hemisphere,
            threshold = self.magnitude_threshold,
            zoom,
            stars = stats.stars,
            skipped = stats.skipped_unprojectable,
            "rebuilt sky frame"
        );

        self.frame = SkyFrame {
            size: self.size,
            background: self.colors.background,
            hemisphere: self.hemisphere,
            magnitude_threshold: self.magnitude_threshold,
            zoom,
            pan: self.view.pan(),
            stats,
            primitives,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use sky_catalog::{SourceBatch, StarRecord};
    use sky_core::constants::{DEG_TO_RAD, PI};

    struct Stars(Vec<StarRecord>);

    impl StarSource for Stars {
        fn name(&self) -> String {
            "test".into()
        }

        fn read_records(&self) -> SkyResult<SourceBatch> {
            Ok(SourceBatch::from_records(self.0.clone()))
        }
    }

    fn star(id: i64, mag: f64, ra_deg: f64, dec_deg: f64) -> StarRecord {
        StarRecord {
            id,
            mag: Some(mag),
            dec: Some(dec_deg),
            rarad: Some(ra_deg * DEG_TO_RAD),
            decrad: Some(dec_deg * DEG_TO_RAD),
            ..Default::default()
        }
    }

    fn model() -> SkyRenderModel {
        let stars = vec![
            star(1, 0.03, 0.0, 90.0),
            star(2, 2.0, 90.0, 45.0),
            star(3, -1.44, 101.0, -16.7),
            star(4, 3.9, 180.0, 0.0),
            star(5, 5.5, 10.0, 20.0),
            StarRecord {
                rarad: None,
                ..star(6, 1.5, 0.0, 30.0)
            },
        ];
        let (catalog, _) = CatalogStore::open(&Stars(stars)).unwrap();
        SkyRenderModel::with_catalog(Size::new(420.0, 320.0), catalog).unwrap()
    }

    #[test]
    fn test_grid_counts() {
        assert_eq!(meridian_angles(PI / 6.0).len(), 13);
        assert_eq!(parallel_fractions(1.0 / 3.0).len(), 4);
        assert_eq!(meridian_angles(PI / 2.0).len(), 5);

        let fractions = parallel_fractions(1.0 / 3.0);
        assert_eq!(fractions[0], 1.0);
        assert_abs_diff_eq!(fractions[3], 0.0, epsilon = 1e-12);
        assert!(fractions.iter().all(|&f| f >= 0.0));
    }

    #[test]
    fn test_geometry_fit() {
        let g = SkyGeometry::fit(Size::new(420.0, 320.0), 10.0).unwrap();
        assert_eq!(g.radius, 150.0);
        assert_eq!(g.center, Point::new(210.0, 160.0));
        assert!(SkyGeometry::fit(Size::new(20.0, 300.0), 10.0).is_err());
    }

    #[test]
    fn test_frame_order_and_counts() {
        let m = model();
        let frame = m.frame();
        assert_eq!(frame.stats.parallels, 4);
        assert_eq!(frame.stats.meridians, 13);
        assert_eq!(frame.len(), 1 + 4 + 13 + frame.stats.stars);

        assert!(matches!(
            frame.primitives()[0],
            Primitive::Circle(CirclePrimitive { role: CircleRole::SkyDisk, .. })
        ));
        assert!(frame.primitives()[1..5]
            .iter()
            .all(|p| matches!(p, Primitive::Circle(_))));
        assert!(frame.primitives()[5..18]
            .iter()
            .all(|p| matches!(p, Primitive::Line(_))));
        assert!(frame.primitives()[18..]
            .iter()
            .all(|p| matches!(p, Primitive::Star(_))));
    }

    #[test]
    fn test_default_north_view() {
        let m = model();
        let frame = m.frame();
        assert_eq!(frame.hemisphere, Hemisphere::North);
        assert_eq!(frame.magnitude_threshold, 4.0);

        // id 3 is southern, id 5 too faint, id 6 has no position
        let ids: Vec<i64> = frame.stars().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 4]);
        assert_eq!(frame.stats.skipped_unprojectable, 1);

        let pole = frame.stars().next().unwrap();
        assert_abs_diff_eq!(pole.center.x, 210.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pole.center.y, 160.0, epsilon = 1e-9);
        assert!(pole.glow_width.is_some());

        let equator = frame.stars().find(|s| s.id == 4).unwrap();
        assert_abs_diff_eq!(equator.center.x, 60.0, epsilon = 1e-9);
        assert_abs_diff_eq!(equator.center.y, 160.0, epsilon = 1e-9);
    }

    #[test]
    fn test_hemisphere_and_threshold_intents() {
        let mut m = model();
        m.set_hemisphere(Hemisphere::South);
        let ids: Vec<i64> = m.frame().stars().map(|s| s.id).collect();
        assert_eq!(ids, vec![3, 4]);

        m.set_magnitude_threshold(3.9);
        let ids: Vec<i64> = m.frame().stars().map(|s| s.id).collect();
        assert_eq!(ids, vec![3]);

        m.set_hemisphere(Hemisphere::North);
        m.set_magnitude_threshold(10.0);
        assert_eq!(m.frame().stats.stars, 4);
    }

    #[test]
    fn test_pinch_scales_grid() {
        let mut m = model();
        m.on_pinch_begin();
        m.on_pinch_update(2.0, None);
        m.on_pinch_end();

        let frame = m.frame();
        assert_eq!(frame.zoom, 2.0);
        assert_eq!(frame.sky_disk().unwrap().radius, 300.0);

        let radii: Vec<f64> = frame.circles().skip(1).map(|c| c.radius).collect();
        assert_abs_diff_eq!(radii[0], 300.0, epsilon = 1e-9);
        assert_abs_diff_eq!(radii[1], 200.0, epsilon = 1e-9);
        assert_abs_diff_eq!(radii[2], 100.0, epsilon = 1e-9);

        let first = frame.lines().next().unwrap();
        assert_eq!(first.from, Point::new(210.0, 160.0));
        assert_abs_diff_eq!(first.to.x, 510.0, epsilon = 1e-9);
        assert_abs_diff_eq!(first.to.y, 160.0, epsilon = 1e-9);

        // star marker size is independent of zoom
        let vega = frame.stars().next().unwrap();
        assert_abs_diff_eq!(vega.radius, 6.0 * (1.0 - 0.03 * 0.125) / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pinch_keeps_focal_star_in_place() {
        let mut m = model();
        let equator = m.frame().stars().find(|s| s.id == 4).unwrap().center;
        m.on_pinch_begin();
        m.on_pinch_update(2.0, Some(equator));
        m.on_pinch_end();

        let after = m.frame().stars().find(|s| s.id == 4).unwrap().center;
        assert_abs_diff_eq!(after.x, equator.x, epsilon = 1e-9);
        assert_abs_diff_eq!(after.y, equator.y, epsilon = 1e-9);
        assert_eq!(m.frame().zoom, 2.0);
    }

    #[test]
    fn test_pinch_clamped_in_frame() {
        let mut m = model();
        m.on_pinch_begin();
        m.on_pinch_update(50.0, None);
        assert_eq!(m.frame().zoom, 8.0);
        assert_eq!(m.frame().sky_disk().unwrap().radius, 1200.0);
    }

    #[test]
    fn test_pan_moves_everything() {
        let mut m = model();
        let before = m.frame().clone();
        m.on_pan_begin();
        m.on_pan_update(Point::new(25.0, 10.0));
        m.on_pan_end();
        let after = m.frame();

        let shift = Point::new(25.0, -10.0);
        assert_eq!(after.sky_disk().unwrap().center, before.sky_disk().unwrap().center + shift);
        for (a, b) in after.stars().zip(before.stars()) {
            assert_abs_diff_eq!(a.center.x, b.center.x + shift.x, epsilon = 1e-9);
            assert_abs_diff_eq!(a.center.y, b.center.y + shift.y, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_resize_refits_disk() {
        let mut m = model();
        m.resize(Size::new(1000.0, 600.0)).unwrap();
        assert_eq!(m.geometry().radius, 290.0);
        assert_eq!(m.frame().sky_disk().unwrap().center, Point::new(500.0, 300.0));
        assert_eq!(m.frame().size, Size::new(1000.0, 600.0));

        let err = m.resize(Size::new(10.0, 10.0)).unwrap_err();
        assert!(matches!(err, SkyError::InvalidConfig { .. }));
        assert_eq!(m.geometry().radius, 290.0);
    }

    #[test]
    fn test_unloaded_catalog_draws_grid_only() {
        let m = SkyRenderModel::with_catalog(Size::new(300.0, 300.0), CatalogStore::new()).unwrap();
        assert_eq!(m.frame().stats.stars, 0);
        assert_eq!(m.frame().len(), 18);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SceneConfig {
            min_zoom: 3.0,
            max_zoom: 2.0,
            ..Default::default()
        };
        let err = SkyRenderModel::new(
            Size::new(300.0, 300.0),
            config,
            ColorScheme::default(),
            CatalogStore::new(),
        )
        .unwrap_err();
        assert!(!err.is_recoverable());
    }
}
