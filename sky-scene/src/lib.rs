//! Sky chart scene: projection, gestures and frame building.
//!
//! Turns a [`CatalogStore`](sky_catalog::CatalogStore) into an ordered list of
//! drawables for one hemisphere. The pole sits at the center of a disk, the
//! equator on its rim, with a grid of meridians and parallels and one marker
//! per visible star sized and faded by magnitude.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`projector`] | [`project`], [`CelestialProjector`], [`StarAppearance`] |
//! | [`view`] | [`ViewTransform`] pinch/pan state, [`ZoomBounds`] |
//! | [`scene`] | [`SkyRenderModel`] intents and the [`SkyFrame`] it rebuilds |
//! | [`primitives`] | [`Primitive`] circles, lines and star markers |
//! | [`renderer`] | [`SkyRenderer`] trait and the `plotters` [`SvgRenderer`] |
//! | [`config`] | [`SceneConfig`] layout and styling constants |
//! | [`style`] | [`Color`], [`ColorScheme`] |
//!
//! # Quick Start
//!
//! ```
//! use sky_catalog::CatalogStore;
//! use sky_core::{Hemisphere, Point, Size};
//! use sky_scene::SkyRenderModel;
//!
//! let mut model = SkyRenderModel::with_catalog(Size::new(800.0, 600.0), CatalogStore::new())?;
//! model.set_hemisphere(Hemisphere::South);
//!
//! model.on_pinch_begin();
//! model.on_pinch_update(20.0, None);
//! model.on_pinch_end();
//! assert_eq!(model.frame().zoom, 8.0);
//!
//! model.on_pan_begin();
//! model.on_pan_update(Point::new(40.0, 0.0));
//! model.on_pan_end();
//!
//! // sky disk, 4 parallels, 13 meridians
//! assert_eq!(model.frame().len(), 18);
//! let svg = sky_scene::render_svg(model.frame())?;
//! assert!(svg.contains("<svg"));
//! # Ok::<(), sky_core::SkyError>(())
//! ```
//!
//! # Features
//!
//! - **`cli`**: Enables the `render-sky` binary.
//! - **`sqlite`**: Lets `render-sky` read SQLite catalogs.

pub mod config;
pub mod primitives;
pub mod projector;
pub mod renderer;
pub mod scene;
pub mod style;
pub mod view;

pub use config::SceneConfig;
pub use primitives::{CirclePrimitive, CircleRole, LinePrimitive, Primitive, StarMarker, Stroke};
pub use projector::{project, CelestialProjector, StarAppearance};
pub use renderer::{render, render_svg, SkyRenderer, SvgRenderer};
pub use scene::{FrameStats, SkyFrame, SkyGeometry, SkyRenderModel};
pub use style::{Color, ColorScheme};
pub use view::{Gesture, ViewTransform, ZoomBounds};
