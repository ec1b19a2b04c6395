//! Shared building blocks for the sky chart crates.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`errors`] | [`SkyError`] and the [`SkyResult`] alias |
//! | [`constants`] | π multiples and degree/radian factors |
//! | [`geometry`] | [`Point`] and [`Size`] on the drawing plane |
//! | [`hemisphere`] | [`Hemisphere`] selection and declination membership |

pub mod constants;
pub mod errors;
pub mod geometry;
pub mod hemisphere;

pub use errors::{SkyError, SkyResult};
pub use geometry::{Point, Size};
pub use hemisphere::Hemisphere;
