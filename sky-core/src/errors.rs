//! Error type shared by the catalog and scene crates.
//!
//! Nothing in the sky chart pipeline is fatal per record or per query: a bad
//! catalog row costs one star, an unreachable catalog costs the star layer,
//! and rendering carries on with whatever survived. [`SkyError`] names each
//! of those degradations so callers can report them.
//!
//! # Error Categories
//!
//! | Variant | Raised by | Recoverable? |
//! |---------|-----------|--------------|
//! | [`CatalogUnavailable`](SkyError::CatalogUnavailable) | catalog load (file or table missing) | Yes |
//! | [`MalformedRow`](SkyError::MalformedRow) | row parser (field count, bad id) | Yes |
//! | [`UnprojectableStar`](SkyError::UnprojectableStar) | render pass (missing position or magnitude) | Yes |
//! | [`InvalidConfig`](SkyError::InvalidConfig) | scene construction, config files | No |
//! | [`RenderFailed`](SkyError::RenderFailed) | drawing backend | Yes |
//!
//! ```
//! use sky_core::{SkyError, SkyResult};
//!
//! fn require_positive(step: f64) -> SkyResult<f64> {
//!     if step <= 0.0 {
//!         return Err(SkyError::invalid_config("meridian step must be positive"));
//!     }
//!     Ok(step)
//! }
//!
//! assert!(require_positive(0.0).is_err());
//! ```

use thiserror::Error;

/// Unified error type for catalog loading, row parsing and scene building.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SkyError {
    /// The backing file or table is missing or cannot be opened.
    #[error("Catalog unavailable ({source_name}): {message}")]
    CatalogUnavailable {
        source_name: String,
        message: String,
    },

    /// A catalog row could not be decoded; the row is skipped.
    #[error("Malformed row at line {line}: {message}")]
    MalformedRow { line: usize, message: String },

    /// A record lacks one of `rarad`, `decrad` or `mag` and cannot be drawn.
    #[error("Star {id} cannot be projected: missing {missing}")]
    UnprojectableStar { id: i64, missing: &'static str },

    /// Scene or view configuration is inconsistent.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// The drawing backend rejected a frame.
    #[error("Render failed: {message}")]
    RenderFailed { message: String },
}

/// Convenience alias for `Result<T, SkyError>`.
pub type SkyResult<T> = Result<T, SkyError>;

impl SkyError {
    /// Creates a [`CatalogUnavailable`](Self::CatalogUnavailable) error.
    pub fn catalog_unavailable(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CatalogUnavailable {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Creates a [`MalformedRow`](Self::MalformedRow) error for a 1-based line number.
    pub fn malformed_row(line: usize, message: impl Into<String>) -> Self {
        Self::MalformedRow {
            line,
            message: message.into(),
        }
    }

    pub fn unprojectable_star(id: i64, missing: &'static str) -> Self {
        Self::UnprojectableStar { id, missing }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    pub fn render_failed(message: impl Into<String>) -> Self {
        Self::RenderFailed {
            message: message.into(),
        }
    }

    /// Returns `true` if the pipeline can keep going after this error.
    ///
    /// Only [`InvalidConfig`](Self::InvalidConfig) stops scene construction;
    /// every other variant degrades to fewer stars drawn.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InvalidConfig { .. })
    }
}
