//! HYG star catalog loading and brightness/hemisphere queries.
//!
//! Reads the 37-column HYG star database (text rows or an SQLite table) into
//! an in-memory [`CatalogStore`], then answers "stars brighter than *m* in
//! hemisphere *h*" queries ordered brightest first.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`record`] | [`StarRecord`] with optional fields, [`SkyPosition`] |
//! | [`row`] | CSV row codec, [`FIELD_COUNT`](row::FIELD_COUNT), [`write_rows`](row::write_rows) |
//! | [`query`] | [`StarQuery`] filter and [`magnitude_order`](query::magnitude_order) |
//! | [`source`] | [`StarSource`] trait, [`TextCatalog`], `SqliteCatalog` |
//! | [`store`] | [`CatalogStore`] and [`LoadReport`] |
//!
//! # Quick Start
//!
//! ```
//! use sky_catalog::{CatalogStore, TextCatalog};
//! use sky_core::Hemisphere;
//!
//! let rows = "\
//! id,hip,hd,hr,gl,bf,proper,ra,dec,dist,pmra,pmdec,rv,mag,absmag,spect,ci,x,y,z,vx,vy,vz,rarad,decrad,pmrarad,pmdecrad,bayer,flam,con,comp,comp_primary,base,lum,var,var_min,var_max
//! 91262,91262,172167,7001,Gl 721,3Alp Lyr,Vega,18.615649,38.783692,7.6787,201.02,287.46,-13.5,0.030,0.604,A0Vvar,-0.001,1.997,-6.997,4.811,0.00000271,0.00000222,0.00000059,4.873563105816723,0.676903848977881,0.0000009745811519,0.0000013936475700000001,Alp,3,Lyr,1,91262,,49.9344457,,,
//! ";
//! let (store, report) = CatalogStore::open(&TextCatalog::from_string("inline", rows))?;
//! assert_eq!(report.loaded, 1);
//!
//! let north = store.query(5.0, Some(Hemisphere::North));
//! assert_eq!(north[0].proper.as_deref(), Some("Vega"));
//! # Ok::<(), sky_core::SkyError>(())
//! ```
//!
//! # Features
//!
//! - **`sqlite`**: Enables `SqliteCatalog`, an SQLite-backed source with an
//!   in-database filtered SELECT and a writer for building catalog databases.
//! - **`cli`**: Enables the `query-catalog` binary.

pub mod query;
pub mod record;
pub mod row;
pub mod source;
pub mod store;

pub use query::StarQuery;
pub use record::{SkyPosition, StarRecord};
pub use source::{SourceBatch, StarSource, TextCatalog};
pub use store::{CatalogStore, LoadReport};

#[cfg(feature = "sqlite")]
pub use source::SqliteCatalog;
