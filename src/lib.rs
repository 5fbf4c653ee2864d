//! # rustxplore
//!
//! Builds boolean search queries, pages through the IEEE Xplore search API and
//! turns the returned records into BibTeX entries.
//!
//! ## Modules
//!
//! - [`query`] - Term combination and field-scoped query strings
//! - [`xplore`] - Search API client
//! - [`record`] - Typed search records
//! - [`normalize`] - Record to BibTeX entry mapping
//! - [`bibtex`] - BibTeX entries and output files
//! - [`paginate`] - Pagination driver
//! - [`credentials`] - API key file
//! - [`pdf`] - `pdftotext` wrapper
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rustxplore::{paginate, query::FieldMask, xplore::{SearchParams, XploreClient}};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = XploreClient::new("my-api-key")?;
//!     let params = SearchParams::new("5G AND security", "abstract,doc-title".parse::<FieldMask>()?);
//!     let report = paginate::run_query(&client, &params, Path::new("query_results")).await?;
//!     println!("Wrote {} entries to {}", report.entries, report.path.display());
//!     Ok(())
//! }
//! ```

pub mod bibtex;
pub mod credentials;
pub mod error;
pub mod normalize;
pub mod paginate;
pub mod pdf;
pub mod query;
pub mod record;
pub mod xplore;

pub use error::{Result, XploreError};
