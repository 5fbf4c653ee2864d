//! Pagination driver.
//!
//! Walks every page of one query, normalizes the records and appends the
//! BibTeX for the whole query once all pages are in. A failing page drops
//! everything gathered for the query so far.

use crate::bibtex::{self, BibEntry};
use crate::error::{Result, XploreError};
use crate::normalize::normalize_page;
use crate::xplore::{SearchApi, SearchParams};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Entries gathered for one query
#[derive(Debug, Default)]
pub struct Harvest {
    pub entries: Vec<BibEntry>,
    /// Pages fetched, the first one included
    pub pages: usize,
    /// Total reported by the first page
    pub total_records: u32,
}

/// Outcome of a query whose entries were written
#[derive(Debug)]
pub struct QueryReport {
    pub query: String,
    pub pages: usize,
    pub entries: usize,
    pub total_records: u32,
    pub path: PathBuf,
}

/// Fetch and normalize every page of `params`.
///
/// The total from the first page bounds the loop; it is not refreshed.
/// Errors on the first page are returned as-is. Fetch errors on later pages
/// are wrapped in [`XploreError::PageFailed`].
pub async fn collect_all<A>(api: &A, params: &SearchParams) -> Result<Harvest>
where
    A: SearchApi + ?Sized,
{
    let first = api.search(params, 1).await?;
    let total_records = first.total_records;

    let mut harvest = Harvest {
        entries: normalize_page(&first)?,
        pages: 1,
        total_records,
    };

    let mut next_start = 1u32.saturating_add(params.max_records);
    while next_start <= total_records {
        info!(
            query = %params.query,
            start_record = next_start,
            total = total_records,
            "Retrieving next page"
        );

        let page = match api.search(params, next_start).await {
            Ok(page) => page,
            Err(e) => {
                return Err(XploreError::PageFailed {
                    start_record: next_start,
                    pages_fetched: harvest.pages,
                    records_fetched: harvest.entries.len(),
                    source: Box::new(e),
                });
            }
        };

        harvest.entries.extend(normalize_page(&page)?);
        harvest.pages += 1;
        next_start = next_start.saturating_add(params.max_records);
    }

    info!(
        query = %params.query,
        pages = harvest.pages,
        entries = harvest.entries.len(),
        total = total_records,
        "Query complete"
    );
    Ok(harvest)
}

/// Run one query end to end and append its entries under `results_dir`.
///
/// Nothing is written unless every page succeeded.
pub async fn run_query<A>(api: &A, params: &SearchParams, results_dir: &Path) -> Result<QueryReport>
where
    A: SearchApi + ?Sized,
{
    let harvest = collect_all(api, params).await?;
    let path = output_path(results_dir, &params.query, params.field_mask.bits(), "bib");

    if harvest.entries.is_empty() {
        warn!(query = %params.query, "Query returned no records");
    }
    bibtex::append_to_file(&path, &harvest.entries)?;

    Ok(QueryReport {
        query: params.query.clone(),
        pages: harvest.pages,
        entries: harvest.entries.len(),
        total_records: harvest.total_records,
        path,
    })
}

/// `<results_dir>/<query>-mask=<bits>.<extension>` with a filesystem-safe query.
pub fn output_path(results_dir: &Path, query: &str, mask_bits: u32, extension: &str) -> PathBuf {
    results_dir.join(format!("{}-mask={}.{}", safe_file_stem(query), mask_bits, extension))
}

fn safe_file_stem(query: &str) -> String {
    let stem = query
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-' || *c == '_')
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");

    if stem.is_empty() {
        "query".to_string()
    } else {
        stem
    }
}
