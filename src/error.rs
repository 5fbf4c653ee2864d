//! Custom error types for rustxplore.
//!
//! All library functions return `Result<T, XploreError>` instead of using `unwrap()`.

use thiserror::Error;

/// Main error type for rustxplore operations.
#[derive(Debug, Error)]
pub enum XploreError {
    /// Malformed caller arguments (empty term groups, bad page size, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Network/HTTP request error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Remote API answered with a non-success status
    #[error("API error: {code} - {message}")]
    Api {
        /// HTTP status code
        code: i32,
        /// Error message from API
        message: String,
    },

    /// API rejected the key
    #[error("Authorization failed: {0}")]
    Auth(String),

    /// Empty or null body where records were expected
    #[error("Empty result: {0}")]
    EmptyResult(String),

    /// Content type outside journal/conference/book
    #[error("Unknown record content type: {0:?}")]
    UnknownRecordType(String),

    /// A page after the first one failed; nothing of this query was written.
    #[error(
        "Page starting at record {start_record} failed after {pages_fetched} page(s) \
         and {records_fetched} record(s): {source}"
    )]
    PageFailed {
        start_record: u32,
        pages_fetched: usize,
        records_fetched: usize,
        #[source]
        source: Box<XploreError>,
    },

    /// Response could not be interpreted
    #[error("Parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

impl XploreError {
    /// Whether this failure should stop the whole batch instead of only the
    /// current query.
    ///
    /// Transport, authorization and empty-result failures end the run.
    /// Bad input and unknown record types only abort the query they hit.
    pub fn aborts_run(&self) -> bool {
        match self {
            XploreError::Network(_)
            | XploreError::Api { .. }
            | XploreError::Auth(_)
            | XploreError::EmptyResult(_) => true,
            XploreError::PageFailed { source, .. } => source.aborts_run(),
            _ => false,
        }
    }
}

/// Result type alias using `XploreError`
pub type Result<T> = std::result::Result<T, XploreError>;
