//! PDF text extraction through the external `pdftotext` tool.
//!
//! Only the extraction and the derived lookup phrase live here; looking a
//! PDF up in a database is not supported.

use crate::error::{Result, XploreError};
use regex::Regex;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Words of extracted text used for a lookup phrase
const LOOKUP_WORDS: usize = 20;

/// Convert `pdf` to text, optionally starting at page `start_page`.
///
/// Runs `pdftotext -q [-f N] <pdf> -` and returns its standard output.
pub fn convert_pdf_to_txt(pdf: &Path, start_page: Option<u32>) -> Result<String> {
    let mut command = Command::new("pdftotext");
    command.arg("-q");
    if let Some(page) = start_page {
        command.arg("-f").arg(page.to_string());
    }
    command.arg(pdf).arg("-");

    debug!(pdf = %pdf.display(), start_page = ?start_page, "Running pdftotext");
    let output = command.output().map_err(|e| {
        XploreError::Config(format!("Failed to run pdftotext (is it installed?): {}", e))
    })?;

    if !output.status.success() {
        return Err(XploreError::Parse(format!(
            "pdftotext exited with {} for {}",
            output.status,
            pdf.display()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Lookup phrase: the first words of `text` once every non-word character
/// has been replaced by a space.
pub fn lookup_query(text: &str) -> String {
    let cleaned = match Regex::new(r"\W") {
        Ok(re) => re.replace_all(text, " ").into_owned(),
        Err(_) => text.to_string(),
    };
    cleaned
        .split_whitespace()
        .take(LOOKUP_WORDS)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_query_strips_punctuation() {
        assert_eq!(
            lookup_query("On-the-fly: 5G (security)\nanalysis!"),
            "On the fly 5G security analysis"
        );
    }

    #[test]
    fn test_lookup_query_word_limit() {
        let text = (1..=30).map(|n| format!("w{n}")).collect::<Vec<_>>().join(", ");
        let query = lookup_query(&text);
        assert_eq!(query.split(' ').count(), LOOKUP_WORDS);
        assert!(query.ends_with("w20"));
    }

    #[test]
    fn test_missing_pdf_fails() {
        assert!(convert_pdf_to_txt(Path::new("/nonexistent/paper.pdf"), Some(2)).is_err());
    }
}
