//! Record normalization.
//!
//! Maps typed search records onto [`BibEntry`] values. Missing source fields
//! are left out of the entry; nothing is substituted for them.

use crate::bibtex::{BibEntry, EntryType};
use crate::error::{Result, XploreError};
use crate::record::{Authors, BookRecord, ConferenceRecord, IndexTerms, JournalRecord, RawRecord, SearchResult};
use regex::Regex;
use tracing::debug;

/// Prefix namespacing citation keys by source database
pub const ID_PREFIX: &str = "ieee";

/// Normalize every record of a page, in order.
///
/// Stops at the first record that cannot be normalized.
pub fn normalize_page(page: &SearchResult) -> Result<Vec<BibEntry>> {
    page.articles.iter().map(normalize).collect()
}

/// Normalize a single record according to its content type.
pub fn normalize(record: &RawRecord) -> Result<BibEntry> {
    match record {
        RawRecord::Journal(journal) => Ok(load_journal(journal)),
        RawRecord::Conference(conference) => Ok(load_inproceeding(conference)),
        RawRecord::Book(book) => Ok(load_book(book)),
        RawRecord::Unknown { content_type } => {
            Err(XploreError::UnknownRecordType(content_type.clone()))
        }
    }
}

fn citation_key(article_number: Option<&str>) -> String {
    format!("{ID_PREFIX}{}", article_number.unwrap_or_default())
}

fn load_journal(record: &JournalRecord) -> BibEntry {
    let mut entry = BibEntry::new(EntryType::Article, citation_key(record.article_number.as_deref()));
    debug!(id = %entry.id, content_type = %record.content_type, "Normalizing journal record");

    entry.set("title", record.title.as_deref());
    entry.set("abstract", record.abstract_text.as_deref());
    set_people(&mut entry, &record.authors, true);
    entry.set("doi", record.doi.as_deref());
    entry.set("booktitle", record.publication_title.as_deref());
    entry.set("issn", record.issn.as_deref());
    entry.set("issue", record.issue.as_deref());
    entry.set("number", record.publication_number.as_deref());
    entry.set("volume", record.volume.as_deref());
    entry.set("publisher", record.publisher.as_deref());
    entry.set_nonempty("pages", page_range(record.start_page.as_deref(), record.end_page.as_deref()));
    entry.set_nonempty("keywords", keywords(&record.index_terms));
    entry.set("pdfurl", record.pdf_url.as_deref());
    entry.set_nonempty("year", extract_year(record.publication_date.as_deref().unwrap_or_default()));
    entry
}

fn load_inproceeding(record: &ConferenceRecord) -> BibEntry {
    let mut entry = BibEntry::new(EntryType::InProceeding, citation_key(record.article_number.as_deref()));
    debug!(id = %entry.id, "Normalizing conference record");

    entry.set("title", record.title.as_deref());
    entry.set("abstract", record.abstract_text.as_deref());
    set_people(&mut entry, &record.authors, true);
    entry.set("doi", record.doi.as_deref());
    entry.set("booktitle", record.publication_title.as_deref());
    entry.set("conference_location", record.conference_location.as_deref());
    entry.set("conference_dates", record.conference_dates.as_deref());
    entry.set("isbn", record.isbn.as_deref());
    entry.set("publisher", record.publisher.as_deref());
    entry.set_nonempty("pages", page_range(record.start_page.as_deref(), record.end_page.as_deref()));
    entry.set_nonempty("keywords", keywords(&record.index_terms));
    entry.set("pdfurl", record.pdf_url.as_deref());
    entry.set_nonempty("year", extract_year(record.conference_dates.as_deref().unwrap_or_default()));
    entry
}

fn load_book(record: &BookRecord) -> BibEntry {
    let mut entry = BibEntry::new(EntryType::Book, citation_key(record.article_number.as_deref()));
    debug!(id = %entry.id, "Normalizing book record");

    entry.set("title", record.publication_title.as_deref());
    entry.set("chapter", record.title.as_deref());
    set_people(&mut entry, &record.authors, false);
    entry.set("doi", record.doi.as_deref());
    entry.set("isbn", record.isbn.as_deref());
    entry.set("publisher", record.publisher.as_deref());
    entry.set("pdfurl", record.pdf_url.as_deref());
    entry
}

fn set_people(entry: &mut BibEntry, authors: &Authors, with_affiliations: bool) {
    let list = &authors.authors;
    entry.set_nonempty("authors", join_present(list.iter().map(|a| a.full_name.as_deref()), ", "));
    if with_affiliations {
        entry.set_nonempty(
            "affiliations",
            join_present(list.iter().map(|a| a.affiliation.as_deref()), ", "),
        );
    }
}

fn keywords(index_terms: &IndexTerms) -> String {
    index_terms
        .author_terms
        .as_ref()
        .map(|t| join_present(t.terms.iter().map(|s| Some(s.as_str())), ", "))
        .unwrap_or_default()
}

/// `"<start> -- <end>"`, or whichever end is known
fn page_range(start: Option<&str>, end: Option<&str>) -> String {
    join_present([start, end], " -- ")
}

/// Join the present, non-blank values with `separator`.
pub fn join_present<'a, I>(values: I, separator: &str) -> String
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    values
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

/// First run of exactly four digits in `date`, or an empty string.
///
/// Works for `2021-05-01` as well as conference ranges like `12-15 May 2021`.
pub fn extract_year(date: &str) -> String {
    let Ok(digits) = Regex::new(r"\d+") else {
        return String::new();
    };
    let year = digits
        .find_iter(date)
        .map(|m| m.as_str())
        .find(|run| run.len() == 4)
        .unwrap_or_default()
        .to_string();
    year
}
