//! Typed view of the records returned by the search endpoint.
//!
//! Each article carries a `content_type` tag. The tag selects one of the
//! typed record structs below; anything else is kept as
//! [`RawRecord::Unknown`] so the normalizer can refuse it.

use serde::{Deserialize, Deserializer};

/// One search response page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResult {
    /// Records matching the query on the server
    #[serde(default)]
    pub total_records: u32,
    /// Records the server looked at
    #[serde(default)]
    pub total_searched: u32,
    /// Records on this page, in server order
    #[serde(default)]
    pub articles: Vec<RawRecord>,
}

/// A single article, decoded by content type
#[derive(Debug, Clone)]
pub enum RawRecord {
    /// "Journals" and "Early Access"
    Journal(JournalRecord),
    /// "Conferences"
    Conference(ConferenceRecord),
    /// "Books"
    Book(BookRecord),
    /// Any other content type, including a missing tag
    Unknown { content_type: String },
}

impl RawRecord {
    /// Dispatch on the `content_type` tag of a raw JSON article.
    pub fn from_value(value: serde_json::Value) -> serde_json::Result<Self> {
        let content_type = value
            .get("content_type")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        Ok(match content_type.as_str() {
            "Journals" | "Early Access" => RawRecord::Journal(serde_json::from_value(value)?),
            "Conferences" => RawRecord::Conference(serde_json::from_value(value)?),
            "Books" => RawRecord::Book(serde_json::from_value(value)?),
            _ => RawRecord::Unknown { content_type },
        })
    }

    pub fn content_type(&self) -> &str {
        match self {
            RawRecord::Journal(r) => &r.content_type,
            RawRecord::Conference(_) => "Conferences",
            RawRecord::Book(_) => "Books",
            RawRecord::Unknown { content_type } => content_type,
        }
    }
}

impl<'de> Deserialize<'de> for RawRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        RawRecord::from_value(value).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JournalRecord {
    /// Either "Journals" or "Early Access"
    pub content_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub article_number: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "abstract")]
    pub abstract_text: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub authors: Authors,
    #[serde(default)]
    pub doi: Option<String>,
    #[serde(default)]
    pub publication_title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub issn: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub issue: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub publication_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub volume: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub start_page: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub end_page: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub index_terms: IndexTerms,
    #[serde(default)]
    pub pdf_url: Option<String>,
    #[serde(default)]
    pub publication_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConferenceRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub article_number: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "abstract")]
    pub abstract_text: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub authors: Authors,
    #[serde(default)]
    pub doi: Option<String>,
    #[serde(default)]
    pub publication_title: Option<String>,
    #[serde(default)]
    pub conference_location: Option<String>,
    #[serde(default)]
    pub conference_dates: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub isbn: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub start_page: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub end_page: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub index_terms: IndexTerms,
    #[serde(default)]
    pub pdf_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub article_number: Option<String>,
    /// Chapter title
    #[serde(default)]
    pub title: Option<String>,
    /// Book title
    #[serde(default)]
    pub publication_title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub authors: Authors,
    #[serde(default)]
    pub doi: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub isbn: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub pdf_url: Option<String>,
}

/// The `authors` object wraps the actual list
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Authors {
    #[serde(default, deserialize_with = "null_as_default")]
    pub authors: Vec<Author>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub affiliation: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexTerms {
    /// Keywords supplied by the authors
    #[serde(default)]
    pub author_terms: Option<TermList>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TermList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub terms: Vec<String>,
}

/// Accept a string or a number; the API is not consistent about either.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Treat an explicit `null` like a missing value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dispatch_on_content_type() {
        let page: SearchResult = serde_json::from_value(json!({
            "total_records": 3,
            "total_searched": 100,
            "articles": [
                {"content_type": "Early Access", "article_number": "1", "title": "a"},
                {"content_type": "Conferences", "article_number": 2},
                {"content_type": "Books", "article_number": "3"}
            ]
        }))
        .expect("decode failed");

        assert_eq!(page.total_records, 3);
        assert!(matches!(&page.articles[0], RawRecord::Journal(j) if j.content_type == "Early Access"));
        match &page.articles[1] {
            RawRecord::Conference(c) => assert_eq!(c.article_number.as_deref(), Some("2")),
            other => panic!("expected conference, got {other:?}"),
        }
        assert!(matches!(page.articles[2], RawRecord::Book(_)));
    }

    #[test]
    fn test_unknown_and_missing_content_type() {
        let standard = RawRecord::from_value(json!({"content_type": "Standards"})).expect("decode");
        assert_eq!(standard.content_type(), "Standards");
        assert!(matches!(standard, RawRecord::Unknown { .. }));

        let untagged = RawRecord::from_value(json!({"title": "x"})).expect("decode");
        assert!(matches!(untagged, RawRecord::Unknown { ref content_type } if content_type.is_empty()));
    }

    #[test]
    fn test_page_without_articles() {
        let page: SearchResult =
            serde_json::from_value(json!({"total_records": 0, "total_searched": 12})).expect("decode");
        assert!(page.articles.is_empty());
    }

    #[test]
    fn test_nested_authors_and_terms() {
        let record = RawRecord::from_value(json!({
            "content_type": "Journals",
            "authors": {"authors": [
                {"full_name": "Ada Lovelace", "affiliation": "Analytical Engines"},
                {"full_name": "Charles Babbage"}
            ]},
            "index_terms": {
                "ieee_terms": {"terms": ["ignored"]},
                "author_terms": {"terms": ["engines", "notes"]}
            },
            "volume": 12
        }))
        .expect("decode");

        let RawRecord::Journal(journal) = record else {
            panic!("expected a journal record");
        };
        assert_eq!(journal.authors.authors.len(), 2);
        assert!(journal.authors.authors[1].affiliation.is_none());
        assert_eq!(journal.volume.as_deref(), Some("12"));
        let terms = journal.index_terms.author_terms.expect("author terms");
        assert_eq!(terms.terms, ["engines", "notes"]);
    }

    #[test]
    fn test_null_lists_are_empty() {
        let record = RawRecord::from_value(json!({
            "content_type": "Conferences",
            "authors": {"authors": null},
            "index_terms": {"author_terms": {"terms": null}}
        }))
        .expect("null author list must decode");
        let RawRecord::Conference(conference) = record else {
            panic!("expected a conference record");
        };
        assert!(conference.authors.authors.is_empty());
        assert!(conference.index_terms.author_terms.expect("author terms").terms.is_empty());

        let record = RawRecord::from_value(json!({
            "content_type": "Books",
            "authors": null
        }))
        .expect("null authors must decode");
        assert!(matches!(record, RawRecord::Book(b) if b.authors.authors.is_empty()));
    }
}
