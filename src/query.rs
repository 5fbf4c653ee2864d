//! Query construction.
//!
//! Turns lists of alternative terms into combined search strings and scopes a
//! search string to a set of document fields using the Xplore command syntax.

use crate::error::{Result, XploreError};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Boolean AND with the spacing the API expects
pub const AND: &str = " AND ";

/// Boolean OR with the spacing the API expects
pub const OR: &str = " OR ";

/// Combine groups of alternative terms into every possible query.
///
/// One term is taken from each group, in group order, and joined with
/// `operator`. The first group varies slowest:
///
/// ```
/// use rustxplore::query::combine;
///
/// let groups = vec![
///     vec!["A".to_string(), "B".to_string()],
///     vec!["C".to_string(), "D".to_string()],
/// ];
/// let queries = combine(&groups, " ").unwrap();
/// assert_eq!(queries, ["A C", "A D", "B C", "B D"]);
/// ```
///
/// A single group is returned as-is. An empty group would yield no queries
/// at all and is rejected.
pub fn combine(groups: &[Vec<String>], operator: &str) -> Result<Vec<String>> {
    let (first, rest) = groups
        .split_first()
        .ok_or_else(|| XploreError::InvalidInput("at least one term group is required".into()))?;

    if let Some(position) = groups.iter().position(|group| group.is_empty()) {
        return Err(XploreError::InvalidInput(format!(
            "term group {} has no terms",
            position + 1
        )));
    }

    let mut queries = first.clone();
    for group in rest {
        queries = queries
            .iter()
            .flat_map(|prefix| group.iter().map(move |term| format!("{prefix}{operator}{term}")))
            .collect();
    }

    Ok(queries)
}

/// Document fields a search clause can be restricted to.
///
/// Declaration order is the canonical clause order used when building a
/// scoped query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SearchField {
    Abstract,
    PublicationTitle,
    DocumentTitle,
    Authors,
    Affiliations,
    Keywords,
}

impl SearchField {
    pub const ALL: [SearchField; 6] = [
        SearchField::Abstract,
        SearchField::PublicationTitle,
        SearchField::DocumentTitle,
        SearchField::Authors,
        SearchField::Affiliations,
        SearchField::Keywords,
    ];

    /// Field name as written in a command search clause
    pub fn label(self) -> &'static str {
        match self {
            SearchField::Abstract => "\"Abstract\"",
            SearchField::PublicationTitle => "\"Publication Title\"",
            SearchField::DocumentTitle => "\"Document Title\"",
            SearchField::Authors => "\"Authors\"",
            SearchField::Affiliations => "\"Author Affiliations\"",
            SearchField::Keywords => "\"Author Keywords\"",
        }
    }

    /// Stable bit used in output file names
    pub fn bit(self) -> u32 {
        match self {
            SearchField::Abstract => 1,
            SearchField::DocumentTitle => 1 << 1,
            SearchField::PublicationTitle => 1 << 2,
            SearchField::Authors => 1 << 3,
            SearchField::Affiliations => 1 << 4,
            SearchField::Keywords => 1 << 5,
        }
    }

    /// Name accepted on the command line
    pub fn name(self) -> &'static str {
        match self {
            SearchField::Abstract => "abstract",
            SearchField::PublicationTitle => "pub-title",
            SearchField::DocumentTitle => "doc-title",
            SearchField::Authors => "authors",
            SearchField::Affiliations => "affiliations",
            SearchField::Keywords => "keywords",
        }
    }
}

impl FromStr for SearchField {
    type Err = XploreError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        SearchField::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| XploreError::InvalidInput(format!("unknown search field '{s}'")))
    }
}

/// Set of fields a query is scoped to. Empty means unscoped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMask(BTreeSet<SearchField>);

impl FieldMask {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fields in canonical order
    pub fn iter(&self) -> impl Iterator<Item = SearchField> + '_ {
        self.0.iter().copied()
    }

    /// Numeric form, e.g. abstract + doc-title = 3
    pub fn bits(&self) -> u32 {
        self.iter().fold(0, |acc, f| acc | f.bit())
    }

    pub fn from_bits(bits: u32) -> Result<Self> {
        let known = SearchField::ALL.iter().fold(0, |acc, f| acc | f.bit());
        if bits & !known != 0 {
            return Err(XploreError::InvalidInput(format!(
                "field mask {bits} has unknown bits set"
            )));
        }
        Ok(SearchField::ALL.into_iter().filter(|f| bits & f.bit() != 0).collect())
    }
}

impl FromIterator<SearchField> for FieldMask {
    fn from_iter<I: IntoIterator<Item = SearchField>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Parses `abstract,doc-title`; `none` or an empty string gives an empty mask.
impl FromStr for FieldMask {
    type Err = XploreError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("none") {
            return Ok(Self::empty());
        }
        s.split(',').map(SearchField::from_str).collect()
    }
}

impl fmt::Display for FieldMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let names: Vec<&str> = self.iter().map(SearchField::name).collect();
        f.write_str(&names.join(","))
    }
}

/// Build the percent-encoded `querytext` value for `search_text`.
///
/// With no fields the bare text is encoded. Otherwise each field yields a
/// `(<label>:<text>)` clause; clauses and the operator are each encoded once
/// and joined.
pub fn build_field_scoped_query(search_text: &str, fields: &FieldMask, operator: &str) -> String {
    if fields.is_empty() {
        return urlencoding::encode(search_text).into_owned();
    }

    let operator = urlencoding::encode(operator);
    fields
        .iter()
        .map(|field| urlencoding::encode(&format!("({}:{})", field.label(), search_text)).into_owned())
        .collect::<Vec<_>>()
        .join(&operator)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|g| g.iter().map(|t| t.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_combine_two_groups() {
        let queries = combine(&groups(&[&["A", "B"], &["C", "D"]]), " ").expect("combine failed");
        assert_eq!(queries, ["A C", "A D", "B C", "B D"]);
    }

    #[test]
    fn test_combine_three_groups_order_and_count() {
        let queries = combine(&groups(&[&["A", "B"], &["C", "D"], &["E", "F"]]), " ")
            .expect("combine failed");
        assert_eq!(
            queries,
            ["A C E", "A C F", "A D E", "A D F", "B C E", "B C F", "B D E", "B D F"]
        );

        let sized = combine(&groups(&[&["a", "b", "c"], &["d"], &["e", "f"]]), AND)
            .expect("combine failed");
        assert_eq!(sized.len(), 6);
        assert_eq!(sized[0], "a AND d AND e");
    }

    #[test]
    fn test_combine_single_group_is_identity() {
        let input = groups(&[&["x y", "z"]]);
        let queries = combine(&input, AND).expect("combine failed");
        assert_eq!(queries, input[0]);
    }

    #[test]
    fn test_combine_no_groups_is_invalid() {
        let err = combine(&[], AND).expect_err("empty input must fail");
        assert!(matches!(err, XploreError::InvalidInput(_)));
    }

    #[test]
    fn test_combine_empty_group_is_invalid() {
        let err = combine(&groups(&[&["5G", "LTE"], &[]]), AND).expect_err("empty group must fail");
        match err {
            XploreError::InvalidInput(message) => assert!(message.contains("group 2")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unscoped_query_is_encoded_text() {
        assert_eq!(build_field_scoped_query("x", &FieldMask::empty(), AND), "x");
        assert_eq!(
            build_field_scoped_query("5G security", &FieldMask::empty(), AND),
            "5G%20security"
        );
    }

    #[test]
    fn test_scoped_query_canonical_order() {
        // inserted out of canonical order on purpose
        let mask: FieldMask = [SearchField::Authors, SearchField::Abstract].into_iter().collect();
        let query = build_field_scoped_query("x", &mask, AND);

        let abstract_clause = urlencoding::encode("(\"Abstract\":x)").into_owned();
        let authors_clause = urlencoding::encode("(\"Authors\":x)").into_owned();
        assert_eq!(query, format!("{abstract_clause}%20AND%20{authors_clause}"));
        assert!(!query.ends_with("%20AND%20"));
    }

    #[test]
    fn test_publication_title_precedes_document_title() {
        let mask: FieldMask = "doc-title,pub-title".parse().expect("parse failed");
        let query = build_field_scoped_query("x", &mask, OR);
        let pub_pos = query.find("Publication").expect("pub title clause");
        let doc_pos = query.find("Document").expect("doc title clause");
        assert!(pub_pos < doc_pos);
    }

    #[test]
    fn test_mask_bits_round_trip() {
        let mask: FieldMask = "abstract,doc-title".parse().expect("parse failed");
        assert_eq!(mask.bits(), 3);
        assert_eq!(FieldMask::from_bits(3).expect("valid bits"), mask);
        assert!(FieldMask::from_bits(1 << 9).is_err());
        assert_eq!(mask.to_string(), "abstract,doc-title");
    }

    #[test]
    fn test_mask_parse_none_and_unknown() {
        assert!("none".parse::<FieldMask>().expect("parse failed").is_empty());
        assert!("abstract,isbn".parse::<FieldMask>().is_err());
    }
}
