//! Normalized bibliographic entries and their BibTeX rendering.

use crate::error::Result;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Entry kind, written after the `@`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    Article,
    InProceeding,
    Book,
}

impl EntryType {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryType::Article => "article",
            EntryType::InProceeding => "inproceeding",
            EntryType::Book => "book",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized citation record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibEntry {
    pub entry_type: EntryType,
    /// Citation key, e.g. `ieee8123456`
    pub id: String,
    /// Field name to value, kept sorted by name
    pub fields: BTreeMap<String, String>,
}

impl BibEntry {
    pub fn new(entry_type: EntryType, id: impl Into<String>) -> Self {
        Self {
            entry_type,
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Set `name` if a value is present. Absent values leave the key out.
    pub fn set(&mut self, name: &str, value: Option<impl Into<String>>) {
        if let Some(value) = value {
            self.fields.insert(name.to_string(), value.into());
        }
    }

    /// Set `name` unless `value` is empty.
    pub fn set_nonempty(&mut self, name: &str, value: String) {
        if !value.is_empty() {
            self.fields.insert(name.to_string(), value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Render as a BibTeX entry followed by a blank line.
    pub fn to_bibtex(&self) -> String {
        let mut bib = format!("@{}{{{}", self.entry_type, self.id);
        for (name, value) in &self.fields {
            bib.push_str(&format!(",\n {name} = {{{value}}}"));
        }
        bib.push_str("\n}\n\n");
        bib
    }
}

/// Render entries in order.
pub fn render(entries: &[BibEntry]) -> String {
    entries.iter().map(BibEntry::to_bibtex).collect()
}

/// Append rendered entries to `path`, creating it if needed.
///
/// Existing content is never truncated.
pub fn append_to_file(path: &Path, entries: &[BibEntry]) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(render(entries).as_bytes())?;
    file.flush()?;
    info!(path = %path.display(), count = entries.len(), "Appended BibTeX entries");
    Ok(())
}
