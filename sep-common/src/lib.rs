//! Common types and utilities shared across the SEP harvester crates.
//!
//! This crate holds the data model that flows from extraction to export,
//! keyword-list parsing, and observability helpers. It stays
//! dependency-minimal so every crate in the workspace can depend on it.
//!
//! # Overview
//!
//! - [`Entry`]: one successfully extracted encyclopedia article
//! - [`parse_keywords`]: split a comma-separated keyword line
//! - [`observability`]: centralised tracing/logging initialisation
//!
//! # Examples
//!
//! ```rust
//! use sep_common::{parse_keywords, Entry};
//!
//! let keywords = parse_keywords("free will, , determinism");
//! assert_eq!(keywords, vec!["free will", "determinism"]);
//!
//! let entry = Entry::new("Free Will", "Free will is ...");
//! assert_eq!(entry.char_count(), 16);
//! ```
use serde::{Deserialize, Serialize};

pub mod observability;

/// One successfully extracted article: a title and its cleaned body text.
///
/// Entries are only built for extractions that produced non-empty content and
/// are never mutated afterwards. Serialization uses the exported column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Content")]
    pub content: String,
}

impl Entry {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Length of the content in characters (not bytes).
    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }
}

/// Split a comma-separated keyword line into trimmed, non-blank keywords,
/// preserving input order. Duplicates are kept.
pub fn parse_keywords(line: &str) -> Vec<String> {
    line.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}
