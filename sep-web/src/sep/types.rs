use sep_common::Entry;
use sep_http::StatusCode;
use url::Url;

/// Result of a keyword search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Absolute URL of the first hit.
    Found(Url),
    /// The search endpoint answered with a non-success status.
    Status(StatusCode),
    /// The results page listed no hits.
    NoResults,
}

/// Result of fetching and reading one article page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractOutcome {
    /// Title and normalized body text; the body may still be empty.
    Extracted { title: String, content: String },
    /// The article URL answered with a non-success status.
    Status(StatusCode),
    /// The page had no main-content container.
    MissingContent { title: String },
}

impl ExtractOutcome {
    /// The entry to keep, if any: only extractions with non-empty content qualify.
    pub fn into_entry(self) -> Option<Entry> {
        match self {
            Self::Extracted { title, content } if !content.is_empty() => {
                Some(Entry { title, content })
            }
            _ => None,
        }
    }
}
