//! Encyclopedia discovery and acquisition.
//!
//! - [`HtmlDocument`] capability and its `scraper`-backed implementation (`document`)
//! - Pure search-result and article extraction over any document (`extract`)
//! - SEP client: keyword search and article fetch over HTTP (`sep`)

pub mod document;
pub mod extract;
pub mod sep;

pub use document::{HtmlDocument, ScraperDocument};
pub use sep::{EncyclopediaSource, ExtractOutcome, SearchOutcome, SepClient};

use sep_http::HttpError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WebError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("invalid selector `{selector}`: {message}")]
    Selector { selector: String, message: String },

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, WebError>;
