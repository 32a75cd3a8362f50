//! Search-result and article extraction over an [`HtmlDocument`].
//!
//! Nothing here performs I/O; the functions take an already parsed page.

use crate::Result;
use crate::document::HtmlDocument;
use crate::sep::ExtractOutcome;
use regex::Regex;
use std::sync::LazyLock;

/// Title links of search hits on the search results page.
pub const RESULT_LINK_SELECTOR: &str = ".result_title a";
pub const TITLE_SELECTOR: &str = "h1";
/// Container holding the article body.
pub const CONTENT_SELECTOR: &str = "#article-content";
/// Non-body material stripped from the container before reading its text.
pub const STRIP_SELECTOR: &str = ".bibliography, .note";
pub const UNKNOWN_TITLE: &str = "Unknown Title";

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Collapse every whitespace run (newlines and tabs included) into one space
/// and trim the ends.
///
/// ```
/// use sep_web::extract::normalize_whitespace;
///
/// assert_eq!(normalize_whitespace("  a \n\t b  "), "a b");
/// ```
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").trim().to_string()
}

/// `href` of the first search hit. A page without hits, or whose first hit
/// carries no link target, yields `None`.
pub fn first_result_href<D: HtmlDocument + ?Sized>(doc: &D) -> Result<Option<String>> {
    Ok(doc
        .select_attr(RESULT_LINK_SELECTOR, "href")?
        .into_iter()
        .next()
        .flatten())
}

/// Title of an article page, falling back to [`UNKNOWN_TITLE`].
pub fn article_title<D: HtmlDocument + ?Sized>(doc: &D) -> Result<String> {
    Ok(doc
        .select_text(TITLE_SELECTOR)?
        .map(|t| t.trim().to_string())
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string()))
}

/// Pull title and cleaned body text out of an article page.
///
/// Bibliography and note elements are detached from the document before the
/// body text is read, so `doc` is modified.
pub fn extract_article<D: HtmlDocument + ?Sized>(doc: &mut D) -> Result<ExtractOutcome> {
    let title = article_title(doc)?;

    if !doc.exists(CONTENT_SELECTOR)? {
        return Ok(ExtractOutcome::MissingContent { title });
    }

    let removed = doc.remove_within(CONTENT_SELECTOR, STRIP_SELECTOR)?;
    tracing::trace!(removed, "extract.stripped");

    let raw = doc
        .select_text_joined(CONTENT_SELECTOR, " ")?
        .unwrap_or_default();
    let content = normalize_whitespace(&raw);

    Ok(ExtractOutcome::Extracted { title, content })
}
