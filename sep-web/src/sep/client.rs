//! HTTP-backed search resolver and content extractor.
//!
//! Pages are parsed synchronously right after their body arrives; the parsed
//! document never lives across an `.await`.
use super::types::{ExtractOutcome, SearchOutcome};
use crate::Result;
use crate::document::ScraperDocument;
use crate::extract::{extract_article, first_result_href};
use async_trait::async_trait;
use sep_http::{HttpClient, RequestOpts};
use std::borrow::Cow;
use std::time::Duration;
use url::Url;

/// Anything that can resolve keywords to articles and read them.
///
/// Handled conditions (error statuses, no hits, missing content) come back as
/// outcome variants; `Err` is reserved for transport and parsing failures.
#[async_trait]
pub trait EncyclopediaSource: Send + Sync {
    async fn search(&self, keyword: &str) -> Result<SearchOutcome>;

    async fn fetch_entry(&self, url: &Url) -> Result<ExtractOutcome>;
}

/// Client for the SEP search endpoint and article pages.
#[derive(Clone, Debug)]
pub struct SepClient {
    http: HttpClient,
    search_path: String,
    result_limit: u32,
}

impl SepClient {
    /// Client for the site at `base_url` with the default search endpoint.
    ///
    /// ```
    /// use sep_web::SepClient;
    ///
    /// let client = SepClient::new("https://plato.stanford.edu/", "Test Bot")?
    ///     .with_search_path("search/searcher.py")
    ///     .with_result_limit(5);
    /// assert_eq!(client.search_url()?.as_str(), "https://plato.stanford.edu/search/searcher.py");
    /// # Ok::<(), sep_web::WebError>(())
    /// ```
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(base_url, user_agent)?,
            search_path: "search/searcher.py".into(),
            result_limit: 10,
        })
    }

    pub fn with_search_path(mut self, path: impl Into<String>) -> Self {
        self.search_path = path.into();
        self
    }

    pub fn with_result_limit(mut self, limit: u32) -> Self {
        self.result_limit = limit;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.http = self.http.with_timeout(timeout);
        self
    }

    pub fn search_url(&self) -> Result<Url> {
        Ok(self.http.resolve(&self.search_path, false)?)
    }
}

fn parse_search_page(base: &Url, body: &str) -> Result<Option<Url>> {
    let doc = ScraperDocument::parse(body);
    match first_result_href(&doc)? {
        Some(href) => Ok(Some(base.join(&href)?)),
        None => Ok(None),
    }
}

fn parse_article_page(body: &str) -> Result<ExtractOutcome> {
    let mut doc = ScraperDocument::parse(body);
    extract_article(&mut doc)
}

#[async_trait]
impl EncyclopediaSource for SepClient {
    async fn search(&self, keyword: &str) -> Result<SearchOutcome> {
        let keyword = keyword.trim();
        let limit = self.result_limit.to_string();
        tracing::info!(keyword, "search.start");

        let resp = self
            .http
            .get_text(
                &self.search_path,
                RequestOpts {
                    query: Some(vec![
                        ("query", Cow::Borrowed(keyword)),
                        ("start", Cow::Borrowed("0")),
                        ("limit", Cow::Borrowed(limit.as_str())),
                    ]),
                    ..Default::default()
                },
            )
            .await?;

        if !resp.is_success() {
            tracing::warn!(keyword, status = %resp.status, "search.status");
            return Ok(SearchOutcome::Status(resp.status));
        }

        let outcome = match parse_search_page(self.http.base(), &resp.body)? {
            Some(url) => SearchOutcome::Found(url),
            None => SearchOutcome::NoResults,
        };
        tracing::info!(keyword, outcome = ?outcome, "search.done");
        Ok(outcome)
    }

    async fn fetch_entry(&self, url: &Url) -> Result<ExtractOutcome> {
        tracing::info!(%url, "extract.start");

        let resp = self
            .http
            .get_text(
                url.as_str(),
                RequestOpts {
                    allow_absolute: true,
                    ..Default::default()
                },
            )
            .await?;

        if !resp.is_success() {
            tracing::warn!(%url, status = %resp.status, "extract.status");
            return Ok(ExtractOutcome::Status(resp.status));
        }

        let outcome = parse_article_page(&resp.body)?;
        match &outcome {
            ExtractOutcome::Extracted { title, content } => {
                tracing::info!(
                    %url,
                    final_url = %resp.url,
                    title = %title,
                    chars = content.chars().count(),
                    "extract.done"
                );
            }
            other => {
                tracing::warn!(%url, outcome = ?other, "extract.incomplete");
            }
        }
        Ok(outcome)
    }
}
