//! Minimal HTTP GET client for HTML pages, with safe logging.
//!
//! - Anchored to a base URL; paths are joined, absolute URLs allowed on request
//! - A fixed `User-Agent` is sent with every request
//! - Every HTTP status is returned to the caller as a [`TextResponse`];
//!   only transport failures become [`HttpError`]
//! - No retries and, unless configured, no timeout
//! - Optional *raw* request/response logging via `SEP_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), sep_http::HttpError> {
//! let client = sep_http::HttpClient::new("https://plato.stanford.edu/", "Example Bot")?;
//! let page = client
//!     .get_text("entries/freewill/", sep_http::RequestOpts::default())
//!     .await?;
//! if page.is_success() {
//!     println!("{} bytes", page.body.len());
//! }
//! # Ok(()) }
//! ```
//!
//! Observability: structured `tracing` events are emitted for request start
//! and response receipt, plus (optionally) raw request/response lines
//! (target `http.raw`) when `SEP_HTTP_RAW=1`.

use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::borrow::Cow;
use std::env;
use std::time::{Duration, Instant};
use thiserror::Error;

pub use reqwest::{StatusCode, Url};

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "SEP_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024; // cap raw body logs (64 KiB)
const SNIPPET_LEN: usize = 500;

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

/// Render a best-effort curl command for repro/debug, with secrets redacted.
fn make_curl(url: &Url, headers: &HeaderMap) -> String {
    let mut parts = vec!["curl".to_string(), "-XGET".to_string()];
    for (name, val) in redact_headers(headers) {
        parts.push(format!("-H '{}: {}'", name, val.replace('\'', r"'\''")));
    }
    parts.push(format!("'{}'", url.as_str()));
    parts.join(" ")
}

/// Redact sensitive headers for logging
fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let key = k.as_str().to_string();
            let mut val = v.to_str().unwrap_or("").to_string();
            if key.eq_ignore_ascii_case("authorization")
                || key.eq_ignore_ascii_case("cookie")
                || key.eq_ignore_ascii_case("set-cookie")
            {
                val = "<redacted>".into();
            }
            (key, val)
        })
        .collect()
}

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("client build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("body read failed: {0}")]
    Body(String),
}

// ==============================
// Request options & response
// ==============================

/// Per-request knobs for [`HttpClient::get_text`].
///
/// ```
/// use sep_http::RequestOpts;
/// use std::borrow::Cow;
///
/// let opts = RequestOpts {
///     query: Some(vec![("query", Cow::Borrowed("free will")), ("start", "0".into())]),
///     ..Default::default()
/// };
///
/// assert_eq!(opts.query.as_ref().unwrap().len(), 2);
/// assert!(!opts.allow_absolute);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub query: Option<Vec<(&'a str, Cow<'a, str>)>>,
    /// If true and `path` is an absolute URL, use it as-is (ignore base).
    pub allow_absolute: bool,
}

/// A fully read response, whatever its status.
#[derive(Clone, Debug)]
pub struct TextResponse {
    pub status: StatusCode,
    /// Final URL after redirects.
    pub url: Url,
    pub body: String,
}

impl TextResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

// ==============================
// Client
// ==============================

#[derive(Clone, Debug)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub default_timeout: Option<Duration>,
}

impl HttpClient {
    /// Construct a client anchored to a base URL, sending `user_agent` on every request.
    ///
    /// A base without a trailing slash is treated as a directory, so relative
    /// paths are joined below it.
    ///
    /// ```
    /// use sep_http::{HttpClient, HttpError};
    ///
    /// let client = HttpClient::new("http://localhost:8080/sep", "Test Bot")?;
    /// assert_eq!(client.base().as_str(), "http://localhost:8080/sep/");
    /// assert!(client.default_timeout.is_none());
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str, user_agent: &str) -> Result<Self, HttpError> {
        let mut base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        if !base.path().ends_with('/') {
            let dir = format!("{}/", base.path());
            base.set_path(&dir);
        }

        let mut headers = HeaderMap::new();
        let ua = HeaderValue::from_str(user_agent)
            .map_err(|e| HttpError::Build(format!("invalid User-Agent header: {e}")))?;
        headers.insert(USER_AGENT, ua);

        let inner = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: None,
        })
    }

    /// Bound every request by `dur` (or leave them unbounded with `None`).
    ///
    /// ```
    /// use sep_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://plato.stanford.edu/", "Test Bot")?
    ///     .with_timeout(Some(Duration::from_secs(2)));
    /// assert_eq!(client.default_timeout, Some(Duration::from_secs(2)));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn with_timeout(mut self, dur: Option<Duration>) -> Self {
        self.default_timeout = dur;
        self
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Resolve `path` against the base URL, or take it verbatim when it is
    /// absolute and `allow_absolute` is set.
    pub fn resolve(&self, path: &str, allow_absolute: bool) -> Result<Url, HttpError> {
        if allow_absolute {
            if let Ok(abs) = Url::parse(path) {
                return Ok(abs);
            }
        }
        self.base
            .join(path)
            .map_err(|e| HttpError::Url(e.to_string()))
    }

    /// GET `path` and read the body as text. Non-success statuses are returned,
    /// not raised.
    pub async fn get_text(
        &self,
        path: &str,
        opts: RequestOpts<'_>,
    ) -> Result<TextResponse, HttpError> {
        let url = self.resolve(path, opts.allow_absolute)?;

        let mut rb = self.inner.get(url.clone());

        let timeout = self.default_timeout;
        if let Some(t) = timeout {
            rb = rb.timeout(t);
        }

        let query: Vec<(&str, &str)> = opts
            .query
            .as_ref()
            .map(|q| q.iter().map(|(k, v)| (*k, v.as_ref())).collect())
            .unwrap_or_default();
        if !query.is_empty() {
            rb = rb.query(&query);
        }

        tracing::debug!(
            method = "GET",
            host_path = %format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
            query = ?query,
            timeout_ms = timeout.map(|t| t.as_millis() as u64),
            "http.request.start"
        );

        let request = rb.build().map_err(|e| HttpError::Build(e.to_string()))?;
        if raw_enabled() {
            let curl = make_curl(request.url(), request.headers());
            tracing::debug!(target: "http.raw", %curl, "request");
        }

        let t0 = Instant::now();
        let resp = match self.inner.execute(request).await {
            Ok(resp) => resp,
            Err(err) => {
                let message = err.to_string();
                tracing::warn!(url = %url, message = %message, "http.network_error.send");
                return Err(HttpError::Network(message));
            }
        };

        let status = resp.status();
        let final_url = resp.url().clone();
        let headers = resp.headers().clone();
        let body = resp.text().await.map_err(|err| {
            tracing::warn!(url = %final_url, message = %err, "http.network_error.body");
            HttpError::Body(err.to_string())
        })?;
        let duration_ms = t0.elapsed().as_millis() as u64;

        tracing::debug!(
            %status,
            url = %final_url,
            duration_ms,
            body_len = body.len(),
            "http.response"
        );

        if raw_enabled() {
            let hdrs = redact_headers(&headers);
            let truncated = body.len() > RAW_MAX_BODY;
            let text = truncate_on_char_boundary(&body, RAW_MAX_BODY);
            tracing::info!(
                target: "http.raw",
                status = %status,
                duration_ms,
                headers = ?hdrs,
                body = %text,
                truncated
            );
        }

        if !status.is_success() {
            tracing::warn!(
                %status,
                url = %final_url,
                body_snippet = %snip_body(&body),
                "http.error_status"
            );
        }

        Ok(TextResponse {
            status,
            url: final_url,
            body,
        })
    }
}

// ==============================
// Helpers
// ==============================

fn truncate_on_char_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

fn snip_body(body: &str) -> String {
    let mut snip = truncate_on_char_boundary(body, SNIPPET_LEN).to_string();
    if snip.len() < body.len() {
        snip.push_str("...");
    }
    snip
}
