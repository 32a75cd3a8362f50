//! Keyword-by-keyword harvest: search, fetch, collect, pause.
//!
//! Progress for the user goes to the injected writer; structured events go
//! to `tracing`. Results accumulate in a `Vec<Entry>` that is passed into and
//! returned from every step.

use crate::export::export_entries;
use crate::pacer::Pacer;
use sep_common::Entry;
use sep_config::NetworkFailurePolicy;
use sep_web::{EncyclopediaSource, ExtractOutcome, SearchOutcome, WebError};
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Web(#[from] WebError),

    #[error("console write failed: {0}")]
    Console(#[from] io::Error),
}

pub struct Batch<'a, S: ?Sized, P: ?Sized> {
    source: &'a S,
    pacer: &'a P,
    pause: Duration,
    network_failures: NetworkFailurePolicy,
}

impl<'a, S, P> Batch<'a, S, P>
where
    S: EncyclopediaSource + ?Sized,
    P: Pacer + ?Sized,
{
    pub fn new(source: &'a S, pacer: &'a P, pause: Duration) -> Self {
        Self {
            source,
            pacer,
            pause,
            network_failures: NetworkFailurePolicy::Abort,
        }
    }

    pub fn with_network_failures(mut self, policy: NetworkFailurePolicy) -> Self {
        self.network_failures = policy;
        self
    }

    /// Process every non-blank keyword in order and return the collected entries.
    pub async fn run<W: Write>(
        &self,
        keywords: &[String],
        out: &mut W,
    ) -> Result<Vec<Entry>, BatchError> {
        let mut entries = Vec::new();
        for keyword in keywords {
            let keyword = keyword.trim();
            if keyword.is_empty() {
                continue;
            }
            entries = self.process_keyword(keyword, entries, out).await?;
        }
        tracing::info!(
            keywords = keywords.len(),
            entries = entries.len(),
            "batch.done"
        );
        Ok(entries)
    }

    /// One keyword: harvest it, append on success, then pause unconditionally.
    ///
    /// Transport errors either propagate (and end the run) or are reported and
    /// skipped, depending on the network failure policy.
    pub async fn process_keyword<W: Write>(
        &self,
        keyword: &str,
        mut entries: Vec<Entry>,
        out: &mut W,
    ) -> Result<Vec<Entry>, BatchError> {
        writeln!(out, "\nSearching for '{keyword}'...")?;
        tracing::info!(keyword, "batch.keyword.start");

        match self.harvest(keyword, out).await {
            Ok(Some(entry)) => {
                writeln!(
                    out,
                    "Successfully extracted '{}' ({} characters)",
                    entry.title,
                    entry.char_count()
                )?;
                entries.push(entry);
            }
            Ok(None) => {}
            Err(BatchError::Web(err)) if self.network_failures == NetworkFailurePolicy::Skip => {
                tracing::warn!(keyword, error = %err, "batch.keyword.skipped");
                writeln!(out, "Failed to process '{keyword}': {err}")?;
            }
            Err(err) => {
                tracing::error!(keyword, error = %err, "batch.keyword.aborted");
                return Err(err);
            }
        }

        self.pacer.pause(self.pause).await;
        Ok(entries)
    }

    async fn harvest<W: Write>(
        &self,
        keyword: &str,
        out: &mut W,
    ) -> Result<Option<Entry>, BatchError> {
        let url = match self.source.search(keyword).await? {
            SearchOutcome::Found(url) => url,
            SearchOutcome::Status(status) => {
                writeln!(
                    out,
                    "Error searching for '{keyword}': HTTP {}",
                    status.as_u16()
                )?;
                return Ok(None);
            }
            SearchOutcome::NoResults => {
                writeln!(out, "No results found for '{keyword}'")?;
                return Ok(None);
            }
        };

        writeln!(out, "Found entry at {url}")?;
        writeln!(out, "Extracting content...")?;

        let outcome = self.source.fetch_entry(&url).await?;
        match &outcome {
            ExtractOutcome::Status(status) => {
                writeln!(out, "Error accessing '{url}': HTTP {}", status.as_u16())?;
            }
            ExtractOutcome::MissingContent { .. } => {
                writeln!(out, "Could not find main content in '{url}'")?;
            }
            ExtractOutcome::Extracted { .. } => {}
        }

        let entry = outcome.into_entry();
        if entry.is_none() {
            writeln!(out, "Failed to extract content for '{keyword}'")?;
        }
        Ok(entry)
    }
}

/// Write the collected entries to `path`, or report that there is nothing to
/// write. Returns whether a file was written.
pub fn finish<W: Write>(entries: &[Entry], path: &Path, out: &mut W) -> anyhow::Result<bool> {
    if entries.is_empty() {
        writeln!(out, "\nNo entries were found or extracted.")?;
        return Ok(false);
    }
    export_entries(path, entries)?;
    writeln!(
        out,
        "\nSuccessfully saved {} entries to {}",
        entries.len(),
        path.display()
    )?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pacer::testing::RecordingPacer;
    use async_trait::async_trait;
    use sep_common::parse_keywords;
    use sep_http::{HttpError, StatusCode, Url};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::TempDir;

    const PAUSE: Duration = Duration::from_secs(2);

    enum Search {
        Found(&'static str),
        Status(StatusCode),
        NoResults,
        Unreachable,
    }

    /// Canned answers keyed by keyword and by article path.
    #[derive(Default)]
    struct FakeSource {
        searches: HashMap<&'static str, Search>,
        articles: HashMap<&'static str, ExtractOutcome>,
        searched: Mutex<Vec<String>>,
    }

    impl FakeSource {
        fn on_search(mut self, keyword: &'static str, answer: Search) -> Self {
            self.searches.insert(keyword, answer);
            self
        }

        fn on_article(mut self, path: &'static str, outcome: ExtractOutcome) -> Self {
            self.articles.insert(path, outcome);
            self
        }

        fn searched(&self) -> Vec<String> {
            self.searched.lock().unwrap().clone()
        }
    }

    fn extracted(title: &str, content: &str) -> ExtractOutcome {
        ExtractOutcome::Extracted {
            title: title.into(),
            content: content.into(),
        }
    }

    #[async_trait]
    impl EncyclopediaSource for FakeSource {
        async fn search(&self, keyword: &str) -> sep_web::Result<SearchOutcome> {
            self.searched.lock().unwrap().push(keyword.to_string());
            match self.searches.get(keyword) {
                Some(Search::Found(path)) => Ok(SearchOutcome::Found(
                    Url::parse("https://plato.stanford.edu/")
                        .unwrap()
                        .join(path)
                        .unwrap(),
                )),
                Some(Search::Status(code)) => Ok(SearchOutcome::Status(*code)),
                Some(Search::Unreachable) => Err(WebError::Http(HttpError::Network(
                    "connection refused".into(),
                ))),
                Some(Search::NoResults) | None => Ok(SearchOutcome::NoResults),
            }
        }

        async fn fetch_entry(&self, url: &Url) -> sep_web::Result<ExtractOutcome> {
            Ok(self
                .articles
                .get(url.path())
                .cloned()
                .unwrap_or(ExtractOutcome::Status(StatusCode::NOT_FOUND)))
        }
    }

    async fn run(
        source: &FakeSource,
        pacer: &RecordingPacer,
        line: &str,
        policy: NetworkFailurePolicy,
    ) -> (Result<Vec<Entry>, BatchError>, String) {
        let mut out = Vec::new();
        let result = Batch::new(source, pacer, PAUSE)
            .with_network_failures(policy)
            .run(&parse_keywords(line), &mut out)
            .await;
        (result, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn blank_keyword_skipped_and_order_kept() {
        let source = FakeSource::default()
            .on_search("free will", Search::Found("entries/freewill/"))
            .on_search("determinism", Search::Found("entries/determinism-causal/"))
            .on_article("/entries/freewill/", extracted("Free Will", "Free will is ..."))
            .on_article(
                "/entries/determinism-causal/",
                extracted("Causal Determinism", "Causal determinism is ..."),
            );
        let pacer = RecordingPacer::default();

        let (result, console) =
            run(&source, &pacer, "free will, , determinism", NetworkFailurePolicy::Abort).await;
        let entries = result.unwrap();

        assert_eq!(source.searched(), vec!["free will", "determinism"]);
        assert_eq!(
            entries,
            vec![
                Entry::new("Free Will", "Free will is ..."),
                Entry::new("Causal Determinism", "Causal determinism is ..."),
            ]
        );
        assert!(console.contains("Found entry at https://plato.stanford.edu/entries/freewill/"));
        assert!(console.contains("Successfully extracted 'Free Will' (16 characters)"));
        assert_eq!(pacer.pauses(), vec![PAUSE, PAUSE]);
    }

    #[tokio::test]
    async fn handled_failures_are_reported_and_omitted() {
        let source = FakeSource::default()
            .on_search("nothing", Search::NoResults)
            .on_search("broken search", Search::Status(StatusCode::SERVICE_UNAVAILABLE))
            .on_search("no body", Search::Found("entries/nobody/"))
            .on_search("gone", Search::Found("entries/gone/"))
            .on_search("empty", Search::Found("entries/empty/"))
            .on_search("ethics", Search::Found("entries/ethics/"))
            .on_article("/entries/nobody/", ExtractOutcome::MissingContent { title: "No Body".into() })
            .on_article("/entries/empty/", extracted("Empty", ""))
            .on_article("/entries/ethics/", extracted("Ethics", "Ethics is ..."));
        let pacer = RecordingPacer::default();

        let (result, console) = run(
            &source,
            &pacer,
            "nothing, broken search, no body, gone, empty, ethics",
            NetworkFailurePolicy::Abort,
        )
        .await;

        assert_eq!(result.unwrap(), vec![Entry::new("Ethics", "Ethics is ...")]);
        assert!(console.contains("No results found for 'nothing'"));
        assert!(console.contains("Error searching for 'broken search': HTTP 503"));
        assert!(console.contains(
            "Could not find main content in 'https://plato.stanford.edu/entries/nobody/'"
        ));
        assert!(console.contains("Error accessing 'https://plato.stanford.edu/entries/gone/': HTTP 404"));
        assert!(console.contains("Failed to extract content for 'no body'"));
        assert!(console.contains("Failed to extract content for 'gone'"));
        assert!(console.contains("Failed to extract content for 'empty'"));
        assert!(!console.contains("Failed to extract content for 'nothing'"));
        // every processed keyword pauses, failures included
        assert_eq!(pacer.pauses().len(), 6);
        assert!(pacer.total() >= PAUSE * 6);
    }

    #[tokio::test]
    async fn network_failure_aborts_by_default() {
        let source = FakeSource::default()
            .on_search("ethics", Search::Found("entries/ethics/"))
            .on_search("offline", Search::Unreachable)
            .on_search("logic", Search::Found("entries/logic/"))
            .on_article("/entries/ethics/", extracted("Ethics", "Ethics is ..."));
        let pacer = RecordingPacer::default();

        let (result, _) =
            run(&source, &pacer, "ethics, offline, logic", NetworkFailurePolicy::Abort).await;

        assert!(matches!(result, Err(BatchError::Web(WebError::Http(_)))));
        assert_eq!(source.searched(), vec!["ethics", "offline"]);
        assert_eq!(pacer.pauses().len(), 1);
    }

    #[tokio::test]
    async fn network_failure_can_be_skipped() {
        let source = FakeSource::default()
            .on_search("offline", Search::Unreachable)
            .on_search("logic", Search::Found("entries/logic/"))
            .on_article("/entries/logic/", extracted("Logic", "Logic is ..."));
        let pacer = RecordingPacer::default();

        let (result, console) =
            run(&source, &pacer, "offline, logic", NetworkFailurePolicy::Skip).await;

        assert_eq!(result.unwrap(), vec![Entry::new("Logic", "Logic is ...")]);
        assert!(console.contains("Failed to process 'offline': network error: connection refused"));
        assert_eq!(pacer.pauses(), vec![PAUSE, PAUSE]);
    }

    #[tokio::test]
    async fn no_keywords_means_no_pauses() {
        let source = FakeSource::default();
        let pacer = RecordingPacer::default();
        let (result, console) = run(&source, &pacer, " , ,", NetworkFailurePolicy::Abort).await;
        assert!(result.unwrap().is_empty());
        assert!(console.is_empty());
        assert!(pacer.pauses().is_empty());
    }

    #[tokio::test]
    async fn accumulator_is_threaded_through_each_step() {
        let source = FakeSource::default()
            .on_search("logic", Search::Found("entries/logic/"))
            .on_article("/entries/logic/", extracted("Logic", "Logic is ..."));
        let pacer = RecordingPacer::default();
        let batch = Batch::new(&source, &pacer, PAUSE);

        let seed = vec![Entry::new("Earlier", "Kept")];
        let entries = batch
            .process_keyword("logic", seed, &mut io::sink())
            .await
            .unwrap();
        let entries = batch
            .process_keyword("unknown", entries, &mut io::sink())
            .await
            .unwrap();

        assert_eq!(
            entries,
            vec![Entry::new("Earlier", "Kept"), Entry::new("Logic", "Logic is ...")]
        );
    }

    #[tokio::test]
    async fn harvests_from_http_and_exports_csv() {
        use sep_web::SepClient;
        use wiremock::matchers::{method, path, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/searcher.py"))
            .and(query_param("query", "free will"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<div class="result_title"><a href="entries/freewill/">Free Will</a></div>"#,
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/search/searcher.py"))
            .and(query_param("query", "qwzx"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>0 documents found</p>"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/entries/freewill/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<html><body><h1>Free Will</h1>
                <div id="article-content">
                  <p>Free   will
                     is a capacity.</p>
                  <div class="note">Footnote.</div>
                  <ul class="bibliography"><li>Kane 1996</li></ul>
                </div></body></html>"#,
            ))
            .mount(&server)
            .await;

        let client = SepClient::new(&server.uri(), "test-agent").unwrap();
        let pacer = RecordingPacer::default();
        let mut out = Vec::new();
        let entries = Batch::new(&client, &pacer, Duration::ZERO)
            .run(&parse_keywords("free will, qwzx"), &mut out)
            .await
            .unwrap();

        assert_eq!(entries, vec![Entry::new("Free Will", "Free will is a capacity.")]);
        assert!(!entries[0].content.contains("  "));
        assert!(String::from_utf8(out).unwrap().contains("No results found for 'qwzx'"));

        let tmp = TempDir::new().unwrap();
        let csv_path = tmp.path().join("entries.csv");
        assert!(finish(&entries, &csv_path, &mut io::sink()).unwrap());
        assert_eq!(
            std::fs::read_to_string(&csv_path).unwrap(),
            "Title,Content\r\nFree Will,Free will is a capacity.\r\n"
        );
    }

    #[test]
    fn finish_without_entries_writes_no_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("stanford_philosophy_entries.csv");
        let mut out = Vec::new();

        let written = finish(&[], &path, &mut out).unwrap();

        assert!(!written);
        assert!(!path.exists());
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\nNo entries were found or extracted.\n"
        );
    }

    #[test]
    fn finish_writes_file_and_reports_count() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.csv");
        let mut out = Vec::new();

        let written = finish(
            &[Entry::new("A", "a"), Entry::new("B", "b")],
            &path,
            &mut out,
        )
        .unwrap();

        assert!(written);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Title,Content\r\nA,a\r\nB,b\r\n"
        );
        let console = String::from_utf8(out).unwrap();
        assert!(console.starts_with("\nSuccessfully saved 2 entries to "));
        assert!(console.trim_end().ends_with("out.csv"));
    }
}
