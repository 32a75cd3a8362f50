//! Loader for harvester configuration with YAML + environment overlays.
//!
//! Every field has a default matching the public SEP site, so an empty
//! configuration is valid. Sources are merged in the order they are added,
//! with `SEP_`-prefixed environment variables (nested with `__`, e.g.
//! `SEP_RUN__PAUSE_SECS=0`) applied last. `${VAR}` placeholders in string
//! values are expanded after merging.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

pub use sep_common::observability::LogFormat;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// Site root that relative result links are resolved against.
pub const DEFAULT_BASE_URL: &str = "https://plato.stanford.edu/";
/// Search endpoint, relative to [`DEFAULT_BASE_URL`].
pub const DEFAULT_SEARCH_PATH: &str = "search/searcher.py";
/// Identifying header sent with every request.
pub const DEFAULT_USER_AGENT: &str = "Philosophy Research Bot (Academic Project)";
/// `limit` query parameter of the search request.
pub const DEFAULT_RESULT_LIMIT: u32 = 10;
/// Fixed pause after every processed keyword.
pub const DEFAULT_PAUSE_SECS: u64 = 2;
/// Output file written in the working directory.
pub const DEFAULT_OUTPUT_FILE: &str = "stanford_philosophy_entries.csv";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SepConfig {
    pub site: SiteConfig,
    pub run: RunConfig,
    pub logging: LoggingConfig,
}

/// Where and how the encyclopedia is queried.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub base_url: String,
    pub search_path: String,
    pub user_agent: String,
    pub result_limit: u32,
    /// Per-request timeout. `None` leaves requests unbounded.
    pub request_timeout_secs: Option<u64>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            search_path: DEFAULT_SEARCH_PATH.into(),
            user_agent: DEFAULT_USER_AGENT.into(),
            result_limit: DEFAULT_RESULT_LIMIT,
            request_timeout_secs: None,
        }
    }
}

/// Batch behavior.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub pause_secs: u64,
    pub output_file: PathBuf,
    pub network_failures: NetworkFailurePolicy,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            pause_secs: DEFAULT_PAUSE_SECS,
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            network_failures: NetworkFailurePolicy::default(),
        }
    }
}

/// What a transport-level failure (DNS, refused connection, broken body)
/// does to the run. Handled outcomes such as non-success statuses are not
/// affected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkFailurePolicy {
    /// Stop the whole run; nothing is written.
    #[default]
    Abort,
    /// Report the keyword as failed and continue with the next one.
    Skip,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: Option<PathBuf>,
    pub format: LogFormat,
    pub emit_stderr: bool,
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: None,
            format: LogFormat::Text,
            emit_stderr: false,
            filter: "info".into(),
        }
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (YAML + env overrides).
pub struct SepConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    env: Environment,
}

impl Default for SepConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SepConfigLoader {
    /// Start from built-in defaults with `SEP_` env overrides.
    ///
    /// ```
    /// use sep_config::{SepConfigLoader, DEFAULT_OUTPUT_FILE};
    ///
    /// let config = SepConfigLoader::new().load().expect("defaults are valid");
    /// assert_eq!(config.run.pause_secs, 2);
    /// assert_eq!(config.run.output_file.to_str(), Some(DEFAULT_OUTPUT_FILE));
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
            env: Environment::with_prefix("SEP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist; the format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is skipped when missing, so a bare environment works.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet (tests and CLI overrides).
    ///
    /// ```
    /// use sep_config::{NetworkFailurePolicy, SepConfigLoader};
    ///
    /// let cfg = SepConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// run:
    ///   pause_secs: 0
    ///   network_failures: skip
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.run.pause_secs, 0);
    /// assert_eq!(cfg.run.network_failures, NetworkFailurePolicy::Skip);
    /// assert_eq!(cfg.site.result_limit, 10);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into [`SepConfig`].
    ///
    /// ```
    /// use sep_config::SepConfigLoader;
    ///
    /// unsafe { std::env::set_var("SEP_DOC_MIRROR", "http://mirror.local/"); }
    ///
    /// let config = SepConfigLoader::new()
    ///     .with_yaml_str("site:\n  base_url: \"${SEP_DOC_MIRROR}\"\n")
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.site.base_url, "http://mirror.local/");
    ///
    /// unsafe { std::env::remove_var("SEP_DOC_MIRROR"); }
    /// ```
    pub fn load(self) -> Result<SepConfig, ConfigError> {
        let cfg = self.builder.add_source(self.env).build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: SepConfig =
            serde_json::from_value(v).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}
