use clap::Parser;
use sep_config::{SepConfig, SepConfigLoader};
use std::path::PathBuf;

const DEFAULT_CONFIG_FILE: &str = "sep.yaml";

/// Search the Stanford Encyclopedia of Philosophy and export entries as CSV.
#[derive(Debug, Parser)]
#[command(name = "sep", version, about)]
pub struct Cli {
    /// YAML config file. Without it, `sep.yaml` is used when present.
    #[arg(short, long, env = "SEP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Comma-separated keywords; skips the interactive prompt.
    #[arg(short, long)]
    pub keywords: Option<String>,

    /// Output file, overriding `run.output_file`.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl Cli {
    pub fn load_config(&self) -> anyhow::Result<SepConfig> {
        let loader = match &self.config {
            Some(path) => SepConfigLoader::new().with_file(path),
            None => SepConfigLoader::new().with_optional_file(DEFAULT_CONFIG_FILE),
        };
        let mut cfg = loader.load()?;
        if let Some(output) = &self.output {
            cfg.run.output_file = output.clone();
        }
        Ok(cfg)
    }
}
