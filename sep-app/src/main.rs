use anyhow::Result;
use batch::{Batch, finish};
use clap::Parser;
use cli::Cli;
use pacer::TokioPacer;
use sep_common::observability::{LogConfig, init_logging};
use sep_common::parse_keywords;
use sep_config::SepConfig;
use sep_web::SepClient;
use std::io::{self, Write};
use std::time::Duration;

mod batch;
mod cli;
mod export;
mod pacer;
mod prompt;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg: SepConfig = cli.load_config()?;

    let log_path = init_logging(LogConfig {
        app_name: "sep",
        log_dir: cfg.logging.dir.clone(),
        emit_stderr: cfg.logging.emit_stderr,
        format: cfg.logging.format,
        default_filter: cfg.logging.filter.clone(),
    })?;
    tracing::info!(log = %log_path.display(), output = %cfg.run.output_file.display(), "sep.start");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    prompt::print_banner(&mut out)?;

    let line = match &cli.keywords {
        Some(line) => line.clone(),
        None => prompt::read_keyword_line(&mut io::stdin().lock(), &mut out)?,
    };
    let keywords = parse_keywords(&line);

    let client = SepClient::new(&cfg.site.base_url, &cfg.site.user_agent)?
        .with_search_path(cfg.site.search_path.clone())
        .with_result_limit(cfg.site.result_limit)
        .with_timeout(cfg.site.request_timeout_secs.map(Duration::from_secs));

    let entries = Batch::new(&client, &TokioPacer, Duration::from_secs(cfg.run.pause_secs))
        .with_network_failures(cfg.run.network_failures)
        .run(&keywords, &mut out)
        .await?;

    finish(&entries, &cfg.run.output_file, &mut out)?;
    out.flush()?;
    Ok(())
}
