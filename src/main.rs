//! edgar-cyber-watch — binary entrypoint.
//!
//! `lookup` inspects one issuer's recent 8-K filings; `monitor` polls the
//! XBRL RSS feed on a fixed interval.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use edgar_cyber_watch::ingest::providers::xbrl_rss::XbrlRssProvider;
use edgar_cyber_watch::ingest::scheduler::{run_monitor, MonitorCfg};
use edgar_cyber_watch::notify::{LogSink, WebhookSink};
use edgar_cyber_watch::{telemetry, EdgarClient, Pipeline, Reporter, WatchConfig};

#[derive(Parser)]
#[command(name = "edgar-cyber-watch")]
#[command(version)]
#[command(about = "Flags SEC 8-K filings that disclose material cybersecurity incidents", long_about = None)]
struct Cli {
    /// TOML config file (defaults to config/watch.toml when present)
    #[arg(long, short, env = "EDGAR_WATCH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect one issuer's recent 8-K family filings
    Lookup {
        /// Company name; prompted for when omitted
        name: Option<String>,
    },
    /// Poll the XBRL RSS feed for new disclosures
    Monitor {
        /// Run a single polling cycle and exit
        #[arg(long)]
        once: bool,
    },
}

fn prompt_company_name() -> Result<String> {
    print!("Enter the company name: ");
    io::stdout().flush().context("flushing prompt")?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("reading company name")?;
    Ok(line.trim().to_string())
}

fn build_reporter(cfg: &WatchConfig) -> Reporter {
    let mut reporter = Reporter::default().with_sink(Box::new(LogSink));
    if let Some(url) = &cfg.webhook_url {
        let sink = WebhookSink::new(url.clone())
            .with_timeout(cfg.webhook_timeout_secs)
            .with_retries(cfg.webhook_retries);
        reporter = reporter.with_sink(Box::new(sink));
    }
    reporter
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let cfg = match &cli.config {
        Some(p) => WatchConfig::load_from(p)?.with_env_overrides(),
        None => WatchConfig::load_default()?,
    };

    telemetry::init(&cfg.log_dir)?;

    let client = EdgarClient::from_config(&cfg).context("building EDGAR client")?;
    let pipeline = Pipeline::new(Arc::new(client), &cfg, build_reporter(&cfg));

    match cli.command {
        Commands::Lookup { name } => {
            let name = match name {
                Some(n) => n,
                None => prompt_company_name()?,
            };
            match pipeline.lookup_company(&name).await {
                Ok(events) => {
                    tracing::info!(company = %name, disclosures = events.len(), "lookup finished");
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(error = %e, "no CIK number found for the given company");
                    Err(e.into())
                }
            }
        }
        Commands::Monitor { once } => {
            let source = XbrlRssProvider::new(&cfg.feed_url, cfg.form_types.clone());
            let mcfg = MonitorCfg {
                interval_secs: cfg.poll_interval_secs,
                max_cycles: once.then_some(1),
            };
            run_monitor(&pipeline, &source, mcfg).await;
            Ok(())
        }
    }
}
