//! Logo-Scout main entry point
//!
//! Reads domains (one per line) from stdin or a file, writes one CSV row per
//! domain to stdout, and logs progress and the final summary to stderr.

use anyhow::Context;
use clap::Parser;
use futures::stream::{self, Stream, StreamExt};
use logo_scout::config::{load_config_with_hash, validate, Config};
use logo_scout::crawler::crawl;
use logo_scout::output::{print_summary, CsvEmitter};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Logo-Scout: a polite logo and favicon finder
///
/// Fetches the home page of every input domain and reports the most likely
/// logo URL and favicon URL for each, as CSV on stdout.
#[derive(Parser, Debug)]
#[command(name = "logo-scout")]
#[command(version)]
#[command(about = "Find logo and favicon URLs for a list of domains", long_about = None)]
struct Cli {
    /// Path to an optional TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Read domains from this file instead of stdin
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Maximum number of domains processed at once
    #[arg(long, value_name = "N")]
    concurrency: Option<u32>,

    /// Minimum delay between two requests of the same worker, in milliseconds
    #[arg(long, value_name = "MS")]
    delay_ms: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Maximum number of redirects followed per domain
    #[arg(long, value_name = "N")]
    max_redirects: Option<u32>,

    /// Add a `failure` column to the CSV output
    #[arg(long)]
    annotate_failures: bool,

    /// Stop dispatching new domains after this many seconds
    #[arg(long, value_name = "SECS")]
    deadline: Option<u64>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the file configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(concurrency) = self.concurrency {
            config.crawler.concurrency_limit = concurrency;
        }
        if let Some(delay_ms) = self.delay_ms {
            config.crawler.inter_request_delay_ms = delay_ms;
        }
        if let Some(timeout) = self.timeout {
            config.crawler.request_timeout_secs = timeout;
        }
        if let Some(max_redirects) = self.max_redirects {
            config.crawler.max_redirects = max_redirects;
        }
        if self.annotate_failures {
            config.output.annotate_failures = true;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };
    cli.apply_overrides(&mut config);
    validate(&config).context("Invalid configuration")?;

    let reader = open_input(cli.input.as_deref()).await?;
    let cancel = cancellation(cli.deadline);

    let stdout = std::io::stdout();
    let mut emitter = CsvEmitter::new(stdout.lock(), config.output.annotate_failures)
        .context("Failed to write CSV header")?;

    tracing::info!(
        "Crawling with concurrency {}, {}ms delay, {}s timeout, {} max redirects",
        config.crawler.concurrency_limit,
        config.crawler.inter_request_delay_ms,
        config.crawler.request_timeout_secs,
        config.crawler.max_redirects
    );

    let snapshot = crawl(&config, domain_lines(reader), &mut emitter, cancel)
        .await
        .context("Crawl failed")?;

    print_summary(&snapshot);

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr; stdout is reserved for CSV.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("logo_scout=info,warn"),
            1 => EnvFilter::new("logo_scout=debug,info"),
            2 => EnvFilter::new("logo_scout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

async fn open_input(path: Option<&Path>) -> anyhow::Result<Box<dyn AsyncRead + Send + Unpin>> {
    match path {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open input {}", path.display()))?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(tokio::io::stdin())),
    }
}

/// Lazily yields domain lines, skipping blank lines and `#` comments
fn domain_lines(
    reader: Box<dyn AsyncRead + Send + Unpin>,
) -> impl Stream<Item = String> + Send + 'static {
    let lines = BufReader::new(reader).lines();

    stream::unfold(lines, |mut lines| async move {
        match lines.next_line().await {
            Ok(Some(line)) => Some((line, lines)),
            Ok(None) => None,
            Err(e) => {
                tracing::error!("Stopped reading input: {}", e);
                None
            }
        }
    })
    .filter(|line| {
        let line = line.trim();
        futures::future::ready(!line.is_empty() && !line.starts_with('#'))
    })
}

/// Global cancellation: raised on Ctrl-C or when the deadline passes
fn cancellation(deadline: Option<u64>) -> CancellationToken {
    let cancel = CancellationToken::new();

    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight domains");
            on_interrupt.cancel();
        }
    });

    if let Some(secs) = deadline {
        let on_deadline = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            tracing::warn!("Deadline of {}s reached, no new domains will start", secs);
            on_deadline.cancel();
        });
    }

    cancel
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "logo-scout",
            "--concurrency",
            "4",
            "--delay-ms",
            "100",
            "--max-redirects",
            "2",
            "--annotate-failures",
        ]);
        let mut config = Config::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.crawler.concurrency_limit, 4);
        assert_eq!(config.crawler.inter_request_delay_ms, 100);
        assert_eq!(config.crawler.max_redirects, 2);
        assert_eq!(config.crawler.request_timeout_secs, 10);
        assert!(config.output.annotate_failures);
    }

    #[tokio::test]
    async fn test_domain_lines_skip_blanks_and_comments() {
        let input: &'static [u8] = b"example.com\n\n# comment\n  plain.com  \r\n";
        let lines: Vec<String> = domain_lines(Box::new(input)).collect().await;
        assert_eq!(lines, vec!["example.com", "  plain.com  "]);
    }
}
