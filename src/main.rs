use anyhow::{Context, Result};
use bondfilms::{
    config::{
        DEFAULT_BOOKS_URL, DEFAULT_BOOK_TABLE, DEFAULT_CHARTS_DIR, DEFAULT_INPUT,
        DEFAULT_MAX_ATTEMPTS, DEFAULT_OUTPUT, DEFAULT_TIMEOUT,
    },
    pipeline, FetchConfig, PipelineConfig,
};
use clap::Parser;
use std::{path::PathBuf, time::Duration};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

/// Clean the James Bond film dataset, write it back out and chart the ratings.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Raw film CSV.
    #[arg(long, default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// Where the cleaned CSV goes.
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Also write the cleaned table as Parquet here.
    #[arg(long)]
    parquet: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_CHARTS_DIR)]
    charts_dir: PathBuf,

    /// Do not render charts.
    #[arg(long)]
    no_charts: bool,

    /// YAML correction table to use instead of the built-in one.
    #[arg(long)]
    corrections: Option<PathBuf>,

    /// Page holding the book list.
    #[arg(long, default_value = DEFAULT_BOOKS_URL)]
    url: Url,

    /// Index of the book table on that page.
    #[arg(long, default_value_t = DEFAULT_BOOK_TABLE)]
    book_table: usize,

    /// Do not fetch the book list.
    #[arg(long)]
    skip_fetch: bool,

    /// Accept invalid TLS certificates when fetching. Unsafe.
    #[arg(long)]
    insecure_tls: bool,

    /// Request timeout for the book list, in seconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout_secs: u64,

    /// Do not print the report tables.
    #[arg(long)]
    quiet: bool,
}

impl Args {
    fn into_config(self) -> PipelineConfig {
        let fetch = (!self.skip_fetch).then(|| FetchConfig {
            url: self.url,
            table_index: self.book_table,
            accept_invalid_certs: self.insecure_tls,
            timeout: Duration::from_secs(self.timeout_secs),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        });
        PipelineConfig {
            input: self.input,
            output: self.output,
            parquet: self.parquet,
            charts_dir: (!self.no_charts).then_some(self.charts_dir),
            corrections: self.corrections,
            fetch,
            print_report: !self.quiet,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();
    info!("startup");

    // ─── 2) config ───────────────────────────────────────────────────
    let cfg = Args::parse().into_config();
    info!(
        input = %cfg.input.display(),
        output = %cfg.output.display(),
        fetch = cfg.fetch.is_some(),
        charts = cfg.charts_dir.is_some(),
        "configured"
    );

    // ─── 3) run ──────────────────────────────────────────────────────
    let summary = pipeline::run(&cfg)
        .await
        .with_context(|| format!("pipeline failed for {}", cfg.input.display()))?;

    info!(
        raw_rows = summary.raw_rows,
        cleaned_rows = summary.cleaned_rows,
        output = %summary.output.display(),
        "done"
    );
    Ok(())
}
