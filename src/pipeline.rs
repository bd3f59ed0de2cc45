use std::path::PathBuf;
use tracing::info;

use crate::analyze::{self, report, Analysis};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::fetch;
use crate::output;
use crate::process::{self, clean_table, CleanReport, CorrectionTable, RawTable};

/// Rows of the raw and cleaned tables shown in the report.
const HEAD_ROWS: usize = 5;

/// What one run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub raw_rows: usize,
    pub cleaned_rows: usize,
    pub book_rows: Option<usize>,
    pub report: CleanReport,
    pub analysis: Analysis,
    pub output: PathBuf,
    pub parquet: Option<PathBuf>,
}

/// Load, clean, write and analyze the film table, fetching the book list
/// first when a fetch config is present.
#[tracing::instrument(level = "info", skip_all, fields(input = %cfg.input.display()))]
pub async fn run(cfg: &PipelineConfig) -> Result<RunSummary> {
    let book_rows = match &cfg.fetch {
        Some(fetch_cfg) => Some(fetch::fetch_book_table(fetch_cfg).await?.num_rows()),
        None => {
            info!("book list fetch skipped");
            None
        }
    };

    let corrections = match &cfg.corrections {
        Some(path) => CorrectionTable::load(path)?,
        None => CorrectionTable::builtin()?,
    };
    info!(
        version = corrections.version,
        cell_fixes = corrections.cell_fixes.len(),
        replacements = corrections.replacements.len(),
        outliers = corrections.outliers.len(),
        "loaded correction table"
    );

    let raw = process::load_csv(&cfg.input)?;
    let raw_rows = raw.num_rows();
    let raw_head: RawTable = raw.head(HEAD_ROWS);

    let cleaned = clean_table(raw, &corrections)?;
    output::write_csv(&cleaned.batch, &cfg.output)?;
    if let Some(path) = &cfg.parquet {
        output::write_parquet(&cleaned.batch, path)?;
    }

    let analysis = analyze::analyze(&cleaned.batch, cfg.charts_dir.as_deref())?;
    if cfg.print_report {
        report::print_report(&raw_head, &cleaned.batch, &cleaned.report, &analysis)?;
    }

    info!(
        raw_rows,
        cleaned_rows = cleaned.batch.num_rows(),
        output = %cfg.output.display(),
        "run finished"
    );

    Ok(RunSummary {
        raw_rows,
        cleaned_rows: cleaned.batch.num_rows(),
        book_rows,
        report: cleaned.report,
        analysis,
        output: cfg.output.clone(),
        parquet: cfg.parquet.clone(),
    })
}
