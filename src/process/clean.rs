use arrow::record_batch::RecordBatch;
use tracing::info;

use crate::analyze::stats::{describe, Summary};
use crate::error::Result;
use crate::schema::types::{FILM_LENGTH, MARTINIS_CONSUMED, RELEASE_DATE};

use super::{
    convert::{add_release_year, convert_to_final_types},
    corrections::CorrectionTable,
    dedup::drop_duplicate_rows,
    rename::rename_columns,
    RawTable,
};

/// Columns whose range is checked around the outlier step.
pub const RANGE_CHECKED: &[&str] = &[FILM_LENGTH, MARTINIS_CONSUMED];

/// What the cleaner changed, for the run report.
#[derive(Debug, Clone, Default)]
pub struct CleanReport {
    pub input_rows: usize,
    pub renamed_columns: usize,
    /// Row positions that had an empty cell before any correction.
    pub rows_with_missing: Vec<usize>,
    pub cell_fixes: usize,
    pub replacements: usize,
    pub outliers_fixed: usize,
    /// Positions of the rows dropped as repeats of an earlier row.
    pub duplicate_rows: Vec<usize>,
    /// `describe` of [`RANGE_CHECKED`] just before the outlier fixes.
    pub before_outliers: Vec<Summary>,
    /// The same columns after the outlier fixes.
    pub after_outliers: Vec<Summary>,
}

#[derive(Debug, Clone)]
pub struct Cleaned {
    pub batch: RecordBatch,
    pub report: CleanReport,
}

/// Run every cleaning step, in order, over the raw film table.
///
/// 1. rename columns
/// 2. cell fixes from the correction table
/// 3. cast currency, length, date, rating and count columns
/// 4. derive `release_year`
/// 5. whole-value string replacements
/// 6. outlier fixes
/// 7. drop duplicate rows, keeping the first
#[tracing::instrument(level = "info", skip_all, fields(rows = raw.num_rows(), version = corrections.version))]
pub fn clean_table(mut raw: RawTable, corrections: &CorrectionTable) -> Result<Cleaned> {
    let mut report = CleanReport {
        input_rows: raw.num_rows(),
        ..Default::default()
    };

    report.renamed_columns = rename_columns(&mut raw);
    report.rows_with_missing = raw.rows_with_missing();
    report.cell_fixes = corrections.apply_cell_fixes(&mut raw)?;

    let batch = convert_to_final_types(&raw)?;
    let batch = add_release_year(&batch, RELEASE_DATE)?;

    let (batch, replaced) = corrections.apply_replacements(&batch)?;
    report.replacements = replaced;

    report.before_outliers = summarize_present(&batch)?;
    let (batch, fixed) = corrections.apply_outliers(&batch)?;
    report.outliers_fixed = fixed;
    report.after_outliers = summarize_present(&batch)?;

    let (batch, removed) = drop_duplicate_rows(&batch)?;
    report.duplicate_rows = removed;

    info!(
        rows = batch.num_rows(),
        columns = batch.num_columns(),
        cell_fixes = report.cell_fixes,
        replacements = report.replacements,
        outliers = report.outliers_fixed,
        duplicates = ?report.duplicate_rows,
        "cleaned film table"
    );

    Ok(Cleaned { batch, report })
}

fn summarize_present(batch: &RecordBatch) -> Result<Vec<Summary>> {
    RANGE_CHECKED
        .iter()
        .filter(|name| batch.schema().index_of(name).is_ok())
        .map(|name| describe(batch, name))
        .collect()
}
