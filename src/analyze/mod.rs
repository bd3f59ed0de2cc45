pub mod charts;
pub mod histogram;
pub mod regression;
pub mod report;
pub mod stats;

use arrow::record_batch::RecordBatch;
use std::path::Path;
use tracing::info;

use crate::error::Result;
use crate::schema::types::{
    BOND_ACTOR, CAR_MANUFACTURER, FILM_LENGTH, IMDB_AVG, ROTTEN_TOMATOES_AVG,
};

pub use charts::ChartPaths;
pub use histogram::{equal_width_bins, Bin};
pub use regression::{fit_linear, LinearFit};
pub use stats::{describe, numeric_column, value_counts, Summary};

/// Text columns whose value counts go into the report.
pub const COUNTED_COLUMNS: &[&str] = &[BOND_ACTOR, CAR_MANUFACTURER];

/// Everything computed from the cleaned table.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub x_column: String,
    pub y_column: String,
    pub fit: LinearFit,
    pub film_length: Summary,
    pub length_bins: Vec<Bin>,
    pub value_counts: Vec<(String, Vec<(String, usize)>)>,
    /// `None` when chart rendering was turned off.
    pub charts: Option<ChartPaths>,
}

/// Regress Rotten Tomatoes on IMDb, bin and describe film length, count
/// actors and car makers, and render the charts into `charts_dir` if given.
#[tracing::instrument(level = "info", skip(batch), fields(rows = batch.num_rows()))]
pub fn analyze(batch: &RecordBatch, charts_dir: Option<&Path>) -> Result<Analysis> {
    let x = numeric_column(batch, IMDB_AVG)?;
    let y = numeric_column(batch, ROTTEN_TOMATOES_AVG)?;
    let fit = fit_linear(&x, &y)?;
    info!(
        slope = fit.slope,
        intercept = fit.intercept,
        r_squared = fit.r_squared,
        n = fit.n,
        "fitted ratings regression"
    );

    let film_length = describe(batch, FILM_LENGTH)?;
    let lengths: Vec<f64> = numeric_column(batch, FILM_LENGTH)?
        .into_iter()
        .flatten()
        .collect();
    let length_bins = equal_width_bins(&lengths, charts::LENGTH_BINS)?;

    let value_counts = COUNTED_COLUMNS
        .iter()
        .map(|c| Ok((c.to_string(), stats::value_counts(batch, c)?)))
        .collect::<Result<Vec<_>>>()?;

    let charts = match charts_dir {
        Some(dir) => Some(charts::render_all(batch, &fit, dir)?),
        None => None,
    };

    Ok(Analysis {
        x_column: IMDB_AVG.to_string(),
        y_column: ROTTEN_TOMATOES_AVG.to_string(),
        fit,
        film_length,
        length_bins,
        value_counts,
        charts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{clean_table, read_csv, tests::film_fixture, CorrectionTable};
    use tempfile::tempdir;

    #[test]
    fn analyzes_the_cleaned_fixture() {
        let raw = read_csv(film_fixture().as_bytes()).unwrap();
        let cleaned = clean_table(raw, &CorrectionTable::builtin().unwrap()).unwrap();

        let analysis = analyze(&cleaned.batch, None).unwrap();
        assert!(analysis.charts.is_none());
        assert_eq!(analysis.fit.n, cleaned.batch.num_rows());
        assert!(analysis.fit.slope > 0.0);
        assert!(analysis.fit.r_squared > 0.0 && analysis.fit.r_squared <= 1.0);
        assert_eq!(analysis.length_bins.len(), 7);
        assert_eq!(
            analysis.length_bins.iter().map(|b| b.count as usize).sum::<usize>(),
            analysis.film_length.count
        );
        assert_eq!(analysis.value_counts.len(), 2);
        assert_eq!(analysis.value_counts[0].0, BOND_ACTOR);
    }

    #[test]
    fn charts_land_in_the_given_dir() {
        let raw = read_csv(film_fixture().as_bytes()).unwrap();
        let cleaned = clean_table(raw, &CorrectionTable::builtin().unwrap()).unwrap();
        let dir = tempdir().unwrap();

        let analysis = analyze(&cleaned.batch, Some(dir.path())).unwrap();
        let charts = analysis.charts.unwrap();
        assert!(charts.regression.starts_with(dir.path()));
        assert!(charts.lengths.exists());
    }
}
