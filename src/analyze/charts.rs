use arrow::record_batch::RecordBatch;
use plotters::prelude::*;
use std::{
    fmt::Display,
    fs,
    ops::Range,
    path::{Path, PathBuf},
};
use tracing::info;

use crate::error::{PipelineError, Result};
use crate::schema::types::{BOND_KILLS, FILM_LENGTH, IMDB_AVG, ROTTEN_TOMATOES_AVG};

use super::{
    histogram::{equal_width_bins, Bin},
    regression::LinearFit,
    stats::numeric_column,
};

const SIZE: (u32, u32) = (800, 600);
pub const LENGTH_BINS: usize = 7;

/// Where the fit labels sit, in data coordinates (IMDb rating, RT rating).
const R_SQUARED_AT: (f64, f64) = (7.25, 5.5);
const EQUATION_AT: (f64, f64) = (7.25, 7.0);

const IMDB_DESC: &str = "Average IMDb Rating";
const RT_DESC: &str = "Average Rotten Tomatoes Rating";

#[derive(Debug, Clone)]
pub struct ChartPaths {
    pub ratings: PathBuf,
    pub regression: PathBuf,
    pub lengths: PathBuf,
    pub kills: PathBuf,
}

fn chart_err<E: Display>(e: E) -> PipelineError {
    PipelineError::Chart(e.to_string())
}

/// Render the four SVG charts into `dir`.
#[tracing::instrument(level = "info", skip(batch, fit), fields(dir = %dir.display()))]
pub fn render_all(batch: &RecordBatch, fit: &LinearFit, dir: &Path) -> Result<ChartPaths> {
    fs::create_dir_all(dir)?;
    let paths = ChartPaths {
        ratings: dir.join("ratings_scatter.svg"),
        regression: dir.join("ratings_regression.svg"),
        lengths: dir.join("film_length_distribution.svg"),
        kills: dir.join("kills_vs_ratings.svg"),
    };

    let ratings = pairs(batch, IMDB_AVG, ROTTEN_TOMATOES_AVG)?;
    draw_scatter(
        &paths.ratings,
        "Scatter Plot of Ratings",
        IMDB_DESC,
        RT_DESC,
        &ratings,
        None,
    )?;
    draw_scatter(
        &paths.regression,
        "Scatter Plot of Ratings",
        IMDB_DESC,
        RT_DESC,
        &ratings,
        Some(fit),
    )?;

    let lengths: Vec<f64> = numeric_column(batch, FILM_LENGTH)?
        .into_iter()
        .flatten()
        .collect();
    let bins = equal_width_bins(&lengths, LENGTH_BINS)?;
    draw_bars(
        &paths.lengths,
        "Film Length Distribution",
        "Time Range (mins)",
        "Count",
        &bins,
    )?;

    let kills = pairs(batch, IMDB_AVG, BOND_KILLS)?;
    draw_scatter(
        &paths.kills,
        "Scatter Plot of Kills vs Ratings",
        IMDB_DESC,
        "Kills by Bond",
        &kills,
        None,
    )?;

    info!("rendered 4 charts");
    Ok(paths)
}

/// Rows where both columns are present.
fn pairs(batch: &RecordBatch, x: &str, y: &str) -> Result<Vec<(f64, f64)>> {
    let xs = numeric_column(batch, x)?;
    let ys = numeric_column(batch, y)?;
    Ok(xs
        .into_iter()
        .zip(ys)
        .filter_map(|(a, b)| Some((a?, b?)))
        .collect())
}

/// min..max of `values` widened by 5 % on each side (or ±1 when flat).
fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let pad = if hi > lo { (hi - lo) * 0.05 } else { 1.0 };
    (lo - pad)..(hi + pad)
}

pub fn draw_scatter(
    path: &Path,
    title: &str,
    x_desc: &str,
    y_desc: &str,
    points: &[(f64, f64)],
    fit: Option<&LinearFit>,
) -> Result<()> {
    if points.is_empty() {
        return Err(PipelineError::Chart(format!("{}: nothing to plot", title)));
    }

    // with a fit, the label anchors must be inside the plotting area
    let anchors: &[(f64, f64)] = if fit.is_some() {
        &[R_SQUARED_AT, EQUATION_AT]
    } else {
        &[]
    };
    let x_range = padded_range(points.iter().chain(anchors).map(|p| p.0));
    let y_range = padded_range(points.iter().chain(anchors).map(|p| p.1));

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d(x_range, y_range)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 4, BLUE.filled())),
        )
        .map_err(chart_err)?;

    if let Some(fit) = fit {
        let x0 = points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
        let x1 = points.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
        chart
            .draw_series(LineSeries::new(
                vec![(x0, fit.predict(x0)), (x1, fit.predict(x1))],
                RED.stroke_width(2),
            ))
            .map_err(chart_err)?;
        chart
            .draw_series(
                [
                    (fit.r_squared_label(), R_SQUARED_AT),
                    (fit.equation_label(), EQUATION_AT),
                ]
                .into_iter()
                .map(|(text, at)| Text::new(text, at, ("sans-serif", 14))),
            )
            .map_err(chart_err)?;
    }

    root.present().map_err(chart_err)?;
    Ok(())
}

pub fn draw_bars(path: &Path, title: &str, x_desc: &str, y_desc: &str, bins: &[Bin]) -> Result<()> {
    if bins.is_empty() {
        return Err(PipelineError::Chart(format!("{}: no bins", title)));
    }
    let labels: Vec<String> = bins.iter().map(Bin::label).collect();
    let top = bins.iter().map(|b| b.count).max().unwrap_or(0) + 1;

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(50)
        .build_cartesian_2d((0usize..bins.len()).into_segmented(), 0u32..top)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(bins.len())
        .x_label_formatter(&|v: &SegmentValue<usize>| match v {
            SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
            _ => String::new(),
        })
        .x_desc(x_desc)
        .y_desc(y_desc)
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(BLUE.mix(0.7).filled())
                .margin(8)
                .data(bins.iter().enumerate().map(|(i, b)| (i, b.count))),
        )
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}
