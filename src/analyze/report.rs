use arrow::{
    record_batch::RecordBatch,
    util::display::{ArrayFormatter, FormatOptions},
};
use prettytable::{format, Cell, Row, Table};

use crate::error::Result;
use crate::process::{CleanReport, RawTable};

use super::{histogram::Bin, regression::LinearFit, stats::Summary, Analysis};

fn boxed() -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table
}

fn header_row<S: AsRef<str>>(names: &[S]) -> Row {
    Row::new(
        names
            .iter()
            .map(|n| Cell::new(n.as_ref()).style_spec("bFg"))
            .collect(),
    )
}

fn num(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else {
        format!("{:.2}", v)
    }
}

/// First `n` rows of the table as it came off disk.
pub fn raw_head_table(raw: &RawTable, n: usize) -> Table {
    let mut table = boxed();
    table.set_titles(header_row(&raw.headers));
    for row in raw.rows.iter().take(n) {
        table.add_row(Row::new(row.iter().map(|v| Cell::new(v)).collect()));
    }
    table
}

/// First `n` rows of a typed batch; nulls print as empty cells.
pub fn batch_head_table(batch: &RecordBatch, n: usize) -> Result<Table> {
    let schema = batch.schema();
    let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();

    let options = FormatOptions::default().with_null("");
    let formatters = batch
        .columns()
        .iter()
        .map(|c| ArrayFormatter::try_new(c.as_ref(), &options))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut table = boxed();
    table.set_titles(header_row(&names));
    for i in 0..batch.num_rows().min(n) {
        table.add_row(Row::new(
            formatters
                .iter()
                .map(|f| Cell::new(&f.value(i).to_string()))
                .collect(),
        ));
    }
    Ok(table)
}

pub fn summary_table(summaries: &[Summary]) -> Table {
    let mut table = boxed();
    table.set_titles(header_row(&["column", "count", "mean", "std", "min", "max"]));
    for s in summaries {
        table.add_row(Row::new(vec![
            Cell::new(&s.column),
            Cell::new(&s.count.to_string()).style_spec("r"),
            Cell::new(&num(s.mean)).style_spec("r"),
            Cell::new(&num(s.std)).style_spec("r"),
            Cell::new(&num(s.min)).style_spec("r"),
            Cell::new(&num(s.max)).style_spec("r"),
        ]));
    }
    table
}

pub fn counts_table(column: &str, counts: &[(String, usize)]) -> Table {
    let mut table = boxed();
    table.set_titles(header_row(&[column, "count"]));
    for (value, count) in counts {
        table.add_row(Row::new(vec![
            Cell::new(value),
            Cell::new(&count.to_string()).style_spec("r"),
        ]));
    }
    table
}

pub fn bins_table(column: &str, bins: &[Bin]) -> Table {
    let mut table = boxed();
    table.set_titles(header_row(&[column, "count"]));
    for bin in bins {
        table.add_row(Row::new(vec![
            Cell::new(&bin.label()),
            Cell::new(&bin.count.to_string()).style_spec("r"),
        ]));
    }
    table
}

pub fn regression_table(x: &str, y: &str, fit: &LinearFit) -> Table {
    let mut table = boxed();
    table.set_titles(header_row(&["x", "y", "n", "slope", "intercept", "R²"]));
    table.add_row(Row::new(vec![
        Cell::new(x),
        Cell::new(y),
        Cell::new(&fit.n.to_string()).style_spec("r"),
        Cell::new(&format!("{:.4}", fit.slope)).style_spec("r"),
        Cell::new(&format!("{:+.4}", fit.intercept)).style_spec("r"),
        Cell::new(&format!("{:.2}", fit.r_squared)).style_spec("r"),
    ]));
    table
}

fn row_list(rows: &[usize]) -> String {
    if rows.is_empty() {
        return "none".to_string();
    }
    rows.iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn cleaning_table(report: &CleanReport) -> Table {
    let mut table = boxed();
    table.set_titles(header_row(&["step", "result"]));
    for (step, result) in [
        ("input rows", report.input_rows.to_string()),
        ("columns renamed", report.renamed_columns.to_string()),
        ("rows with missing cells", row_list(&report.rows_with_missing)),
        ("cells corrected", report.cell_fixes.to_string()),
        ("values replaced", report.replacements.to_string()),
        ("outliers fixed", report.outliers_fixed.to_string()),
        ("duplicates removed", report.duplicate_rows.len().to_string()),
        ("duplicate rows", row_list(&report.duplicate_rows)),
    ] {
        table.add_row(Row::new(vec![Cell::new(step), Cell::new(&result)]));
    }
    table
}

/// Print the whole run report to stdout.
pub fn print_report(
    raw_head: &RawTable,
    cleaned: &RecordBatch,
    report: &CleanReport,
    analysis: &Analysis,
) -> Result<()> {
    println!("\n--- Raw Data (first {} rows) ---", raw_head.num_rows());
    raw_head_table(raw_head, raw_head.num_rows()).printstd();

    println!("\n--- Cleaning ---");
    cleaning_table(report).printstd();

    println!("\n--- Before Outlier Correction ---");
    summary_table(&report.before_outliers).printstd();
    println!("\n--- After Outlier Correction ---");
    summary_table(&report.after_outliers).printstd();

    println!("\n--- Cleaned Data (first {} rows) ---", raw_head.num_rows());
    batch_head_table(cleaned, raw_head.num_rows())?.printstd();

    println!("\n--- Film Length ---");
    summary_table(std::slice::from_ref(&analysis.film_length)).printstd();
    bins_table("film_length", &analysis.length_bins).printstd();

    for (column, counts) in &analysis.value_counts {
        println!("\n--- {} ---", column);
        counts_table(column, counts).printstd();
    }

    println!("\n--- Regression ---");
    regression_table(&analysis.x_column, &analysis.y_column, &analysis.fit).printstd();
    println!("{}", analysis.fit.r_squared_label());
    println!("{}", analysis.fit.equation_label());
    Ok(())
}
