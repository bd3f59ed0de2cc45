use arrow::{
    array::{Array, Float64Array, Int64Array, StringArray},
    record_batch::RecordBatch,
};
use std::collections::HashMap;

use crate::error::{PipelineError, Result};

/// count / mean / std / min / max of one numeric column, nulls skipped.
/// `std` is the sample standard deviation; NaN when fewer than two values.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

/// Read an Int64 or Float64 column as optional floats.
pub fn numeric_column(batch: &RecordBatch, name: &str) -> Result<Vec<Option<f64>>> {
    let arr = batch
        .column_by_name(name)
        .ok_or_else(|| PipelineError::Analysis(format!("no column {}", name)))?;

    if let Some(f) = arr.as_any().downcast_ref::<Float64Array>() {
        return Ok(f.iter().collect());
    }
    if let Some(i) = arr.as_any().downcast_ref::<Int64Array>() {
        return Ok(i.iter().map(|v| v.map(|v| v as f64)).collect());
    }
    Err(PipelineError::Analysis(format!(
        "column {} is {}, not numeric",
        name,
        arr.data_type()
    )))
}

pub fn describe(batch: &RecordBatch, name: &str) -> Result<Summary> {
    let values: Vec<f64> = numeric_column(batch, name)?.into_iter().flatten().collect();
    Ok(summarize(name, &values))
}

pub fn summarize(name: &str, values: &[f64]) -> Summary {
    let count = values.len();
    if count == 0 {
        return Summary {
            column: name.to_string(),
            count,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
        };
    }
    let n = count as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = if count > 1 {
        (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
    } else {
        f64::NAN
    };
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Summary {
        column: name.to_string(),
        count,
        mean,
        std,
        min,
        max,
    }
}

/// Occurrences of each distinct value of a Utf8 column, most frequent first,
/// ties broken alphabetically. Nulls are not counted.
pub fn value_counts(batch: &RecordBatch, name: &str) -> Result<Vec<(String, usize)>> {
    let arr = batch
        .column_by_name(name)
        .ok_or_else(|| PipelineError::Analysis(format!("no column {}", name)))?;
    let strings = arr
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| PipelineError::Analysis(format!("column {} is not text", name)))?;

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for v in strings.iter().flatten() {
        *counts.entry(v).or_default() += 1;
    }
    let mut out: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(out)
}
