//! Versioned table of literal data fixes.
//!
//! The fixes are facts about one particular dataset, not general cleaning
//! rules, so they live in a YAML document that can be read and audited on its
//! own. The default table is compiled in from `corrections/bond_films_v1.yaml`.

use arrow::{
    array::{Array, ArrayRef, Float64Array, Int64Array, StringArray},
    datatypes::DataType,
    record_batch::RecordBatch,
};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, fs, path::Path, sync::Arc};
use tracing::{debug, info};

use crate::error::{PipelineError, Result};

use super::{parse::integral_f64_to_i64, RawTable};

const BUILTIN_V1: &str = include_str!("../../corrections/bond_films_v1.yaml");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionTable {
    pub version: u32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cell_fixes: Vec<CellFix>,
    #[serde(default)]
    pub replacements: Vec<Replacement>,
    #[serde(default)]
    pub outliers: Vec<OutlierFix>,
}

/// Set one cell, addressed by 0-based row position and cleaned column name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellFix {
    pub row: usize,
    pub field: String,
    pub value: CellValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

/// Replace a whole string value wherever it appears in a text column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Replacement {
    pub from: String,
    pub to: String,
}

/// Replace one exact numeric value in one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierFix {
    pub field: String,
    pub from: f64,
    pub to: f64,
}

impl CorrectionTable {
    /// The fixes for the Bond film practice dataset.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml_str(BUILTIN_V1)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(&path)?;
        let table = Self::from_yaml_str(&text)?;
        info!(
            path = %path.as_ref().display(),
            version = table.version,
            "loaded correction table"
        );
        Ok(table)
    }

    /// An empty table; cleaning with it only casts and de-duplicates.
    pub fn empty() -> Self {
        Self {
            version: 0,
            description: None,
            cell_fixes: Vec::new(),
            replacements: Vec::new(),
            outliers: Vec::new(),
        }
    }

    /// Write the cell fixes into the raw strings. Runs after renaming, before casting.
    pub fn apply_cell_fixes(&self, table: &mut RawTable) -> Result<usize> {
        for fix in &self.cell_fixes {
            let col = table.column_index(&fix.field).ok_or_else(|| {
                PipelineError::SchemaMismatch(format!(
                    "cell fix targets unknown column {}",
                    fix.field
                ))
            })?;
            let width = table.headers.len();
            let n_rows = table.rows.len();
            let row = table.rows.get_mut(fix.row).ok_or_else(|| {
                PipelineError::SchemaMismatch(format!(
                    "cell fix targets row {} but the table has {} rows",
                    fix.row, n_rows
                ))
            })?;
            if row.len() < width {
                row.resize(width, String::new());
            }
            let new_value = fix.value.to_string();
            debug!(row = fix.row, field = %fix.field, old = %row[col], new = %new_value, "cell fix");
            row[col] = new_value;
        }
        Ok(self.cell_fixes.len())
    }

    /// Whole-value string replacement across every Utf8 column.
    /// Returns the batch and how many cells changed.
    pub fn apply_replacements(&self, batch: &RecordBatch) -> Result<(RecordBatch, usize)> {
        if self.replacements.is_empty() {
            return Ok((batch.clone(), 0));
        }
        let lookup: HashMap<&str, &str> = self
            .replacements
            .iter()
            .map(|r| (r.from.as_str(), r.to.as_str()))
            .collect();

        let mut changed = 0;
        let mut cols: Vec<ArrayRef> = Vec::with_capacity(batch.num_columns());
        for (field, arr) in batch.schema().fields().iter().zip(batch.columns()) {
            let Some(sarr) = arr.as_any().downcast_ref::<StringArray>() else {
                cols.push(arr.clone());
                continue;
            };
            let mut hits = 0;
            let values: Vec<Option<String>> = sarr
                .iter()
                .map(|v| {
                    v.map(|s| match lookup.get(s) {
                        Some(to) => {
                            hits += 1;
                            to.to_string()
                        }
                        None => s.to_string(),
                    })
                })
                .collect();
            if hits > 0 {
                debug!(column = %field.name(), hits, "replaced values");
            }
            changed += hits;
            cols.push(Arc::new(StringArray::from(values)) as ArrayRef);
        }

        Ok((RecordBatch::try_new(batch.schema(), cols)?, changed))
    }

    /// Swap exact bad values for corrected ones in Int64/Float64 columns.
    /// Returns the batch and how many cells changed.
    pub fn apply_outliers(&self, batch: &RecordBatch) -> Result<(RecordBatch, usize)> {
        let schema = batch.schema();
        let mut cols: Vec<ArrayRef> = batch.columns().to_vec();
        let mut changed = 0;

        for fix in &self.outliers {
            let idx = schema.index_of(&fix.field).map_err(|_| {
                PipelineError::SchemaMismatch(format!(
                    "outlier fix targets unknown column {}",
                    fix.field
                ))
            })?;
            let (new_col, hits) = replace_numeric(&cols[idx], fix)?;
            debug!(column = %fix.field, from = fix.from, to = fix.to, hits, "outlier fix");
            cols[idx] = new_col;
            changed += hits;
        }

        Ok((RecordBatch::try_new(schema, cols)?, changed))
    }
}

fn replace_numeric(arr: &ArrayRef, fix: &OutlierFix) -> Result<(ArrayRef, usize)> {
    let mut hits = 0;
    match arr.data_type() {
        DataType::Int64 => {
            let to = integral_f64_to_i64(fix.to).ok_or_else(|| {
                PipelineError::SchemaMismatch(format!(
                    "outlier fix for integer column {} has value {} that is not an i64",
                    fix.field, fix.to
                ))
            })?;
            let ints = arr
                .as_any()
                .downcast_ref::<Int64Array>()
                .ok_or_else(|| PipelineError::SchemaMismatch(fix.field.clone()))?;
            let values: Vec<Option<i64>> = ints
                .iter()
                .map(|v| {
                    v.map(|i| {
                        if i as f64 == fix.from {
                            hits += 1;
                            to
                        } else {
                            i
                        }
                    })
                })
                .collect();
            Ok((Arc::new(Int64Array::from(values)) as ArrayRef, hits))
        }
        DataType::Float64 => {
            let floats = arr
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(|| PipelineError::SchemaMismatch(fix.field.clone()))?;
            let values: Vec<Option<f64>> = floats
                .iter()
                .map(|v| {
                    v.map(|f| {
                        if f == fix.from {
                            hits += 1;
                            fix.to
                        } else {
                            f
                        }
                    })
                })
                .collect();
            Ok((Arc::new(Float64Array::from(values)) as ArrayRef, hits))
        }
        other => Err(PipelineError::SchemaMismatch(format!(
            "outlier fix targets column {} of type {}, expected a number",
            fix.field, other
        ))),
    }
}
