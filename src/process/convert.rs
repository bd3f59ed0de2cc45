use arrow::{
    array::{Array, ArrayRef, Date32Array, Float64Array, Int64Array, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use chrono::Datelike;
use std::sync::Arc;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::process::{
    parse::{self, ValueError},
    utils::infer_kind,
    RawTable,
};
use crate::schema::{map_to_arrow_type, spec_for, types::RELEASE_YEAR, ColumnKind};

/// Convert a renamed raw table into typed columns.
///
/// Known columns use their declared conversion; anything else is inferred.
/// Empty cells become nulls. A non-empty cell that does not parse is an error.
pub fn convert_to_final_types(table: &RawTable) -> Result<RecordBatch> {
    let mut fields = Vec::with_capacity(table.num_columns());
    let mut out = Vec::with_capacity(table.num_columns());

    for (idx, name) in table.headers.iter().enumerate() {
        let kind = match spec_for(name) {
            Some(spec) => spec.kind,
            None => {
                let inferred = infer_kind(table.column_values(idx));
                debug!(column = %name, ?inferred, "inferred column type");
                inferred
            }
        };
        out.push(build_column(name, kind, table.column_values(idx))?);
        fields.push(Field::new(name, map_to_arrow_type(kind), true));
    }

    let schema = Arc::new(Schema::new(fields));
    RecordBatch::try_new(schema, out).map_err(Into::into)
}

fn build_column<'a>(
    name: &str,
    kind: ColumnKind,
    values: impl Iterator<Item = &'a str>,
) -> Result<ArrayRef> {
    let at = |row: usize, raw: &str, e: ValueError| PipelineError::parse(name, row, raw, e.to_string());

    let col: ArrayRef = match kind {
        ColumnKind::MonthDate { format } => {
            let days = values
                .enumerate()
                .map(|(row, raw)| {
                    parse::parse_month_date(raw, format)
                        .map(|d| d.map(parse::date_to_days))
                        .map_err(|e| at(row, raw, e))
                })
                .collect::<Result<Vec<Option<i32>>>>()?;
            Arc::new(Date32Array::from(days))
        }
        ColumnKind::Currency { scale } => {
            let amounts = values
                .enumerate()
                .map(|(row, raw)| {
                    parse::parse_currency(raw)
                        .map(|v| v.map(|v| v * scale))
                        .map_err(|e| at(row, raw, e))
                })
                .collect::<Result<Vec<Option<f64>>>>()?;
            Arc::new(Float64Array::from(amounts))
        }
        ColumnKind::SuffixedInt { suffix } => {
            let ints = values
                .enumerate()
                .map(|(row, raw)| parse::parse_suffixed_int(raw, suffix).map_err(|e| at(row, raw, e)))
                .collect::<Result<Vec<Option<i64>>>>()?;
            Arc::new(Int64Array::from(ints))
        }
        ColumnKind::Float => {
            let floats = values
                .enumerate()
                .map(|(row, raw)| parse::parse_float(raw).map_err(|e| at(row, raw, e)))
                .collect::<Result<Vec<Option<f64>>>>()?;
            Arc::new(Float64Array::from(floats))
        }
        ColumnKind::Int => {
            let ints = values
                .enumerate()
                .map(|(row, raw)| parse::parse_int(raw).map_err(|e| at(row, raw, e)))
                .collect::<Result<Vec<Option<i64>>>>()?;
            Arc::new(Int64Array::from(ints))
        }
        ColumnKind::Text => {
            let text: Vec<Option<String>> = values
                .map(|raw| (!raw.is_empty()).then(|| raw.to_string()))
                .collect();
            Arc::new(StringArray::from(text))
        }
    };
    Ok(col)
}

/// Append `release_year`, taken from the `Date32` column `date_column`.
pub fn add_release_year(batch: &RecordBatch, date_column: &str) -> Result<RecordBatch> {
    let schema = batch.schema();
    let idx = schema.index_of(date_column).map_err(|_| {
        PipelineError::SchemaMismatch(format!("no {} column to derive a year from", date_column))
    })?;
    let dates = batch
        .column(idx)
        .as_any()
        .downcast_ref::<Date32Array>()
        .ok_or_else(|| {
            PipelineError::SchemaMismatch(format!(
                "{} is {}, expected Date32",
                date_column,
                batch.column(idx).data_type()
            ))
        })?;

    let years: Vec<Option<i64>> = dates
        .iter()
        .map(|d| d.and_then(parse::days_to_date).map(|d| d.year() as i64))
        .collect();

    let mut fields: Vec<Field> = schema.fields().iter().map(|f| f.as_ref().clone()).collect();
    fields.push(Field::new(RELEASE_YEAR, DataType::Int64, true));
    let mut cols = batch.columns().to_vec();
    cols.push(Arc::new(Int64Array::from(years)) as ArrayRef);

    RecordBatch::try_new(Arc::new(Schema::new(fields)), cols).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::RELEASE_DATE;

    fn raw(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn converts_known_and_inferred_columns() {
        let t = raw(
            &[
                "release_date",
                "budget_usd",
                "film_length",
                "imdb_avg",
                "Bond_Car_MFG",
                "Kisses",
            ],
            &[
                &["June, 1962", "$1,000.00", "110 mins", "7.3", "Sunbeam", "3"],
                &["August, 1963", "", "115 mins", "", "Bentley", ""],
            ],
        );
        let batch = convert_to_final_types(&t).unwrap();
        let schema = batch.schema();
        assert_eq!(schema.field(0).data_type(), &DataType::Date32);
        assert_eq!(schema.field(1).data_type(), &DataType::Float64);
        assert_eq!(schema.field(2).data_type(), &DataType::Int64);
        assert_eq!(schema.field(3).data_type(), &DataType::Float64);
        assert_eq!(schema.field(4).data_type(), &DataType::Utf8);
        assert_eq!(schema.field(5).data_type(), &DataType::Int64);

        let budget = batch
            .column(1)
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        assert_eq!(budget.value(0), 1_000_000.0);
        assert!(budget.is_null(1));

        let with_year = add_release_year(&batch, RELEASE_DATE).unwrap();
        let years = with_year
            .column_by_name(RELEASE_YEAR)
            .unwrap()
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        assert_eq!(years.iter().collect::<Vec<_>>(), vec![Some(1962), Some(1963)]);
        assert_eq!(with_year.schema().fields().len(), 7);
    }

    #[test]
    fn bad_cell_names_column_and_row() {
        let t = raw(&["income_usa"], &[&["$5.00"], &["lots"]]);
        match convert_to_final_types(&t).unwrap_err() {
            PipelineError::Parse { column, row, value, .. } => {
                assert_eq!(column, "income_usa");
                assert_eq!(row, 1);
                assert_eq!(value, "lots");
            }
            other => panic!("unexpected error {other}"),
        }
    }
}
