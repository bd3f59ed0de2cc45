// src/schema/arrow.rs

use arrow::datatypes::{DataType, Field as ArrowField, Schema as ArrowSchema};
use std::sync::Arc;

use super::types::{spec_for, ColumnKind, RELEASE_YEAR};

/// Map a column conversion to the Arrow type it produces.
///
/// - MonthDate        → Date32
/// - Currency, Float  → Float64
/// - SuffixedInt, Int → Int64
/// - Text             → Utf8
pub fn map_to_arrow_type(kind: ColumnKind) -> DataType {
    match kind {
        ColumnKind::MonthDate { .. } => DataType::Date32,
        ColumnKind::Currency { .. } | ColumnKind::Float => DataType::Float64,
        ColumnKind::SuffixedInt { .. } | ColumnKind::Int => DataType::Int64,
        ColumnKind::Text => DataType::Utf8,
    }
}

/// The Arrow type a cleaned column is expected to have, if it is one we know.
pub fn known_arrow_type(name: &str) -> Option<DataType> {
    if name == RELEASE_YEAR {
        return Some(DataType::Int64);
    }
    spec_for(name).map(|spec| map_to_arrow_type(spec.kind))
}

/// Replace the types of known cleaned columns in `schema`, leaving the rest as-is.
pub fn pin_known_types(schema: &ArrowSchema) -> Arc<ArrowSchema> {
    let fields: Vec<ArrowField> = schema
        .fields()
        .iter()
        .map(|f| match known_arrow_type(f.name()) {
            Some(dt) => ArrowField::new(f.name(), dt, true),
            None => f.as_ref().clone().with_nullable(true),
        })
        .collect();

    Arc::new(ArrowSchema::new(fields))
}
