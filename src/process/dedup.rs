use arrow::{
    array::BooleanArray,
    compute::filter_record_batch,
    record_batch::RecordBatch,
    row::{RowConverter, SortField},
};
use std::collections::HashSet;

use crate::error::Result;

/// Drop rows that exactly repeat an earlier row across every column.
///
/// The first occurrence is kept and surviving rows keep their order, so the
/// result is implicitly re-indexed from 0. Nulls compare equal to nulls.
/// Returns the de-duplicated batch and the positions, in `batch`, of the
/// rows that were removed.
pub fn drop_duplicate_rows(batch: &RecordBatch) -> Result<(RecordBatch, Vec<usize>)> {
    if batch.num_rows() < 2 {
        return Ok((batch.clone(), Vec::new()));
    }

    let sort_fields = batch
        .schema()
        .fields()
        .iter()
        .map(|f| SortField::new(f.data_type().clone()))
        .collect();
    let converter = RowConverter::new(sort_fields)?;
    let rows = converter.convert_columns(batch.columns())?;

    let mut seen = HashSet::with_capacity(batch.num_rows());
    let keep: Vec<bool> = rows.iter().map(|row| seen.insert(row.owned())).collect();
    let removed: Vec<usize> = keep
        .iter()
        .enumerate()
        .filter(|(_, k)| !**k)
        .map(|(i, _)| i)
        .collect();
    if removed.is_empty() {
        return Ok((batch.clone(), removed));
    }

    let mask = BooleanArray::from(keep);
    Ok((filter_record_batch(batch, &mask)?, removed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::{
        array::{Array, Float64Array, StringArray},
        datatypes::{DataType, Field, Schema},
    };
    use std::sync::Arc;

    #[test]
    fn keeps_first_occurrence_in_order() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("movie_title", DataType::Utf8, true),
            Field::new("imdb_avg", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec![
                    Some("Dr. No"),
                    Some("Goldfinger"),
                    Some("Dr. No"),
                    Some("Thunderball"),
                    Some("Goldfinger"),
                    None,
                    None,
                ])),
                Arc::new(Float64Array::from(vec![
                    Some(7.3),
                    Some(7.8),
                    Some(7.3),
                    Some(7.0),
                    Some(7.9),
                    None,
                    None,
                ])),
            ],
        )
        .unwrap();

        let (deduped, removed) = drop_duplicate_rows(&batch).unwrap();
        assert_eq!(removed, vec![2, 6]);
        assert_eq!(deduped.num_rows(), 5);
        let titles = deduped
            .column(0)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(
            titles.iter().collect::<Vec<_>>(),
            vec![
                Some("Dr. No"),
                Some("Goldfinger"),
                Some("Thunderball"),
                Some("Goldfinger"),
                None
            ]
        );
    }

    #[test]
    fn distinct_rows_report_no_positions() {
        let schema = Arc::new(Schema::new(vec![Field::new(
            "movie_title",
            DataType::Utf8,
            true,
        )]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(StringArray::from(vec!["Dr. No", "Goldfinger"]))],
        )
        .unwrap();
        let (deduped, removed) = drop_duplicate_rows(&batch).unwrap();
        assert!(removed.is_empty());
        assert_eq!(deduped.num_rows(), 2);
    }
}
