use arrow::{
    compute::concat_batches,
    csv::{reader::Format, ReaderBuilder, WriterBuilder},
    datatypes::SchemaRef,
    record_batch::RecordBatch,
};
use parquet::{arrow::ArrowWriter, basic::Compression, file::properties::WriterProperties};
use std::{
    ffi::OsString,
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::info;

use crate::error::Result;
use crate::schema::pin_known_types;

const DATE_FORMAT: &str = "%Y-%m-%d";
const READ_BATCH_SIZE: usize = 8_192;

/// `<path>.tmp` next to the final file.
fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name: OsString = path.file_name().map(Into::into).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Write the cleaned table as CSV: header row, no index column, ISO dates,
/// nulls as empty cells. Goes through a `.tmp` sibling and is renamed into place.
#[tracing::instrument(level = "info", skip(batch), fields(path = %path.display(), rows = batch.num_rows()))]
pub fn write_csv(batch: &RecordBatch, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let tmp_path = tmp_sibling(path);
    {
        let file = File::create(&tmp_path)?;
        let mut out = BufWriter::new(file);
        let mut writer = WriterBuilder::new()
            .with_header(true)
            .with_date_format(DATE_FORMAT.to_string())
            .build(&mut out);
        writer.write(batch)?;
        drop(writer);
        out.flush()?;
    }
    fs::rename(&tmp_path, path)?;
    info!("wrote cleaned csv");
    Ok(())
}

/// Schema of a cleaned CSV: inferred from the file, with the known columns
/// pinned to their cleaned types.
pub fn infer_cleaned_schema(path: &Path) -> Result<SchemaRef> {
    let file = File::open(path)?;
    let (inferred, _) = Format::default()
        .with_header(true)
        .infer_schema(BufReader::new(file), None)?;
    Ok(pin_known_types(&inferred))
}

/// Read a cleaned CSV back into one batch. With no `schema` the schema is
/// inferred via [`infer_cleaned_schema`].
#[tracing::instrument(level = "info", skip(schema), fields(path = %path.display()))]
pub fn read_cleaned_csv(path: &Path, schema: Option<SchemaRef>) -> Result<RecordBatch> {
    let schema = match schema {
        Some(s) => s,
        None => infer_cleaned_schema(path)?,
    };
    let file = File::open(path)?;

    let reader = ReaderBuilder::new(schema.clone())
        .with_header(true)
        .with_batch_size(READ_BATCH_SIZE)
        .build(BufReader::new(file))?;
    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    let batch = concat_batches(&schema, &batches)?;
    info!(rows = batch.num_rows(), "read cleaned csv");
    Ok(batch)
}

/// Same table as Snappy-compressed Parquet, via a `.tmp` sibling.
#[tracing::instrument(level = "info", skip(batch), fields(path = %path.display(), rows = batch.num_rows()))]
pub fn write_parquet(batch: &RecordBatch, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let tmp_path = tmp_sibling(path);
    {
        let file = File::create(&tmp_path)?;
        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();
        let mut writer = ArrowWriter::try_new(BufWriter::new(file), batch.schema(), Some(props))?;
        writer.write(batch)?;
        writer.close()?;
    }
    fs::rename(&tmp_path, path)?;
    info!("wrote parquet");
    Ok(())
}
