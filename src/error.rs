use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("correction table is invalid: {0}")]
    Corrections(#[from] serde_yaml::Error),

    #[error("cannot parse {value:?} in column {column} (row {row}): {reason}")]
    Parse {
        column: String,
        row: usize,
        value: String,
        reason: String,
    },

    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("analysis failed: {0}")]
    Analysis(String),

    #[error("chart rendering failed: {0}")]
    Chart(String),
}

impl PipelineError {
    pub(crate) fn parse(
        column: impl Into<String>,
        row: usize,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        PipelineError::Parse {
            column: column.into(),
            row,
            value: value.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
