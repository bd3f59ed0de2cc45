pub mod analyze;
pub mod config;
pub mod error;
pub mod fetch;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod schema;

pub use config::{FetchConfig, PipelineConfig};
pub use error::{PipelineError, Result};
