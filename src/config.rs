use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_INPUT: &str = "james_bond_data_rp.csv";
pub const DEFAULT_OUTPUT: &str = "james_bond_data_cleansed.csv";
pub const DEFAULT_CHARTS_DIR: &str = "charts";
pub const DEFAULT_BOOKS_URL: &str =
    "https://en.wikipedia.org/wiki/List_of_James_Bond_novels_and_short_stories";
/// The novels table is the second table on the page.
pub const DEFAULT_BOOK_TABLE: usize = 1;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Total requests per page, the first one included.
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// How the book list page is fetched.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub url: Url,
    pub table_index: usize,
    /// Skip TLS certificate verification. Off unless asked for.
    pub accept_invalid_certs: bool,
    pub timeout: Duration,
    pub max_attempts: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            url: Url::parse(DEFAULT_BOOKS_URL).expect("default books URL is valid"),
            table_index: DEFAULT_BOOK_TABLE,
            accept_invalid_certs: false,
            timeout: DEFAULT_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// One run of the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub parquet: Option<PathBuf>,
    /// `None` disables chart rendering.
    pub charts_dir: Option<PathBuf>,
    /// Alternative correction table; the built-in one is used when unset.
    pub corrections: Option<PathBuf>,
    /// `None` skips the book list fetch.
    pub fetch: Option<FetchConfig>,
    /// Print the report tables to stdout.
    pub print_report: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            parquet: None,
            charts_dir: Some(PathBuf::from(DEFAULT_CHARTS_DIR)),
            corrections: None,
            fetch: Some(FetchConfig::default()),
            print_report: true,
        }
    }
}
