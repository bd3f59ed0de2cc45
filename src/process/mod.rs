// src/process/mod.rs
pub mod clean;
pub mod convert;
pub mod corrections;
pub mod dedup;
pub mod parse;
pub mod rename;
pub mod utils;

use csv::ReaderBuilder;
use std::{fs::File, io::Read, path::Path};
use tracing::{debug, info};

use crate::error::{PipelineError, Result};
use utils::clean_str;

pub use clean::{clean_table, CleanReport, Cleaned};
pub use corrections::CorrectionTable;

/// A table of untyped cells, as read from a CSV file or scraped from HTML.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    /// Column names, from the header row.
    pub headers: Vec<String>,
    /// Each data row, one String per header.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.headers.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// All cells of column `idx`, top to bottom. Short rows yield `""`.
    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(idx).map(String::as_str).unwrap_or(""))
    }

    /// Row indices with at least one empty cell.
    pub fn rows_with_missing(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| {
                row.len() < self.headers.len() || row.iter().any(|c| c.trim().is_empty())
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// A copy holding only the first `n` rows.
    pub fn head(&self, n: usize) -> RawTable {
        RawTable {
            headers: self.headers.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }
}

/// Read a delimited file with a header row into a [`RawTable`].
///
/// Every data row must have as many fields as the header.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<RawTable> {
    let file = File::open(&path)?;
    let table = read_csv(file)?;
    info!(
        rows = table.num_rows(),
        columns = table.num_columns(),
        "loaded film table"
    );
    Ok(table)
}

/// Same as [`load_csv`] for any reader.
pub fn read_csv<R: Read>(reader: R) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(clean_str).collect();

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result?;
        if record.len() != headers.len() {
            return Err(PipelineError::SchemaMismatch(format!(
                "row {} has {} fields, header has {}",
                idx,
                record.len(),
                headers.len()
            )));
        }
        rows.push(record.iter().map(|s| s.trim().to_string()).collect());
    }
    debug!(rows = rows.len(), "parsed csv records");

    Ok(RawTable { headers, rows })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    pub(crate) fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,bondfilms=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    const HEADER: &str = "Release,Movie,Bond,Bond_Car_MFG,US_Gross,World_Gross,Budget ($ 000s),Film_Length,Avg_User_IMDB,Avg_User_Rtn_Tom,Martinis,Kills_Bond";

    /// Thirteen rows so that row 10 exists; row 10 has its ratings withheld,
    /// row 3 says "Shawn Connery", row 5 has -6 martinis, row 6 runs 1200
    /// minutes and row 12 repeats row 2.
    pub(crate) fn film_fixture() -> String {
        let rows = [
            r#""June, 1962",Dr. No,Sean Connery,Sunbeam,"$16,067,035.00","$59,567,035.00","$1,000.00",110 mins,7.3,7.7,2,4"#,
            r#""August, 1963",From Russia with Love,Sean Connery,Bentley,"$24,800,000.00","$78,900,000.00","$2,000.00",115 mins,7.5,8.0,0,11"#,
            r#""May, 1964",Goldfinger,Sean Connery,Aston Martin,"$51,100,000.00","$124,900,000.00","$3,000.00",110 mins,7.8,8.4,1,9"#,
            r#""September, 1965",Thunderball,Shawn Connery,Aston Martin,"$63,600,000.00","$141,200,000.00","$9,000.00",130 mins,7.0,6.8,0,20"#,
            r#""November, 1967",You Only Live Twice,Sean Connery,Toyota,"$43,100,000.00","$111,600,000.00","$9,500.00",117 mins,6.9,6.3,1,21"#,
            r#""December, 1969",On Her Majesty's Secret Service,George Lazenby,Mercury,"$22,800,000.00","$82,000,000.00","$7,000.00",142 mins,6.8,6.7,-6,5"#,
            r#""December, 1971",Diamonds Are Forever,Sean Connery,Ford,"$43,800,000.00","$116,000,000.00","$7,200.00",1200 mins,6.7,6.3,0,7"#,
            r#""July, 1973",Live and Let Die,Roger MOORE,AMC,"$35,400,000.00","$161,800,000.00","$7,000.00",121 mins,6.8,5.9,3,8"#,
            r#""December, 1974",The Man with the Golden Gun,Roger Moore,AMC,"$21,000,000.00","$97,600,000.00","$7,000.00",125 mins,6.7,5.1,3,1"#,
            r#""July, 1977",The Spy Who Loved Me,Roger Moore,Lotus,"$46,800,000.00","$185,400,000.00","$14,000.00",125 mins,7.1,6.8,3,31"#,
            r#""June, 1979",Moonraker,Roger Moore,Astin Martin,"$70,300,000.00","$210,300,000.00","$31,000.00",126 mins,,,1,12"#,
            r#""June, 1981",For Your Eyes Only,Roger Moore,Citroen,"$54,800,000.00","$195,300,000.00","$28,000.00",127 mins,6.8,6.3,2,18"#,
            r#""May, 1964",Goldfinger,Sean Connery,Aston Martin,"$51,100,000.00","$124,900,000.00","$3,000.00",110 mins,7.8,8.4,1,9"#,
        ];
        let mut s = String::from(HEADER);
        for r in rows {
            s.push('\n');
            s.push_str(r);
        }
        s.push('\n');
        s
    }

    #[test]
    fn test_load_csv_example() -> Result<()> {
        init_test_logging();
        let content = r#"Release,Movie,Bond,Bond_Car_MFG,US_Gross,World_Gross,Budget ($ 000s),Film_Length,Avg_User_IMDB,Avg_User_Rtn_Tom,Martinis,Kills_Bond
"June, 1962",Dr. No,Sean Connery,Sunbeam,"$16,067,035.00","$59,567,035.00","$1,000.00",110 mins,7.3,7.7,2,4
"August, 1963",From Russia with Love,Sean Connery,Bentley,"$24,800,000.00","$78,900,000.00","$2,000.00",115 mins,7.5,,0,11
"#;
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(content.as_bytes())?;

        let table = load_csv(tmp.path())?;
        assert_eq!(table.num_columns(), 12);
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.headers[6], "Budget ($ 000s)");
        assert_eq!(table.rows[0][0], "June, 1962");
        assert_eq!(table.rows[0][4], "$16,067,035.00");
        assert_eq!(table.rows_with_missing(), vec![1]);
        assert_eq!(
            table.column_values(1).collect::<Vec<_>>(),
            vec!["Dr. No", "From Russia with Love"]
        );
        Ok(())
    }

    #[test]
    fn test_ragged_row_is_rejected() {
        let content = "a,b\n1,2\n3\n";
        let err = read_csv(content.as_bytes()).unwrap_err();
        assert!(matches!(err, PipelineError::SchemaMismatch(_)));
    }
}
