use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_DATA_FILE: &str = "data/sales_data.csv";

/// Columns the analysis prompt is written against.
pub const EXPECTED_COLUMNS: [&str; 4] = ["Month", "Sales", "Expenses", "Profit"];

#[derive(Error, Debug)]
pub enum DataFileError {
    #[error("Data file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read data file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// CSV text loaded from disk, embedded verbatim into the prompt.
#[derive(Debug, Clone)]
pub struct SalesData {
    pub path: PathBuf,
    pub text: String,
    pub columns: Vec<String>,
    pub row_count: usize,
}

impl SalesData {
    pub fn has_expected_columns(&self) -> bool {
        self.columns.len() == EXPECTED_COLUMNS.len()
            && self
                .columns
                .iter()
                .zip(EXPECTED_COLUMNS)
                .all(|(actual, expected)| actual == expected)
    }
}

pub fn load_csv(path: impl AsRef<Path>) -> Result<SalesData, DataFileError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => DataFileError::NotFound(path.to_path_buf()),
        _ => DataFileError::Read {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let mut lines = text.lines().filter(|line| !line.trim().is_empty());
    let columns: Vec<String> = lines
        .next()
        .map(|header| {
            header
                .trim_start_matches('\u{feff}')
                .split(',')
                .map(|c| c.trim().to_string())
                .collect()
        })
        .unwrap_or_default();
    let row_count = lines.count();

    let data = SalesData {
        path: path.to_path_buf(),
        text,
        columns,
        row_count,
    };

    if !data.has_expected_columns() {
        tracing::warn!(
            path = %path.display(),
            columns = ?data.columns,
            "CSV header does not match {}; sending it anyway",
            EXPECTED_COLUMNS.join(",")
        );
    }
    tracing::debug!(path = %path.display(), rows = data.row_count, "Loaded data file");

    Ok(data)
}
