//! Error types for dataset loading
//!
//! Filtering and aggregation are infallible; only getting the sheet into
//! memory can fail:
//! - Reading a local file or fetching a remote CSV
//! - Decoding CSV rows or opening an Excel workbook
//! - Missing required columns or unreadable cell values

use std::path::PathBuf;

/// Errors while loading the stock sheet
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// IO error reading a local file
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Remote CSV could not be fetched
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Remote endpoint answered with a non-success status
    #[error("{url} answered with status {status}")]
    HttpStatus { url: String, status: u16 },

    /// Malformed CSV
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Workbook could not be opened or read
    #[error("workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    /// Workbook lacks the sheet holding the stock
    #[error("workbook has no '{0}' sheet")]
    MissingSheet(&'static str),

    /// Required column absent from the header row
    #[error("missing required column: {0}")]
    MissingColumn(&'static str),

    /// A cell could not be read as the column's type
    #[error("row {row}: invalid {column} value '{value}'")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },
}

impl LoadError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create invalid value error
    pub fn invalid_value(row: usize, column: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            row,
            column,
            value: value.into(),
        }
    }
}

/// Result type alias for loading operations
pub type LoadResult<T> = Result<T, LoadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_display() {
        let err = LoadError::MissingColumn("size");
        assert_eq!(err.to_string(), "missing required column: size");
    }

    #[test]
    fn missing_sheet_display() {
        let err = LoadError::MissingSheet("Stock");
        assert_eq!(err.to_string(), "workbook has no 'Stock' sheet");
    }

    #[test]
    fn invalid_value_display() {
        let err = LoadError::invalid_value(3, "size", "cuarenta");
        assert_eq!(err.to_string(), "row 3: invalid size value 'cuarenta'");
    }
}
