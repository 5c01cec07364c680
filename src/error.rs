/*!
 * Error handling for the servisheet engine
 *
 * Distinguishes fatal whole-run conditions from recoverable per-item and
 * per-customer faults. Per-item faults never surface here; they are counted
 * in the run report instead. Everything in this enum aborts the run except
 * `NoInstallationDate`, which is absorbed per customer during import.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Servisheet library result type
pub type Result<T> = std::result::Result<T, ServisheetError>;

/// Error types with context and suggestions
#[derive(Error, Debug)]
pub enum ServisheetError {
    /// File I/O errors with context
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
        path: Option<PathBuf>,
    },

    /// Input record set was empty before filtering
    #[error("No visit records to export")]
    EmptyInput,

    /// Filtering removed every record
    #[error("No completed visits to export")]
    EmptyResult,

    /// CSV parsing errors with location information
    #[error("CSV parsing error at line {line:?}: {message}")]
    CsvParse {
        message: String,
        line: Option<usize>,
    },

    /// JSON transport errors
    #[error("JSON parsing error: {message}")]
    JsonParse {
        message: String,
    },

    /// Spreadsheet container errors (reading or writing)
    #[error("Spreadsheet error: {message}")]
    Spreadsheet {
        message: String,
    },

    /// File not found with suggestions
    #[error("File not found: {path}")]
    FileNotFound {
        path: PathBuf,
        suggestion: String,
    },

    /// A customer row with no determinable installation date.
    /// Recoverable: the row is excluded and the import run continues.
    #[error("No installation date for customer '{customer}'")]
    NoInstallationDate {
        customer: String,
    },

    /// Export serialization errors
    #[error("Export error: {message}")]
    Export {
        message: String,
        suggestion: Option<String>,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        suggestion: Option<String>,
    },
}

impl ServisheetError {
    /// Create a file not found error with a helpful suggestion
    pub fn file_not_found_with_suggestion(path: PathBuf) -> Self {
        let suggestion = match path.extension().and_then(|e| e.to_str()) {
            Some("xlsx") | Some("csv") => format!(
                "Check that the spreadsheet exists at '{}' and that the path was not moved after export.",
                path.display()
            ),
            Some("json") => format!(
                "Check that the visit record file exists at '{}'. The export input is a JSON array of visit objects.",
                path.display()
            ),
            _ => format!(
                "Check that the file exists at '{}' and that you have read permissions.",
                path.display()
            ),
        };

        Self::FileNotFound { path, suggestion }
    }

    /// Wrap an I/O error with the path it occurred on
    pub fn io_with_path(source: std::io::Error, path: &std::path::Path) -> Self {
        Self::Io {
            message: format!("{} ({})", source, path.display()),
            source,
            path: Some(path.to_path_buf()),
        }
    }

    /// True for conditions that are absorbed per customer rather than
    /// aborting the run
    pub fn is_per_customer(&self) -> bool {
        matches!(self, Self::NoInstallationDate { .. })
    }

    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            Self::FileNotFound { suggestion, .. } => {
                format!("{}\n\nSuggestion: {}", self, suggestion)
            }
            Self::Export { suggestion: Some(sug), .. } => {
                format!("{}\n\nSuggestion: {}", self, sug)
            }
            Self::Configuration { suggestion: Some(sug), .. } => {
                format!("{}\n\nSuggestion: {}", self, sug)
            }
            _ => self.to_string(),
        }
    }
}

// Convenience conversions
impl From<std::io::Error> for ServisheetError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: err,
            path: None,
        }
    }
}

impl From<csv::Error> for ServisheetError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|pos| pos.line() as usize);
        Self::CsvParse {
            message: err.to_string(),
            line,
        }
    }
}

impl From<serde_json::Error> for ServisheetError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonParse {
            message: err.to_string(),
        }
    }
}

impl From<calamine::XlsxError> for ServisheetError {
    fn from(err: calamine::XlsxError) -> Self {
        Self::Spreadsheet {
            message: err.to_string(),
        }
    }
}

impl From<rust_xlsxwriter::XlsxError> for ServisheetError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::Export {
            message: err.to_string(),
            suggestion: Some("Check that the output location is writable.".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_installation_date_is_per_customer() {
        let err = ServisheetError::NoInstallationDate {
            customer: "C1".to_string(),
        };
        assert!(err.is_per_customer());
        assert!(!ServisheetError::EmptyInput.is_per_customer());
    }

    #[test]
    fn test_file_not_found_suggestion_mentions_path() {
        let err = ServisheetError::file_not_found_with_suggestion(PathBuf::from("report.xlsx"));
        assert!(err.user_message().contains("report.xlsx"));
    }
}
