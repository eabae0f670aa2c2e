use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("Browser session unavailable: {reason}")]
    SessionUnavailable { reason: String },

    #[error("Timed out after {timeout:?} waiting for result table to appear")]
    TableNotFound { timeout: Duration },

    #[error("Browser protocol error: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("PDF rendering error: {0}")]
    PdfError(#[from] lopdf::Error),

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Browser,
    Network,
    Data,
    Storage,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ScrapeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ScrapeError::SessionUnavailable { .. }
            | ScrapeError::TableNotFound { .. }
            | ScrapeError::Browser(_) => ErrorCategory::Browser,
            ScrapeError::Http(_) => ErrorCategory::Network,
            ScrapeError::CsvError(_)
            | ScrapeError::SerializationError(_)
            | ScrapeError::PdfError(_)
            | ScrapeError::ProcessingError { .. } => ErrorCategory::Data,
            ScrapeError::IoError(_) => ErrorCategory::Storage,
            ScrapeError::ConfigValidationError { .. }
            | ScrapeError::InvalidConfigValueError { .. }
            | ScrapeError::MissingConfigError { .. }
            | ScrapeError::ValidationError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 找不到表格只是空結果
            ScrapeError::TableNotFound { .. } => ErrorSeverity::Low,
            ScrapeError::Http(_) | ScrapeError::Browser(_) => ErrorSeverity::Medium,
            ScrapeError::SessionUnavailable { .. } | ScrapeError::IoError(_) => {
                ErrorSeverity::Critical
            }
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ScrapeError::SessionUnavailable { .. } => {
                "Start Chrome with --remote-debugging-port=9222, or pass --chrome-path so it can be launched"
            }
            ScrapeError::TableNotFound { .. } => {
                "Fill the selection popup in the browser window and click Proceed, or raise the table timeouts"
            }
            ScrapeError::Browser(_) => "Check that the browser tab is still open and retry",
            ScrapeError::Http(_) => "Check that the debugging endpoint is reachable on the configured host and port",
            ScrapeError::IoError(_) => "Check that the download directory exists and is writable",
            ScrapeError::CsvError(_)
            | ScrapeError::SerializationError(_)
            | ScrapeError::PdfError(_)
            | ScrapeError::ProcessingError { .. } => {
                "The scraped table could not be exported; rerun with --verbose for details"
            }
            ScrapeError::ConfigValidationError { .. }
            | ScrapeError::InvalidConfigValueError { .. }
            | ScrapeError::MissingConfigError { .. } => {
                "Review the configuration file and command-line flags"
            }
            ScrapeError::ValidationError { .. } => "Provide a value for every query parameter",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ScrapeError::SessionUnavailable { .. } => {
                "Could not attach to or launch a Chrome browser".to_string()
            }
            ScrapeError::TableNotFound { .. } => "No cause list table appeared on the page".to_string(),
            ScrapeError::IoError(e) => format!("Could not write output files: {}", e),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_unavailable_is_critical() {
        let err = ScrapeError::SessionUnavailable {
            reason: "connection refused".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Browser);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_table_not_found_is_low_severity() {
        let err = ScrapeError::TableNotFound {
            timeout: Duration::from_secs(30),
        };
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert!(err.recovery_suggestion().contains("Proceed"));
    }

    #[test]
    fn test_config_errors_share_category() {
        let err = ScrapeError::MissingConfigError {
            field: "portal.base_url".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }
}
