//! Unified error hierarchy for liftrs
//!
//! The analytics core never fails on messy spreadsheet data; these errors
//! cover the boundary where sheets, streams and configuration are read.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for all liftrs operations
#[derive(Debug, Error)]
pub enum LiftError {
    /// Sheet or stream import errors
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV reading errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors reading workout sheets or heart-rate streams
#[derive(Debug, Error)]
pub enum ImportError {
    /// File or directory not found at specified path
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// No source knows how to read the path
    #[error("Unsupported input: {path}")]
    UnsupportedFormat { path: PathBuf },

    /// The file was readable but its structure was not
    #[error("Invalid data structure in {path}: {reason}")]
    InvalidStructure { path: PathBuf, reason: String },

    /// A requested sheet does not exist in the workbook
    #[error("Sheet not found: {label}")]
    SheetNotFound { label: String },

    /// Stream is missing a required series
    #[error("Missing stream: {stream}")]
    MissingStream { stream: String },
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be parsed
    #[error("Failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    /// Config could not be serialized
    #[error("Failed to serialize configuration: {reason}")]
    Serialize { reason: String },

    /// A mapping entry could not be understood
    #[error("Invalid mapping '{entry}': expected name=id1,id2")]
    InvalidMapping { entry: String },
}

/// Result type alias for liftrs operations
pub type Result<T> = std::result::Result<T, LiftError>;

impl LiftError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LiftError::Import(ImportError::SheetNotFound { .. }) => ErrorSeverity::Warning,
            LiftError::Import(ImportError::FileNotFound { .. }) => ErrorSeverity::Warning,
            LiftError::Config(ConfigError::InvalidMapping { .. }) => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            LiftError::Import(ImportError::FileNotFound { path }) => {
                format!("Could not find workout data: {}", path.display())
            }
            LiftError::Import(ImportError::UnsupportedFormat { path }) => {
                format!(
                    "Don't know how to read {}. Use a .json workbook, a directory of .csv sheets, or a heart-rate stream .json.",
                    path.display()
                )
            }
            LiftError::Import(ImportError::SheetNotFound { label }) => {
                format!("No worksheet named '{}' was found.", label)
            }
            LiftError::Config(ConfigError::Parse { path, .. }) => {
                format!("Configuration file {} is invalid.", path.display())
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Error that prevents operation but system can continue
    Error,
    /// Warning that doesn't prevent operation
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_severity() {
        let err = LiftError::Import(ImportError::FileNotFound {
            path: PathBuf::from("/tmp/workouts.json"),
        });
        assert_eq!(err.severity(), ErrorSeverity::Warning);
        assert_eq!(err.severity().to_tracing_level(), tracing::Level::WARN);

        let err = LiftError::Import(ImportError::InvalidStructure {
            path: PathBuf::from("/tmp/broken.json"),
            reason: "unexpected end".to_string(),
        });
        assert_eq!(err.severity(), ErrorSeverity::Error);
        assert_eq!(err.severity().to_tracing_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_user_messages() {
        let err = LiftError::Import(ImportError::SheetNotFound {
            label: "1/29/2026".to_string(),
        });
        assert!(err.user_message().contains("1/29/2026"));

        let err = LiftError::Config(ConfigError::InvalidMapping {
            entry: "oops".to_string(),
        });
        assert!(err.user_message().contains("name=id1,id2"));
    }

    #[test]
    fn test_from_conversions() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        assert!(matches!(LiftError::from(io), LiftError::Io(_)));

        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(LiftError::from(json), LiftError::Json(_)));
    }
}
