//! Error types for Navi

use thiserror::Error;

/// Result type alias using Navi's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Navi error types with helpful messages and suggestions
#[derive(Error, Debug)]
pub enum Error {
    // Input errors (E001-E099)
    #[error("Malformed forest: {0}")]
    MalformedForest(String),

    #[error("Malformed node data: {0}")]
    MalformedNode(String),

    // Fetch errors (E100-E199)
    #[error("Network error: {0}. Is the debugging data source running?")]
    NetworkError(#[from] reqwest::Error),

    #[error("Fetch of '{path}' failed: {reason}")]
    FetchFailed { path: String, reason: String },

    #[error("Fetch of '{path}' returned HTTP {status}")]
    HttpStatus { path: String, status: u16 },

    #[error("No value at path '{0}'")]
    PathNotFound(String),

    // User errors (E800-E899)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedForest(_) => "E001",
            Self::MalformedNode(_) => "E002",
            Self::NetworkError(_) => "E100",
            Self::FetchFailed { .. } => "E101",
            Self::HttpStatus { .. } => "E102",
            Self::PathNotFound(_) => "E103",
            Self::InvalidInput(_) => "E800",
            Self::Io(_) => "E9999",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::MalformedForest(_) => {
                Some("Check that the input is a JSON forest, a snapshot, or a page with a #forest element".to_string())
            }
            Self::NetworkError(_) => Some("navi config get source.base_url".to_string()),
            Self::HttpStatus { status: 404, .. } | Self::PathNotFound(_) => {
                Some("The value may no longer exist; re-capture the forest".to_string())
            }
            Self::FetchFailed { .. } => Some("navi config set source.timeout_secs 30".to_string()),
            _ => None,
        }
    }

    /// Whether this error belongs to a single lazy expansion.
    ///
    /// Such errors are isolated to the activation that caused them and must
    /// never disturb already rendered content.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Self::MalformedNode(_)
                | Self::NetworkError(_)
                | Self::FetchFailed { .. }
                | Self::HttpStatus { .. }
                | Self::PathNotFound(_)
        )
    }
}
