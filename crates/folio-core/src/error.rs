//! Error types for Folio

use thiserror::Error;

use crate::application::errors::{FieldError, ValidationErrors};

/// Result type alias using Folio's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Broad failure categories callers branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotConfigured,
    NotFound,
    ValidationFailed,
    VersionConflict,
    TransientFailure,
    DecodeFailure,
    InvalidSection,
    Unauthorized,
    Rejected,
    Internal,
}

/// Folio error types with helpful messages and suggestions
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (E001-E099)
    #[error("Content store not configured: missing {}.", .missing.join(", "))]
    NotConfigured { missing: Vec<String> },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Lookup errors (E100-E199)
    #[error("Document '{0}' not found in the content store.")]
    DocumentNotFound(String),

    #[error("Project '{0}' not found. Run `folio projects list` to see all projects.")]
    ProjectNotFound(String),

    #[error("Invalid section '{0}'. Valid sections: hero, about, skills, contact, footer.")]
    InvalidSection(String),

    // Input errors (E200-E299)
    #[error("Validation failed: {0}")]
    ValidationFailed(ValidationErrors),

    // Concurrency errors (E300-E399)
    #[error("Your data for '{document}' is out of date. Refresh and retry.")]
    VersionConflict { document: String },

    // Network errors (E400-E499)
    #[error("Network error: {0}. Check your internet connection.")]
    NetworkError(#[from] reqwest::Error),

    #[error("Content store temporarily unavailable: {0}")]
    TransientFailure(String),

    #[error("Rate limited by the content store. Retry in {0} seconds.")]
    RateLimited(u64),

    #[error("Content store rejected the request (HTTP {status}): {message}")]
    StoreRejected { status: u16, message: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    // Data errors (E500-E599)
    #[error("Stored document '{document}' could not be decoded: {reason}")]
    DecodeFailure { document: String, reason: String },

    // Generic errors
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a `NotConfigured` error from the names of the missing settings
    pub fn not_configured<I, S>(missing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::NotConfigured {
            missing: missing.into_iter().map(Into::into).collect(),
        }
    }

    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotConfigured { .. } => "E001",
            Self::ConfigError(_) => "E002",
            Self::DocumentNotFound(_) => "E100",
            Self::ProjectNotFound(_) => "E101",
            Self::InvalidSection(_) => "E102",
            Self::ValidationFailed(_) => "E200",
            Self::VersionConflict { .. } => "E300",
            Self::NetworkError(_) => "E400",
            Self::TransientFailure(_) => "E401",
            Self::RateLimited(_) => "E402",
            Self::StoreRejected { .. } => "E403",
            Self::Unauthorized(_) => "E404",
            Self::DecodeFailure { .. } => "E500",
            Self::Other(_) | Self::Io(_) => "E9999",
        }
    }

    /// Map this error onto the category callers act on
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotConfigured { .. } => ErrorKind::NotConfigured,
            Self::DocumentNotFound(_) | Self::ProjectNotFound(_) => ErrorKind::NotFound,
            Self::InvalidSection(_) => ErrorKind::InvalidSection,
            Self::ValidationFailed(_) => ErrorKind::ValidationFailed,
            Self::VersionConflict { .. } => ErrorKind::VersionConflict,
            Self::NetworkError(_) | Self::TransientFailure(_) | Self::RateLimited(_) => {
                ErrorKind::TransientFailure
            }
            Self::DecodeFailure { .. } => ErrorKind::DecodeFailure,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::StoreRejected { .. } => ErrorKind::Rejected,
            Self::ConfigError(_) | Self::Other(_) | Self::Io(_) => ErrorKind::Internal,
        }
    }

    /// Whether a caller may retry the same request unchanged
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::TransientFailure
    }

    /// Field-level problems carried by a validation failure
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::ValidationFailed(errors) => errors.as_slice(),
            _ => &[],
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::NotConfigured { missing } => Some(format!(
                "Set {} in the environment or .env file",
                missing.join(", ")
            )),
            Self::ProjectNotFound(_) => Some("folio projects list".to_string()),
            Self::VersionConflict { .. } => {
                Some("Reload the latest content and apply your change again".to_string())
            }
            Self::NetworkError(_) => Some("Check internet connection".to_string()),
            Self::RateLimited(secs) => Some(format!("Wait {} seconds and retry", secs)),
            Self::Unauthorized(_) => Some("Check GITHUB_TOKEN permissions".to_string()),
            Self::DecodeFailure { document, .. } => {
                Some(format!("Inspect '{}' in the repository for malformed JSON", document))
            }
            _ => None,
        }
    }
}
