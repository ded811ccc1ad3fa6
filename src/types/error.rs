use thiserror::Error;

/// Failure of a single metrics API or report download request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// Remote endpoint answered with a non-success status
    #[error("error fetching usage for {entity}: HTTP {status}{}", reason.as_deref().map(|r| format!(" {}", r)).unwrap_or_default())]
    Http {
        entity: String,
        status: u16,
        reason: Option<String>,
    },

    /// Network, URL, or decode failure
    #[error("{0}")]
    Transport(String),
}

impl ReportError {
    /// HTTP status code, when the remote answered
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport(_) => None,
        }
    }

    /// Enterprise or organization the failing request targeted
    pub fn entity(&self) -> Option<&str> {
        match self {
            Self::Http { entity, .. } => Some(entity),
            Self::Transport(_) => None,
        }
    }
}

/// copilot-usage error types
#[derive(Error, Debug)]
pub enum UsageError {
    /// Failed to parse JSON/NDJSON
    #[error("parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// Metrics API request failed
    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Result type alias for copilot-usage
pub type Result<T> = std::result::Result<T, UsageError>;
