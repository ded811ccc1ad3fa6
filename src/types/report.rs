//! Report metadata and the success/error envelope

use serde::{Deserialize, Serialize};

use super::{ReportError, UsageError};

/// Download links for a single-day users report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DailyReportLinks {
    #[serde(default)]
    pub download_links: Vec<String>,
    #[serde(default)]
    pub report_day: Option<String>,
}

/// Download links for the latest rolling-period users report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PeriodReportLinks {
    #[serde(default)]
    pub download_links: Vec<String>,
    #[serde(default)]
    pub report_start_day: Option<String>,
    #[serde(default)]
    pub report_end_day: Option<String>,
}

/// Uniform result shape for JSON output
///
/// `{"status":"OK","response":...}` on success. Failures carry the message
/// plus, for HTTP failures, the status code and the entity that answered.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "status")]
pub enum Envelope<T> {
    #[serde(rename = "OK")]
    Ok { response: T },
    #[serde(rename = "NOT_FOUND")]
    NotFound(ErrorDetail),
    #[serde(rename = "UNAUTHORIZED")]
    Unauthorized(ErrorDetail),
    #[serde(rename = "ERROR")]
    Error(ErrorDetail),
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

impl<T> Envelope<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    /// Error message, if this is a failure
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Ok { .. } => None,
            Self::NotFound(d) | Self::Unauthorized(d) | Self::Error(d) => Some(&d.message),
        }
    }
}

impl<T> From<ReportError> for Envelope<T> {
    fn from(err: ReportError) -> Self {
        let detail = ErrorDetail {
            message: err.to_string(),
            status_code: err.status_code(),
            entity: err.entity().map(str::to_string),
        };
        match err.status_code() {
            Some(404) => Self::NotFound(detail),
            Some(401) | Some(403) => Self::Unauthorized(detail),
            _ => Self::Error(detail),
        }
    }
}

impl<T> From<std::result::Result<T, ReportError>> for Envelope<T> {
    fn from(result: std::result::Result<T, ReportError>) -> Self {
        match result {
            Ok(response) => Self::Ok { response },
            Err(err) => err.into(),
        }
    }
}

impl<T> From<UsageError> for Envelope<T> {
    fn from(err: UsageError) -> Self {
        match err {
            UsageError::Report(e) => e.into(),
            other => Self::Error(ErrorDetail {
                message: other.to_string(),
                status_code: None,
                entity: None,
            }),
        }
    }
}
