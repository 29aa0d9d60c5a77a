use std::io;

use thiserror::Error;

/// Provides `EpiError` and maps other errors to
/// convert to an `EpiError`
#[derive(Error, Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum EpiError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("unknown time series field `{0}`")]
    UnknownField(String),
    #[error("report error: {0}")]
    ReportError(String),
    #[error(transparent)]
    IoError(#[from] io::Error),
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),
    #[error(transparent)]
    CSVError(#[from] csv::Error),
    #[error("{0}")]
    EpiError(String),
}

impl EpiError {
    pub(crate) fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        EpiError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

impl From<String> for EpiError {
    fn from(error: String) -> Self {
        EpiError::EpiError(error)
    }
}

impl From<&str> for EpiError {
    fn from(error: &str) -> Self {
        EpiError::EpiError(error.to_string())
    }
}
