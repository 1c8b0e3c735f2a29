use thiserror::Error;
use wikifix_core::{ApiFailure, ApiFailureKind};

/// Transport-level failure of one API call.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("http status {0}")]
    Status(u16),
    #[error("decode error: {0}")]
    Decode(String),
}

impl ApiError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return ApiError::Timeout;
        }
        if err.is_decode() {
            return ApiError::Decode(err.to_string());
        }
        ApiError::Network(err.to_string())
    }

    pub fn is_status(&self, code: u16) -> bool {
        matches!(self, ApiError::Status(status) if *status == code)
    }

    /// The page-facing failure this error maps to.
    pub fn failure(&self) -> ApiFailure {
        let kind = match self {
            ApiError::InvalidUrl(_) | ApiError::Network(_) => ApiFailureKind::Network,
            ApiError::Timeout => ApiFailureKind::Timeout,
            ApiError::Status(code) => ApiFailureKind::HttpStatus(*code),
            ApiError::Decode(_) => ApiFailureKind::Decode,
        };
        ApiFailure::new(kind, self.to_string())
    }
}
