//! Analysis client error types.

use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid analysis configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Service returned {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Unexpected response shape: {0}")]
    UnexpectedShape(String),
}

impl ServiceError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn unexpected_shape(msg: impl Into<String>) -> Self {
        Self::UnexpectedShape(msg.into())
    }

    /// The request went through but the body did not look like an analysis result.
    pub fn is_unexpected_shape(&self) -> bool {
        matches!(self, ServiceError::UnexpectedShape(_))
    }

    pub fn http_status(&self) -> Option<u16> {
        match self {
            ServiceError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Config(_) => "config",
            ServiceError::Network(_) => "network",
            ServiceError::Timeout(_) => "timeout",
            ServiceError::HttpStatus { .. } => "http_status",
            ServiceError::UnexpectedShape(_) => "unexpected_shape",
        }
    }
}
