//! Domain-level errors, shared by the resolver, replay guard, and request
//! handler, one layer below the HTTP boundary.

use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TtpError {
    #[error("{message}")]
    Validation { code: &'static str, message: String },

    #[error("party already requested this triple")]
    DoubleRequest,

    #[error("waited for triple generation, but it timed out")]
    GenerationTimeout,

    #[error("coordination store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for TtpError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => TtpError::StoreUnavailable(msg),
        }
    }
}

impl TtpError {
    pub fn missing_field(field: &str) -> Self {
        TtpError::Validation {
            code: "MISSING_FIELD",
            message: format!("missing required field: {field}"),
        }
    }

    pub fn invalid_value(message: impl Into<String>) -> Self {
        TtpError::Validation {
            code: "INVALID_VALUE",
            message: message.into(),
        }
    }

    pub fn ring_mismatch(message: impl Into<String>) -> Self {
        TtpError::Validation {
            code: "RING_MISMATCH",
            message: message.into(),
        }
    }
}
