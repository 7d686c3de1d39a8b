//! Unifies HTTP-boundary failures: malformed JSON bodies (from
//! `axum-extra`'s `WithRejection`) and domain errors bubbled up from the
//! resolver and replay guard.

use crate::error::TtpError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    JsonExtractorRejection(#[from] JsonRejection),
    #[error(transparent)]
    Domain(#[from] TtpError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let (status, code, message) = match self {
            Error::JsonExtractorRejection(rejection) => (
                StatusCode::BAD_REQUEST,
                "INVALID_VALUE",
                rejection.body_text(),
            ),
            Error::Domain(TtpError::Validation { code, message }) => {
                (StatusCode::BAD_REQUEST, code, message)
            }
            Error::Domain(TtpError::DoubleRequest) => {
                let message = TtpError::DoubleRequest.to_string();
                (StatusCode::FORBIDDEN, "DOUBLE_REQUEST", message)
            }
            Error::Domain(err @ TtpError::GenerationTimeout) => {
                tracing::warn!("generation timed out, slot poisoned until TTL");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", err.to_string())
            }
            Error::Domain(TtpError::StoreUnavailable(message)) => {
                tracing::error!(%message, "coordination store unavailable");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
            }
            Error::Domain(TtpError::Internal(message)) => {
                tracing::error!(%message, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
            }
        };
        (status, Json(ErrorBody { error: code, message })).into_response()
    }
}
