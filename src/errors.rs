use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Rejections produced by the HTTP layer. None of these reach the
/// coordinator; a rejected request never changes gate state.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found")]
    NotFound,
}

impl AppError {
    pub fn bad_request(reason: impl Into<String>) -> Self {
        AppError::BadRequest(reason.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::BadRequest(reason) => {
                // The reason stays in the logs; clients only ever see the generic body.
                tracing::debug!(reason = %reason, "rejecting request");
                (StatusCode::BAD_REQUEST, "Bad request.")
            }
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found."),
        };

        (status, [(header::CONTENT_TYPE, "text/plain")], body).into_response()
    }
}

/// Failures delivering an outcome message to a callback address.
/// These are logged by the coordinator and never surface to a caller.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid callback address '{0}'")]
    InvalidAddress(String),

    #[error("callback request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("callback endpoint returned {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
}
