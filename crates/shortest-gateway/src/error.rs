use crate::model::ErrorResponse;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use shortest_shortener::ShortenerError;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, warn};

pub type Result<T> = std::result::Result<T, AppError>;

/// Message returned for every 5xx; the cause only goes to the logs.
pub const INTERNAL_ERROR_MESSAGE: &str = "oops, something went wrong in our side";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidBody(String),
    #[error(transparent)]
    Shortener(#[from] ShortenerError),
    #[error("request deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            AppError::Shortener(ShortenerError::InvalidUrl(_)) => StatusCode::BAD_REQUEST,
            AppError::Shortener(ShortenerError::NotFound) => StatusCode::NOT_FOUND,
            AppError::Shortener(_) | AppError::DeadlineExceeded(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidBody(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status.is_server_error() {
            error!(error = %self, "request failed");
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            warn!(error = %self, status = status.as_u16(), "rejected request");
            self.to_string()
        };

        let body = ErrorResponse {
            status: status.canonical_reason().unwrap_or_default().to_string(),
            error: message,
        };

        (status, Json(body)).into_response()
    }
}
