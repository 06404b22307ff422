use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use sweep_core::SweepError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "message": self.message,
                "status": self.status.as_u16(),
            }
        }));

        (self.status, body).into_response()
    }
}

impl From<SweepError> for AppError {
    fn from(err: SweepError) -> Self {
        match err {
            SweepError::InvalidInput(msg) => Self::bad_request(msg),
            SweepError::NoActiveScan => Self::conflict(err.to_string()),
            SweepError::Conflict { .. } => {
                tracing::warn!(error = %err, "concurrent scan update rejected");
                Self::conflict("Scan state changed concurrently, retry")
            }
            other => {
                tracing::error!(error = %other, "scan operation failed");
                Self::internal("Failed to process batch")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_errors_map_to_http_statuses() {
        let cases = [
            (
                SweepError::InvalidInput("No content types selected".into()),
                StatusCode::BAD_REQUEST,
                "No content types selected",
            ),
            (
                SweepError::NoActiveScan,
                StatusCode::CONFLICT,
                "No scan is currently processing",
            ),
            (
                SweepError::Conflict {
                    key: "scan_progress".into(),
                    expected: 2,
                    found: 3,
                },
                StatusCode::CONFLICT,
                "Scan state changed concurrently, retry",
            ),
            (
                SweepError::Storage("down".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to process batch",
            ),
        ];
        for (err, status, message) in cases {
            let app = AppError::from(err);
            assert_eq!(app.status, status);
            assert_eq!(app.message, message);
        }
    }
}
