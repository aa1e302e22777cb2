//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::platform::PlatformError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// A backend platform operation failed.
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    // BadRequest and Internal are kept for form and account routes to come.
    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Platform(err) if err.is_not_found() => StatusCode::NOT_FOUND,
            Self::Platform(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Internal(_) => "Internal server error".to_string(),
            Self::Platform(_) if status == StatusCode::NOT_FOUND => "Not found".to_string(),
            Self::Platform(_) => "External service error".to_string(),
            Self::NotFound(_) | Self::BadRequest(_) => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::platform::{Operation, PlatformFailure};

    fn platform_error(status: u16) -> AppError {
        AppError::Platform(PlatformError::new(
            Operation::GetFileUrl,
            PlatformFailure::Api {
                status,
                message: "boom".to_string(),
            },
        ))
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("/products/123".to_string());
        assert_eq!(err.to_string(), "Not found: /products/123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(get_status(platform_error(503)), StatusCode::BAD_GATEWAY);
        assert_eq!(get_status(platform_error(404)), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_platform_error_converts() {
        fn fails() -> Result<()> {
            Err(PlatformError::new(
                Operation::DeleteFile,
                PlatformFailure::InvalidInput("root".to_string()),
            ))?;
            Ok(())
        }

        let err = fails().unwrap_err();
        assert!(err.to_string().starts_with("Platform error: delete_file failed"));
    }
}
