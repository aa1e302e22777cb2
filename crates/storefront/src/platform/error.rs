//! Platform error types.
//!
//! Every wrapper failure is one category, "platform operation failed",
//! tagged with the [`Operation`] that was attempted.

use serde::Deserialize;
use thiserror::Error;

/// Platform service an operation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    Identity,
    DocumentStore,
    BlobStore,
}

/// The wrapper operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Initialize,
    SignIn,
    SignUp,
    SetDocument,
    GetDocument,
    GetDocuments,
    QueryDocuments,
    UpdateDocument,
    DeleteDocument,
    UploadFile,
    UploadString,
    GetFileUrl,
    DeleteFile,
    DownloadFile,
    ListFiles,
    ListDirectories,
}

impl Operation {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::SignIn => "sign_in",
            Self::SignUp => "sign_up",
            Self::SetDocument => "set_document",
            Self::GetDocument => "get_document",
            Self::GetDocuments => "get_documents",
            Self::QueryDocuments => "query_documents",
            Self::UpdateDocument => "update_document",
            Self::DeleteDocument => "delete_document",
            Self::UploadFile => "upload_file",
            Self::UploadString => "upload_string",
            Self::GetFileUrl => "get_file_url",
            Self::DeleteFile => "delete_file",
            Self::DownloadFile => "download_file",
            Self::ListFiles => "list_files",
            Self::ListDirectories => "list_directories",
        }
    }

    /// Service the operation talks to. `Initialize` is attributed to identity.
    #[must_use]
    pub const fn service(&self) -> Service {
        match self {
            Self::Initialize | Self::SignIn | Self::SignUp => Service::Identity,
            Self::SetDocument
            | Self::GetDocument
            | Self::GetDocuments
            | Self::QueryDocuments
            | Self::UpdateDocument
            | Self::DeleteDocument => Service::DocumentStore,
            Self::UploadFile
            | Self::UploadString
            | Self::GetFileUrl
            | Self::DeleteFile
            | Self::DownloadFile
            | Self::ListFiles
            | Self::ListDirectories => Service::BlobStore,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Underlying cause of a platform failure.
#[derive(Debug, Error)]
pub enum PlatformFailure {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The platform answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Response parsed but had an unexpected shape.
    #[error("Unexpected response: {0}")]
    Unexpected(String),

    /// Caller input could not be turned into a request.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// A failed platform operation.
#[derive(Debug, Error)]
#[error("{operation} failed: {source}")]
pub struct PlatformError {
    pub operation: Operation,
    #[source]
    pub source: PlatformFailure,
}

impl PlatformError {
    #[must_use]
    pub const fn new(operation: Operation, source: PlatformFailure) -> Self {
        Self { operation, source }
    }

    /// HTTP status returned by the platform, if it answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match &self.source {
            PlatformFailure::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Platform-provided error message (e.g. `EMAIL_NOT_FOUND`), if any.
    #[must_use]
    pub fn api_message(&self) -> Option<&str> {
        match &self.source {
            PlatformFailure::Api { message, .. } => Some(message),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.status(), Some(404))
    }
}

/// Log a failed platform call once and tag it with its operation.
pub(crate) trait LogFailure<T> {
    fn log_failure(self, operation: Operation, target: &str) -> Result<T, PlatformError>;
}

impl<T> LogFailure<T> for Result<T, PlatformFailure> {
    fn log_failure(self, operation: Operation, target: &str) -> Result<T, PlatformError> {
        self.map_err(|source| {
            tracing::error!(
                operation = %operation,
                target = %target,
                error = %source,
                "Platform operation failed"
            );
            PlatformError::new(operation, source)
        })
    }
}

/// Google-style error body: `{"error": {"code": 404, "message": "..."}}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Pass successful responses through; turn anything else into `Api`.
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, PlatformFailure> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(PlatformFailure::Api {
        status: status.as_u16(),
        message: api_message(&body),
    })
}

/// Extract the platform's message from an error body, falling back to the
/// start of the raw text.
fn api_message(body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        return envelope.error.message;
    }
    // Streaming endpoints wrap the error in a one-element array
    if let Ok(mut envelopes) = serde_json::from_str::<Vec<ErrorEnvelope>>(body)
        && !envelopes.is_empty()
    {
        return envelopes.swap_remove(0).error.message;
    }
    body.chars().take(200).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_api_message_object() {
        let body = r#"{"error":{"code":400,"message":"EMAIL_NOT_FOUND","errors":[]}}"#;
        assert_eq!(api_message(body), "EMAIL_NOT_FOUND");
    }

    #[test]
    fn test_api_message_array() {
        let body = r#"[{"error":{"code":403,"message":"Missing or insufficient permissions.","status":"PERMISSION_DENIED"}}]"#;
        assert_eq!(api_message(body), "Missing or insufficient permissions.");
    }

    #[test]
    fn test_api_message_plain_text_is_truncated() {
        let body = "x".repeat(500);
        assert_eq!(api_message(&body).len(), 200);
        assert_eq!(api_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn test_error_display_names_operation() {
        let err = PlatformError::new(
            Operation::GetDocument,
            PlatformFailure::Api {
                status: 404,
                message: "Not Found".to_string(),
            },
        );
        assert_eq!(
            err.to_string(),
            "get_document failed: API error: 404 - Not Found"
        );
        assert!(err.is_not_found());
        assert_eq!(err.api_message(), Some("Not Found"));
        assert_eq!(err.operation.service(), Service::DocumentStore);
    }

    #[test]
    fn test_log_failure_keeps_cause() {
        let result: Result<(), PlatformFailure> =
            Err(PlatformFailure::InvalidInput("bad base64".to_string()));
        let err = result
            .log_failure(Operation::UploadString, "images/a.png")
            .unwrap_err();
        assert_eq!(err.operation, Operation::UploadString);
        assert!(matches!(err.source, PlatformFailure::InvalidInput(_)));
        assert_eq!(err.status(), None);
    }
}
