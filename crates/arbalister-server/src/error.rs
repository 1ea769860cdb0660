//! Error types for the server binary and its handlers.

use std::net::SocketAddr;

use arbalister_core::{FormatError, ipc_stream::IpcStreamError};
use arbalister_datafusion::ReadError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use snafu::Snafu;

use crate::config::ConfigError;
use crate::paths::PathError;

/// Fatal errors of the server process.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ServerError {
    /// The command line did not produce a usable configuration.
    #[snafu(display("Invalid configuration: {source}"))]
    Config {
        /// Underlying configuration error.
        source: ConfigError,
    },

    /// The listener could not be bound.
    #[snafu(display("Failed to bind {addr}: {source}"))]
    Bind {
        /// Requested address.
        addr: SocketAddr,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The server loop stopped with an error.
    #[snafu(display("Server error: {source}"))]
    Serve {
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Error answered to an HTTP client as `{"message": ..., "reason": ...}`.
///
/// The body never carries server-side paths; the full error text is kept in
/// `detail` and only logged.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    reason: Option<String>,
    detail: Option<String>,
}

impl AppError {
    /// `403 Forbidden`.
    pub fn forbidden(reason: &str) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: "Forbidden".to_string(),
            reason: Some(reason.to_string()),
            detail: None,
        }
    }

    /// `500 Internal Server Error` with a client-safe `message`; `detail` is
    /// logged only.
    pub fn internal(message: impl Into<String>, detail: impl ToString) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
            reason: None,
            detail: Some(detail.to_string()),
        }
    }

    /// Report `path`, as requested by the client, as the reason unless one is
    /// already set.
    pub fn for_path(mut self, path: &str) -> Self {
        self.reason.get_or_insert_with(|| path.to_string());
        self
    }

    /// Status code of the response.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Client-facing message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(
                status = %self.status,
                reason = self.reason.as_deref().unwrap_or_default(),
                detail = self.detail.as_deref().unwrap_or_default(),
                "{}",
                self.message
            );
        }
        let body = serde_json::json!({
            "message": self.message,
            "reason": self.reason,
        });
        (self.status, Json(body)).into_response()
    }
}

impl From<PathError> for AppError {
    fn from(err: PathError) -> Self {
        match err {
            PathError::OutsideRoot { .. } => AppError::forbidden("path is outside the server root"),
            PathError::Canonicalize { .. } => AppError::internal("Failed to resolve path", err),
        }
    }
}

impl From<FormatError> for AppError {
    fn from(err: FormatError) -> Self {
        match err {
            FormatError::MissingExtension { .. } => AppError::internal(
                "Cannot infer a file format: the file has no extension",
                err,
            ),
            // The remaining variants only name the format or the extension.
            FormatError::UnknownFormat { .. }
            | FormatError::FormatDisabled { .. }
            | FormatError::Unsupported { .. } => AppError::internal(err.to_string(), err),
        }
    }
}

impl From<ReadError> for AppError {
    fn from(err: ReadError) -> Self {
        let message = match &err {
            ReadError::Format { source } => return source.clone().into(),
            ReadError::FileNotFound { .. } => "File not found".to_string(),
            ReadError::NotAFile { .. } => "Not a regular file".to_string(),
            ReadError::Query { format, .. } => format!("Failed to read {format} file"),
            ReadError::Assemble { .. } | ReadError::Orc { .. } | ReadError::Task { .. } => {
                "Failed to read file".to_string()
            }
        };
        AppError::internal(message, err)
    }
}

impl From<IpcStreamError> for AppError {
    fn from(err: IpcStreamError) -> Self {
        AppError::internal("Failed to encode Arrow IPC stream", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbalister_core::FileFormat;

    #[test]
    fn missing_file_message_hides_the_server_path() {
        let err = ReadError::FileNotFound {
            path: "/srv/private/data/absent.csv".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        let app = AppError::from(err).for_path("absent.csv");

        assert_eq!(app.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(app.message(), "File not found");
        assert_eq!(app.reason.as_deref(), Some("absent.csv"));
        assert!(app.detail.as_deref().is_some_and(|d| d.contains("/srv/private")));
    }

    #[test]
    fn missing_extension_message_hides_the_server_path() {
        let err = FileFormat::from_path(std::path::Path::new("/srv/private/README")).unwrap_err();
        let app = AppError::from(err);
        assert!(!app.message().contains("/srv"));
    }

    #[test]
    fn format_errors_keep_their_text() {
        let err = FileFormat::from_token("xlsx").unwrap_err();
        assert_eq!(AppError::from(err).message(), "Unknown file format 'xlsx'");
    }

    #[test]
    fn forbidden_keeps_its_reason() {
        let app = AppError::forbidden("missing token").for_path("a.csv");
        assert_eq!(app.status(), StatusCode::FORBIDDEN);
        assert_eq!(app.reason.as_deref(), Some("missing token"));
    }
}
