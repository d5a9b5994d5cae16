//! Error types module
//!
//! Every failure of the transform workflow is expressed as an `AppError`
//! variant. The variant alone decides the HTTP status, the machine-readable
//! code and what the client is allowed to see, through the `ErrorMetadata`
//! trait.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for client errors worth noticing
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "UPLOAD_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether repeating the same request may succeed
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing messages (may differ from the internal error message)
    fn client_messages(&self) -> Vec<String>;

    /// Whether details should be hidden from the client
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Transform error: {0}")]
    Transform(String),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Request timed out: {0}")]
    RequestTimeout(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(validation_messages(&err))
    }
}

/// Flatten field errors into `"<field> <message>"` strings, sorted by field
/// so responses are stable.
pub fn validation_messages(errors: &validator::ValidationErrors) -> Vec<String> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => format!("{} {}", field, message),
                None => format!("{} is invalid", field),
            })
        })
        .collect()
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Validation(_) => (
            400,
            "VALIDATION_ERROR",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::UnsupportedFormat(_) => (
            400,
            "UNSUPPORTED_FORMAT",
            false,
            Some("Upload a PNG or JPEG image"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size"),
            false,
            LogLevel::Debug,
        ),
        AppError::RequestTimeout(_) => (
            408,
            "REQUEST_TIMEOUT",
            true,
            Some("Retry with a smaller image"),
            false,
            LogLevel::Warn,
        ),
        AppError::Decode(_) => (
            500,
            "DECODE_ERROR",
            false,
            Some("Check the image is not corrupted"),
            true,
            LogLevel::Warn,
        ),
        AppError::Encode(_) => (
            500,
            "ENCODE_ERROR",
            false,
            None,
            true,
            LogLevel::Error,
        ),
        AppError::Transform(_) => (
            500,
            "TRANSFORM_ERROR",
            false,
            None,
            true,
            LogLevel::Error,
        ),
        AppError::Upload(_) => (
            500,
            "UPLOAD_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Persistence(_) => (
            500,
            "PERSISTENCE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for logs
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Validation(_) => "Validation",
            AppError::UnsupportedFormat(_) => "UnsupportedFormat",
            AppError::Decode(_) => "Decode",
            AppError::Encode(_) => "Encode",
            AppError::Transform(_) => "Transform",
            AppError::Upload(_) => "Upload",
            AppError::Persistence(_) => "Persistence",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::RequestTimeout(_) => "RequestTimeout",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_messages(&self) -> Vec<String> {
        match self {
            AppError::Validation(messages) => messages.clone(),
            AppError::UnsupportedFormat(msg) => vec![msg.clone()],
            AppError::PayloadTooLarge(msg) => vec![msg.clone()],
            AppError::RequestTimeout(_) => vec!["Request timed out".to_string()],
            AppError::Decode(_)
            | AppError::Encode(_)
            | AppError::Transform(_)
            | AppError::Upload(_)
            | AppError::Persistence(_)
            | AppError::Internal(_)
            | AppError::InternalWithSource { .. } => vec!["Internal server error".to_string()],
        }
    }
}
