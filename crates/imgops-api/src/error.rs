//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Every failure is
//! rendered as `{code, messages}` with the status taken from
//! [`ErrorMetadata`], and logged at the level the error asks for.

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    BoxError, Json,
};
use imgops_core::{AppError, ErrorMetadata, ErrorResponse, LogLevel};
use imgops_processing::CodecError;
use imgops_storage::StorageError;
use tower::timeout::error::Elapsed;

/// Wrapper type for AppError to implement IntoResponse
/// (orphan rules: IntoResponse and AppError are both foreign to this crate)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

/// A request that is not a readable multipart form at all.
impl From<MultipartRejection> for HttpAppError {
    fn from(rejection: MultipartRejection) -> Self {
        HttpAppError(AppError::Validation(vec![rejection.body_text()]))
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        HttpAppError(storage_error_to_app(err))
    }
}

impl From<CodecError> for HttpAppError {
    fn from(err: CodecError) -> Self {
        HttpAppError(err.into())
    }
}

/// Every blob store failure is an upload failure from the client's point of view.
pub fn storage_error_to_app(err: StorageError) -> AppError {
    match err {
        StorageError::UploadFailed(msg) => AppError::Upload(msg),
        other => AppError::Upload(other.to_string()),
    }
}

/// Errors raised while streaming multipart fields.
///
/// The body limit surfaces here, so a 413 from the stream becomes
/// `PayloadTooLarge`; anything else is a malformed request.
pub fn multipart_error_to_app(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::Validation(vec![format!("Failed to read multipart: {}", err.body_text())])
    }
}

/// Error handler for the request timeout layer.
///
/// The timeout drops the handler future, so the client still gets the
/// usual `{code, messages}` body instead of an empty 408.
pub async fn handle_timeout_error(err: BoxError) -> HttpAppError {
    if err.is::<Elapsed>() {
        HttpAppError(AppError::RequestTimeout(err.to_string()))
    } else {
        HttpAppError(AppError::Internal(format!("Unhandled middleware error: {}", err)))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    let recoverable = error.is_recoverable();
    let suggested_action = error.suggested_action().unwrap_or("none");
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(
                error = %error,
                error_type = error_type,
                recoverable,
                suggested_action,
                "Error occurred"
            );
        }
        LogLevel::Error => {
            tracing::error!(
                error = %error,
                error_type = error_type,
                recoverable,
                suggested_action,
                details = %error.detailed_message(),
                "Error occurred"
            );
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let body = ErrorResponse {
            code: status.as_u16(),
            messages: app_error.client_messages(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn render_with_logs(err: AppError) -> (Response, String) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let response = tracing::subscriber::with_default(subscriber, || {
            HttpAppError(err).into_response()
        });
        (response, logs.contents())
    }

    async fn body_of(response: Response) -> ErrorResponse {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("error body is json")
    }

    #[tokio::test]
    async fn test_validation_error_lists_messages() {
        let err = HttpAppError(AppError::Validation(vec![
            "height_in_pixels is required".to_string(),
            "width_in_pixels is required".to_string(),
        ]));
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_of(response).await;
        assert_eq!(body.code, 400);
        assert_eq!(body.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_internal_errors_hide_details() {
        let err = HttpAppError(AppError::Persistence("relation does not exist".to_string()));
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_of(response).await;
        assert_eq!(body.code, 500);
        assert_eq!(body.messages, vec!["Internal server error"]);
    }

    #[test]
    fn test_error_log_carries_recovery_hint() {
        let (response, logs) =
            render_with_logs(AppError::Upload("bucket unreachable".to_string()));

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(logs.contains("recoverable=true"), "{logs}");
        assert!(logs.contains("Retry after a short delay"), "{logs}");
        assert!(logs.contains("bucket unreachable"), "{logs}");
    }

    #[test]
    fn test_timeout_log_is_a_warning() {
        let (response, logs) =
            render_with_logs(AppError::RequestTimeout("no response within 1s".to_string()));

        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        assert!(logs.contains("WARN"), "{logs}");
        assert!(logs.contains("error_type=\"RequestTimeout\""), "{logs}");
    }

    #[tokio::test]
    async fn test_elapsed_timeout_renders_408_body() {
        let response = handle_timeout_error(Box::new(Elapsed::new()))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        let body = body_of(response).await;
        assert_eq!(body.code, 408);
        assert_eq!(body.messages, vec!["Request timed out"]);
    }

    #[tokio::test]
    async fn test_other_middleware_errors_are_internal() {
        let err: BoxError = "service overloaded".into();
        let response = handle_timeout_error(err).await.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_of(response).await;
        assert_eq!(body.messages, vec!["Internal server error"]);
    }

    #[test]
    fn test_storage_errors_become_upload_errors() {
        let HttpAppError(err) = StorageError::UploadFailed("bucket unreachable".to_string()).into();
        assert!(matches!(err, AppError::Upload(msg) if msg == "bucket unreachable"));

        let HttpAppError(err) = StorageError::InvalidKey("../etc".to_string()).into();
        assert!(matches!(err, AppError::Upload(_)));
    }

    #[test]
    fn test_codec_errors_keep_their_stage() {
        let HttpAppError(err) = CodecError::Decode("truncated".to_string()).into();
        assert!(matches!(err, AppError::Decode(_)));
    }
}
