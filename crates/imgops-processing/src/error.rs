use imgops_core::AppError;
use thiserror::Error;

/// Failures of the codec and transform stages
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Decode failed: {0}")]
    Decode(String),

    #[error("Encode failed: {0}")]
    Encode(String),

    #[error("Transform failed: {0}")]
    Transform(String),
}

pub type CodecResult<T> = Result<T, CodecError>;

impl From<CodecError> for AppError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Decode(msg) => AppError::Decode(msg),
            CodecError::Encode(msg) => AppError::Encode(msg),
            CodecError::Transform(msg) => AppError::Transform(msg),
        }
    }
}
