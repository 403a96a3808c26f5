use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("source file not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("video processing failed: {0}")]
    ProcessingFailed(String),

    #[error("upload URL issuance failed: {0}")]
    UrlIssuance(String),

    #[error("upload failed with status code {0}")]
    UploadFailed(u16),

    #[error("record finalize failed: {0}")]
    FinalizeFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("state serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl UploadError {
    pub fn processing_failed(message: impl Into<String>) -> Self {
        Self::ProcessingFailed(message.into())
    }

    pub fn finalize_failed(message: impl Into<String>) -> Self {
        Self::FinalizeFailed(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

/// Error alias
pub type Result<T, E = UploadError> = std::result::Result<T, E>;
