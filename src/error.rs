use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response from {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("Playback error: {0}")]
    Playback(String),

    #[error("Camera '{id}' not found")]
    CameraNotFound { id: String },
}

pub type Result<T> = std::result::Result<T, ViewerError>;
