use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Unexpected payload shape: {0}")]
    DataShape(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ExportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            ExportError::Transport(err.to_string())
        } else if err.is_status() {
            ExportError::Protocol(err.to_string())
        } else if err.is_decode() {
            ExportError::Protocol(format!("response body is not valid JSON: {err}"))
        } else {
            ExportError::Transport(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;
