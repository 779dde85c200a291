use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket-level failure: refused connect, abrupt close, send while closed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// HTTP-level failure. The message is shown to the caller as-is.
    #[error("{0}")]
    RequestFailed(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, Error>;
