use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Authorization error: {0}")]
    Auth(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Image error: {0}")]
    Image(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// True for 401/403-class failures from the remote API. These are
    /// surfaced to the user as a bad credential, never as a generic
    /// transport problem.
    pub fn is_auth(&self) -> bool {
        matches!(self, Error::Auth(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
