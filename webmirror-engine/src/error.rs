use thiserror::Error;

#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("download of {url} failed after {attempts} attempts")]
    RetriesExhausted { url: String, attempts: usize },

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("failed to download seed page {0}")]
    SeedFetch(String),

    #[error("cannot decode {path}: {message}")]
    Decode { path: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, MirrorError>;
