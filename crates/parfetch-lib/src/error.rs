use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParfetchError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid command-line arguments: {details}")]
    CliArgumentValidation { details: String },

    #[error("Server did not report a content length for {url}")]
    MissingContentLength { url: String },

    #[error("Chunk at offset {offset} failed with status {status}")]
    UnexpectedStatus {
        offset: u64,
        status: reqwest::StatusCode,
    },

    #[error("Worker pool closed unexpectedly: {0}")]
    WorkerPool(#[from] tokio::sync::AcquireError),

    #[error("Chunk task failed: {0}")]
    ChunkTask(#[from] tokio::task::JoinError),

    #[error("Integrity verification failed: {0}")]
    Verification(#[from] crate::verification::VerificationError),

    #[error("Unexpected error: {0}")]
    Unexpected(#[from] eyre::Report),
}
