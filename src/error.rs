use reqwest::StatusCode;
use thiserror::Error as ThisError;

/// Whether an operation that produced this error is worth retrying.
pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}

#[derive(Debug, ThisError)]
pub enum GlsyncError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("authentication rejected by remote (status {0})")]
    Auth(StatusCode),

    #[error("remote rate limit exceeded")]
    RateLimited,

    #[error("upstream error with status: {0}")]
    UpstreamStatus(StatusCode),

    #[error("malformed response body: {0}")]
    MalformedResponse(String),

    #[error("project {0} not found")]
    NotFound(i64),

    #[error("project {0} already exists")]
    DuplicateKey(i64),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl GlsyncError {
    /// Process exit code for a command that failed with this error.
    ///
    /// `2` is reserved for usage errors (clap uses the same convention);
    /// everything else maps to `1`.
    pub fn exit_code(&self) -> u8 {
        match self {
            GlsyncError::Validation(_) => 2,
            _ => 1,
        }
    }
}

impl IsRetryable for GlsyncError {
    fn is_retryable(&self) -> bool {
        match self {
            GlsyncError::Network(_) | GlsyncError::RateLimited => true,
            GlsyncError::UpstreamStatus(status) => status.is_server_error(),
            _ => false,
        }
    }
}
