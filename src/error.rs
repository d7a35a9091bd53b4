use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("invalid repository '{0}': expected format 'owner/repo'")]
    InvalidRepository(String),
    #[error("API rate limit exceeded or access forbidden")]
    RateLimited,
    #[error("GitHub responded with {status}")]
    Http { status: u16 },
    #[error("request failed: {0}")]
    Transport(String),
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("failed to fetch repository information for {0}")]
    RepositoryUnavailable(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
