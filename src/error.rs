use thiserror::Error;

/// Engine-level errors
///
/// Most external failures never surface through the public recommendation
/// API: providers degrade to empty candidate lists. These variants exist for
/// the seams where a caller does need to know (store access, misuse).
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Content store error: {0}")]
    Store(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
