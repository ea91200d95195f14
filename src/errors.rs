use thiserror::Error;

/// Request-level failures surfaced to the transport as typed errors.
#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("text too short: {chars} characters, need at least {min}")]
    TooShort { chars: usize, min: usize },
    #[error("unknown strategy '{name}', valid strategies: {}", valid.join(", "))]
    UnknownStrategy { name: String, valid: Vec<String> },
    #[error("sentence count must be at least 1, got {0}")]
    InvalidSentenceCount(u64),
}

impl SummarizeError {
    pub fn kind(&self) -> &'static str {
        match self {
            SummarizeError::TooShort { .. } => "too_short",
            SummarizeError::UnknownStrategy { .. } => "unknown_strategy",
            SummarizeError::InvalidSentenceCount(_) => "invalid_sentence_count",
        }
    }
}

#[derive(Debug, Error)]
pub enum GenerativeError {
    #[error("no credential configured for the generative service")]
    CredentialMissing,
    #[error("upstream error: {0}")]
    Upstream(String),
    #[error("upstream request timed out")]
    Timeout,
    #[error("upstream returned no usable content")]
    EmptyResponse,
}

impl From<reqwest::Error> for GenerativeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GenerativeError::Timeout
        } else {
            GenerativeError::Upstream(e.to_string())
        }
    }
}

/// Failures of a single service call, reported as JSON-RPC errors.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Summarize(#[from] SummarizeError),
    #[error("invalid params: {0}")]
    InvalidParams(String),
    #[error("method not found: {0}")]
    MethodNotFound(String),
}

impl ServiceError {
    pub fn code(&self) -> i64 {
        match self {
            ServiceError::Summarize(_) | ServiceError::InvalidParams(_) => -32602,
            ServiceError::MethodNotFound(_) => -32601,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Summarize(e) => e.kind(),
            ServiceError::InvalidParams(_) => "invalid_params",
            ServiceError::MethodNotFound(_) => "method_not_found",
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(e: serde_json::Error) -> Self {
        ServiceError::InvalidParams(e.to_string())
    }
}

/// Reading one stdio frame. `Malformed` frames are skipped; `Io` ends the loop.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("malformed frame: {0}")]
    Malformed(String),
}
