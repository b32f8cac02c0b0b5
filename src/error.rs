use crate::{FailureKind, TransportError};

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Failure reported by the transport, with its cause.
    #[error("transport error: {0}")]
    Transport(#[source] TransportError),
    /// An attempt did not complete within its timeout.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },
    /// Response status 5xx with raw response body.
    #[error("http error {status}: {body}")]
    HttpServer { status: u16, body: String },
    /// Non-success, non-5xx response status with raw response body.
    #[error("http error {status}: {body}")]
    HttpClient { status: u16, body: String },
    /// Response body of a 2xx response could not be decoded.
    #[error("invalid JSON response: {source}; body: {body}")]
    Parse {
        #[source]
        source: serde_json::Error,
        body: String,
    },
    /// The request could not be built, or the configuration is unusable.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Every permitted attempt failed with a retryable error.
    #[error("giving up after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Total attempts made, including the first.
        attempts: usize,
        /// Failure of the final attempt.
        #[source]
        last: Box<FetchError>,
    },
}

impl FetchError {
    /// Classification of the failure. For [`FetchError::RetriesExhausted`]
    /// this is the classification of the last attempt.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Transport(TransportError::Timeout(_)) => FailureKind::Timeout,
            Self::Transport(TransportError::InvalidRequest(_)) => FailureKind::InvalidRequest,
            Self::Transport(_) => FailureKind::Transport,
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::HttpServer { .. } => FailureKind::HttpServer,
            Self::HttpClient { .. } => FailureKind::HttpClient,
            Self::Parse { .. } => FailureKind::Parse,
            Self::InvalidRequest(_) => FailureKind::InvalidRequest,
            Self::RetriesExhausted { last, .. } => last.kind(),
        }
    }

    /// Whether the client may retry after this failure.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RetriesExhausted { .. } => false,
            other => other.kind().is_retryable(),
        }
    }

    pub fn is_retries_exhausted(&self) -> bool {
        matches!(self, Self::RetriesExhausted { .. })
    }

    /// Number of attempts made, when the call got as far as exhausting them.
    pub fn attempts(&self) -> Option<usize> {
        match self {
            Self::RetriesExhausted { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }

    /// HTTP status of the (last) response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpServer { status, .. } | Self::HttpClient { status, .. } => Some(*status),
            Self::RetriesExhausted { last, .. } => last.status(),
            _ => None,
        }
    }

    /// The underlying failure, looking through [`FetchError::RetriesExhausted`].
    pub fn last_cause(&self) -> &FetchError {
        match self {
            Self::RetriesExhausted { last, .. } => last.last_cause(),
            other => other,
        }
    }

    pub(crate) fn from_status(status: u16, body: String) -> Self {
        if matches!(crate::classify_status(status), Some(FailureKind::HttpServer)) {
            Self::HttpServer { status, body }
        } else {
            Self::HttpClient { status, body }
        }
    }
}
