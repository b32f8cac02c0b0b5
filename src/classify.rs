//! Failure classification for retry decisions.

/// Classification of a failed call, independent of the underlying cause.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FailureKind {
    /// Connection refused, DNS failure, connection dropped mid-flight.
    Transport,
    /// An attempt exceeded its timeout.
    Timeout,
    /// Response status 5xx.
    HttpServer,
    /// Any other non-2xx response status (4xx in practice).
    HttpClient,
    /// A 2xx response whose body is not the expected JSON.
    Parse,
    /// The request could not be built or the configuration is unusable.
    InvalidRequest,
}

impl FailureKind {
    /// Whether another attempt could plausibly succeed.
    ///
    /// A server that answered 4xx or sent a malformed body will answer the
    /// same way again.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Transport | Self::Timeout | Self::HttpServer)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Timeout => "timeout",
            Self::HttpServer => "http_server",
            Self::HttpClient => "http_client",
            Self::Parse => "parse",
            Self::InvalidRequest => "invalid_request",
        }
    }
}

/// Classifies a response status. Returns `None` for 2xx.
pub fn classify_status(status: u16) -> Option<FailureKind> {
    match status {
        200..=299 => None,
        500..=599 => Some(FailureKind::HttpServer),
        _ => Some(FailureKind::HttpClient),
    }
}

#[cfg(test)]
mod tests {
    use super::{classify_status, FailureKind};

    #[test]
    fn success_statuses_are_not_failures() {
        assert_eq!(classify_status(200), None);
        assert_eq!(classify_status(204), None);
        assert_eq!(classify_status(299), None);
    }

    #[test]
    fn server_errors_retry() {
        for status in [500, 502, 503, 504, 599] {
            let kind = classify_status(status).expect("5xx is a failure");
            assert_eq!(kind, FailureKind::HttpServer);
            assert!(kind.is_retryable());
        }
    }

    #[test]
    fn client_errors_never_retry() {
        for status in [400, 401, 404, 422, 429] {
            let kind = classify_status(status).expect("4xx is a failure");
            assert_eq!(kind, FailureKind::HttpClient);
            assert!(!kind.is_retryable());
        }
    }

    #[test]
    fn informational_and_redirect_statuses_never_retry() {
        for status in [100, 101, 301, 302, 304, 307, 308] {
            let kind = classify_status(status).expect("non-2xx is a failure");
            assert_eq!(kind, FailureKind::HttpClient);
            assert!(!kind.is_retryable());
        }
    }

    #[test]
    fn parse_and_invalid_request_are_terminal() {
        assert!(!FailureKind::Parse.is_retryable());
        assert!(!FailureKind::InvalidRequest.is_retryable());
        assert!(FailureKind::Transport.is_retryable());
        assert!(FailureKind::Timeout.is_retryable());
    }
}
