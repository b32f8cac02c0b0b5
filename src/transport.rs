use std::{fmt, future::Future};

use crate::TransportRequest;

/// Boxed cause carried by [`TransportError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Fully read response of one attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Failure reported by a [`Transport`] before a complete response arrived.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection refused, DNS failure, TLS handshake failure.
    #[error("connection failed: {0}")]
    Connect(#[source] BoxError),
    /// The transport's own timeout fired.
    #[error("transport timeout: {0}")]
    Timeout(#[source] BoxError),
    /// The request could not be built (bad header, bad URL).
    #[error("request could not be built: {0}")]
    InvalidRequest(#[source] BoxError),
    /// Any other failure while sending or reading the body.
    #[error("network error: {0}")]
    Network(#[source] BoxError),
}

/// Capability the client uses to issue requests.
///
/// One call to [`Transport::send`] is one attempt. The returned future must
/// read the response body completely before resolving, and dropping it must
/// abort the in-flight request: the client relies on drop for both its
/// timeout guard and caller cancellation.
pub trait Transport: Send + Sync {
    fn send<'a>(
        &'a self,
        request: &'a TransportRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send + 'a;
}

/// Production transport backed by `reqwest`.
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestTransport").finish_non_exhaustive()
    }
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a preconfigured `reqwest::Client` (proxies, TLS roots, ...).
    ///
    /// Timeouts configured on the client still apply and surface as
    /// [`TransportError::Timeout`].
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl Transport for ReqwestTransport {
    fn send<'a>(
        &'a self,
        request: &'a TransportRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send + 'a {
        async move {
            let mut builder = self.http.request(request.method.clone(), &request.url);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(body) = &request.body {
                builder = builder.body(body.clone());
            }

            let response = builder.send().await.map_err(classify_reqwest_error)?;
            let status = response.status().as_u16();
            let body = response.bytes().await.map_err(classify_reqwest_error)?;
            Ok(TransportResponse {
                status,
                body: body.to_vec(),
            })
        }
    }
}

fn classify_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_builder() {
        TransportError::InvalidRequest(Box::new(err))
    } else if err.is_timeout() {
        TransportError::Timeout(Box::new(err))
    } else if err.is_connect() {
        TransportError::Connect(Box::new(err))
    } else {
        TransportError::Network(Box::new(err))
    }
}
