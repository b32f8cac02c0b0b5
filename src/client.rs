use std::fmt;
use std::future::Future;

use serde::de::DeserializeOwned;
use tokio::time::{sleep, timeout};

use crate::{
    classify_status, FetchError, ReqwestTransport, RequestOptions, ResilienceConfig, Result,
    Transport, TransportRequest,
};

const ENV_API_URL: &str = "COURTSIDE_API_URL";

/// Fetches `resource` once-or-more with a fresh default client and decodes
/// the JSON body as `R`.
///
/// `resource` must be absolute here; use [`FetchClient::with_base_url`] for
/// base-relative paths.
///
/// Every call builds its own `reqwest::Client`, so nothing (TLS setup,
/// connection pool) is reused between calls. Loaders that fetch repeatedly
/// should keep one [`FetchClient`] and call [`FetchClient::fetch_json`].
pub async fn fetch_json<R: DeserializeOwned>(
    resource: &str,
    options: RequestOptions,
    resilience: ResilienceConfig,
) -> Result<R> {
    FetchClient::new()
        .fetch_json(resource, options, resilience)
        .await
}

#[derive(Clone)]
/// JSON client with per-attempt timeouts and exponential backoff.
///
/// Calls share nothing but the transport handle: each call owns its
/// configuration, timers and in-flight request.
pub struct FetchClient<T = ReqwestTransport> {
    transport: T,
    base_url: Option<String>,
    resilience: ResilienceConfig,
}

impl<T> fmt::Debug for FetchClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchClient")
            .field("base_url", &self.base_url)
            .field("resilience", &self.resilience)
            .finish_non_exhaustive()
    }
}

impl Default for FetchClient<ReqwestTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchClient<ReqwestTransport> {
    /// Creates a client over a default `reqwest` transport, without a base URL.
    pub fn new() -> Self {
        Self::with_transport(ReqwestTransport::new())
    }

    /// Creates a client from environment variables.
    ///
    /// Reads:
    /// - `COURTSIDE_API_URL` — base URL for relative resources (required)
    /// - `COURTSIDE_MAX_RETRIES`, `COURTSIDE_RETRY_DELAY_MS`,
    ///   `COURTSIDE_TIMEOUT_MS` — see [`ResilienceConfig::from_env`]
    ///
    /// # Example
    ///
    /// ```no_run
    /// use courtside_http::FetchClient;
    ///
    /// let api = FetchClient::from_env().expect("missing COURTSIDE_API_URL");
    /// ```
    pub fn from_env() -> std::result::Result<Self, String> {
        let base_url = std::env::var(ENV_API_URL)
            .map_err(|_| format!("missing {ENV_API_URL} environment variable"))?;
        if base_url.trim().is_empty() {
            return Err(format!("{ENV_API_URL} is set but empty"));
        }
        let resilience = ResilienceConfig::from_env()?;
        Ok(Self::new()
            .with_base_url(base_url)
            .with_resilience(resilience))
    }
}

impl<T: Transport> FetchClient<T> {
    /// Creates a client over any [`Transport`].
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            base_url: None,
            resilience: ResilienceConfig::DEFAULT,
        }
    }

    /// Sets the base URL that relative resources are joined onto.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the configuration used by [`FetchClient::get_json`].
    pub fn with_resilience(mut self, resilience: ResilienceConfig) -> Self {
        self.resilience = resilience;
        self
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn resilience(&self) -> ResilienceConfig {
        self.resilience
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// GETs `resource` with the client's default resilience configuration.
    pub async fn get_json<R: DeserializeOwned>(&self, resource: &str) -> Result<R> {
        self.fetch_json(resource, RequestOptions::default(), self.resilience)
            .await
    }

    /// Issues the request, retrying retryable failures, and decodes the body.
    ///
    /// Makes at most `resilience.max_retries + 1` attempts. Each attempt gets
    /// the full `timeout_ms`. After failed attempt `i` the client waits
    /// `retry_delay_ms * 2^i` before the next one. 4xx responses, malformed
    /// bodies and unbuildable requests fail on the spot.
    ///
    /// Dropping the returned future aborts the in-flight attempt and any
    /// pending backoff.
    pub async fn fetch_json<R: DeserializeOwned>(
        &self,
        resource: &str,
        options: RequestOptions,
        resilience: ResilienceConfig,
    ) -> Result<R> {
        resilience.validate()?;
        let request = TransportRequest::build(self.base_url.as_deref(), resource, options)?;

        let mut attempt = 0usize;
        loop {
            #[cfg(feature = "tracing")]
            let started = tokio::time::Instant::now();

            let failure = match self
                .attempt(&request, &resilience)
                .await
                .and_then(decode_body::<R>)
            {
                Ok(value) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        url = %request.url,
                        attempt,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "request succeeded"
                    );
                    return Ok(value);
                }
                Err(failure) => failure,
            };

            #[cfg(feature = "tracing")]
            tracing::debug!(
                url = %request.url,
                attempt,
                elapsed_ms = started.elapsed().as_millis() as u64,
                kind = failure.kind().as_str(),
                "attempt failed: {failure}"
            );

            if !failure.is_retryable() {
                #[cfg(feature = "tracing")]
                tracing::warn!(url = %request.url, attempt, "giving up on non-retryable failure");
                return Err(failure);
            }
            if attempt >= resilience.max_retries {
                #[cfg(feature = "tracing")]
                tracing::warn!(url = %request.url, attempt, "retries exhausted");
                return Err(FetchError::RetriesExhausted {
                    attempts: attempt + 1,
                    last: Box::new(failure),
                });
            }

            self.wait_before_retry(&resilience, attempt).await;
            attempt += 1;
        }
    }

    /// Like [`FetchClient::fetch_json`], but gives up as soon as `cancel`
    /// completes.
    ///
    /// Returns `None` when cancelled: the in-flight attempt is aborted, no
    /// further attempt or backoff runs, and no outcome is reported.
    pub async fn fetch_json_until<R, C>(
        &self,
        resource: &str,
        options: RequestOptions,
        resilience: ResilienceConfig,
        cancel: C,
    ) -> Option<Result<R>>
    where
        R: DeserializeOwned,
        C: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            () = cancel => {
                #[cfg(feature = "tracing")]
                tracing::debug!(resource, "request cancelled by caller");
                None
            }
            result = self.fetch_json(resource, options, resilience) => Some(result),
        }
    }

    /// Runs one attempt under its own timeout guard and returns the body of
    /// a 2xx response.
    async fn attempt(
        &self,
        request: &TransportRequest,
        resilience: &ResilienceConfig,
    ) -> Result<Vec<u8>> {
        let response = match timeout(resilience.timeout(), self.transport.send(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => return Err(FetchError::Transport(err)),
            Err(_) => {
                return Err(FetchError::Timeout {
                    timeout_ms: resilience.timeout_ms,
                });
            }
        };

        if classify_status(response.status).is_some() {
            let body = String::from_utf8_lossy(&response.body).into_owned();
            return Err(FetchError::from_status(response.status, body));
        }
        Ok(response.body)
    }

    /// Waits `retry_delay_ms * 2^attempt` before the next attempt.
    async fn wait_before_retry(&self, resilience: &ResilienceConfig, attempt: usize) {
        let delay = resilience.backoff_delay(attempt);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            attempt,
            delay_ms = delay.as_millis() as u64,
            "retrying request after backoff"
        );

        sleep(delay).await;
    }
}

fn decode_body<R: DeserializeOwned>(body: Vec<u8>) -> Result<R> {
    serde_json::from_slice(&body).map_err(|source| FetchError::Parse {
        source,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}
