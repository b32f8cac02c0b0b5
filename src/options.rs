use std::time::Duration;

use crate::FetchError;

pub(crate) const ENV_MAX_RETRIES: &str = "COURTSIDE_MAX_RETRIES";
pub(crate) const ENV_RETRY_DELAY_MS: &str = "COURTSIDE_RETRY_DELAY_MS";
pub(crate) const ENV_TIMEOUT_MS: &str = "COURTSIDE_TIMEOUT_MS";

/// Configures per-call timeout and retry behavior.
///
/// A configuration is a plain `Copy` value: each call owns its own copy and
/// nothing is shared between concurrent calls.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ResilienceConfig {
    /// Maximum number of retries after the initial attempt.
    ///
    /// `0` disables retrying; a call makes at most `max_retries + 1` attempts.
    pub max_retries: usize,
    /// Base retry backoff in milliseconds (exponential strategy).
    pub retry_delay_ms: u64,
    /// Per-attempt timeout in milliseconds. Resets on every attempt.
    pub timeout_ms: u64,
}

impl ResilienceConfig {
    /// Defaults used by every dashboard page: 3 retries, 1 s base delay,
    /// 30 s per attempt.
    pub const DEFAULT: Self = Self {
        max_retries: 3,
        retry_delay_ms: 1_000,
        timeout_ms: 30_000,
    };

    /// Single attempt, no retry.
    pub const NO_RETRY: Self = Self {
        max_retries: 0,
        ..Self::DEFAULT
    };

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_delay_ms(mut self, retry_delay_ms: u64) -> Self {
        self.retry_delay_ms = retry_delay_ms;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Reads overrides from the environment.
    ///
    /// Reads:
    /// - `COURTSIDE_MAX_RETRIES`
    /// - `COURTSIDE_RETRY_DELAY_MS`
    /// - `COURTSIDE_TIMEOUT_MS`
    ///
    /// Unset or empty variables keep their [`ResilienceConfig::DEFAULT`]
    /// value. A value that does not parse as a non-negative integer is an
    /// error.
    pub fn from_env() -> std::result::Result<Self, String> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> std::result::Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::DEFAULT;
        if let Some(value) = read_var(&lookup, ENV_MAX_RETRIES)? {
            config.max_retries = value;
        }
        if let Some(value) = read_var(&lookup, ENV_RETRY_DELAY_MS)? {
            config.retry_delay_ms = value;
        }
        if let Some(value) = read_var(&lookup, ENV_TIMEOUT_MS)? {
            config.timeout_ms = value;
        }
        Ok(config)
    }

    /// Rejects configurations that can never produce a successful attempt.
    pub fn validate(&self) -> crate::Result<()> {
        if self.timeout_ms == 0 {
            return Err(FetchError::InvalidRequest(
                "timeout_ms must be greater than zero".to_owned(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Delay to wait after failed attempt `attempt` (0-based) before the
    /// next one: `retry_delay_ms * 2^attempt`, saturating.
    pub fn backoff_delay(&self, attempt: usize) -> Duration {
        let multiplier = u32::try_from(attempt)
            .ok()
            .and_then(|exp| 1u64.checked_shl(exp))
            .unwrap_or(u64::MAX);
        Duration::from_millis(self.retry_delay_ms.saturating_mul(multiplier))
    }
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn read_var<F, T>(lookup: &F, name: &str) -> std::result::Result<Option<T>, String>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|_| format!("{name} must be a non-negative integer, got '{trimmed}'"))
}
