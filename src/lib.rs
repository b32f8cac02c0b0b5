//! `courtside-http` is the resilient JSON fetch client behind the Courtside
//! basketball stats dashboard.
//!
//! Every page loads its data (scoreboard, rosters, player profiles,
//! predictions) through one call:
//! - [`fetch_json`] / [`FetchClient::fetch_json`]
//!
//! Each call makes up to `max_retries + 1` attempts, each under its own
//! timeout, waits `retry_delay_ms * 2^i` between attempts, and returns
//! either the decoded body or a classified [`FetchError`].

mod classify;
mod client;
mod error;
mod options;
mod request;
mod transport;

pub use classify::{classify_status, FailureKind};
pub use client::{fetch_json, FetchClient};
pub use error::FetchError;
pub use options::ResilienceConfig;
pub use request::{RequestOptions, TransportRequest};
pub use reqwest::Method;
pub use transport::{BoxError, ReqwestTransport, Transport, TransportError, TransportResponse};

pub type Result<T> = std::result::Result<T, FetchError>;
