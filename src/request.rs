use reqwest::Method;
use serde::Serialize;

use crate::{FetchError, Result};

const ACCEPT: &str = "accept";
const CONTENT_TYPE: &str = "content-type";
const APPLICATION_JSON: &str = "application/json";

/// Pass-through transport options for one call.
///
/// Defaults to a `GET` with no headers and no body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: Vec::new(),
            body: None,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post() -> Self {
        Self::default().with_method(Method::POST)
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Appends a header. Names are validated by the transport when the
    /// request is issued.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets a raw body.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serializes `body` as JSON and sets `Content-Type: application/json`
    /// unless the caller already chose a content type.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let bytes = serde_json::to_vec(body).map_err(|err| {
            FetchError::InvalidRequest(format!("request body is not serializable: {err}"))
        })?;
        if !self.has_header(CONTENT_TYPE) {
            self.headers
                .push((CONTENT_TYPE.to_owned(), APPLICATION_JSON.to_owned()));
        }
        self.body = Some(bytes);
        Ok(self)
    }

    fn has_header(&self, name: &str) -> bool {
        self.headers
            .iter()
            .any(|(existing, _)| existing.eq_ignore_ascii_case(name))
    }
}

/// Fully resolved request handed to a [`crate::Transport`] on every attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl TransportRequest {
    /// Resolves `resource` against `base_url` and applies the default
    /// `Accept: application/json` header.
    pub(crate) fn build(
        base_url: Option<&str>,
        resource: &str,
        options: RequestOptions,
    ) -> Result<Self> {
        let url = resolve_url(base_url, resource)?;
        let mut headers = options.headers;
        if !headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case(ACCEPT))
        {
            headers.push((ACCEPT.to_owned(), APPLICATION_JSON.to_owned()));
        }
        Ok(Self {
            method: options.method,
            url,
            headers,
            body: options.body,
        })
    }
}

fn is_absolute(resource: &str) -> bool {
    let lower = resource.get(..8).unwrap_or(resource).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Joins a base-relative resource onto `base_url` with exactly one `/`
/// between them. Absolute resources are returned unchanged.
pub(crate) fn resolve_url(base_url: Option<&str>, resource: &str) -> Result<String> {
    let resource = resource.trim();
    if resource.is_empty() {
        return Err(FetchError::InvalidRequest(
            "resource must not be empty".to_owned(),
        ));
    }
    if is_absolute(resource) {
        return Ok(resource.to_owned());
    }
    let base = base_url
        .map(str::trim)
        .filter(|base| !base.is_empty())
        .ok_or_else(|| {
            FetchError::InvalidRequest(format!(
                "relative resource '{resource}' requires a base URL"
            ))
        })?;
    Ok(format!(
        "{}/{}",
        base.trim_end_matches('/'),
        resource.trim_start_matches('/')
    ))
}
