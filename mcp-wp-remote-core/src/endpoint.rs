//! Remote endpoint configuration.
//!
//! The relay talks to exactly one WebSamurai MCP endpoint for its whole
//! lifetime. [`RemoteEndpoint`] holds the normalized URL and the bearer token
//! and is immutable once built.

use std::fmt;

use reqwest::Url;

use crate::error::EndpointError;

/// Path every WebSamurai MCP endpoint is served under.
pub const ENDPOINT_PATH: &str = "/wp-json/websamurai/v1/mcp";

/// Append [`ENDPOINT_PATH`] to a site URL unless it is already there.
///
/// A single trailing `/` is dropped before appending, so both
/// `https://site.example` and `https://site.example/` normalize to
/// `https://site.example/wp-json/websamurai/v1/mcp`.
pub fn normalize_url(base_url: &str) -> String {
    if base_url.ends_with(ENDPOINT_PATH) {
        return base_url.to_string();
    }
    let trimmed = base_url.strip_suffix('/').unwrap_or(base_url);
    format!("{trimmed}{ENDPOINT_PATH}")
}

/// Fixed destination for every forward call.
#[derive(Clone)]
pub struct RemoteEndpoint {
    url: Url,
    api_key: String,
}

impl RemoteEndpoint {
    /// Normalize and validate `base_url`, pairing it with `api_key`.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError::InvalidUrl`] if the normalized URL is not a
    /// syntactically valid absolute URL.
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, EndpointError> {
        let normalized = normalize_url(base_url);
        let url = Url::parse(&normalized).map_err(|e| EndpointError::InvalidUrl {
            url: normalized.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            url,
            api_key: api_key.into(),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub(crate) fn api_key(&self) -> &str {
        &self.api_key
    }
}

// Keeps the bearer token out of logs and panic messages.
impl fmt::Debug for RemoteEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteEndpoint")
            .field("url", &self.url.as_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}
