//! Client configuration.
//!
//! The only externally visible setting is the service base URL. It is the
//! fixed remote origin unless the page is served from the service's own
//! host, in which case requests go same-origin with an empty prefix.

use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

/// Remote origin used when the page is not hosted by the service itself.
pub const DEFAULT_REMOTE_ORIGIN: &str = "http://localhost:8000";

/// Host (with port) the service serves its own pages from.
pub const DEFAULT_SERVICE_HOST: &str = "localhost:8000";

/// Analysis runs text extraction plus an LLM pass; allow it time.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Period of the loading step indicator.
pub const STEP_PERIOD: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Prefix joined with API and asset paths. Empty means same-origin.
    pub base_url: String,

    /// Origin of the hosting page, needed to issue same-origin requests
    /// from outside a browser.
    pub page_origin: Option<String>,

    pub request_timeout: Duration,

    pub step_period: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_REMOTE_ORIGIN.to_string(),
            page_origin: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            step_period: STEP_PERIOD,
        }
    }
}

impl ClientConfig {
    /// Build a config for a page served from `page_origin` (None when the
    /// client is not running inside a page at all).
    pub fn for_page(
        page_origin: Option<&str>,
        remote_origin: &str,
        service_host: &str,
    ) -> Result<Self, ConfigError> {
        let page_origin = page_origin.map(parse_origin).transpose()?;
        let page_host = page_origin.as_ref().and_then(host_with_port);
        let base_url = resolve_base_url(page_host.as_deref(), remote_origin, service_host)?;

        Ok(Self {
            base_url,
            page_origin: page_origin.map(|url| url.origin().ascii_serialization()),
            ..Self::default()
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Absolute prefix for outgoing requests.
    ///
    /// Same-origin configs fall back to the page origin. Without one the
    /// prefix stays empty and the request fails as a transport error.
    pub fn request_base(&self) -> &str {
        if self.base_url.is_empty() {
            self.page_origin.as_deref().unwrap_or("")
        } else {
            &self.base_url
        }
    }
}

/// Pick the service base URL for a page hosted at `page_host`.
pub fn resolve_base_url(
    page_host: Option<&str>,
    remote_origin: &str,
    service_host: &str,
) -> Result<String, ConfigError> {
    let same_origin = page_host.is_some_and(|host| host.eq_ignore_ascii_case(service_host));
    if same_origin {
        return Ok(String::new());
    }
    let remote = parse_origin(remote_origin)?;
    Ok(remote.origin().ascii_serialization())
}

fn parse_origin(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidOrigin {
        origin: raw.to_string(),
        source,
    })?;
    if !url.has_host() {
        return Err(ConfigError::MissingHost {
            origin: raw.to_string(),
        });
    }
    Ok(url)
}

fn host_with_port(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}
