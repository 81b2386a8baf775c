use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{Client, ClientBuilder};
use url::Url;

use crate::error::Result;

const USER_AGENT: &str = concat!("bench-board/", env!("CARGO_PKG_VERSION"));

/// Wrapper around the configured HTTP client used to fetch remote tables.
#[derive(Debug, Clone)]
pub struct HttpSession {
    client: Client,
    base: Option<Url>,
}

/// Minimal data required to build an HTTP session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub base_url: Option<Url>,
    pub timeout: Duration,
}

impl SessionConfig {
    pub fn new(base_url: Option<Url>, timeout: Duration) -> Self {
        Self { base_url, timeout }
    }
}

impl HttpSession {
    pub fn new(config: &SessionConfig) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("text/csv, text/plain, */*"));
        default_headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("zh-CN,zh;q=0.9,en-US;q=0.8,en;q=0.7"),
        );

        let client = ClientBuilder::new()
            .default_headers(default_headers)
            .timeout(config.timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base: config.base_url.clone(),
        })
    }

    /// Returns reference to the inner `reqwest::Client`.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Base URL relative table locations are resolved against.
    pub fn base_url(&self) -> Option<&Url> {
        self.base.as_ref()
    }
}
