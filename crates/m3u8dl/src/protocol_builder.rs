//! # Protocol Builder
//!
//! Fluent API for creating a configured [`HlsDownloader`].

use crate::{
    DownloadError, DownloaderConfig,
    hls::{HlsConfig, HlsDownloader},
    proxy::ProxyConfig,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::{str::FromStr, time::Duration};

/// Builder for playlist downloaders
#[derive(Debug, Clone, Default)]
pub struct HlsProtocolBuilder {
    config: HlsConfig,
}

impl HlsProtocolBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_config(mut self, base_config: DownloaderConfig) -> Self {
        self.config.base = base_config;
        self
    }

    /// Set user agent for HTTP requests
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.base.user_agent = user_agent.into();
        self
    }

    /// Set overall HTTP timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.base.timeout = timeout;
        self
    }

    /// Set connection timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.base.connect_timeout = timeout;
        self
    }

    /// Set read timeout
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.config.base.read_timeout = timeout;
        self
    }

    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.config.base.follow_redirects = follow;
        self
    }

    /// Replace all HTTP headers
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.config.base.headers = headers;
        self
    }

    /// Add a single HTTP header
    pub fn add_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (HeaderName::from_str(name), HeaderValue::from_str(value)) {
            self.config.base.headers.insert(name, value);
        }
        self
    }

    /// Set proxy configuration
    pub fn proxy(mut self, proxy_config: ProxyConfig) -> Self {
        self.config.base.proxy = Some(proxy_config);
        self.config.base.use_system_proxy = false;
        self
    }

    /// Set whether to use system proxy settings
    pub fn use_system_proxy(mut self, use_system_proxy: bool) -> Self {
        self.config.base.use_system_proxy = use_system_proxy;
        self
    }

    pub fn get_config(&self) -> &HlsConfig {
        &self.config
    }

    /// Build the downloader and its HTTP client
    pub fn build(self) -> Result<HlsDownloader, DownloadError> {
        HlsDownloader::with_config(self.config)
    }
}
