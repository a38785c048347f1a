use async_trait::async_trait;
use bytes::Bytes;
use futures::{StreamExt, TryStreamExt, stream::BoxStream};
use reqwest::Client;
use rustls::{ClientConfig, crypto::aws_lc_rs};
use rustls_platform_verifier::BuilderVerifierExt;
use std::sync::Arc;
use tracing::{debug, info, trace};

use crate::{DownloadError, DownloaderConfig, proxy::build_proxy_from_config};

/// Create a reqwest Client with the provided configuration
pub fn create_client(config: &DownloaderConfig) -> Result<Client, DownloadError> {
    let proxy = config
        .proxy
        .as_ref()
        .map(build_proxy_from_config)
        .transpose()?;

    let provider = Arc::new(aws_lc_rs::default_provider());

    let tls_config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| DownloadError::Client(format!("TLS protocol versions: {e}")))?
        .with_platform_verifier()
        .map_err(|e| DownloadError::Client(format!("platform verifier: {e}")))?
        .with_no_client_auth();

    let mut client_builder = Client::builder()
        .user_agent(&config.user_agent)
        .default_headers(config.headers.clone())
        .use_preconfigured_tls(tls_config)
        .redirect(if config.follow_redirects {
            reqwest::redirect::Policy::limited(10)
        } else {
            reqwest::redirect::Policy::none()
        });

    if !config.timeout.is_zero() {
        client_builder = client_builder.timeout(config.timeout);
    }

    if !config.connect_timeout.is_zero() {
        client_builder = client_builder.connect_timeout(config.connect_timeout);
    }

    if !config.read_timeout.is_zero() {
        client_builder = client_builder.read_timeout(config.read_timeout);
    }

    if let (Some(proxy), Some(proxy_config)) = (proxy, &config.proxy) {
        client_builder = client_builder.proxy(proxy);
        info!(proxy_url = %proxy_config.url, "Using explicitly configured proxy for downloads");
    } else if config.use_system_proxy {
        // reqwest picks up system/environment proxies unless no_proxy() is called
        info!("Using system proxy settings for downloads");
    } else {
        client_builder = client_builder.no_proxy();
        debug!("Proxy disabled for downloads");
    }

    client_builder
        .build()
        .map_err(|e| DownloadError::Client(e.to_string()))
}

/// A segment response body: the declared length (if any) and its byte chunks.
pub struct SegmentBody {
    pub content_length: Option<u64>,
    pub stream: BoxStream<'static, Result<Bytes, DownloadError>>,
}

impl std::fmt::Debug for SegmentBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentBody")
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Network capability used by the playlist loader and the drain loop.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `url` and return the body as text.
    async fn fetch_text(&self, url: &str) -> Result<String, DownloadError>;

    /// GET `url` and return the body as a chunk stream.
    async fn fetch_stream(&self, url: &str) -> Result<SegmentBody, DownloadError>;
}

/// [`Transport`] backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &DownloaderConfig) -> Result<Self, DownloadError> {
        Ok(Self {
            client: create_client(config)?,
        })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, DownloadError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::http(url, e))?;

        let status = response.status();
        trace!(url, %status, version = ?response.version(), "Received response");
        if !status.is_success() {
            return Err(DownloadError::http_status(status, url));
        }
        Ok(response)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch_text(&self, url: &str) -> Result<String, DownloadError> {
        let response = self.get(url).await?;
        response.text().await.map_err(|e| DownloadError::http(url, e))
    }

    async fn fetch_stream(&self, url: &str) -> Result<SegmentBody, DownloadError> {
        let response = self.get(url).await?;
        let content_length = response.content_length();
        let owned_url = url.to_string();
        let stream = response
            .bytes_stream()
            .map_err(move |e| DownloadError::fetch(owned_url.clone(), e.to_string()))
            .boxed();

        Ok(SegmentBody {
            content_length,
            stream,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::ProxyConfig;

    #[test]
    fn test_create_client_rejects_bad_proxy() {
        let config = DownloaderConfig::builder()
            .with_proxy(ProxyConfig::from_url("http://[::1"))
            .build();
        let err = create_client(&config).unwrap_err();
        assert!(matches!(err, DownloadError::Proxy(_)));
    }
}
