use reqwest::Proxy;

use crate::DownloadError;

/// Proxy configuration types
#[derive(Debug, Clone, PartialEq, Eq, Copy)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum ProxyType {
    /// HTTP proxy
    Http,
    /// HTTPS proxy
    Https,
    /// SOCKS5 proxy
    Socks5,
}

impl ProxyType {
    /// Infer the proxy type from the scheme of a proxy URL, defaulting to HTTP.
    pub fn from_url(url: &str) -> Self {
        let scheme = url
            .split_once("://")
            .map(|(scheme, _)| scheme.to_ascii_lowercase());
        match scheme.as_deref() {
            Some("socks5") | Some("socks5h") | Some("socks") => ProxyType::Socks5,
            Some("https") => ProxyType::Https,
            _ => ProxyType::Http,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProxyAuth {
    pub username: String,
    pub password: String,
}

/// Proxy configuration
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Proxy server URL (e.g., "socks5://127.0.0.1:1080")
    pub url: String,
    pub proxy_type: ProxyType,
    pub auth: Option<ProxyAuth>,
}

impl ProxyConfig {
    /// Proxy for `url` with the type taken from its scheme.
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            proxy_type: ProxyType::from_url(&url),
            url,
            auth: None,
        }
    }
}

/// Build a reqwest Proxy object from our proxy configuration
pub fn build_proxy_from_config(config: &ProxyConfig) -> Result<Proxy, DownloadError> {
    let proxy_url = &config.url;

    let mut proxy = match config.proxy_type {
        ProxyType::Http => Proxy::http(proxy_url)
            .map_err(|e| DownloadError::Proxy(format!("Invalid HTTP proxy URL: {e}")))?,
        ProxyType::Https => Proxy::https(proxy_url)
            .map_err(|e| DownloadError::Proxy(format!("Invalid HTTPS proxy URL: {e}")))?,
        ProxyType::Socks5 => {
            // reqwest only accepts socks5:// and socks5h:// schemes
            let url = if proxy_url.starts_with("socks5://") || proxy_url.starts_with("socks5h://")
            {
                proxy_url.to_string()
            } else {
                let host = proxy_url
                    .split_once("://")
                    .map_or(proxy_url.as_str(), |(_, rest)| rest);
                format!("socks5://{host}")
            };

            Proxy::all(&url)
                .map_err(|e| DownloadError::Proxy(format!("Invalid SOCKS5 proxy URL: {e}")))?
        }
    };

    if let Some(auth) = &config.auth {
        proxy = proxy.basic_auth(&auth.username, &auth.password);
    }

    Ok(proxy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_type_from_url() {
        assert_eq!(ProxyType::from_url("socks5://127.0.0.1:1080"), ProxyType::Socks5);
        assert_eq!(ProxyType::from_url("SOCKS5H://127.0.0.1:1080"), ProxyType::Socks5);
        assert_eq!(ProxyType::from_url("https://proxy:443"), ProxyType::Https);
        assert_eq!(ProxyType::from_url("http://proxy:8080"), ProxyType::Http);
        assert_eq!(ProxyType::from_url("proxy:8080"), ProxyType::Http);
    }

    #[test]
    fn test_build_proxy() {
        assert!(build_proxy_from_config(&ProxyConfig::from_url("socks5://127.0.0.1:1080")).is_ok());
        assert!(build_proxy_from_config(&ProxyConfig::from_url("http://proxy:8080")).is_ok());

        let socks = ProxyConfig {
            url: "socks://127.0.0.1:1080".to_string(),
            proxy_type: ProxyType::Socks5,
            auth: Some(ProxyAuth {
                username: "u".to_string(),
                password: "p".to_string(),
            }),
        };
        assert!(build_proxy_from_config(&socks).is_ok());
    }
}
