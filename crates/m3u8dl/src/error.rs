use reqwest::StatusCode;
use std::path::PathBuf;

// Custom error type for playlist and segment download operations
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("HTTP error for {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} failed with HTTP {status}")]
    HttpStatus { status: StatusCode, url: String },

    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("invalid URL `{input}`: {reason}")]
    InvalidUrl { input: String, reason: String },

    #[error("playlist parse error: {reason}")]
    Parse { reason: String },

    #[error("output file {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid proxy configuration: {0}")]
    Proxy(String),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl DownloadError {
    pub fn http(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Http {
            url: url.into(),
            source,
        }
    }

    pub fn http_status(status: StatusCode, url: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            url: url.into(),
        }
    }

    pub fn fetch(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_url(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub fn parse(reason: impl Into<String>) -> Self {
        Self::Parse {
            reason: reason.into(),
        }
    }

    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }

    /// Retrieval failed at the transport layer.
    pub fn is_fetch(&self) -> bool {
        matches!(
            self,
            Self::Http { .. } | Self::HttpStatus { .. } | Self::Fetch { .. }
        )
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Self::File { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(DownloadError::fetch("http://h/a.ts", "reset").is_fetch());
        assert!(DownloadError::http_status(StatusCode::NOT_FOUND, "http://h/a.ts").is_fetch());
        assert!(DownloadError::parse("no segments").is_parse());

        let err = DownloadError::file(
            "/nope/out.ts",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.is_file());
        assert!(!err.is_fetch());
        assert!(!err.is_parse());
    }

    #[test]
    fn test_display_messages() {
        let err = DownloadError::http_status(StatusCode::BAD_GATEWAY, "http://h/x/list.m3u8");
        assert_eq!(
            err.to_string(),
            "request to http://h/x/list.m3u8 failed with HTTP 502 Bad Gateway"
        );

        let err = DownloadError::file(
            "out/video.ts",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert_eq!(err.to_string(), "output file out/video.ts: missing");
    }
}
