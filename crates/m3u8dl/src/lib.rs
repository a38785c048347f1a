//! # m3u8dl
//!
//! Downloads the segments of an m3u8 playlist one after another and
//! concatenates them into a single output file.
//!
//! ## Features
//!
//! - Lenient playlist parsing with segment URL resolution
//! - Segment range selection by index or by fraction of the playlist
//! - Strictly sequential downloads streamed straight to disk
//! - Typed progress events through a callback or a stream
//! - HTTP, HTTPS and SOCKS5 proxies

pub mod builder;
pub mod config;
pub mod error;
pub mod hls;
pub mod protocol_builder;
pub mod proxy;
pub mod transport;

#[cfg(test)]
mod test_utils;

pub use builder::DownloaderConfigBuilder;
pub use config::DownloaderConfig;
pub use error::DownloadError;

// Re-export pipeline types
pub use hls::{
    DownloadCounters, DownloadEvent, DownloadOptions, DownloadTask, HlsConfig, HlsDownloader,
    Manifest, NormalizedRange, OnEvent, Segment, SegmentRange, WriteMode,
};
pub use protocol_builder::HlsProtocolBuilder;

// Re-export transport and proxy utilities
pub use proxy::{ProxyAuth, ProxyConfig, ProxyType};
pub use transport::{HttpTransport, SegmentBody, Transport, create_client};
