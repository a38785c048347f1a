// Playlist parsing and the sequential segment download pipeline

pub mod config;
pub mod events;
pub mod fetcher;
pub mod hls_downloader;
pub mod output;
pub mod playlist;
pub mod range;

// Re-exports for easier access
pub use config::{DownloadOptions, HlsConfig};
pub use events::{DownloadCounters, DownloadEvent, OnEvent};
pub use hls_downloader::{DownloadTask, HlsDownloader};
pub use output::{OutputFile, WriteMode};
pub use playlist::{Manifest, Segment, load_manifest, parse_manifest};
pub use range::{NormalizedRange, SegmentRange};
