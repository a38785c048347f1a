use std::path::PathBuf;

use super::output::WriteMode;
use super::range::SegmentRange;
use crate::DownloaderConfig;

// --- Top-Level Configuration ---
#[derive(Debug, Clone, Default)]
pub struct HlsConfig {
    /// Base transport configuration
    pub base: DownloaderConfig,
}

/// Per-run options for the download pipeline.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Segments to download
    pub range: SegmentRange,
    /// Directory the output file is placed in
    pub dest: PathBuf,
    /// Output file name; the playlist's derived name when `None`
    pub filename: Option<String>,
    pub mode: WriteMode,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            range: SegmentRange::all(),
            dest: PathBuf::from("."),
            filename: None,
            mode: WriteMode::Truncate,
        }
    }
}

impl DownloadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn range(mut self, range: SegmentRange) -> Self {
        self.range = range;
        self
    }

    pub fn dest(mut self, dest: impl Into<PathBuf>) -> Self {
        self.dest = dest.into();
        self
    }

    /// Explicit output file name. Empty names fall back to the derived one.
    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        let filename = filename.into();
        self.filename = (!filename.is_empty()).then_some(filename);
        self
    }

    pub fn append(mut self, append: bool) -> Self {
        self.mode = WriteMode::from_append(append);
        self
    }

    /// Output path for a playlist whose derived name is `default_name`.
    pub fn output_path(&self, default_name: &str) -> PathBuf {
        let filename = self.filename.as_deref().unwrap_or(default_name);
        self.dest.join(filename)
    }
}
