use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use super::playlist::Segment;
use super::range::NormalizedRange;

/// Final per-run outcome counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DownloadCounters {
    pub success: u64,
    pub failure: u64,
}

impl DownloadCounters {
    pub fn total(&self) -> u64 {
        self.success + self.failure
    }
}

/// Observations emitted while a playlist is downloaded, in emission order.
#[derive(Debug, Clone)]
pub enum DownloadEvent {
    /// The playlist was fetched and parsed.
    ManifestReady {
        url: String,
        name: String,
        segments: usize,
    },
    RangeNormalized {
        range: NormalizedRange,
    },
    FileOpened {
        path: PathBuf,
    },
    JobStarted {
        segments: usize,
    },
    SegmentPending {
        index: usize,
    },
    SegmentProgress {
        index: usize,
        received: u64,
        total: Option<u64>,
    },
    SegmentSucceeded {
        index: usize,
        bytes: u64,
        total: Option<u64>,
    },
    /// Descriptor of a segment that failed, for debugging.
    SegmentDiagnostic {
        segment: Segment,
    },
    SegmentFailed {
        index: usize,
        error: String,
    },
    FileClosed {
        path: PathBuf,
    },
    JobDone {
        counters: DownloadCounters,
    },
    /// The job stopped before or instead of draining the queue.
    Fatal {
        error: String,
    },
}

/// Callback receiving every [`DownloadEvent`].
pub type OnEvent = Arc<dyn Fn(DownloadEvent) + Send + Sync>;
