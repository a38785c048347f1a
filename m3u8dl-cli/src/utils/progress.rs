use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use m3u8dl_engine::DownloadEvent;
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use tracing::info;

use super::{format_bytes, format_mb};

fn segment_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} {msg}\n[{elapsed_precise}] [{bar:40.green/white}] {bytes}/{total_bytes} @ {bytes_per_sec}")
        .unwrap()
        .progress_chars("=> ")
}

fn job_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} segments")
        .unwrap()
        .progress_chars("#>-")
}

#[derive(Default)]
struct Bars {
    job: Option<ProgressBar>,
    segment: Option<ProgressBar>,
    bytes: u64,
}

/// Renders download events as progress bars, or as progress log lines when disabled.
#[derive(Clone)]
pub struct ProgressManager {
    multi: MultiProgress,
    bars: Arc<Mutex<Bars>>,
    disabled: bool,
}

impl ProgressManager {
    pub fn new(multi: MultiProgress) -> Self {
        Self {
            multi,
            bars: Arc::new(Mutex::new(Bars::default())),
            disabled: false,
        }
    }

    pub fn new_disabled(multi: MultiProgress) -> Self {
        Self {
            disabled: true,
            ..Self::new(multi)
        }
    }

    pub fn handle_event(&self, event: DownloadEvent) {
        let mut bars = self.bars.lock().unwrap();
        match event {
            DownloadEvent::JobStarted { segments } if !self.disabled => {
                let bar = self.multi.add(ProgressBar::new(segments as u64));
                bar.set_style(job_style());
                bar.set_message("Downloading");
                bars.job = Some(bar);
            }
            DownloadEvent::SegmentPending { index } if !self.disabled => {
                let bar = self.multi.add(ProgressBar::new(0));
                bar.set_style(segment_style());
                bar.set_message(format!("Segment-{index}"));
                bar.enable_steady_tick(Duration::from_millis(500));
                bars.segment = Some(bar);
            }
            DownloadEvent::SegmentProgress {
                index,
                received,
                total,
            } => {
                if self.disabled {
                    let total = total.map_or_else(|| "?".to_string(), format_mb);
                    info!("Segment-{index}: {} / {total} MB.", format_mb(received));
                } else if let Some(bar) = &bars.segment {
                    if let Some(total) = total {
                        bar.set_length(total);
                    }
                    bar.set_position(received);
                }
            }
            DownloadEvent::SegmentSucceeded { bytes, .. } => {
                bars.bytes += bytes;
                if let Some(bar) = bars.segment.take() {
                    bar.finish_and_clear();
                }
                if let Some(job) = &bars.job {
                    job.inc(1);
                }
            }
            DownloadEvent::SegmentFailed { index, error } => {
                if let Some(bar) = bars.segment.take() {
                    bar.abandon_with_message(format!("Segment-{index}: {error}"));
                }
                if let Some(job) = &bars.job {
                    job.inc(1);
                }
            }
            DownloadEvent::JobDone { counters } => {
                if let Some(job) = bars.job.take() {
                    job.finish_with_message(format!(
                        "{} succeeded, {} failed",
                        counters.success, counters.failure
                    ));
                }
                info!("Downloaded {}", format_bytes(bars.bytes));
            }
            _ => {}
        }
    }

    #[inline]
    #[allow(unused)]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indicatif::ProgressDrawTarget;
    use m3u8dl_engine::DownloadCounters;

    fn hidden() -> MultiProgress {
        MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
    }

    #[test]
    fn test_bars_follow_segment_lifecycle() {
        let manager = ProgressManager::new(hidden());
        manager.handle_event(DownloadEvent::JobStarted { segments: 2 });
        manager.handle_event(DownloadEvent::SegmentPending { index: 0 });
        manager.handle_event(DownloadEvent::SegmentProgress {
            index: 0,
            received: 4,
            total: Some(8),
        });

        {
            let bars = manager.bars.lock().unwrap();
            let segment = bars.segment.as_ref().unwrap();
            assert_eq!(segment.position(), 4);
            assert_eq!(segment.length(), Some(8));
        }

        manager.handle_event(DownloadEvent::SegmentSucceeded {
            index: 0,
            bytes: 8,
            total: Some(8),
        });
        manager.handle_event(DownloadEvent::SegmentPending { index: 1 });
        manager.handle_event(DownloadEvent::SegmentFailed {
            index: 1,
            error: "reset".to_string(),
        });

        let bars = manager.bars.lock().unwrap();
        assert!(bars.segment.is_none());
        assert_eq!(bars.job.as_ref().unwrap().position(), 2);
        assert_eq!(bars.bytes, 8);
    }

    #[test]
    fn test_disabled_manager_creates_no_bars() {
        let manager = ProgressManager::new_disabled(hidden());
        assert!(manager.is_disabled());
        manager.handle_event(DownloadEvent::JobStarted { segments: 1 });
        manager.handle_event(DownloadEvent::SegmentPending { index: 0 });
        manager.handle_event(DownloadEvent::SegmentProgress {
            index: 0,
            received: 1,
            total: None,
        });
        manager.handle_event(DownloadEvent::JobDone {
            counters: DownloadCounters::default(),
        });

        let bars = manager.bars.lock().unwrap();
        assert!(bars.job.is_none());
        assert!(bars.segment.is_none());
    }
}
