// Download pipeline: range selection, output file lifecycle and the
// sequential fetch/write loop over the selected segments.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, error, info, trace, warn};

use super::config::{DownloadOptions, HlsConfig};
use super::events::{DownloadCounters, DownloadEvent, OnEvent};
use super::fetcher::SegmentFetcher;
use super::output::{OutputFile, WriteMode};
use super::playlist::{self, Manifest, Segment};
use super::range::{NormalizedRange, SegmentRange};
use crate::{
    DownloadError,
    transport::{HttpTransport, Transport},
};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Lifecycle of one pipeline run. Phases only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Phase {
    Init,
    RangeNormalized,
    FileOpen,
    Draining,
    Done,
}

/// Fan-out point for events; a no-op when nobody listens.
#[derive(Clone, Default)]
struct Emitter {
    on_event: Option<OnEvent>,
}

impl Emitter {
    fn new(on_event: Option<OnEvent>) -> Self {
        Self { on_event }
    }

    fn emit(&self, event: DownloadEvent) {
        if let Some(on_event) = &self.on_event {
            on_event(event);
        }
    }
}

/// State owned by a single run: the range, the output handle and the counters.
struct DownloadJob<'a> {
    manifest: &'a Manifest,
    emitter: &'a Emitter,
    phase: Phase,
    output: Option<OutputFile>,
    counters: DownloadCounters,
}

impl<'a> DownloadJob<'a> {
    fn new(manifest: &'a Manifest, emitter: &'a Emitter) -> Self {
        Self {
            manifest,
            emitter,
            phase: Phase::Init,
            output: None,
            counters: DownloadCounters::default(),
        }
    }

    fn advance(&mut self, next: Phase) {
        debug_assert!(next >= self.phase, "phase moved backwards");
        if next != self.phase {
            trace!(from = ?self.phase, to = ?next, "Pipeline phase change");
            self.phase = next;
        }
    }

    fn normalize_range(&mut self, requested: SegmentRange) -> NormalizedRange {
        let range = requested.normalize(self.manifest.len());
        info!("Download segment ranges: {range}");
        info!("Download segment length: {}", range.len());
        self.emitter.emit(DownloadEvent::RangeNormalized { range });
        self.advance(Phase::RangeNormalized);
        range
    }

    async fn open_output(&mut self, path: PathBuf, mode: WriteMode) -> Result<(), DownloadError> {
        let output = OutputFile::open(path, mode).await?;
        let path = output.path().to_path_buf();
        info!(
            "Filepath: {}",
            std::path::absolute(&path).unwrap_or_else(|_| path.clone()).display()
        );
        self.emitter.emit(DownloadEvent::FileOpened { path });
        self.output = Some(output);
        self.advance(Phase::FileOpen);
        Ok(())
    }

    async fn drain(&mut self, mut queue: VecDeque<&'a Segment>, fetcher: &SegmentFetcher) {
        let emitter = self.emitter;
        let Some(mut output) = self.output.take() else {
            return;
        };

        info!("------> Start Downloading <------");
        emitter.emit(DownloadEvent::JobStarted {
            segments: queue.len(),
        });

        while let Some(segment) = queue.pop_front() {
            self.advance(Phase::Draining);

            let label = format!("Segment-{}", segment.index);
            info!("{label}: Pending...");
            emitter.emit(DownloadEvent::SegmentPending {
                index: segment.index,
            });

            match fetcher
                .fetch_into(segment, &mut output, &mut |event: DownloadEvent| emitter.emit(event))
                .await
            {
                Ok(transfer) => {
                    self.counters.success += 1;
                    info!(
                        "{label}: Size - {} MB. Success!",
                        format_mb(transfer.total.unwrap_or(transfer.bytes))
                    );
                    emitter.emit(DownloadEvent::SegmentSucceeded {
                        index: segment.index,
                        bytes: transfer.bytes,
                        total: transfer.total,
                    });
                }
                Err(err) => {
                    self.counters.failure += 1;
                    debug!("{label}: {segment:?}");
                    error!("{label}: {err}");
                    emitter.emit(DownloadEvent::SegmentDiagnostic {
                        segment: segment.clone(),
                    });
                    emitter.emit(DownloadEvent::SegmentFailed {
                        index: segment.index,
                        error: err.to_string(),
                    });
                }
            }
        }

        self.output = Some(output);
    }

    async fn finish(mut self) -> DownloadCounters {
        self.advance(Phase::Done);
        let counters = self.counters;

        info!("------> Finish Download <------");
        info!("Total - {}", counters.total());
        info!("Success - {}", counters.success);
        info!("Failure - {}", counters.failure);

        if let Some(output) = self.output.take() {
            let path = output.path().to_path_buf();
            if let Err(e) = output.close().await {
                warn!(path = %path.display(), error = %e, "Failed to flush output file");
            }
            self.emitter.emit(DownloadEvent::FileClosed { path });
        }

        self.emitter.emit(DownloadEvent::JobDone { counters });
        counters
    }
}

fn format_mb(bytes: u64) -> String {
    format!("{:.4}", bytes as f64 / BYTES_PER_MB)
}

/// A spawned download whose events can be consumed as a stream.
pub struct DownloadTask {
    pub events: UnboundedReceiverStream<DownloadEvent>,
    pub handle: JoinHandle<Result<DownloadCounters, DownloadError>>,
}

/// Sequential playlist downloader.
#[derive(Clone)]
pub struct HlsDownloader {
    transport: Arc<dyn Transport>,
    config: HlsConfig,
}

impl HlsDownloader {
    pub fn new(config: HlsConfig) -> Result<Self, DownloadError> {
        Self::with_config(config)
    }

    /// Create a downloader with an HTTP transport built from `config`
    pub fn with_config(config: HlsConfig) -> Result<Self, DownloadError> {
        let transport = HttpTransport::new(&config.base)?;
        Ok(Self {
            transport: Arc::new(transport),
            config,
        })
    }

    /// Create a downloader over an existing transport
    pub fn with_transport(transport: Arc<dyn Transport>, config: HlsConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &HlsConfig {
        &self.config
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub async fn load_manifest(&self, url: &str) -> Result<Manifest, DownloadError> {
        playlist::load_manifest(self.transport.as_ref(), url).await
    }

    /// Fetch and parse the playlist at `url`, then download it.
    pub async fn download(
        &self,
        url: &str,
        options: DownloadOptions,
        on_event: Option<OnEvent>,
    ) -> Result<DownloadCounters, DownloadError> {
        let emitter = Emitter::new(on_event);
        info!("Get M3U8URL: {url}");

        let manifest = match self.load_manifest(url).await {
            Ok(manifest) => manifest,
            Err(err) => {
                error!("Load M3U8 failure: {err}");
                emitter.emit(DownloadEvent::Fatal {
                    error: err.to_string(),
                });
                return Err(err);
            }
        };

        emitter.emit(DownloadEvent::ManifestReady {
            url: manifest.url.clone(),
            name: manifest.name.clone(),
            segments: manifest.len(),
        });

        self.run_with_emitter(&manifest, options, &emitter).await
    }

    /// Download the selected segments of an already parsed playlist into one file.
    ///
    /// Segment failures are counted, not returned; the only error is an output
    /// file that cannot be opened.
    pub async fn run(
        &self,
        manifest: &Manifest,
        options: DownloadOptions,
        on_event: Option<OnEvent>,
    ) -> Result<DownloadCounters, DownloadError> {
        let emitter = Emitter::new(on_event);
        self.run_with_emitter(manifest, options, &emitter).await
    }

    /// Spawn [`download`](Self::download) and expose its events as a stream.
    pub fn download_stream(&self, url: impl Into<String>, options: DownloadOptions) -> DownloadTask {
        let (tx, rx) = mpsc::unbounded_channel();
        let on_event: OnEvent = Arc::new(move |event: DownloadEvent| {
            // The consumer may stop listening; the job still runs to completion.
            let _ = tx.send(event);
        });

        let downloader = self.clone();
        let url = url.into();
        let handle =
            tokio::spawn(async move { downloader.download(&url, options, Some(on_event)).await });

        DownloadTask {
            events: UnboundedReceiverStream::new(rx),
            handle,
        }
    }

    async fn run_with_emitter(
        &self,
        manifest: &Manifest,
        options: DownloadOptions,
        emitter: &Emitter,
    ) -> Result<DownloadCounters, DownloadError> {
        let mut job = DownloadJob::new(manifest, emitter);
        let range = job.normalize_range(options.range);

        info!("Filename: {}", options.filename.as_deref().unwrap_or(&manifest.name));
        let path = options.output_path(&manifest.name);
        if let Err(err) = job.open_output(path, options.mode).await {
            error!("{err}");
            emitter.emit(DownloadEvent::Fatal {
                error: err.to_string(),
            });
            return Err(err);
        }

        let queue: VecDeque<&Segment> = manifest.segments[range.indices()].iter().collect();
        let fetcher = SegmentFetcher::new(self.transport.clone());
        job.drain(queue, &fetcher).await;

        Ok(job.finish().await)
    }
}
