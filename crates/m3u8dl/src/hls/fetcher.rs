// Segment fetcher: streams one segment's body straight into the output file.

use futures::StreamExt;
use std::sync::Arc;
use tracing::{instrument, trace};

use super::events::DownloadEvent;
use super::output::OutputFile;
use super::playlist::Segment;
use crate::{DownloadError, transport::Transport};

/// Bytes received for one segment and the length the server declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentTransfer {
    pub bytes: u64,
    pub total: Option<u64>,
}

pub struct SegmentFetcher {
    transport: Arc<dyn Transport>,
}

impl SegmentFetcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Fetch `segment` and append every chunk to `output` as it arrives.
    ///
    /// Chunks written before a stream error stay in the file. A failed write
    /// is reported as a file error, not a fetch error.
    #[instrument(skip_all, fields(index = segment.index))]
    pub async fn fetch_into(
        &self,
        segment: &Segment,
        output: &mut OutputFile,
        emit: &mut (dyn FnMut(DownloadEvent) + Send),
    ) -> Result<SegmentTransfer, DownloadError> {
        let body = self.transport.fetch_stream(&segment.resolved_url).await?;
        let total = body.content_length;
        let mut stream = body.stream;
        let mut received: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            output
                .write_chunk(&chunk)
                .await
                .map_err(|e| DownloadError::file(output.path(), e))?;
            received += chunk.len() as u64;
            trace!(received, ?total, "Segment chunk written");
            emit(DownloadEvent::SegmentProgress {
                index: segment.index,
                received,
                total,
            });
        }

        Ok(SegmentTransfer {
            bytes: received,
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hls::output::WriteMode;
    use crate::test_utils::ScriptedTransport;

    const SEGMENT_URL: &str = "http://h/x/seg0.ts";

    fn segment() -> Segment {
        Segment {
            index: 0,
            duration: 10.0,
            raw_url: "seg0.ts".to_string(),
            resolved_url: SEGMENT_URL.to_string(),
            target_filename: "list/seg0.ts".to_string(),
        }
    }

    #[tokio::test]
    async fn test_fetch_into_streams_chunks_and_reports_progress() {
        let transport = ScriptedTransport::new().with_segment(SEGMENT_URL, b"abcdef");
        let fetcher = SegmentFetcher::new(Arc::new(transport));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.ts");
        let mut output = OutputFile::open(&path, WriteMode::Truncate).await.unwrap();

        let mut received = Vec::new();
        let transfer = fetcher
            .fetch_into(&segment(), &mut output, &mut |event: DownloadEvent| {
                if let DownloadEvent::SegmentProgress { received: n, .. } = event {
                    received.push(n);
                }
            })
            .await
            .unwrap();
        output.close().await.unwrap();

        assert_eq!(transfer, SegmentTransfer { bytes: 6, total: Some(6) });
        assert_eq!(received, vec![3, 6]);
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"abcdef");
    }

    #[tokio::test]
    async fn test_write_failure_is_a_file_error() {
        let transport = ScriptedTransport::new().with_segment(SEGMENT_URL, b"abcdef");
        let fetcher = SegmentFetcher::new(Arc::new(transport));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("readonly.ts");
        tokio::fs::write(&path, b"").await.unwrap();
        let file = tokio::fs::File::open(&path).await.unwrap();
        let mut output = OutputFile::from_file(path.clone(), file);

        let err = fetcher
            .fetch_into(&segment(), &mut output, &mut |_: DownloadEvent| {})
            .await
            .unwrap_err();

        assert!(err.is_file());
        assert!(!err.is_fetch());
        assert!(err.to_string().contains("readonly.ts"));
    }
}
