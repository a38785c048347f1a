//! In-memory [`Transport`] for tests.

use async_trait::async_trait;
use bytes::Bytes;
use futures::{StreamExt, stream};
use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::DownloadError;
use crate::transport::{SegmentBody, Transport};

#[derive(Debug, Clone)]
enum ScriptedBody {
    Chunks(Vec<Bytes>),
    /// Yields the chunks, then fails the stream.
    BrokenAfter(Vec<Bytes>, String),
    /// The request itself fails.
    Rejected(String),
}

/// Serves canned playlist text and segment bodies, and records every request.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    texts: HashMap<String, String>,
    bodies: HashMap<String, ScriptedBody>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, url: &str, text: impl Into<String>) -> Self {
        self.texts.insert(url.to_string(), text.into());
        self
    }

    /// Segment served as two chunks with a matching content length.
    pub fn with_segment(mut self, url: &str, data: &'static [u8]) -> Self {
        let mid = data.len() / 2;
        let chunks = vec![
            Bytes::from_static(&data[..mid]),
            Bytes::from_static(&data[mid..]),
        ];
        self.bodies
            .insert(url.to_string(), ScriptedBody::Chunks(chunks));
        self
    }

    pub fn with_rejected_segment(mut self, url: &str, reason: &str) -> Self {
        self.bodies
            .insert(url.to_string(), ScriptedBody::Rejected(reason.to_string()));
        self
    }

    pub fn with_broken_segment(mut self, url: &str, prefix: &'static [u8], reason: &str) -> Self {
        self.bodies.insert(
            url.to_string(),
            ScriptedBody::BrokenAfter(vec![Bytes::from_static(prefix)], reason.to_string()),
        );
        self
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, url: &str) {
        self.requests.lock().unwrap().push(url.to_string());
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn fetch_text(&self, url: &str) -> Result<String, DownloadError> {
        self.record(url);
        self.texts
            .get(url)
            .cloned()
            .ok_or_else(|| DownloadError::http_status(StatusCode::NOT_FOUND, url))
    }

    async fn fetch_stream(&self, url: &str) -> Result<SegmentBody, DownloadError> {
        self.record(url);
        match self.bodies.get(url).cloned() {
            Some(ScriptedBody::Chunks(chunks)) => {
                let content_length = Some(chunks.iter().map(|c| c.len() as u64).sum());
                Ok(SegmentBody {
                    content_length,
                    stream: stream::iter(chunks.into_iter().map(Ok)).boxed(),
                })
            }
            Some(ScriptedBody::BrokenAfter(chunks, reason)) => {
                let url = url.to_string();
                let failure = stream::once(async move { Err(DownloadError::fetch(url, reason)) });
                Ok(SegmentBody {
                    content_length: None,
                    stream: stream::iter(chunks.into_iter().map(Ok))
                        .chain(failure)
                        .boxed(),
                })
            }
            Some(ScriptedBody::Rejected(reason)) => Err(DownloadError::fetch(url, reason)),
            None => Err(DownloadError::http_status(StatusCode::NOT_FOUND, url)),
        }
    }
}
