// Playlist parsing: turns manifest text into an ordered list of segments.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use tracing::{debug, info, instrument};
use url::Url;

use crate::{DownloadError, transport::Transport};

const EXTINF_MARKER: &str = "#EXTINF";
const EXTINF_PREFIX: &str = "#EXTINF:";
const ENDLIST_MARKER: &str = "#EXT-X-ENDLIST";
const SEGMENT_SUFFIX: &str = ".ts";
const MAX_NAME_LENGTH: usize = 20;

static SCHEME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://").expect("scheme pattern is valid")
});

/// One media segment listed in a playlist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    /// Zero-based position in the playlist
    pub index: usize,
    /// Declared playback duration in seconds
    pub duration: f64,
    /// Path token exactly as written in the playlist
    pub raw_url: String,
    /// Absolute URL used for fetching
    pub resolved_url: String,
    /// Suggested per-segment file name, `<manifest name>/<segment file>`
    pub target_filename: String,
}

/// A parsed media playlist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Manifest {
    pub url: String,
    /// Filesystem-safe digest of `url`, the default output file name
    pub name: String,
    pub segments: Vec<Segment>,
}

impl Manifest {
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Sum of the declared durations, in seconds.
    pub fn total_duration(&self) -> f64 {
        self.segments.iter().map(|s| s.duration).sum()
    }
}

/// Fetch the playlist at `url` and parse it.
#[instrument(skip(transport))]
pub async fn load_manifest(
    transport: &dyn Transport,
    url: &str,
) -> Result<Manifest, DownloadError> {
    // Reject a malformed playlist URL before touching the network.
    Url::parse(url).map_err(|e| DownloadError::invalid_url(url, e.to_string()))?;

    let text = transport.fetch_text(url).await?;
    debug!(text = %text, "Got playlist text");

    let manifest = parse_manifest(&text, url)?;
    info!(segments = manifest.len(), "Total segments length: {}", manifest.len());
    Ok(manifest)
}

/// Parse playlist `text` that was served from `manifest_url`.
///
/// The segment region starts at the first `#EXTINF` marker and ends right
/// before `#EXT-X-ENDLIST`. It is split on whitespace into
/// (duration, path) pairs; a trailing unpaired token is dropped.
pub fn parse_manifest(text: &str, manifest_url: &str) -> Result<Manifest, DownloadError> {
    let base = Url::parse(manifest_url)
        .map_err(|e| DownloadError::invalid_url(manifest_url, e.to_string()))?;
    let name = manifest_name(manifest_url);

    let region = segment_region(text).ok_or_else(|| {
        debug!(text = %text, "Segment region not found");
        DownloadError::parse(format!("Not found M3U8 text in url: {manifest_url}"))
    })?;

    let tokens: Vec<&str> = region.split_whitespace().collect();
    let segments = tokens
        .chunks_exact(2)
        .enumerate()
        .map(|(index, pair)| parse_segment(index, pair[0], pair[1], &base, &name))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Manifest {
        url: manifest_url.to_string(),
        name,
        segments,
    })
}

fn segment_region(text: &str) -> Option<&str> {
    let start = text.find(EXTINF_MARKER)?;
    let len = text[start..].find(ENDLIST_MARKER)?;
    // At least one character must follow the marker itself.
    (len > EXTINF_MARKER.len()).then(|| text[start..start + len].trim())
}

fn parse_segment(
    index: usize,
    duration_token: &str,
    path_token: &str,
    base: &Url,
    manifest_name: &str,
) -> Result<Segment, DownloadError> {
    let duration = parse_duration(duration_token).ok_or_else(|| {
        DownloadError::parse(format!(
            "segment {index}: invalid duration marker `{duration_token}`"
        ))
    })?;

    let resolved_url = resolve_segment_url(base, path_token);
    let file_name = segment_file_name(&resolved_url).ok_or_else(|| {
        DownloadError::parse(format!(
            "segment {index}: no `{SEGMENT_SUFFIX}` path in `{path_token}`"
        ))
    })?;

    Ok(Segment {
        index,
        duration,
        raw_url: path_token.to_string(),
        resolved_url,
        target_filename: format!("{manifest_name}/{file_name}"),
    })
}

/// `#EXTINF:9.009,` -> `9.009`
fn parse_duration(token: &str) -> Option<f64> {
    let value = token.strip_prefix(EXTINF_PREFIX)?;
    let value = value.split_once(',').map_or(value, |(duration, _)| duration);
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d >= 0.0)
}

/// First path segment of the resolved URL that ends in `.ts`.
///
/// Host, query and fragment never count.
fn segment_file_name(resolved_url: &str) -> Option<String> {
    let url = Url::parse(resolved_url).ok()?;
    url.path_segments()?
        .find(|segment| segment.ends_with(SEGMENT_SUFFIX))
        .map(str::to_string)
}

/// Resolve a playlist path token against the playlist URL.
///
/// * `scheme://...` is already absolute.
/// * `/path` is joined to the playlist's scheme, host and port.
/// * anything else replaces the playlist's trailing file name; the playlist's
///   query and fragment are dropped first.
pub fn resolve_segment_url(base: &Url, raw: &str) -> String {
    if SCHEME_RE.is_match(raw) {
        return raw.to_string();
    }
    if raw.starts_with('/') {
        return format!("{}{}", base.origin().ascii_serialization(), raw);
    }

    let mut dir = base.clone();
    dir.set_query(None);
    dir.set_fragment(None);
    let dir = dir.as_str();
    match dir.rfind('/') {
        Some(pos) => format!("{}{}", &dir[..=pos], raw),
        None => raw.to_string(),
    }
}

/// Short, filesystem-safe name derived from the playlist URL.
///
/// Keeps the URL's ASCII alphanumerics. Short results are used as is; longer
/// ones are sampled at a fixed stride so at most 20 characters remain, and get
/// a `.ts` suffix.
pub fn manifest_name(url: &str) -> String {
    let encoded: Vec<char> = url.chars().filter(char::is_ascii_alphanumeric).collect();
    if encoded.len() < MAX_NAME_LENGTH {
        return encoded.into_iter().collect();
    }

    let gap = encoded.len().div_ceil(MAX_NAME_LENGTH);
    let mut name: String = encoded.into_iter().step_by(gap).collect();
    name.push_str(SEGMENT_SUFFIX);
    name
}
