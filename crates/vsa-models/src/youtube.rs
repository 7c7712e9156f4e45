//! YouTube reference parsing.
//!
//! User input is untrusted: the reference must be an absolute `http(s)` URL
//! on a YouTube host and carry an 11-character video id. Everything here is
//! pure string work; reachability is checked elsewhere.

use thiserror::Error;
use url::Url;

/// Registrable YouTube domains. Subdomains (`www.`, `m.`, `music.`) are accepted.
const YOUTUBE_DOMAINS: &[&str] = &["youtube.com", "youtu.be", "youtube-nocookie.com"];

/// Path prefixes that carry the id as the following segment.
const ID_PATH_PREFIXES: &[&str] = &["embed", "v", "shorts", "live"];

/// Errors produced while extracting a video id from a reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum YoutubeIdError {
    /// Not an absolute http/https URL
    #[error("reference is not an http(s) URL")]
    NotAUrl,
    /// Parsed as a URL but the host is not YouTube
    #[error("non-YouTube host: {0}")]
    NonYoutubeHost(String),
    /// Playlist URL without a selected video
    #[error("playlist URL without a specific video")]
    PlaylistWithoutVideo,
    /// Channel or user page without a selected video
    #[error("channel URL without a specific video")]
    ChannelWithoutVideo,
    /// YouTube URL with no recognizable id position
    #[error("video id not found in URL")]
    VideoIdNotFound,
    /// Id present but malformed
    #[error("video id has invalid format")]
    InvalidVideoId,
}

impl YoutubeIdError {
    /// Whether the reference is a YouTube URL of a kind we cannot analyze
    /// (as opposed to not being a YouTube URL at all).
    pub fn is_unsupported_kind(&self) -> bool {
        matches!(
            self,
            YoutubeIdError::PlaylistWithoutVideo | YoutubeIdError::ChannelWithoutVideo
        )
    }
}

pub type YoutubeIdResult<T> = Result<T, YoutubeIdError>;

/// Extract the 11-character video id from any supported YouTube URL shape.
///
/// Supported:
/// - `https://www.youtube.com/watch?v=ID`
/// - `https://youtu.be/ID`
/// - `https://www.youtube.com/embed/ID`, `/v/ID`, `/shorts/ID`, `/live/ID`
/// - any of the above with extra query parameters or fragments
pub fn extract_youtube_id(raw: &str) -> YoutubeIdResult<String> {
    let url = Url::parse(raw.trim()).map_err(|_| YoutubeIdError::NotAUrl)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(YoutubeIdError::NotAUrl);
    }

    let host = url
        .host_str()
        .map(|h| h.to_ascii_lowercase())
        .ok_or(YoutubeIdError::NotAUrl)?;
    if !is_youtube_host(&host) {
        return Err(YoutubeIdError::NonYoutubeHost(host));
    }

    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|p| !p.is_empty()).collect())
        .unwrap_or_default();

    let candidate = if host == "youtu.be" || host.ends_with(".youtu.be") {
        segments.first().map(|s| s.to_string())
    } else if let Some(v) = query_value(&url, "v") {
        Some(v)
    } else {
        match segments.as_slice() {
            [prefix, id, ..] if ID_PATH_PREFIXES.iter().any(|p| p == prefix) => Some(id.to_string()),
            _ => None,
        }
    };

    match candidate {
        Some(id) => validate_youtube_id(id),
        None => Err(classify_missing_id(&url, &segments)),
    }
}

/// Canonical watch URL for a video id.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// Embeddable player URL for a reference, if it names a YouTube video.
pub fn embed_url(raw: &str) -> Option<String> {
    extract_youtube_id(raw)
        .ok()
        .map(|id| format!("https://www.youtube.com/embed/{}", id))
}

/// Whether the reference begins with an http scheme, ignoring surrounding whitespace.
pub fn has_http_scheme(raw: &str) -> bool {
    let trimmed = raw.trim_start();
    trimmed.starts_with("http://") || trimmed.starts_with("https://")
}

fn is_youtube_host(host: &str) -> bool {
    YOUTUBE_DOMAINS
        .iter()
        .any(|d| host == *d || host.ends_with(&format!(".{}", d)))
}

fn query_value(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

fn classify_missing_id(url: &Url, segments: &[&str]) -> YoutubeIdError {
    if query_value(url, "list").is_some() || segments.first() == Some(&"playlist") {
        return YoutubeIdError::PlaylistWithoutVideo;
    }

    match segments.first() {
        Some(&"channel") | Some(&"user") | Some(&"c") => YoutubeIdError::ChannelWithoutVideo,
        Some(s) if s.starts_with('@') => YoutubeIdError::ChannelWithoutVideo,
        _ => YoutubeIdError::VideoIdNotFound,
    }
}

fn validate_youtube_id(id: String) -> YoutubeIdResult<String> {
    let valid_chars = id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if id.len() != 11 || !valid_chars {
        return Err(YoutubeIdError::InvalidVideoId);
    }

    Ok(id)
}
