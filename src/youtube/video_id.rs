use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::{Result, TranscriptError};

static BARE_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]{11}$").unwrap());

static EMBEDDED_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:youtube\.com/(?:[^/]+/.+/|(?:v|e(?:mbed)?)/|.*[?&]v=)|youtu\.be/)([^"&?/\s]{11})"#)
        .unwrap()
});

/// Extract the 11-character video ID from a YouTube URL or a bare ID
pub fn extract_video_id(input: &str) -> Result<String> {
    if input.is_empty() {
        return Err(TranscriptError::MissingInput.into());
    }

    if BARE_ID_RE.is_match(input) {
        return Ok(input.to_string());
    }

    if let Some(id) = id_from_url(input) {
        return Ok(id);
    }

    if let Some(caps) = EMBEDDED_ID_RE.captures(input) {
        return Ok(caps[1].to_string());
    }

    Err(TranscriptError::InvalidVideoId(input.to_string()).into())
}

/// Canonical watch URL for a video ID
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

fn id_from_url(input: &str) -> Option<String> {
    let url = Url::parse(input).ok()?;
    let host = url.host_str()?;

    let candidate = if host == "youtu.be" {
        url.path().trim_start_matches('/').to_string()
    } else if host.contains("youtube.com") {
        if let Some(id) = url.path().strip_prefix("/shorts/") {
            id.to_string()
        } else {
            url.query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned())?
        }
    } else {
        return None;
    };

    (!candidate.is_empty()).then_some(candidate)
}
