//! Typed views of the provider documents the fetcher consumes.
//!
//! Two documents are involved: the video metadata printed by `yt-dlp --dump-json`
//! and the "json3" timed-text format YouTube serves for caption tracks. Only the
//! fields the fetcher reads are modelled; a document missing a required field
//! fails to parse instead of being searched for something that looks right.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::transcript::TranscriptFragment;

/// Wire magic carried by the json3 timed-text format
pub const JSON3_WIRE_MAGIC: &str = "pb3";

/// Pseudo caption track yt-dlp reports for live chat replays
const LIVE_CHAT_TRACK: &str = "live_chat";

/// Video metadata as printed by `yt-dlp --dump-json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoInfo {
    pub id: String,

    #[serde(default)]
    pub title: Option<String>,

    /// Primary spoken language, when YouTube knows it
    #[serde(default)]
    pub language: Option<String>,

    /// Duration in seconds
    #[serde(default)]
    pub duration: Option<f64>,

    /// Uploaded caption tracks by language code
    #[serde(default)]
    pub subtitles: BTreeMap<String, Vec<CaptionFormat>>,

    /// Auto-generated caption tracks by language code
    #[serde(default)]
    pub automatic_captions: BTreeMap<String, Vec<CaptionFormat>>,
}

/// One downloadable rendition of a caption track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionFormat {
    pub ext: String,
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A caption track available for a video
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionTrack {
    pub language: String,
    pub name: Option<String>,
    pub automatic: bool,
    pub formats: Vec<CaptionFormat>,
}

impl CaptionTrack {
    /// URL of the json3 rendition, if the provider offers one
    pub fn json3_url(&self) -> Option<&str> {
        self.formats
            .iter()
            .find(|format| format.ext == "json3")
            .map(|format| format.url.as_str())
    }
}

impl VideoInfo {
    /// All caption tracks: uploaded tracks first, then auto-generated tracks for
    /// languages that have no uploaded track.
    pub fn caption_tracks(&self) -> Vec<CaptionTrack> {
        let manual = self
            .subtitles
            .iter()
            .filter(|(language, _)| language.as_str() != LIVE_CHAT_TRACK)
            .map(|(language, formats)| Self::track(language, formats, false));

        let automatic = self
            .automatic_captions
            .iter()
            .filter(|(language, _)| !self.subtitles.contains_key(*language))
            .map(|(language, formats)| Self::track(language, formats, true));

        manual.chain(automatic).collect()
    }

    fn track(language: &str, formats: &[CaptionFormat], automatic: bool) -> CaptionTrack {
        CaptionTrack {
            language: language.to_string(),
            name: formats.iter().find_map(|format| format.name.clone()),
            automatic,
            formats: formats.to_vec(),
        }
    }
}

/// YouTube json3 timed-text document
#[derive(Debug, Clone, Deserialize)]
pub struct Json3Transcript {
    #[serde(rename = "wireMagic", default)]
    pub wire_magic: Option<String>,

    pub events: Vec<Json3Event>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Json3Event {
    #[serde(rename = "tStartMs", default)]
    pub start_ms: f64,

    #[serde(rename = "dDurationMs", default)]
    pub duration_ms: f64,

    #[serde(default)]
    pub segs: Vec<Json3Segment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Json3Segment {
    #[serde(default)]
    pub utf8: String,
}

impl Json3Transcript {
    /// Parse and version-check a json3 document
    pub fn parse(body: &str) -> std::result::Result<Self, String> {
        let document: Self = serde_json::from_str(body).map_err(|e| e.to_string())?;

        match document.wire_magic.as_deref() {
            Some(magic) if magic != JSON3_WIRE_MAGIC => {
                Err(format!("unexpected wire format '{}'", magic))
            }
            _ => Ok(document),
        }
    }

    /// Convert caption events into fragments, dropping events with no text
    pub fn fragments(&self, language: &str) -> Vec<TranscriptFragment> {
        self.events
            .iter()
            .filter_map(|event| {
                let text = event
                    .segs
                    .iter()
                    .map(|seg| seg.utf8.as_str())
                    .collect::<String>();
                let text = text.trim();
                if text.is_empty() {
                    return None;
                }

                Some(
                    TranscriptFragment::new(
                        text,
                        event.start_ms / 1000.0,
                        (event.duration_ms / 1000.0).max(0.0),
                    )
                    .with_language(language),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIDEO_INFO: &str = r#"{
        "id": "gzBS9eh-Eh4",
        "title": "A test video",
        "language": "en",
        "duration": 120.0,
        "subtitles": {
            "en": [{"ext": "vtt", "url": "https://example.com/en.vtt", "name": "English"},
                   {"ext": "json3", "url": "https://example.com/en.json3", "name": "English"}],
            "live_chat": [{"ext": "json", "url": "https://example.com/chat"}]
        },
        "automatic_captions": {
            "en": [{"ext": "json3", "url": "https://example.com/auto-en.json3"}],
            "de": [{"ext": "json3", "url": "https://example.com/auto-de.json3", "name": "German"}]
        },
        "formats": [{"format_id": "18"}]
    }"#;

    #[test]
    fn test_caption_tracks_prefer_uploaded() {
        let info: VideoInfo = serde_json::from_str(VIDEO_INFO).unwrap();
        let tracks = info.caption_tracks();

        let languages: Vec<_> = tracks.iter().map(|t| t.language.as_str()).collect();
        assert_eq!(languages, vec!["en", "de"]);
        assert!(!tracks[0].automatic);
        assert_eq!(tracks[0].json3_url(), Some("https://example.com/en.json3"));
        assert!(tracks[1].automatic);
        assert_eq!(tracks[1].name.as_deref(), Some("German"));
    }

    #[test]
    fn test_video_info_without_captions() {
        let info: VideoInfo = serde_json::from_str(r#"{"id": "gzBS9eh-Eh4"}"#).unwrap();
        assert!(info.caption_tracks().is_empty());
        assert!(info.title.is_none());
    }

    #[test]
    fn test_json3_fragments() {
        let body = r#"{
            "wireMagic": "pb3",
            "events": [
                {"tStartMs": 1200, "dDurationMs": 2300, "segs": [{"utf8": "hello "}, {"utf8": "there"}]},
                {"tStartMs": 3500, "dDurationMs": 10, "segs": [{"utf8": "\n"}]},
                {"tStartMs": 0, "dDurationMs": 90000},
                {"tStartMs": 4000, "dDurationMs": -500, "segs": [{"utf8": "&amp; more"}]}
            ]
        }"#;
        let document = Json3Transcript::parse(body).unwrap();
        let fragments = document.fragments("en");

        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].text, "hello there");
        assert_eq!(fragments[0].timestamp, 1.2);
        assert_eq!(fragments[0].duration, 2.3);
        assert_eq!(fragments[0].language.as_deref(), Some("en"));
        assert_eq!(fragments[1].text, "&amp; more");
        assert_eq!(fragments[1].duration, 0.0);
    }

    #[test]
    fn test_json3_requires_events() {
        let err = Json3Transcript::parse(r#"{"wireMagic": "pb3"}"#).unwrap_err();
        assert!(err.contains("events"));
    }

    #[test]
    fn test_json3_rejects_foreign_format() {
        let err = Json3Transcript::parse(r#"{"wireMagic": "pb4", "events": []}"#).unwrap_err();
        assert!(err.contains("pb4"));
    }
}
