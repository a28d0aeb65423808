use serde::{Deserialize, Serialize};

pub mod normalize;
pub mod segmenter;

pub use normalize::{decode_entities, normalize_text};
pub use segmenter::{format_transcript_text, ParagraphSegmenter};

/// A single timestamped caption fragment as delivered by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptFragment {
    /// Raw caption text (may still contain HTML entities)
    pub text: String,

    /// Start time in seconds
    pub timestamp: f64,

    /// Duration in seconds
    pub duration: f64,

    /// Language of the caption track, informational only
    #[serde(rename = "lang", default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl TranscriptFragment {
    pub fn new(text: impl Into<String>, timestamp: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            timestamp,
            duration,
            language: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// End time in seconds
    pub fn end_time(&self) -> f64 {
        self.timestamp + self.duration
    }
}

/// Options controlling how fragments are turned into text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// Split the output into paragraphs instead of one flowing block
    pub enable_paragraphs: bool,

    /// Silence (in seconds) between fragments that starts a new paragraph
    pub time_gap_threshold: f64,

    /// Upper bound on fragments collected into a single paragraph
    pub max_fragments_per_paragraph: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            enable_paragraphs: false,
            time_gap_threshold: 2.0,
            max_fragments_per_paragraph: 5,
        }
    }
}

impl FormatOptions {
    pub fn paragraphs(mut self, enabled: bool) -> Self {
        self.enable_paragraphs = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_options_defaults() {
        let options = FormatOptions::default();
        assert!(!options.enable_paragraphs);
        assert_eq!(options.time_gap_threshold, 2.0);
        assert_eq!(options.max_fragments_per_paragraph, 5);
    }

    #[test]
    fn test_format_options_partial_deserialize() {
        let options: FormatOptions =
            serde_json::from_str(r#"{"enable_paragraphs": true}"#).unwrap();
        assert!(options.enable_paragraphs);
        assert_eq!(options.time_gap_threshold, 2.0);
        assert_eq!(options.max_fragments_per_paragraph, 5);
    }

    #[test]
    fn test_fragment_serializes_language_as_lang() {
        let fragment = TranscriptFragment::new("hi", 1.5, 2.0).with_language("en");
        let json = serde_json::to_value(&fragment).unwrap();
        assert_eq!(json["lang"], "en");
        assert_eq!(json["timestamp"], 1.5);
        assert_eq!(fragment.end_time(), 3.5);
    }
}
