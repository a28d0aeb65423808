//! YouTube Transcript - extract clean, readable transcripts from YouTube videos
//!
//! This library fetches caption tracks for a video, normalizes the caption text and
//! optionally splits it into paragraphs. The same pipeline backs the command-line tool
//! and the Model Context Protocol tool server.

pub mod cli;
pub mod config;
pub mod mcp;
pub mod output;
pub mod transcript;
pub mod utils;
pub mod youtube;

pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use transcript::{format_transcript_text, FormatOptions, TranscriptFragment};
pub use youtube::{FetchedTranscript, TranscriptFetcher, YoutubeClient, YtDlpClient};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to transcript extraction
#[derive(thiserror::Error, Debug)]
pub enum TranscriptError {
    #[error("YouTube URL or ID is required")]
    MissingInput,

    #[error("Could not extract video ID from: {0}")]
    InvalidVideoId(String),

    #[error("Video {video_id} is unavailable: {reason}")]
    VideoUnavailable { video_id: String, reason: String },

    #[error("No transcripts available for video {0}")]
    NoTranscripts(String),

    #[error("Language {lang} not available for video {video_id}. Available languages: {available}")]
    LanguageUnavailable {
        lang: String,
        video_id: String,
        available: String,
    },

    #[error("Unsupported language code: {code}. Supported codes are: {supported}")]
    UnsupportedLanguage { code: String, supported: String },

    #[error("Unable to parse transcript for video {video_id}: {reason}")]
    MalformedTranscript { video_id: String, reason: String },

    #[error("No transcript segments found for video {0}. The video may not have captions or they may be disabled.")]
    NoSegments(String),

    #[error("Video download failed: {0}")]
    DownloadFailed(String),

    #[error("{0} is not available. Please install it: https://github.com/yt-dlp/yt-dlp")]
    ToolUnavailable(String),
}

impl TranscriptError {
    /// Whether the error was caused by the caller's input rather than by the provider
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::MissingInput | Self::InvalidVideoId(_))
    }
}
