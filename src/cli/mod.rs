use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::youtube::VideoQuality;

#[derive(Parser)]
#[command(
    name = "youtube-transcript",
    about = "Extract transcripts from YouTube videos",
    version,
    long_about = "Extract clean, readable transcripts from YouTube videos, download videos, or serve both as Model Context Protocol tools over stdio."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Emit log lines as JSON
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract the transcript of a YouTube video
    Transcript {
        /// YouTube video URL or ID
        #[arg(value_name = "URL")]
        url: String,

        /// Language code for transcripts (e.g. en, uk, ja, ru, zh)
        #[arg(short, long, value_name = "LANGUAGE")]
        lang: Option<String>,

        /// Enable automatic paragraph breaks
        #[arg(short, long)]
        paragraphs: bool,

        /// Output file path (prints to stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,

        /// Seconds of silence that start a new paragraph
        #[arg(long, value_name = "SECONDS")]
        gap_threshold: Option<f64>,

        /// Maximum caption fragments per paragraph
        #[arg(long, value_name = "COUNT")]
        max_fragments: Option<usize>,
    },

    /// Download a YouTube video
    Download {
        /// YouTube video URL or ID
        #[arg(value_name = "URL")]
        url: String,

        /// Output file path (or directory)
        #[arg(short, long, value_name = "FILE", default_value = "video.mp4")]
        output: PathBuf,

        /// Video quality
        #[arg(long, value_enum, default_value = "best")]
        quality: VideoQuality,
    },

    /// Run the Model Context Protocol tool server on stdio
    Serve,

    /// Show or initialize the configuration file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Markdown title followed by the transcript text
    Text,
    /// JSON report with fragments and formatted text
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}
