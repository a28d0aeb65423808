use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::transcript::{format_transcript_text, FormatOptions, TranscriptFragment};
use crate::utils;
use crate::youtube::FetchedTranscript;

/// Everything produced for one transcript extraction
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptReport {
    pub video_id: String,
    pub title: String,
    pub language: String,
    pub timestamp: DateTime<Utc>,
    pub total_duration: f64,
    pub transcript_count: usize,
    pub transcripts: Vec<TranscriptFragment>,
    pub formatted_text: String,
}

impl TranscriptReport {
    pub fn new(fetched: FetchedTranscript, options: &FormatOptions) -> Self {
        let formatted_text = format_transcript_text(&fetched.transcripts, options);

        Self {
            total_duration: utils::calculate_total_duration(&fetched.transcripts),
            transcript_count: fetched.transcripts.len(),
            video_id: fetched.video_id,
            title: fetched.title,
            language: fetched.language,
            timestamp: Utc::now(),
            transcripts: fetched.transcripts,
            formatted_text,
        }
    }
}

/// Markdown heading with the title, then the transcript text
pub fn format_as_text(report: &TranscriptReport) -> String {
    format!("# {}\n\n{}", report.title, report.formatted_text)
}

pub fn format_as_json(report: &TranscriptReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
