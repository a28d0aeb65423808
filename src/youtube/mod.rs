use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod schema;
pub mod video_id;
pub mod ytdlp;

pub use schema::{CaptionTrack, Json3Transcript, VideoInfo};
pub use video_id::{extract_video_id, watch_url};
pub use ytdlp::YtDlpClient;

use crate::transcript::TranscriptFragment;
use crate::utils;
use crate::{Result, TranscriptError};

const UNTITLED_VIDEO: &str = "Untitled Video";

/// Transcript fragments and metadata fetched for one video
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedTranscript {
    pub video_id: String,
    pub title: String,
    /// Language code of the caption track that was used
    pub language: String,
    /// Fragments sorted by start time
    pub transcripts: Vec<TranscriptFragment>,
}

/// Video quality preference for downloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum VideoQuality {
    /// Best available mp4 rendition
    #[default]
    Best,
    /// Smallest available rendition
    Lowest,
}

impl VideoQuality {
    /// yt-dlp format selector for this quality
    pub fn format_selector(&self) -> &'static str {
        match self {
            VideoQuality::Best => "best[ext=mp4]/best",
            VideoQuality::Lowest => "worst[ext=mp4]/worst",
        }
    }
}

/// Access to YouTube metadata, caption tracks and video streams
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait YoutubeClient: Send + Sync {
    /// Fetch metadata (title, caption tracks) for a video
    async fn video_info(&self, video_id: &str) -> Result<VideoInfo>;

    /// Fetch and parse a json3 caption track
    async fn fetch_caption_track(&self, url: &str) -> Result<Json3Transcript>;

    /// Download the video stream to `output`
    async fn download_video(&self, video_id: &str, output: &Path, quality: VideoQuality) -> Result<()>;
}

/// Fetches transcripts through a caller-owned client
pub struct TranscriptFetcher<C> {
    client: C,
}

impl<C: YoutubeClient> TranscriptFetcher<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Fetch the transcript of a video given its URL or ID.
    ///
    /// `lang` selects the caption track; without it the video's own language is
    /// used, falling back to the first track.
    pub async fn fetch_transcripts(&self, input: &str, lang: Option<&str>) -> Result<FetchedTranscript> {
        let video_id = extract_video_id(input)?;
        tracing::debug!("Fetching video info for: {}", video_id);

        let info = self.client.video_info(&video_id).await?;
        let title = info
            .title
            .clone()
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| UNTITLED_VIDEO.to_string());
        if let Some(duration) = info.duration {
            tracing::debug!("Video length: {}", utils::format_duration(duration));
        }

        let tracks = info.caption_tracks();
        if tracks.is_empty() {
            return Err(TranscriptError::NoTranscripts(video_id).into());
        }

        let track = select_track(&tracks, lang, info.language.as_deref()).ok_or_else(|| {
            TranscriptError::LanguageUnavailable {
                lang: lang.unwrap_or_default().to_string(),
                video_id: video_id.clone(),
                available: tracks
                    .iter()
                    .map(|t| t.language.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            }
        })?;

        if let Some(requested) = lang {
            if !track.language.eq_ignore_ascii_case(requested) {
                tracing::warn!(
                    "Language {} has no exact track, using {}",
                    requested,
                    track.language
                );
            }
        }

        let url = track
            .json3_url()
            .ok_or_else(|| TranscriptError::MalformedTranscript {
                video_id: video_id.clone(),
                reason: format!("caption track '{}' has no json3 rendition", track.language),
            })?;

        tracing::info!(
            "Using {} caption track: {}",
            if track.automatic { "auto-generated" } else { "uploaded" },
            track.language
        );

        let document = self.client.fetch_caption_track(url).await?;
        let mut transcripts = document.fragments(&track.language);

        if transcripts.is_empty() {
            return Err(TranscriptError::NoSegments(video_id).into());
        }

        // Caption events are not guaranteed to arrive in order.
        transcripts.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));

        Ok(FetchedTranscript {
            video_id,
            title,
            language: track.language.clone(),
            transcripts,
        })
    }

    /// Download a video; returns the path the video was written to
    pub async fn download(&self, input: &str, output: &Path, quality: VideoQuality) -> Result<PathBuf> {
        let video_id = extract_video_id(input)?;
        let path = utils::resolve_video_path(output, &video_id);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs_err::create_dir_all(parent)?;
        }

        tracing::info!("Downloading video {} to {}", video_id, path.display());
        self.client.download_video(&video_id, &path, quality).await?;

        Ok(path)
    }
}

/// Pick the caption track for a requested language.
///
/// Exact (case-insensitive) matches win over loose matches where either code
/// contains the other, e.g. `en` and `en-GB`.
fn select_track<'a>(
    tracks: &'a [CaptionTrack],
    requested: Option<&str>,
    video_language: Option<&str>,
) -> Option<&'a CaptionTrack> {
    match requested {
        Some(requested) => {
            let requested = requested.to_lowercase();
            tracks
                .iter()
                .find(|track| track.language.to_lowercase() == requested)
                .or_else(|| {
                    tracks.iter().find(|track| {
                        let language = track.language.to_lowercase();
                        language.contains(&requested) || requested.contains(&language)
                    })
                })
        }
        None => video_language
            .and_then(|language| tracks.iter().find(|track| track.language == language))
            .or_else(|| tracks.first()),
    }
}
