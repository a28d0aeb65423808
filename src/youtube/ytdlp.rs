use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use std::path::Path;
use std::process::{Output, Stdio};
use tokio::process::Command;

use super::schema::{Json3Transcript, VideoInfo};
use super::{watch_url, VideoQuality, YoutubeClient};
use crate::config::YoutubeConfig;
use crate::{Result, TranscriptError};

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Messages yt-dlp prints when a video cannot be accessed at all
const UNAVAILABLE_MARKERS: &[&str] = &[
    "Video unavailable",
    "Private video",
    "This video has been removed",
    "Incomplete YouTube ID",
    "is not a valid URL",
];

/// YouTube client backed by yt-dlp for metadata and downloads, and reqwest for caption tracks
pub struct YtDlpClient {
    yt_dlp_path: String,
    http: reqwest::Client,
}

impl YtDlpClient {
    pub fn new(config: &YoutubeConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language)
                .context("Invalid Accept-Language header in config")?,
        );

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            yt_dlp_path: config.yt_dlp_path.clone(),
            http,
        })
    }

    /// Run yt-dlp with the given arguments and capture its output
    async fn run_yt_dlp(&self, args: &[&str]) -> Result<Output> {
        tracing::debug!("Running {} {}", self.yt_dlp_path, args.join(" "));

        Command::new(&self.yt_dlp_path)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    anyhow::Error::from(TranscriptError::ToolUnavailable(self.yt_dlp_path.clone()))
                }
                _ => anyhow::Error::new(e).context(format!("Failed to run {}", self.yt_dlp_path)),
            })
    }
}

#[async_trait]
impl YoutubeClient for YtDlpClient {
    async fn video_info(&self, video_id: &str) -> Result<VideoInfo> {
        let url = watch_url(video_id);
        let output = self
            .run_yt_dlp(&[
                "--dump-json",
                "--skip-download",
                "--no-playlist",
                "--no-warnings",
                url.as_str(),
            ])
            .await?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if UNAVAILABLE_MARKERS.iter().any(|marker| error.contains(marker)) {
                return Err(TranscriptError::VideoUnavailable {
                    video_id: video_id.to_string(),
                    reason: error,
                }
                .into());
            }
            anyhow::bail!("yt-dlp failed: {}", error);
        }

        serde_json::from_slice(&output.stdout)
            .with_context(|| format!("Failed to parse video info for {}", video_id))
    }

    async fn fetch_caption_track(&self, url: &str) -> Result<Json3Transcript> {
        tracing::debug!("Fetching caption track: {}", url);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .context("Failed to download caption track")?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to download caption track: HTTP {}", response.status());
        }

        let body = response
            .text()
            .await
            .context("Failed to read caption track")?;

        Json3Transcript::parse(&body).map_err(|reason| {
            anyhow::Error::from(TranscriptError::MalformedTranscript {
                video_id: video_id_hint(url),
                reason,
            })
        })
    }

    async fn download_video(&self, video_id: &str, output: &Path, quality: VideoQuality) -> Result<()> {
        let url = watch_url(video_id);
        let output_path = output.to_string_lossy();
        let result = self
            .run_yt_dlp(&[
                "--format",
                quality.format_selector(),
                "--output",
                &*output_path,
                "--no-playlist",
                "--no-part",
                "--newline",
                url.as_str(),
            ])
            .await?;

        if !result.status.success() {
            let error = String::from_utf8_lossy(&result.stderr).trim().to_string();
            return Err(TranscriptError::DownloadFailed(error).into());
        }

        if !output.exists() {
            return Err(TranscriptError::DownloadFailed(format!(
                "yt-dlp finished but {} was not created",
                output.display()
            ))
            .into());
        }

        Ok(())
    }
}

/// Caption URLs carry the video ID in their `v` query parameter
fn video_id_hint(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_tool(path: &str) -> YoutubeConfig {
        YoutubeConfig {
            yt_dlp_path: path.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_video_id_hint() {
        assert_eq!(
            video_id_hint("https://www.youtube.com/api/timedtext?v=gzBS9eh-Eh4&lang=en&fmt=json3"),
            "gzBS9eh-Eh4"
        );
        assert_eq!(video_id_hint("https://example.com/en.json3"), "unknown");
    }

    #[test]
    fn test_rejects_invalid_accept_language() {
        let config = YoutubeConfig {
            accept_language: "en\nbad".to_string(),
            ..Default::default()
        };
        assert!(YtDlpClient::new(&config).is_err());
    }

    #[tokio::test]
    async fn test_missing_binary_is_reported() {
        let client = YtDlpClient::new(&config_with_tool("definitely-not-a-real-binary-xyz")).unwrap();
        let err = client.video_info("gzBS9eh-Eh4").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TranscriptError>(),
            Some(TranscriptError::ToolUnavailable(_))
        ));
    }
}
