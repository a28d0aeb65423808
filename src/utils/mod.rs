use std::path::{Path, PathBuf};

use crate::transcript::TranscriptFragment;

/// Format seconds as `HH:MM:SS.mmm`
pub fn format_time(seconds: f64) -> String {
    let hours = (seconds / 3600.0).floor() as u64;
    let minutes = ((seconds % 3600.0) / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    let ms = ((seconds % 1.0) * 1000.0).floor() as u64;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, ms)
}

/// Latest end time across all fragments, in seconds
pub fn calculate_total_duration(fragments: &[TranscriptFragment]) -> f64 {
    fragments
        .iter()
        .fold(0.0, |acc, fragment| acc.max(fragment.end_time()))
}

/// Format duration in human-readable format
pub fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Resolve where a downloaded video should land.
///
/// A directory (existing, or spelled with a trailing separator) gets `<video_id>.mp4` inside it.
pub fn resolve_video_path(output: &Path, video_id: &str) -> PathBuf {
    let as_str = output.to_string_lossy();
    let looks_like_dir = as_str.ends_with('/') || as_str.ends_with(std::path::MAIN_SEPARATOR);

    if output.is_dir() || looks_like_dir {
        output.join(format!("{}.mp4", video_id))
    } else {
        output.to_path_buf()
    }
}

/// Check if the current environment has required tools
pub async fn check_dependencies(yt_dlp_path: &str) -> Vec<String> {
    let mut missing = Vec::new();

    if !check_command_available(yt_dlp_path).await {
        missing.push(format!(
            "{} - required for fetching captions and downloading videos",
            yt_dlp_path
        ));
    }

    missing
}

/// Check if a command is available in PATH
async fn check_command_available(command: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "00:00:00.000");
        assert_eq!(format_time(65.5), "00:01:05.500");
        assert_eq!(format_time(3661.123), "01:01:01.123");
        assert_eq!(format_time(7323.456), "02:02:03.456");
    }

    #[test]
    fn test_calculate_total_duration() {
        let fragments = vec![
            TranscriptFragment::new("test1", 0.0, 5.0),
            TranscriptFragment::new("test2", 10.0, 3.0),
            TranscriptFragment::new("test3", 20.0, 7.0),
        ];
        assert_eq!(calculate_total_duration(&fragments), 27.0);
        assert_eq!(calculate_total_duration(&[]), 0.0);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(30.0), "30s");
        assert_eq!(format_duration(90.0), "1m 30s");
        assert_eq!(format_duration(3661.0), "1h 1m 1s");
    }

    #[test]
    fn test_resolve_video_path() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            resolve_video_path(dir.path(), "gzBS9eh-Eh4"),
            dir.path().join("gzBS9eh-Eh4.mp4")
        );
        assert_eq!(
            resolve_video_path(Path::new("out/"), "gzBS9eh-Eh4"),
            Path::new("out/").join("gzBS9eh-Eh4.mp4")
        );
        assert_eq!(
            resolve_video_path(Path::new("clip.mp4"), "gzBS9eh-Eh4"),
            PathBuf::from("clip.mp4")
        );
    }

    #[tokio::test]
    async fn test_missing_tool_is_reported() {
        let missing = check_dependencies("definitely-not-a-real-binary-xyz").await;
        assert_eq!(missing.len(), 1);
        assert!(missing[0].starts_with("definitely-not-a-real-binary-xyz"));
    }
}
