use anyhow::Result;
use std::path::Path;

use crate::cli::OutputFormat;

pub mod formatters;

pub use formatters::*;

fn render(report: &TranscriptReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format_as_text(report)),
        OutputFormat::Json => format_as_json(report),
    }
}

/// Save a transcript report to file, returning the number of characters written
pub async fn save_to_file(report: &TranscriptReport, path: &Path, format: OutputFormat) -> Result<usize> {
    let content = render(report, format)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs_err::create_dir_all(parent)?;
    }
    fs_err::write(path, &content)?;

    Ok(content.chars().count())
}

/// Print a transcript report to stdout, returning the number of characters printed
pub fn print_to_console(report: &TranscriptReport, format: OutputFormat) -> Result<usize> {
    let content = render(report, format)?;
    println!("{}", content);
    Ok(content.chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::{FormatOptions, TranscriptFragment};
    use crate::youtube::FetchedTranscript;

    #[tokio::test]
    async fn test_save_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("transcript.md");
        let report = TranscriptReport::new(
            FetchedTranscript {
                video_id: "gzBS9eh-Eh4".to_string(),
                title: "Saved".to_string(),
                language: "en".to_string(),
                transcripts: vec![TranscriptFragment::new("Just one line .", 0.0, 1.0)],
            },
            &FormatOptions::default(),
        );

        let written = save_to_file(&report, &path, OutputFormat::Text).await.unwrap();
        let content = fs_err::read_to_string(&path).unwrap();
        assert_eq!(content, "# Saved\n\nJust one line.");
        assert_eq!(written, content.chars().count());
    }
}
