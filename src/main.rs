use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use youtube_transcript::cli::{Cli, Commands, OutputFormat};
use youtube_transcript::config::Config;
use youtube_transcript::mcp::McpServer;
use youtube_transcript::output::{self, TranscriptReport};
use youtube_transcript::youtube::{TranscriptFetcher, YtDlpClient};
use youtube_transcript::utils;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let config = Config::load().await?;

    // Check for required external dependencies (non-fatal, the path may still resolve later)
    if matches!(cli.command, Commands::Transcript { .. } | Commands::Download { .. } | Commands::Serve) {
        for dep in utils::check_dependencies(&config.youtube.yt_dlp_path).await {
            tracing::warn!("Missing dependency: {}", dep);
        }
    }

    match cli.command {
        Commands::Transcript {
            url,
            lang,
            paragraphs,
            output,
            json,
            gap_threshold,
            max_fragments,
        } => {
            let lang = lang.or_else(|| config.youtube.default_language.clone());
            let mut options = config.formatting.clone();
            options.enable_paragraphs |= paragraphs;
            if let Some(threshold) = gap_threshold {
                options.time_gap_threshold = threshold;
            }
            if let Some(max) = max_fragments {
                options.max_fragments_per_paragraph = max;
            }

            tracing::info!("Processing YouTube video: {}", url);
            let fetcher = TranscriptFetcher::new(YtDlpClient::new(&config.youtube)?);
            let fetched = fetcher.fetch_transcripts(&url, lang.as_deref()).await?;

            let report = TranscriptReport::new(fetched, &options);
            tracing::info!("Video ID: {}", report.video_id);
            tracing::info!("Found {} transcript segments", report.transcript_count);
            tracing::info!("Title: {}", report.title);
            tracing::info!("Language: {}", report.language);
            tracing::info!("Total duration: {}", utils::format_duration(report.total_duration));

            let format = OutputFormat::from_json_flag(json);
            let written = match output {
                Some(path) => {
                    let written = output::save_to_file(&report, &path, format).await?;
                    tracing::info!("Transcript saved to: {}", path.display());
                    written
                }
                None => output::print_to_console(&report, format)?,
            };

            tracing::info!("Successfully extracted transcript ({} characters)", written);
        }
        Commands::Download { url, output, quality } => {
            tracing::info!("Processing YouTube video download: {}", url);
            let fetcher = TranscriptFetcher::new(YtDlpClient::new(&config.youtube)?);

            let progress = ProgressBar::new_spinner();
            progress.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
            );
            progress.set_message("Downloading video with yt-dlp...");
            progress.enable_steady_tick(Duration::from_millis(120));

            match fetcher.download(&url, &output, quality).await {
                Ok(path) => {
                    progress.finish_with_message("Download complete");
                    println!("Video saved to: {}", path.display());
                }
                Err(e) => {
                    progress.abandon_with_message("Download failed");
                    return Err(e);
                }
            }
        }
        Commands::Serve => {
            let fetcher = TranscriptFetcher::new(YtDlpClient::new(&config.youtube)?);
            McpServer::new(fetcher, config.formatting.clone())
                .serve_stdio()
                .await?;
        }
        Commands::Config { show } => {
            if show {
                config.display();
            } else {
                let path = config.save().await?;
                println!("Configuration written to: {}", path.display());
            }
        }
    }

    Ok(())
}

fn init_tracing(cli: &Cli) {
    let default_level = if cli.verbose {
        "youtube_transcript=debug"
    } else if cli.quiet {
        "youtube_transcript=warn"
    } else {
        "youtube_transcript=info"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into());

    // Stdout is reserved for transcripts and MCP messages.
    let registry = tracing_subscriber::registry().with(filter);
    if cli.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
