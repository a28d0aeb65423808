use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;

use super::protocol::{CallToolResult, JsonRpcError, ToolContent};
use crate::output::{format_as_text, TranscriptReport};
use crate::transcript::FormatOptions;
use crate::youtube::{extract_video_id, TranscriptFetcher, VideoQuality, YoutubeClient};
use crate::TranscriptError;

pub const GET_TRANSCRIPTS: &str = "get_transcripts";
pub const DOWNLOAD_VIDEO: &str = "download_video";

/// Language codes accepted by `get_transcripts`, with the caption track code each selects
pub const LANGUAGE_CODES: &[(&str, &str)] = &[
    ("en", "en"),
    ("ja", "ja"),
    ("ru", "ru"),
    ("zh", "zh"),
    ("kr", "ko"),
    ("fr", "fr"),
    ("ge", "de"),
];

const GET_TRANSCRIPTS_DESCRIPTION: &str = "Extract and process transcripts from a YouTube video.\n\n\
**Parameters:**\n\
- `url` (string, required): YouTube video URL or ID.\n\
- `lang` (string, optional, default 'en'): Language code for transcripts (e.g. 'en', 'ja', 'ru', 'zh').\n\
- `enableParagraphs` (boolean, optional, default false): Enable automatic paragraph breaks.\n\n\
**IMPORTANT:** If the user does *not* specify a language *code*, **DO NOT** include the `lang` parameter in the tool call. \
Do not guess the language or use parts of the user query as the language code, if user specify the language, use the language code instead.";

const DOWNLOAD_VIDEO_DESCRIPTION: &str = "Download a YouTube video to a specified path.\n\n\
**Parameters:**\n\
- `url` (string, required): YouTube video URL or ID.\n\
- `outputPath` (string, optional, default './'): The file or directory to save the video to.";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTranscriptsArgs {
    pub url: String,
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default)]
    pub enable_paragraphs: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadVideoArgs {
    pub url: String,
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
}

fn default_lang() -> String {
    "en".to_string()
}

fn default_output_path() -> PathBuf {
    PathBuf::from("./")
}

/// Tool descriptors returned by `tools/list`
pub fn tool_definitions() -> Value {
    json!([
        {
            "name": GET_TRANSCRIPTS,
            "description": GET_TRANSCRIPTS_DESCRIPTION,
            "inputSchema": {
                "type": "object",
                "properties": {
                    "url": {"type": "string", "description": "YouTube video URL or ID"},
                    "lang": {
                        "type": "string",
                        "default": "en",
                        "description": "Language code for transcripts, default 'en' (e.g. 'en', 'zh', 'ja', 'ru')"
                    },
                    "enableParagraphs": {
                        "type": "boolean",
                        "default": false,
                        "description": "Enable automatic paragraph breaks, default `false`"
                    }
                },
                "required": ["url"]
            }
        },
        {
            "name": DOWNLOAD_VIDEO,
            "description": DOWNLOAD_VIDEO_DESCRIPTION,
            "inputSchema": {
                "type": "object",
                "properties": {
                    "url": {"type": "string", "description": "YouTube video URL or ID"},
                    "outputPath": {"type": "string", "default": "./", "description": "Output file path"}
                },
                "required": ["url"]
            }
        }
    ])
}

/// Map a tool language code to a caption track code
pub fn resolve_language(code: &str) -> Result<&'static str, TranscriptError> {
    LANGUAGE_CODES
        .iter()
        .find(|(tool_code, _)| *tool_code == code)
        .map(|(_, track_code)| *track_code)
        .ok_or_else(|| TranscriptError::UnsupportedLanguage {
            code: code.to_string(),
            supported: LANGUAGE_CODES
                .iter()
                .map(|(tool_code, _)| *tool_code)
                .collect::<Vec<_>>()
                .join(", "),
        })
}

pub fn parse_args<T: for<'de> Deserialize<'de>>(tool: &str, arguments: Value) -> Result<T, JsonRpcError> {
    let arguments = if arguments.is_null() { json!({}) } else { arguments };
    serde_json::from_value(arguments)
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid arguments for {}: {}", tool, e)))
}

pub async fn get_transcripts<C: YoutubeClient>(
    fetcher: &TranscriptFetcher<C>,
    defaults: &FormatOptions,
    args: GetTranscriptsArgs,
) -> Result<CallToolResult, JsonRpcError> {
    let video_id = extract_video_id(&args.url).map_err(invalid_params)?;
    tracing::info!("Processing transcripts for video: {}", video_id);

    let track_language = match resolve_language(&args.lang) {
        Ok(language) => language,
        Err(e) => return Ok(failed("process transcripts", &e)),
    };

    let fetched = match fetcher.fetch_transcripts(&video_id, Some(track_language)).await {
        Ok(fetched) => fetched,
        Err(e) => return classify("process transcripts", e),
    };

    let options = defaults.clone().paragraphs(args.enable_paragraphs);
    let report = TranscriptReport::new(fetched, &options);
    // Counted in UTF-16 code units, the unit MCP clients measure strings in
    let char_count = report.formatted_text.encode_utf16().count();

    tracing::info!(
        "Successfully extracted transcripts for \"{}\" ({} chars)",
        report.title,
        char_count
    );

    let metadata = json!({
        "videoId": report.video_id,
        "title": report.title,
        "language": args.lang,
        "timestamp": report.timestamp,
        "charCount": char_count,
        "transcriptCount": report.transcript_count,
        "totalDuration": report.total_duration,
        "paragraphsEnabled": args.enable_paragraphs,
    });

    Ok(CallToolResult::success(
        ToolContent::text(format_as_text(&report)).with_metadata(metadata),
    ))
}

pub async fn download_video<C: YoutubeClient>(
    fetcher: &TranscriptFetcher<C>,
    args: DownloadVideoArgs,
) -> Result<CallToolResult, JsonRpcError> {
    let video_id = extract_video_id(&args.url).map_err(invalid_params)?;
    tracing::info!("Downloading video {} to {}", video_id, args.output_path.display());

    let path = match fetcher
        .download(&video_id, &args.output_path, VideoQuality::default())
        .await
    {
        Ok(path) => path,
        Err(e) => return classify("download video", e),
    };

    let metadata = json!({
        "videoId": video_id,
        "path": path.display().to_string(),
        "timestamp": chrono::Utc::now(),
    });

    Ok(CallToolResult::success(
        ToolContent::text(format!("Video successfully downloaded to {}", path.display()))
            .with_metadata(metadata),
    ))
}

fn invalid_params(err: anyhow::Error) -> JsonRpcError {
    JsonRpcError::invalid_params(err.to_string())
}

fn failed(action: &str, err: &dyn std::fmt::Display) -> CallToolResult {
    CallToolResult::error(format!("Failed to {}: {}", action, err))
}

/// Caller mistakes become protocol errors; anything else is reported inside the tool result
fn classify(action: &str, err: anyhow::Error) -> Result<CallToolResult, JsonRpcError> {
    let invalid_input = err
        .downcast_ref::<TranscriptError>()
        .is_some_and(TranscriptError::is_invalid_input);

    if invalid_input {
        return Err(invalid_params(err));
    }

    tracing::warn!("Tool call failed: {:#}", err);
    Ok(failed(action, &format!("{:#}", err)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::protocol::INVALID_PARAMS;

    #[test]
    fn test_resolve_language() {
        assert_eq!(resolve_language("en").unwrap(), "en");
        assert_eq!(resolve_language("kr").unwrap(), "ko");
        assert_eq!(resolve_language("ge").unwrap(), "de");

        let err = resolve_language("xx").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unsupported language code: xx. Supported codes are: en, ja, ru, zh, kr, fr, ge"
        );
    }

    #[test]
    fn test_parse_args_defaults() {
        let args: GetTranscriptsArgs =
            parse_args(GET_TRANSCRIPTS, json!({"url": "gzBS9eh-Eh4"})).unwrap();
        assert_eq!(args.lang, "en");
        assert!(!args.enable_paragraphs);

        let args: DownloadVideoArgs = parse_args(DOWNLOAD_VIDEO, json!({"url": "x"})).unwrap();
        assert_eq!(args.output_path, PathBuf::from("./"));
    }

    #[test]
    fn test_parse_args_missing_url() {
        let err = parse_args::<GetTranscriptsArgs>(GET_TRANSCRIPTS, Value::Null).unwrap_err();
        assert_eq!(err.code, INVALID_PARAMS);
        assert!(err.message.contains("url"));
    }

    #[test]
    fn test_tool_definitions() {
        let tools = tool_definitions();
        let names: Vec<_> = tools
            .as_array()
            .unwrap()
            .iter()
            .map(|tool| tool["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec![GET_TRANSCRIPTS, DOWNLOAD_VIDEO]);
        assert_eq!(tools[0]["inputSchema"]["required"], json!(["url"]));
    }
}
