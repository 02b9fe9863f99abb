//! Video transcripts.
//!
//! A [`TranscriptSource`] turns a video id into plain text. The default
//! source downloads subtitles with yt-dlp; tests plug in their own.

mod vtt;
mod ytdlp;

pub use vtt::vtt_to_text;
pub use ytdlp::YtDlpTranscriptSource;

use crate::error::{RecapError, Result};
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Plain-text transcript of one video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub video_id: String,
    /// Subtitle language code the text came from, if known.
    pub language: Option<String>,
    pub text: String,
}

/// Something that can fetch a transcript for a video.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the transcript for `video_id`.
    ///
    /// Returns [`RecapError::NoTranscript`] when the video has no usable
    /// subtitles in any preferred language.
    async fn fetch(&self, video_id: &str) -> Result<Transcript>;
}

fn video_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?x)
            (?:
                (?:https?://)?
                (?:www\.|m\.)?
                (?:youtube\.com/watch\?(?:.*&)?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/v/|youtube\.com/shorts/)
                ([a-zA-Z0-9_-]{11})
            )
            |
            ^([a-zA-Z0-9_-]{11})$
        ",
        )
        .expect("Invalid regex")
    })
}

/// Extract the 11-character video id from a YouTube URL or bare id.
pub fn extract_video_id(input: &str) -> Option<String> {
    let caps = video_id_regex().captures(input.trim())?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
}

/// Like [`extract_video_id`], failing with `InvalidInput`.
pub fn parse_video_url(input: &str) -> Result<String> {
    if input.trim().is_empty() {
        return Err(RecapError::InvalidInput(
            "Please provide a YouTube URL".to_string(),
        ));
    }
    extract_video_id(input)
        .ok_or_else(|| RecapError::InvalidInput(format!("Invalid YouTube URL: {}", input.trim())))
}

/// Canonical watch URL for a video id.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id() {
        let cases = [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://m.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "dQw4w9WgXcQ",
            "  dQw4w9WgXcQ  ",
        ];
        for case in cases {
            assert_eq!(extract_video_id(case), Some("dQw4w9WgXcQ".to_string()), "{}", case);
        }

        assert_eq!(extract_video_id("not-a-video-id"), None);
        assert_eq!(extract_video_id("https://vimeo.com/123456789"), None);
        assert_eq!(extract_video_id(""), None);
    }

    #[test]
    fn test_parse_video_url_errors() {
        assert!(matches!(parse_video_url("   "), Err(RecapError::InvalidInput(_))));
        let err = parse_video_url("https://example.com").unwrap_err();
        assert!(err.to_string().contains("Invalid YouTube URL"));
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(watch_url("abc123def45"), "https://www.youtube.com/watch?v=abc123def45");
    }
}
