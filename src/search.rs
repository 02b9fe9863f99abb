//! Related-video search.

use crate::config::SearchSettings;
use crate::error::{RecapError, Result};
use crate::transcript::watch_url;
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use std::sync::OnceLock;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// A video suggested from a summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub video_id: String,
    pub url: String,
}

impl Recommendation {
    pub fn new(title: &str, video_id: &str) -> Self {
        Self {
            title: title.to_string(),
            video_id: video_id.to_string(),
            url: watch_url(video_id),
        }
    }
}

/// Video search backend.
#[async_trait]
pub trait VideoSearch: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Recommendation>>;
}

/// Build a search query from a summary: its first sentence, capped at `max_chars`.
pub fn query_from_summary(summary: &str, max_chars: usize) -> Result<String> {
    let first_sentence = summary.split('.').next().unwrap_or_default();
    let query: String = first_sentence.trim().chars().take(max_chars).collect();
    let query = query.trim().to_string();
    if query.is_empty() {
        return Err(RecapError::InvalidInput(
            "Summary is empty, nothing to search for".to_string(),
        ));
    }
    Ok(query)
}

fn id_in_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:v=|shorts/)([a-zA-Z0-9_-]+)").expect("Invalid regex"))
}

/// Video id from a yt-dlp flat-playlist entry.
fn entry_video_id(entry: &serde_json::Value) -> Option<String> {
    let from_url = entry["url"]
        .as_str()
        .and_then(|url| id_in_url_regex().captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());

    from_url.or_else(|| {
        entry["id"]
            .as_str()
            .filter(|id| !id.is_empty())
            .map(str::to_string)
    })
}

/// Parse `--dump-json` output, one JSON object per line.
fn parse_search_output(stdout: &str, limit: usize) -> Vec<Recommendation> {
    let mut results = Vec::new();
    for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
        let entry: serde_json::Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                warn!("Skipping unparseable search result: {}", e);
                continue;
            }
        };
        let Some(video_id) = entry_video_id(&entry) else {
            debug!("Skipping search result without a video id");
            continue;
        };
        let title = entry["title"].as_str().unwrap_or("Untitled video");
        results.push(Recommendation::new(title, &video_id));
        if results.len() >= limit {
            break;
        }
    }
    results
}

/// Searches YouTube through yt-dlp's `ytsearch` extractor.
pub struct YtDlpSearch {
    ytdlp_path: String,
    timeout: Duration,
}

impl YtDlpSearch {
    pub fn new(ytdlp_path: &str, timeout: Duration) -> Self {
        Self {
            ytdlp_path: ytdlp_path.to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl VideoSearch for YtDlpSearch {
    #[instrument(skip(self))]
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Recommendation>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let target = format!("ytsearch{}:{}", limit, query);

        let command = Command::new(&self.ytdlp_path)
            .arg("--flat-playlist")
            .arg("--dump-json")
            .arg("--no-warnings")
            .arg(&target)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, command).await {
            Err(_) => return Err(RecapError::Search("search timed out".to_string())),
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RecapError::ToolNotFound(self.ytdlp_path.clone()));
            }
            Ok(Err(e)) => return Err(RecapError::Search(format!("Failed to run yt-dlp: {e}"))),
            Ok(Ok(output)) => output,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RecapError::Search(stderr.trim().to_string()));
        }

        let results = parse_search_output(&String::from_utf8_lossy(&output.stdout), limit);
        info!("Found {} related videos", results.len());
        Ok(results)
    }
}

/// Search backend configured from settings.
pub fn create_search(ytdlp_path: &str, settings: &SearchSettings) -> YtDlpSearch {
    YtDlpSearch::new(ytdlp_path, Duration::from_secs(settings.timeout_secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_is_first_sentence() {
        let summary = "Rust ownership explained simply. Then borrowing. Then lifetimes.";
        assert_eq!(
            query_from_summary(summary, 80).unwrap(),
            "Rust ownership explained simply"
        );
    }

    #[test]
    fn test_query_is_truncated_by_chars() {
        let summary = "é".repeat(200);
        let query = query_from_summary(&summary, 80).unwrap();
        assert_eq!(query.chars().count(), 80);
    }

    #[test]
    fn test_empty_query_is_rejected() {
        assert!(matches!(
            query_from_summary("  . second", 80),
            Err(RecapError::InvalidInput(_))
        ));
        assert!(query_from_summary("", 80).is_err());
    }

    #[test]
    fn test_parse_search_output() {
        let stdout = concat!(
            r#"{"id":"aaaaaaaaaaa","title":"First","url":"https://www.youtube.com/watch?v=aaaaaaaaaaa"}"#,
            "\n",
            "not json\n",
            r#"{"title":"No id at all"}"#,
            "\n",
            r#"{"id":"bbbbbbbbbbb","title":"Short","url":"https://www.youtube.com/shorts/bbbbbbbbbbb"}"#,
            "\n",
            r#"{"id":"ccccccccccc","title":"Third"}"#,
            "\n",
        );

        let results = parse_search_output(stdout, 5);
        assert_eq!(
            results,
            vec![
                Recommendation::new("First", "aaaaaaaaaaa"),
                Recommendation::new("Short", "bbbbbbbbbbb"),
                Recommendation::new("Third", "ccccccccccc"),
            ]
        );
        assert_eq!(results[1].url, "https://www.youtube.com/watch?v=bbbbbbbbbbb");

        assert_eq!(parse_search_output(stdout, 1).len(), 1);
    }

    #[tokio::test]
    async fn test_zero_limit_skips_search() {
        let search = YtDlpSearch::new("recap-test-no-such-yt-dlp-binary", Duration::from_secs(1));
        assert!(search.search("rust", 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_binary_is_tool_not_found() {
        let search = YtDlpSearch::new("recap-test-no-such-yt-dlp-binary", Duration::from_secs(5));
        let err = search.search("rust", 3).await.unwrap_err();
        assert!(matches!(err, RecapError::ToolNotFound(_)));
    }
}
