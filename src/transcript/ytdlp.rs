//! Subtitle download through yt-dlp.

use super::{vtt_to_text, watch_url, Transcript, TranscriptSource};
use crate::config::TranscriptSettings;
use crate::error::{RecapError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// Fetches manual or auto-generated subtitles with yt-dlp.
pub struct YtDlpTranscriptSource {
    ytdlp_path: String,
    languages: Vec<String>,
    timeout: Duration,
}

impl YtDlpTranscriptSource {
    pub fn new(ytdlp_path: &str, languages: Vec<String>, timeout: Duration) -> Self {
        Self {
            ytdlp_path: ytdlp_path.to_string(),
            languages,
            timeout,
        }
    }

    pub fn from_settings(settings: &TranscriptSettings) -> Self {
        Self::new(
            &settings.ytdlp_path,
            settings.languages.clone(),
            Duration::from_secs(settings.timeout_secs),
        )
    }

    async fn download_subtitles(&self, video_id: &str, dir: &Path) -> Result<()> {
        let template = dir.join("%(id)s.%(ext)s");
        let sub_langs = self.languages.join(",");

        let command = Command::new(&self.ytdlp_path)
            .arg("--skip-download")
            .arg("--write-subs")
            .arg("--write-auto-subs")
            .arg("--sub-langs")
            .arg(&sub_langs)
            .arg("--sub-format")
            .arg("vtt")
            .arg("--output")
            .arg(&template)
            .arg("--no-playlist")
            .arg("--quiet")
            .arg("--no-warnings")
            .arg(watch_url(video_id))
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, command).await {
            Err(_) => {
                return Err(RecapError::VideoSource(format!(
                    "yt-dlp timed out after {}s",
                    self.timeout.as_secs()
                )))
            }
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RecapError::ToolNotFound(self.ytdlp_path.clone()));
            }
            Ok(Err(e)) => {
                return Err(RecapError::VideoSource(format!("Failed to run yt-dlp: {e}")));
            }
            Ok(Ok(output)) => output,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RecapError::VideoSource(format!(
                "yt-dlp failed for {}: {}",
                video_id,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

/// Language code of a subtitle file named `<id>.<lang>.vtt`.
fn subtitle_language(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let (_, lang) = stem.rsplit_once('.')?;
    Some(lang.to_string())
}

/// Pick the subtitle file matching the earliest preferred language.
///
/// A preference of `en` also accepts regional variants such as `en-US`.
/// Falls back to any file when no preference matches.
fn pick_subtitle(files: &[PathBuf], languages: &[String]) -> Option<(PathBuf, Option<String>)> {
    let tagged: Vec<(PathBuf, Option<String>)> = files
        .iter()
        .map(|f| (f.clone(), subtitle_language(f)))
        .collect();

    for preferred in languages {
        let regional = format!("{}-", preferred);
        let found = tagged.iter().find(|(_, lang)| {
            lang.as_deref()
                .is_some_and(|l| l == preferred || l.starts_with(&regional))
        });
        if let Some(hit) = found {
            return Some(hit.clone());
        }
    }
    tagged.into_iter().next()
}

fn list_vtt_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "vtt"))
        .collect();
    files.sort();
    Ok(files)
}

#[async_trait]
impl TranscriptSource for YtDlpTranscriptSource {
    #[instrument(skip(self))]
    async fn fetch(&self, video_id: &str) -> Result<Transcript> {
        let temp_dir = tempfile::tempdir()?;
        info!("Fetching subtitles for {}", video_id);
        self.download_subtitles(video_id, temp_dir.path()).await?;

        let files = list_vtt_files(temp_dir.path())?;
        debug!("yt-dlp wrote {} subtitle files", files.len());

        let (path, language) = pick_subtitle(&files, &self.languages)
            .ok_or_else(|| RecapError::NoTranscript(video_id.to_string()))?;

        let text = vtt_to_text(&std::fs::read_to_string(&path)?);
        if text.trim().is_empty() {
            return Err(RecapError::NoTranscript(video_id.to_string()));
        }

        info!(
            "Transcript for {}: {} chars ({})",
            video_id,
            text.chars().count(),
            language.as_deref().unwrap_or("unknown language")
        );

        Ok(Transcript {
            video_id: video_id.to_string(),
            language,
            text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn langs(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_subtitle_language() {
        assert_eq!(
            subtitle_language(Path::new("/tmp/x/dQw4w9WgXcQ.en-US.vtt")),
            Some("en-US".to_string())
        );
        assert_eq!(subtitle_language(Path::new("noext.vtt")), None);
    }

    #[test]
    fn test_pick_subtitle_follows_preference_order() {
        let files = vec![
            PathBuf::from("id.de.vtt"),
            PathBuf::from("id.en-GB.vtt"),
            PathBuf::from("id.fr.vtt"),
        ];

        let (path, lang) = pick_subtitle(&files, &langs(&["fr", "en"])).unwrap();
        assert_eq!(path, PathBuf::from("id.fr.vtt"));
        assert_eq!(lang.as_deref(), Some("fr"));

        let (path, _) = pick_subtitle(&files, &langs(&["en", "fr"])).unwrap();
        assert_eq!(path, PathBuf::from("id.en-GB.vtt"));

        let (path, _) = pick_subtitle(&files, &langs(&["ja"])).unwrap();
        assert_eq!(path, PathBuf::from("id.de.vtt"));

        assert!(pick_subtitle(&[], &langs(&["en"])).is_none());
    }

    #[test]
    fn test_list_vtt_files_ignores_other_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("id.en.vtt"), "WEBVTT").unwrap();
        std::fs::write(dir.path().join("id.info.json"), "{}").unwrap();

        let files = list_vtt_files(dir.path()).unwrap();
        assert_eq!(files, vec![dir.path().join("id.en.vtt")]);
    }

    #[tokio::test]
    async fn test_missing_binary_is_tool_not_found() {
        let source = YtDlpTranscriptSource::new(
            "recap-test-no-such-yt-dlp-binary",
            langs(&["en"]),
            Duration::from_secs(5),
        );
        let err = source.fetch("dQw4w9WgXcQ").await.unwrap_err();
        assert!(matches!(err, RecapError::ToolNotFound(_)));
    }
}
