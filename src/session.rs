//! Per-request working state and export.
//!
//! A [`Session`] is owned by whoever drives a run (one CLI invocation, one
//! HTTP request) and handed to the orchestrator by `&mut`.

use crate::error::Result;
use crate::search::Recommendation;
use chrono::Local;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// A translated summary and the language it was translated into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub language: String,
    pub text: String,
}

/// Everything produced for the current video.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    pub video_url: Option<String>,
    pub video_id: Option<String>,
    pub transcript: Option<String>,
    pub summary: Option<String>,
    pub translation: Option<Translation>,
    pub notes: Option<String>,
    pub recommendations: Vec<Recommendation>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to a new video. Outputs derived from the previous one are dropped.
    pub fn start_video(&mut self, url: &str, video_id: &str, transcript: String) {
        self.video_url = Some(url.to_string());
        self.video_id = Some(video_id.to_string());
        self.transcript = Some(transcript);
        self.summary = None;
        self.translation = None;
        self.notes = None;
        self.recommendations.clear();
    }

    /// Language of the last translation, if any.
    pub fn translation_language(&self) -> Option<&str> {
        self.translation.as_ref().map(|t| t.language.as_str())
    }

    /// Whether there is nothing worth exporting. Blank outputs count as absent.
    pub fn is_empty(&self) -> bool {
        let blank = |text: Option<&str>| text.map_or(true, |t| t.trim().is_empty());
        blank(self.summary.as_deref())
            && blank(self.translation.as_ref().map(|t| t.text.as_str()))
            && blank(self.notes.as_deref())
            && self.recommendations.is_empty()
    }

    /// Render the selected sections as one document.
    pub fn export(&self, options: &ExportOptions) -> String {
        let rule = |c: char| c.to_string().repeat(50);
        let mut out = String::from("# YouTube Video Summary Export\n\n");
        out.push_str(&rule('='));
        out.push_str("\n\n");

        let mut section = |title: &str, body: &str| {
            out.push_str(&format!("## {}\n\n{}\n\n{}\n\n", title, body.trim(), rule('-')));
        };

        if options.summary {
            if let Some(summary) = &self.summary {
                section("📄 SUMMARY", summary);
            }
        }
        if options.translation {
            if let Some(translation) = &self.translation {
                section(
                    &format!("🌐 TRANSLATION ({})", translation.language),
                    &translation.text,
                );
            }
        }
        if options.notes {
            if let Some(notes) = &self.notes {
                section("📝 STRUCTURED NOTES", &strip_html(notes));
            }
        }
        if options.recommendations && !self.recommendations.is_empty() {
            let body = self
                .recommendations
                .iter()
                .map(|r| match options.format {
                    ExportFormat::Md => format!("- [{}]({})", r.title, r.url),
                    ExportFormat::Txt => format!("- {}: {}", r.title, r.url),
                })
                .collect::<Vec<_>>()
                .join("\n");
            section("🎬 RECOMMENDATIONS", &body);
        }

        out
    }
}

/// Output file format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Txt,
    Md,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Md => "md",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "txt" | "text" => Ok(ExportFormat::Txt),
            "md" | "markdown" => Ok(ExportFormat::Md),
            _ => Err(format!("Unknown export format: {}", s)),
        }
    }
}

/// Which sections to export, and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    pub summary: bool,
    pub translation: bool,
    pub notes: bool,
    pub recommendations: bool,
    pub format: ExportFormat,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            summary: true,
            translation: true,
            notes: true,
            recommendations: true,
            format: ExportFormat::Txt,
        }
    }
}

/// File name stem for an export made now, e.g. `youtube_summary_20250101_120000`.
pub fn default_export_name() -> String {
    format!("youtube_summary_{}", Local::now().format("%Y%m%d_%H%M%S"))
}

/// Write `content` to `<dir>/<name>.<ext>`, creating `dir` if needed.
pub fn write_export(dir: &Path, name: &str, format: ExportFormat, content: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.{}", name, format.extension()));
    std::fs::write(&path, content)?;
    Ok(path)
}

fn strip_html(text: &str) -> String {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    TAGS.get_or_init(|| Regex::new(r"<[^>]+>").expect("Invalid regex"))
        .replace_all(text, "")
        .to_string()
}
