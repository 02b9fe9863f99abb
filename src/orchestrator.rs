//! Feature orchestrator for Recap.
//!
//! Coordinates transcript fetching, the reduction pipeline and related-video
//! search for the summarize, translate, notes and recommend features.

use crate::config::{Prompts, Settings};
use crate::error::{RecapError, Result};
use crate::llm::{create_generator, TextGenerator};
use crate::notes::tidy_notes;
use crate::pipeline::{HierarchicalReducer, TaskSpec};
use crate::search::{create_search, query_from_summary, Recommendation, VideoSearch};
use crate::session::{Session, Translation};
use crate::transcript::{parse_video_url, TranscriptSource, YtDlpTranscriptSource};
use indicatif::ProgressBar;
use std::sync::Arc;
use tracing::{info, instrument};

/// Notes language used when nothing else is known.
pub const DEFAULT_NOTES_LANGUAGE: &str = "English";

/// A video summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub video_id: String,
    pub text: String,
}

/// The main orchestrator.
pub struct Orchestrator {
    settings: Settings,
    prompts: Prompts,
    reducer: HierarchicalReducer,
    transcripts: Arc<dyn TranscriptSource>,
    search: Arc<dyn VideoSearch>,
}

impl Orchestrator {
    /// Create an orchestrator with the API key taken from the environment.
    pub fn new(settings: Settings) -> Result<Self> {
        Self::with_api_key(settings, None)
    }

    /// Create an orchestrator, preferring `api_key` over the environment.
    pub fn with_api_key(settings: Settings, api_key: Option<&str>) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;
        let generator = create_generator(&settings.llm, api_key)?;
        let transcripts = Arc::new(YtDlpTranscriptSource::from_settings(&settings.transcript));
        let search = Arc::new(create_search(&settings.transcript.ytdlp_path, &settings.search));

        Ok(Self::with_components(settings, prompts, generator, transcripts, search))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        generator: Arc<dyn TextGenerator>,
        transcripts: Arc<dyn TranscriptSource>,
        search: Arc<dyn VideoSearch>,
    ) -> Self {
        let reducer = HierarchicalReducer::from_settings(generator, &settings.pipeline);
        Self {
            settings,
            prompts,
            reducer,
            transcripts,
            search,
        }
    }

    /// Report generation calls on `progress`.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.reducer = self.reducer.with_progress(progress);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Fetch the transcript for `url` and make it the session's current video.
    #[instrument(skip(self, session))]
    pub async fn load_video(&self, session: &mut Session, url: &str) -> Result<String> {
        let video_id = parse_video_url(url)?;
        let transcript = self.transcripts.fetch(&video_id).await?;
        if transcript.text.trim().is_empty() {
            return Err(RecapError::NoTranscript(video_id));
        }
        session.start_video(url.trim(), &video_id, transcript.text);
        Ok(video_id)
    }

    /// Fetch a video's transcript and summarize it.
    #[instrument(skip(self, session))]
    pub async fn summarize_video(&self, session: &mut Session, url: &str) -> Result<Summary> {
        let video_id = self.load_video(session, url).await?;
        let transcript = session.transcript.as_deref().unwrap_or_default();

        let text = self.summarize_text(transcript).await?;
        session.summary = Some(text.clone());
        Ok(Summary { video_id, text })
    }

    /// Summarize arbitrary text in its own language.
    pub async fn summarize_text(&self, text: &str) -> Result<String> {
        let spec = TaskSpec::summarize(&self.settings, &self.prompts);
        let reduction = self.reducer.reduce(&spec, text).await?;
        info!(
            "Summary: {} chars from {} calls",
            reduction.text.chars().count(),
            reduction.generation_calls
        );
        Ok(reduction.text)
    }

    /// Translate the session's summary.
    pub async fn translate(&self, session: &mut Session, target_language: &str) -> Result<String> {
        let summary = session
            .summary
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| RecapError::InvalidInput("Generate a summary first".to_string()))?;

        let text = self.translate_text(summary, target_language).await?;
        session.translation = Some(Translation {
            language: target_language.trim().to_string(),
            text: text.clone(),
        });
        Ok(text)
    }

    /// Translate arbitrary text into `target_language`.
    pub async fn translate_text(&self, text: &str, target_language: &str) -> Result<String> {
        let target_language = require_language(target_language)?;
        let spec = TaskSpec::translate(&self.settings, &self.prompts, target_language);
        self.reducer.run(&spec, text).await
    }

    /// Generate study notes from the session's transcript.
    ///
    /// Without an explicit language the notes follow the last translation,
    /// or English.
    pub async fn notes(&self, session: &mut Session, language: Option<&str>) -> Result<String> {
        let transcript = session
            .transcript
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| RecapError::InvalidInput("Load a video first".to_string()))?;

        let language = language
            .filter(|l| !l.trim().is_empty())
            .or(session.translation_language())
            .unwrap_or(DEFAULT_NOTES_LANGUAGE)
            .to_string();

        let notes = self.notes_from_text(transcript, &language).await?;
        session.notes = Some(notes.clone());
        Ok(notes)
    }

    /// Generate study notes from arbitrary text.
    pub async fn notes_from_text(&self, text: &str, language: &str) -> Result<String> {
        let language = require_language(language)?;
        let spec = TaskSpec::notes(&self.settings, &self.prompts, language);
        let notes = self.reducer.run(&spec, text).await?;
        Ok(tidy_notes(&notes))
    }

    /// Find videos related to the session's summary.
    pub async fn recommend(&self, session: &mut Session, limit: Option<usize>) -> Result<Vec<Recommendation>> {
        let summary = session
            .summary
            .as_deref()
            .ok_or_else(|| RecapError::InvalidInput("Generate a summary first".to_string()))?;

        let results = self.recommend_for(summary, limit).await?;
        session.recommendations = results.clone();
        Ok(results)
    }

    /// Find videos related to a summary text.
    pub async fn recommend_for(&self, summary: &str, limit: Option<usize>) -> Result<Vec<Recommendation>> {
        recommend_with(self.search.as_ref(), &self.settings, summary, limit).await
    }
}

/// Related-video search without a generator, for callers that only search.
pub async fn recommend_with(
    search: &dyn VideoSearch,
    settings: &Settings,
    summary: &str,
    limit: Option<usize>,
) -> Result<Vec<Recommendation>> {
    let query = query_from_summary(summary, settings.search.query_max_chars)?;
    let limit = limit.unwrap_or(settings.search.max_results);
    info!("Searching related videos for \"{}\"", query);
    search.search(&query, limit).await
}

fn require_language(language: &str) -> Result<&str> {
    let language = language.trim();
    if language.is_empty() {
        return Err(RecapError::InvalidInput(
            "Target language must not be empty".to_string(),
        ));
    }
    Ok(language)
}
