//! Configuration settings for Recap.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub llm: LlmSettings,
    pub pipeline: PipelineSettings,
    pub tasks: TaskSettings,
    pub transcript: TranscriptSettings,
    pub search: SearchSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory where exports are written when no path is given.
    pub export_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            export_dir: ".".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// LLM provider type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// OpenAI chat completions.
    OpenAi,
    /// Groq (OpenAI-compatible endpoint).
    #[default]
    Groq,
    /// Local Ollama server.
    Ollama,
}

impl LlmProvider {
    /// Default API base URL for the provider.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "https://api.openai.com/v1",
            LlmProvider::Groq => "https://api.groq.com/openai/v1",
            LlmProvider::Ollama => "http://localhost:11434",
        }
    }

    /// Default model for the provider.
    pub fn default_model(&self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "gpt-4o-mini",
            LlmProvider::Groq => "llama-3.1-8b-instant",
            LlmProvider::Ollama => "llama3.1:8b",
        }
    }

    /// Environment variable holding the API key, if the provider needs one.
    pub fn default_api_key_env(&self) -> Option<&'static str> {
        match self {
            LlmProvider::OpenAi => Some("OPENAI_API_KEY"),
            LlmProvider::Groq => Some("GROQ_API_KEY"),
            LlmProvider::Ollama => None,
        }
    }
}

impl std::str::FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(LlmProvider::OpenAi),
            "groq" => Ok(LlmProvider::Groq),
            "ollama" | "local" => Ok(LlmProvider::Ollama),
            _ => Err(format!("Unknown LLM provider: {}", s)),
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmProvider::OpenAi => write!(f, "openai"),
            LlmProvider::Groq => write!(f, "groq"),
            LlmProvider::Ollama => write!(f, "ollama"),
        }
    }
}

/// LLM provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Provider (openai, groq, ollama).
    pub provider: LlmProvider,
    /// Model name. Uses the provider default when unset.
    pub model: Option<String>,
    /// API base URL. Uses the provider default when unset.
    pub base_url: Option<String>,
    /// Environment variable to read the API key from.
    pub api_key_env: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Groq,
            model: None,
            base_url: None,
            api_key_env: None,
            timeout_secs: 300,
            temperature: 0.3,
        }
    }
}

impl LlmSettings {
    /// Effective model name.
    pub fn model_name(&self) -> String {
        self.model
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| self.provider.default_model().to_string())
    }

    /// Effective API base URL.
    pub fn base_url(&self) -> String {
        self.base_url
            .clone()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| self.provider.default_base_url().to_string())
    }

    /// Effective API key environment variable, if any.
    pub fn api_key_env(&self) -> Option<String> {
        self.api_key_env
            .clone()
            .filter(|v| !v.is_empty())
            .or_else(|| self.provider.default_api_key_env().map(|s| s.to_string()))
    }
}

/// Settings shared by every pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Pause between consecutive generation calls, in milliseconds.
    pub inter_call_delay_ms: u64,
    /// Pause before retrying a rate-limited call, in seconds.
    pub rate_limit_cooldown_secs: u64,
    /// How many times a rate-limited call is retried.
    pub max_retries: u32,
    /// Upper bound on combine rounds over oversized intermediate text.
    pub max_combine_rounds: u32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            inter_call_delay_ms: 750,
            rate_limit_cooldown_secs: 5,
            max_retries: 1,
            max_combine_rounds: 3,
        }
    }
}

/// Size constants for a single task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskLimits {
    /// Inputs shorter than this (in characters) get a single direct call.
    pub direct_threshold: usize,
    /// Chunk size in characters. Must be smaller than `direct_threshold`.
    pub chunk_size: usize,
}

/// Per-task size constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskSettings {
    pub summarize: TaskLimits,
    pub translate: TaskLimits,
    pub notes: TaskLimits,
}

impl Default for TaskSettings {
    fn default() -> Self {
        Self {
            summarize: TaskLimits {
                direct_threshold: 3000,
                chunk_size: 2500,
            },
            translate: TaskLimits {
                direct_threshold: 2000,
                chunk_size: 1200,
            },
            notes: TaskLimits {
                direct_threshold: 3000,
                chunk_size: 2500,
            },
        }
    }
}

/// Transcript fetching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptSettings {
    /// Caption languages to try, in order of preference.
    pub languages: Vec<String>,
    /// Path or name of the yt-dlp executable.
    pub ytdlp_path: String,
    /// Timeout for a single yt-dlp invocation, in seconds.
    pub timeout_secs: u64,
}

impl Default for TranscriptSettings {
    fn default() -> Self {
        let languages = [
            "fr", "en", "es", "de", "it", "pt", "ru", "ja", "ko", "zh-Hans", "ar", "hi", "nl",
            "pl", "tr", "sv", "no", "da", "fi",
        ];
        Self {
            languages: languages.iter().map(|l| l.to_string()).collect(),
            ytdlp_path: "yt-dlp".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Related-video search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Number of related videos to return.
    pub max_results: usize,
    /// Maximum length of the query derived from a summary.
    pub query_max_chars: usize,
    /// Timeout for a search, in seconds.
    pub timeout_secs: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_results: 5,
            query_max_chars: 80,
            timeout_secs: 60,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::RecapError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("recap")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded export directory path.
    pub fn export_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.export_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parsing() {
        assert_eq!("groq".parse::<LlmProvider>().unwrap(), LlmProvider::Groq);
        assert_eq!("OpenAI".parse::<LlmProvider>().unwrap(), LlmProvider::OpenAi);
        assert_eq!("local".parse::<LlmProvider>().unwrap(), LlmProvider::Ollama);
        assert!("mistral".parse::<LlmProvider>().is_err());
        assert_eq!(LlmProvider::OpenAi.to_string(), "openai");
    }

    #[test]
    fn test_llm_defaults_follow_provider() {
        let mut llm = LlmSettings::default();
        assert_eq!(llm.model_name(), "llama-3.1-8b-instant");
        assert_eq!(llm.api_key_env().as_deref(), Some("GROQ_API_KEY"));

        llm.provider = LlmProvider::Ollama;
        assert_eq!(llm.base_url(), "http://localhost:11434");
        assert_eq!(llm.api_key_env(), None);

        llm.model = Some("mistral:7b".to_string());
        assert_eq!(llm.model_name(), "mistral:7b");
    }

    #[test]
    fn test_default_task_limits_keep_chunks_below_threshold() {
        let tasks = TaskSettings::default();
        for limits in [tasks.summarize, tasks.translate, tasks.notes] {
            assert!(limits.chunk_size < limits.direct_threshold);
        }
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [llm]
            provider = "ollama"

            [tasks.translate]
            direct_threshold = 4000
            chunk_size = 1500
            "#,
        )
        .unwrap();

        assert_eq!(settings.llm.provider, LlmProvider::Ollama);
        assert_eq!(settings.tasks.translate.direct_threshold, 4000);
        assert_eq!(settings.tasks.summarize.chunk_size, 2500);
        assert_eq!(settings.pipeline.max_retries, 1);
        assert_eq!(settings.transcript.languages.first().map(String::as_str), Some("fr"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.pipeline.max_combine_rounds = 1;
        settings.search.max_results = 8;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.pipeline.max_combine_rounds, 1);
        assert_eq!(loaded.search.max_results, 8);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.llm.provider, LlmProvider::Groq);
    }
}
