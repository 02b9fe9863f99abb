//! Text generation providers.
//!
//! Every provider is reached through the [`TextGenerator`] trait. Provider
//! adapters classify failures into [`LlmError`] variants so callers can tell
//! rate limits apart from everything else without inspecting messages.

mod ollama;
mod openai;

pub use ollama::OllamaGenerator;
pub use openai::OpenAiCompatibleGenerator;

use crate::config::{LlmProvider, LlmSettings};
use crate::error::{RecapError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Classified failure of a single generation call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    /// The provider throttled the request.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The credential was missing, malformed or rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The request could not be built or was rejected as malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Network failure, outage or any other provider-side error.
    #[error("provider error: {0}")]
    Provider(String),

    /// The provider answered without any content.
    #[error("empty response from model")]
    Empty,
}

impl LlmError {
    /// Whether this failure should be retried after a cooldown.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, LlmError::RateLimited(_))
    }

    /// Classify a free-text provider error message.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();

        if lower.contains("rate_limit")
            || lower.contains("rate limit")
            || lower.contains("too many requests")
        {
            LlmError::RateLimited(message)
        } else if lower.contains("invalid_api_key")
            || lower.contains("invalid api key")
            || lower.contains("incorrect api key")
            || lower.contains("unauthorized")
        {
            LlmError::Auth(message)
        } else {
            LlmError::Provider(message)
        }
    }

    /// Classify an HTTP error status together with the response body.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        match status.as_u16() {
            429 => LlmError::RateLimited(format!("HTTP 429: {}", body)),
            401 | 403 => LlmError::Auth(format!("HTTP {}: {}", status.as_u16(), body)),
            400 | 404 | 422 => LlmError::InvalidRequest(format!("HTTP {}: {}", status.as_u16(), body)),
            _ => LlmError::classify(format!("HTTP {}: {}", status.as_u16(), body)),
        }
    }
}

/// Trait for text generation backends.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for a fully rendered prompt.
    async fn generate(&self, prompt: &str) -> std::result::Result<String, LlmError>;

    /// Model identifier, for logging.
    fn model(&self) -> &str;
}

/// Accept a provider's answer.
///
/// A missing message is [`LlmError::Empty`]. Blank text is a valid answer
/// and is returned as is, so the pipeline decides what blank output means.
pub(crate) fn completion_text(content: Option<String>) -> std::result::Result<String, LlmError> {
    content.ok_or(LlmError::Empty)
}

/// Check an API key before any request is made.
pub fn validate_api_key(provider: LlmProvider, key: &str) -> Result<()> {
    let key = key.trim();
    if key.is_empty() {
        return Err(RecapError::InvalidCredential(format!(
            "{} API key is empty",
            provider
        )));
    }
    if provider == LlmProvider::Groq && !key.starts_with("gsk_") {
        return Err(RecapError::InvalidCredential(
            "Groq API keys start with 'gsk_'".to_string(),
        ));
    }
    Ok(())
}

/// Resolve the API key for the configured provider.
///
/// An explicit key (e.g. from an API request) wins over the environment.
pub fn resolve_api_key(settings: &LlmSettings, explicit: Option<&str>) -> Result<Option<String>> {
    if let Some(key) = explicit.filter(|k| !k.trim().is_empty()) {
        return Ok(Some(key.trim().to_string()));
    }

    let Some(var) = settings.api_key_env() else {
        return Ok(None);
    };

    match std::env::var(&var) {
        Ok(key) if !key.trim().is_empty() => Ok(Some(key.trim().to_string())),
        _ => Err(RecapError::InvalidCredential(format!(
            "{} not set. Set it with: export {}='...'",
            var, var
        ))),
    }
}

/// Create the generator for the configured provider.
pub fn create_generator(
    settings: &LlmSettings,
    api_key: Option<&str>,
) -> Result<Arc<dyn TextGenerator>> {
    let model = settings.model_name();
    let base_url = settings.base_url();
    let timeout = Duration::from_secs(settings.timeout_secs);

    info!("Using {} provider with model {}", settings.provider, model);

    match settings.provider {
        LlmProvider::OpenAi | LlmProvider::Groq => {
            let key = resolve_api_key(settings, api_key)?.ok_or_else(|| {
                RecapError::InvalidCredential(format!("{} requires an API key", settings.provider))
            })?;
            validate_api_key(settings.provider, &key)?;
            Ok(Arc::new(OpenAiCompatibleGenerator::new(
                &base_url,
                &key,
                &model,
                settings.temperature,
                timeout,
            )?))
        }
        LlmProvider::Ollama => {
            let key = resolve_api_key(settings, api_key)?;
            Ok(Arc::new(OllamaGenerator::new(
                &base_url,
                key,
                &model,
                settings.temperature,
                timeout,
            )?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_rate_limit_messages() {
        assert!(LlmError::classify("Error: rate_limit exceeded").is_rate_limited());
        assert!(LlmError::classify("Rate Limit reached for model").is_rate_limited());
        assert!(LlmError::classify("429 Too Many Requests").is_rate_limited());
        assert!(!LlmError::classify("You exceeded your current quota").is_rate_limited());
    }

    #[test]
    fn test_classify_auth_and_other() {
        assert!(matches!(
            LlmError::classify("invalid_api_key: Invalid API Key"),
            LlmError::Auth(_)
        ));
        assert!(matches!(
            LlmError::classify("service unavailable"),
            LlmError::Provider(_)
        ));
    }

    #[test]
    fn test_from_status() {
        use reqwest::StatusCode;
        assert!(LlmError::from_status(StatusCode::TOO_MANY_REQUESTS, "").is_rate_limited());
        assert!(matches!(
            LlmError::from_status(StatusCode::UNAUTHORIZED, "nope"),
            LlmError::Auth(_)
        ));
        assert!(matches!(
            LlmError::from_status(StatusCode::BAD_REQUEST, "bad"),
            LlmError::InvalidRequest(_)
        ));
        assert!(matches!(
            LlmError::from_status(StatusCode::BAD_GATEWAY, "down"),
            LlmError::Provider(_)
        ));
    }

    #[test]
    fn test_completion_text() {
        assert_eq!(completion_text(None), Err(LlmError::Empty));
        assert_eq!(completion_text(Some("  ".to_string())).as_deref(), Ok("  "));
        assert_eq!(completion_text(Some("ok".to_string())).as_deref(), Ok("ok"));
    }

    #[test]
    fn test_validate_api_key() {
        assert!(validate_api_key(LlmProvider::Groq, "gsk_abc123").is_ok());
        assert!(validate_api_key(LlmProvider::Groq, "sk-abc123").is_err());
        assert!(validate_api_key(LlmProvider::OpenAi, "sk-abc123").is_ok());
        assert!(validate_api_key(LlmProvider::OpenAi, "  ").is_err());
    }

    #[test]
    fn test_explicit_key_wins() {
        let settings = LlmSettings {
            api_key_env: Some("RECAP_TEST_KEY_THAT_IS_NEVER_SET".to_string()),
            ..LlmSettings::default()
        };
        let key = resolve_api_key(&settings, Some("gsk_request")).unwrap();
        assert_eq!(key.as_deref(), Some("gsk_request"));
        assert!(matches!(
            resolve_api_key(&settings, None),
            Err(RecapError::InvalidCredential(_))
        ));
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let settings = LlmSettings {
            provider: LlmProvider::Ollama,
            ..LlmSettings::default()
        };
        assert_eq!(resolve_api_key(&settings, None).unwrap(), None);
        let generator = create_generator(&settings, None).unwrap();
        assert_eq!(generator.model(), "llama3.1:8b");
    }

    #[test]
    fn test_groq_rejects_malformed_explicit_key() {
        let settings = LlmSettings::default();
        let err = create_generator(&settings, Some("not-a-groq-key")).err().unwrap();
        assert!(matches!(err, RecapError::InvalidCredential(_)));
    }
}
