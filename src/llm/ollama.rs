//! Local Ollama provider using the native `/api/generate` endpoint.

use super::{completion_text, LlmError, TextGenerator};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Generator backed by a local (or self-hosted) Ollama server.
pub struct OllamaGenerator {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
}

impl OllamaGenerator {
    /// Create a generator for the Ollama server at `base_url`.
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        model: &str,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/generate", base_url.trim_end_matches('/')),
            api_key,
            model: model.to_string(),
            temperature,
        })
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> std::result::Result<String, LlmError> {
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
            },
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| LlmError::Provider(format!("Ollama request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::from_status(status, &text));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Provider(format!("Invalid Ollama response: {}", e)))?;

        if let Some(error) = parsed.error {
            return Err(LlmError::classify(error));
        }
        let text = completion_text(parsed.response)?;
        debug!("Received {} characters", text.len());
        Ok(text)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_normalization() {
        let generator = OllamaGenerator::new(
            "http://localhost:11434/",
            None,
            "llama3.1:8b",
            0.3,
            Duration::from_secs(10),
        )
        .unwrap();
        assert_eq!(generator.endpoint, "http://localhost:11434/api/generate");
    }

    #[test]
    fn test_blank_response_is_returned_not_an_error() {
        let parsed: GenerateResponse =
            serde_json::from_str(r#"{"model":"llama3.1:8b","response":"","done":true}"#).unwrap();
        assert_eq!(completion_text(parsed.response).as_deref(), Ok(""));

        let parsed: GenerateResponse = serde_json::from_str(r#"{"done":true}"#).unwrap();
        assert_eq!(completion_text(parsed.response), Err(LlmError::Empty));
    }

    #[test]
    fn test_request_shape() {
        let body = GenerateRequest {
            model: "llama3.1:8b",
            prompt: "hi",
            stream: false,
            options: GenerateOptions { temperature: 0.5 },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "llama3.1:8b");
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["temperature"], 0.5);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_provider_error() {
        let generator = OllamaGenerator::new(
            "http://127.0.0.1:1",
            None,
            "llama3.1:8b",
            0.3,
            Duration::from_secs(2),
        )
        .unwrap();
        let err = generator.generate("hello").await.unwrap_err();
        assert!(matches!(err, LlmError::Provider(_)));
    }
}
