//! Minimal OpenAI chat-completions client.
//!
//! This crate is the boundary to the external text-generation provider. It
//! exposes the [`TextGenerator`] trait that the rest of the system depends
//! on, plus the production [`OpenAiClient`] implementation. Test doubles
//! live in `taleforge-test-support`.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Errors that can occur when calling the provider.
#[derive(Debug, Error)]
pub enum Error {
    /// No API key was configured. Surfaces when a call is attempted, not at
    /// construction, so a misconfigured process can still serve requests.
    #[error("OPENAI_API_KEY is not configured")]
    NoApiKey,

    /// Transport-level failure, including timeouts.
    #[error("network error: {0}")]
    Network(String),

    /// The provider returned a non-success status.
    #[error("provider error (status {status}): {message}")]
    Api {
        /// HTTP status code returned by the provider.
        status: u16,
        /// Response body, as returned.
        message: String,
    },

    /// The provider response could not be decoded.
    #[error("failed to parse provider response: {0}")]
    Parse(String),

    /// The provider returned no usable text.
    #[error("provider returned an empty completion")]
    EmptyCompletion,
}

/// A single completion request: one system instruction, one user prompt,
/// and fixed sampling parameters.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// System instruction establishing the writing persona.
    pub system: String,
    /// The user prompt.
    pub user: String,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

/// The seam between the system and the external provider.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generates text for the request, or fails with a provider error.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, Error>;
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// OpenAI chat-completions API client.
#[derive(Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
}

impl OpenAiClient {
    /// Creates a client with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_key(Some(api_key.into()))
    }

    /// Creates a client from `OPENAI_API_KEY` and `OPENAI_MODEL`. A missing
    /// key is deferred: every call will fail with [`Error::NoApiKey`].
    #[must_use]
    pub fn from_env() -> Self {
        let mut client = Self::with_key(std::env::var("OPENAI_API_KEY").ok());
        if let Ok(model) = std::env::var("OPENAI_MODEL") {
            client = client.with_model(model);
        }
        client
    }

    /// Overrides the model for this client.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn with_key(api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(120))
                .connect_timeout(Duration::from_secs(30))
                .build()
                .expect("failed to build HTTP client"),
            api_key,
            model: DEFAULT_MODEL.to_owned(),
        }
    }

    fn build_api_request(&self, request: &GenerationRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_owned(),
                    content: request.system.clone(),
                },
                ChatMessage {
                    role: "user".to_owned(),
                    content: request.user.clone(),
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

fn extract_text(response: ChatCompletionResponse) -> Result<String, Error> {
    let text = response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or(Error::EmptyCompletion)?;
    if text.trim().is_empty() {
        return Err(Error::EmptyCompletion);
    }
    Ok(text)
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, Error> {
        let api_key = self.api_key.as_deref().ok_or(Error::NoApiKey)?;
        let api_request = self.build_api_request(request);

        let response = self
            .client
            .post(format!("{API_BASE}/chat/completions"))
            .bearer_auth(api_key)
            .json(&api_request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api { status, message });
        }

        let api_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        extract_text(api_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_api_request_carries_prompt_and_sampling_parameters() {
        let client = OpenAiClient::new("sk-test").with_model("gpt-4o-mini");
        let request = GenerationRequest {
            system: "You are a creative story writer.".to_owned(),
            user: "Write a short story (200-400 words) about: a lost dragon".to_owned(),
            max_tokens: 400,
            temperature: 0.9,
        };

        let api_request = client.build_api_request(&request);
        let json = serde_json::to_value(&api_request).unwrap();

        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["max_tokens"], 400);
        assert!((json["temperature"].as_f64().unwrap() - 0.9).abs() < 1e-6);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], "You are a creative story writer.");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(
            json["messages"][1]["content"],
            "Write a short story (200-400 words) about: a lost dragon"
        );
    }

    #[test]
    fn test_extract_text_returns_first_choice() {
        let response: ChatCompletionResponse = serde_json::from_value(serde_json::json!({
            "choices": [
                { "message": { "role": "assistant", "content": "Once upon a time." } }
            ]
        }))
        .unwrap();

        assert_eq!(extract_text(response).unwrap(), "Once upon a time.");
    }

    #[test]
    fn test_extract_text_rejects_missing_choices() {
        let response: ChatCompletionResponse =
            serde_json::from_value(serde_json::json!({ "choices": [] })).unwrap();

        assert!(matches!(extract_text(response), Err(Error::EmptyCompletion)));
    }

    #[test]
    fn test_extract_text_rejects_blank_completion() {
        let response: ChatCompletionResponse = serde_json::from_value(serde_json::json!({
            "choices": [
                { "message": { "role": "assistant", "content": "   \n " } }
            ]
        }))
        .unwrap();

        assert!(matches!(extract_text(response), Err(Error::EmptyCompletion)));
    }

    #[tokio::test]
    async fn test_generate_without_api_key_fails_with_no_api_key() {
        let client = OpenAiClient::with_key(None);
        let request = GenerationRequest {
            system: "You are a creative story writer.".to_owned(),
            user: "Write a short story (200-400 words) about: a lost dragon".to_owned(),
            max_tokens: 400,
            temperature: 0.9,
        };

        let result = client.generate(&request).await;

        assert!(matches!(result, Err(Error::NoApiKey)));
    }
}
