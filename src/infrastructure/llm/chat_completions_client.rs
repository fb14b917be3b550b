use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::application::ports::{LlmClient, LlmClientError};
use crate::domain::{OutputFormat, UNKNOWN_LANGUAGE};
use crate::presentation::config::LlmSettings;

/// Text generation through an OpenAI-compatible `/chat/completions` endpoint
/// (Open WebUI, Ollama, OpenAI). Each output format is served by its own
/// model, typically a preset carrying the formatting instructions.
pub struct ChatCompletionsClient {
    client: Client,
    base_url: String,
    api_key: String,
    default_model: String,
    summary_model: Option<String>,
    keypoints_model: Option<String>,
    interview_model: Option<String>,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Serialize, Deserialize, Clone)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl ChatCompletionsClient {
    pub fn new(settings: &LlmSettings) -> Result<Self, LlmClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| LlmClientError::ApiRequestFailed(format!("http client: {}", e)))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            default_model: settings.default_model.clone(),
            summary_model: settings.summary_model.clone(),
            keypoints_model: settings.keypoints_model.clone(),
            interview_model: settings.interview_model.clone(),
        })
    }

    pub fn model_for(&self, format: OutputFormat) -> &str {
        let preset = match format {
            OutputFormat::Text => None,
            OutputFormat::Summary => self.summary_model.as_deref(),
            OutputFormat::Keypoints => self.keypoints_model.as_deref(),
            OutputFormat::Interview => self.interview_model.as_deref(),
        };
        preset.unwrap_or(&self.default_model)
    }

    fn build_messages(&self, text: &str, language: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(2);
        if !language.is_empty() && language != UNKNOWN_LANGUAGE {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: format!("The transcription language is '{}'.", language),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: text.to_string(),
        });
        messages
    }
}

#[async_trait]
impl LlmClient for ChatCompletionsClient {
    async fn generate(
        &self,
        text: &str,
        format: OutputFormat,
        language: &str,
    ) -> Result<String, LlmClientError> {
        let model = self.model_for(format);
        let request_body = ChatCompletionRequest {
            model,
            messages: self.build_messages(text, language),
            stream: false,
        };

        tracing::debug!(model, format = %format, "Requesting text generation");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| LlmClientError::ApiRequestFailed(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmClientError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmClientError::ApiRequestFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmClientError::InvalidResponse(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| LlmClientError::InvalidResponse("no choices".to_string()))
    }
}
