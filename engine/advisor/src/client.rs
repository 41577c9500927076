//! Chat-completions HTTP client

use crate::config::AdvisorConfig;
use crate::error::{AdvisorError, Result};
use crate::prompt::Prompt;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// Turns a prompt into the model's text answer
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &Prompt) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Pull the assistant text out of a successful response body
///
/// A missing or blank first choice is [`AdvisorError::EmptyCompletion`].
pub fn parse_completion(body: &str) -> Result<String> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| AdvisorError::UnexpectedResponse(format!("{e}")))?;

    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .unwrap_or_default();

    if content.trim().is_empty() {
        return Err(AdvisorError::EmptyCompletion);
    }
    Ok(content)
}

/// Friendliest message available from an error body
pub fn error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) if !body.trim().is_empty() => body.trim().to_string(),
        Err(_) => format!("completion request failed with status {status}"),
    }
}

/// OpenAI-compatible `/chat/completions` client
pub struct ChatCompletionClient {
    config: AdvisorConfig,
    api_key: String,
    http_client: Client,
}

impl ChatCompletionClient {
    /// Create a client; fails when no API key can be resolved
    pub fn new(config: AdvisorConfig) -> Result<Self> {
        config.validate().map_err(AdvisorError::Config)?;

        let api_key = config
            .resolve_api_key()
            .ok_or_else(|| AdvisorError::MissingApiKey { var: config.api_key_env.clone() })?;

        let http_client = Client::builder().timeout(config.request_timeout()).build()?;

        Ok(Self { config, api_key, http_client })
    }

    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    fn request<'a>(&'a self, prompt: &'a Prompt) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage { role: "system", content: &prompt.system },
                ChatMessage { role: "user", content: &prompt.user },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }
}

#[async_trait]
impl CompletionClient for ChatCompletionClient {
    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        info!(model = %self.config.model, "Requesting completion");

        let response = self
            .http_client
            .post(&self.config.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request(prompt))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_message(status.as_u16(), &body);
            error!(status = status.as_u16(), message = %message, "Completion request failed");
            return Err(AdvisorError::Api { status: status.as_u16(), message });
        }

        debug!(bytes = body.len(), "Completion received");
        parse_completion(&body)
    }
}
