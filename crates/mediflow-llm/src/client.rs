//! OpenAI-compatible chat-completion HTTP client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use mediflow_core::config::LlmConfig;

use crate::error::LlmError;
use crate::{ChatCompletionService, ChatMessage, CompletionReply, ToolCall};

/// Request body for POST /v1/chat/completions.
#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    tools: &'a [serde_json::Value],
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ToolCall>,
}

/// HTTP client for an OpenAI-compatible chat-completion endpoint.
pub struct OpenAiClient {
    base_url: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Build a client from configuration.
    ///
    /// Fails when no API key is configured, so callers can degrade to a
    /// "service unavailable" response instead of failing per request.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config.resolve_api_key().ok_or(LlmError::MissingApiKey)?;
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| LlmError::Http(e.to_string()))?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn map_transport_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_connect() {
            LlmError::Connection(self.base_url.clone())
        } else if e.is_timeout() {
            LlmError::Timeout(e.to_string())
        } else {
            LlmError::Http(e.to_string())
        }
    }
}

#[async_trait]
impl ChatCompletionService for OpenAiClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[serde_json::Value],
    ) -> Result<CompletionReply, LlmError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = CompletionRequest {
            model: &self.model,
            messages,
            tools,
        };

        debug!(model = %self.model, messages = messages.len(), "Requesting completion");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::MalformedResponse(e.to_string()))?;

        let message = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| LlmError::MalformedResponse("no choices in response".to_string()))?;

        debug!(
            has_content = message.content.is_some(),
            tool_calls = message.tool_calls.len(),
            "Completion received"
        );

        Ok(CompletionReply {
            content: message.content,
            tool_calls: message.tool_calls,
        })
    }
}
