//! OpenAI-compatible LLM provider.
//!
//! Used for the secondary provider (Groq), but works with any API that
//! speaks `/chat/completions`.

use async_trait::async_trait;
use reqwest::Client;

use super::error::{LLMError, error_from_response};
use super::provider::LLMProvider;
use super::types::{ChatRequest, ChatResponse, Message, Role};

/// OpenAI-compatible provider.
pub struct OpenAICompatibleProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAICompatibleProvider {
    #[must_use]
    pub fn new(client: Client, base_url: String, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl LLMProvider for OpenAICompatibleProvider {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, LLMError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let body = to_request(request);

        let mut req = self
            .client
            .post(&url)
            .header("Content-Type", "application/json");

        if let Some(ref key) = self.api_key {
            req = req.header("Authorization", format!("Bearer {}", key));
        }

        let response = req.json(&body).send().await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(response.json().await?)
    }
}

#[derive(serde::Serialize)]
struct Request {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// Flatten a request into `[system] + history + [user message]`.
///
/// History is passed through as-is; only the role names are mapped.
fn to_request(request: ChatRequest) -> Request {
    let mut messages = Vec::with_capacity(request.history.len() + 2);

    if let Some(system) = request.system {
        messages.push(Message::text(Role::System, system));
    }
    messages.extend(
        request
            .history
            .into_iter()
            .map(|turn| Message::text(turn.role.into(), turn.content)),
    );
    messages.push(Message::text(Role::User, request.message));

    Request {
        model: request.model,
        messages,
        temperature: request.temperature,
        max_tokens: request.max_tokens,
    }
}
