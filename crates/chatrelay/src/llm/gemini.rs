//! Gemini LLM provider with native API format.

use async_trait::async_trait;
use reqwest::Client;

use super::error::{LLMError, error_from_response};
use super::history::{NormalizedRole, normalize};
use super::provider::LLMProvider;
use super::types::{ChatRequest, ChatResponse, Choice, Message, Role, Usage};

/// Gemini provider speaking the `generateContent` REST API.
pub struct GeminiProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GeminiProvider {
    pub const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com";

    #[must_use]
    pub fn new(client: Client, api_key: String, base_url: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, LLMError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            request.model
        );
        let gemini_request = to_request(&request);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&gemini_request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let gemini_response: Response = response.json().await?;
        from_response(gemini_response)
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct Request {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(serde::Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<NormalizedRole>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

/// Built-in tools. Only Google Search grounding is used.
#[derive(serde::Serialize)]
enum Tool {
    #[serde(rename = "google_search")]
    GoogleSearch {},
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct Response {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    response_id: Option<String>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

// ============================================================================
// Conversions
// ============================================================================

fn to_request(request: &ChatRequest) -> Request {
    let system_instruction = request
        .system
        .as_ref()
        .filter(|s| !s.is_empty())
        .map(|s| SystemInstruction {
            parts: vec![Part::text(s.as_str())],
        });

    // Gemini rejects blank turns and conversations that open with `model`
    let mut contents: Vec<Content> = normalize(&request.history)
        .into_iter()
        .map(|turn| Content {
            role: Some(turn.role),
            parts: vec![Part::text(turn.content)],
        })
        .collect();
    contents.push(Content {
        role: Some(NormalizedRole::User),
        parts: vec![Part::text(request.message.as_str())],
    });

    let tools = if request.web_search {
        vec![Tool::GoogleSearch {}]
    } else {
        Vec::new()
    };

    let generation_config = (request.temperature.is_some() || request.max_tokens.is_some())
        .then(|| GenerationConfig {
            temperature: request.temperature,
            max_output_tokens: request.max_tokens,
        });

    Request {
        system_instruction,
        contents,
        tools,
        generation_config,
    }
}

fn from_response(response: Response) -> Result<ChatResponse, LLMError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .map(|r| format!("no candidates (blocked: {r})"))
            .unwrap_or_else(|| "no candidates".to_string());
        return Err(LLMError::MalformedResponse(reason));
    };

    let text = candidate
        .content
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.is_empty() {
        let reason = match candidate.finish_reason {
            Some(r) => format!("candidate has no text (finish reason: {r})"),
            None => "candidate has no text".to_string(),
        };
        return Err(LLMError::MalformedResponse(reason));
    }

    Ok(ChatResponse {
        id: response.response_id,
        choices: vec![Choice {
            index: 0,
            message: Some(Message::text(Role::Assistant, text)),
            finish_reason: candidate.finish_reason,
        }],
        usage: response.usage_metadata.map(|u| Usage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        }),
    })
}
