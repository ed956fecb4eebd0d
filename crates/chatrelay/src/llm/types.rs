//! Common types for LLM chat completions.

use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Conversation turns (client-supplied)
// ============================================================================

/// One prior message of a conversation, as supplied by the client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    #[serde(default)]
    pub role: TurnRole,
    #[serde(default)]
    pub content: String,
}

impl Turn {
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(TurnRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(TurnRole::Assistant, content)
    }
}

/// Speaker of a [`Turn`].
///
/// Only the exact string `"user"` reads as [`TurnRole::User`]; every other
/// value is a non-user turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum TurnRole {
    User,
    #[default]
    Assistant,
}

impl From<String> for TurnRole {
    fn from(value: String) -> Self {
        if value == "user" {
            TurnRole::User
        } else {
            TurnRole::Assistant
        }
    }
}

/// Deserialize a history field leniently.
///
/// `null`, a missing field or a non-array value is an empty history, and
/// array elements that are not turn objects are skipped.
pub fn deserialize_history<'de, D>(deserializer: D) -> Result<Vec<Turn>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let serde_json::Value::Array(items) = value else {
        return Ok(Vec::new());
    };

    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<Turn>(item).ok())
        .collect())
}

// ============================================================================
// Provider-facing request/response
// ============================================================================

/// A chat request handed to a provider.
///
/// Each provider converts this into its native wire format.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub system: Option<String>,
    pub history: Vec<Turn>,
    pub message: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub web_search: bool,
}

/// A message in an OpenAI-compatible conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Some compatible servers omit the role on replies.
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub content: Option<String>,
}

impl Message {
    pub fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
        }
    }
}

/// The role of a message sender.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    #[default]
    Assistant,
}

impl From<TurnRole> for Role {
    fn from(role: TurnRole) -> Self {
        match role {
            TurnRole::User => Role::User,
            TurnRole::Assistant => Role::Assistant,
        }
    }
}

/// A chat completion response (OpenAI-compatible format).
#[derive(Debug, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_nullable_vec")]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl ChatResponse {
    /// Text content of the first choice, if any.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.as_deref())
    }
}

/// Read `null` the same as a missing list.
fn deserialize_nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A single completion choice.
#[derive(Debug, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Token usage statistics.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}
