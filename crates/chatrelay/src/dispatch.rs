//! Routing a chat message to exactly one provider.
//!
//! [`Dispatcher::try_dispatch`] returns a typed error. [`Dispatcher::dispatch`]
//! never fails: it folds errors into an apology-style reply for the UI while
//! keeping the [`ErrorKind`] on the reply.

use std::fmt;

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{Config, ProvidersConfig};
use crate::llm::{ChatRequest, LLMError, ModelChoice, Provider, ProviderRegistry, Turn};

/// Reply used when the secondary provider answers without any content.
pub const EMPTY_REPLY_FALLBACK: &str = "Error from API";

// ============================================================================
// Reply and errors
// ============================================================================

/// Reply returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub content: String,
    /// `<provider>/<model>` that produced the reply.
    pub source_label: String,
    /// Set when `content` describes a failure.
    pub error: Option<ErrorKind>,
}

impl ChatReply {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Coarse failure classes exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The selected provider has no credential.
    Configuration,
    /// The outbound call failed, timed out or returned an error status.
    Network,
    /// The provider answered with an unexpected shape.
    MalformedResponse,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration_error",
            ErrorKind::Network => "network_error",
            ErrorKind::MalformedResponse => "malformed_response",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("{provider} provider is not configured (set {env_var})")]
    NotConfigured {
        provider: Provider,
        env_var: &'static str,
    },

    #[error("{provider} request failed: {source}")]
    Provider {
        provider: Provider,
        #[source]
        source: LLMError,
    },
}

impl DispatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::NotConfigured { .. } => ErrorKind::Configuration,
            DispatchError::Provider { source, .. } if source.is_malformed() => {
                ErrorKind::MalformedResponse
            }
            DispatchError::Provider { .. } => ErrorKind::Network,
        }
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Per-request settings resolved from configuration.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub persona: String,
    pub providers: ProvidersConfig,
}

impl From<&Config> for DispatchSettings {
    fn from(config: &Config) -> Self {
        Self {
            persona: config.persona.clone(),
            providers: config.providers.clone(),
        }
    }
}

/// Sends each message to the provider selected by its model hint.
#[derive(Clone)]
pub struct Dispatcher {
    registry: ProviderRegistry,
    settings: DispatchSettings,
}

impl Dispatcher {
    pub fn new(registry: ProviderRegistry, settings: DispatchSettings) -> Self {
        Self { registry, settings }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Dispatch and fold any failure into the reply text.
    pub async fn dispatch(&self, message: &str, history: &[Turn], model_hint: &str) -> ChatReply {
        let choice = ModelChoice::parse(model_hint);
        match self.try_dispatch_choice(message, history, choice).await {
            Ok(reply) => reply,
            Err(e) => {
                let kind = e.kind();
                warn!(error = %e, kind = %kind, model_hint, "Chat dispatch failed");
                ChatReply {
                    content: format!("Sorry, I couldn't get a response ({kind}): {e}"),
                    source_label: self.source_label(choice),
                    error: Some(kind),
                }
            }
        }
    }

    /// Dispatch a message, surfacing failures as [`DispatchError`].
    pub async fn try_dispatch(
        &self,
        message: &str,
        history: &[Turn],
        model_hint: &str,
    ) -> Result<ChatReply, DispatchError> {
        self.try_dispatch_choice(message, history, ModelChoice::parse(model_hint))
            .await
    }

    async fn try_dispatch_choice(
        &self,
        message: &str,
        history: &[Turn],
        choice: ModelChoice,
    ) -> Result<ChatReply, DispatchError> {
        let provider = choice.provider();
        let Some(client) = self.registry.get(&provider) else {
            return Err(DispatchError::NotConfigured {
                provider,
                env_var: provider.api_key_env(),
            });
        };

        let request = self.build_request(choice, message, history);
        let source_label = self.source_label(choice);
        debug!(
            %provider,
            model = %request.model,
            history_len = history.len(),
            "Dispatching chat request"
        );

        let response = client
            .chat(request)
            .await
            .map_err(|source| DispatchError::Provider { provider, source })?;

        let content = match (choice, response.first_content()) {
            (_, Some(content)) => content.to_string(),
            (ModelChoice::Secondary, None) => {
                warn!(%provider, "Provider returned no choice content, using fallback reply");
                EMPTY_REPLY_FALLBACK.to_string()
            }
            (ModelChoice::Fast | ModelChoice::Capable, None) => {
                return Err(DispatchError::Provider {
                    provider,
                    source: LLMError::MalformedResponse("response has no content".to_string()),
                });
            }
        };

        Ok(ChatReply {
            content,
            source_label,
            error: None,
        })
    }

    fn build_request(&self, choice: ModelChoice, message: &str, history: &[Turn]) -> ChatRequest {
        let providers = &self.settings.providers;
        let (temperature, max_tokens, web_search) = match choice {
            ModelChoice::Fast | ModelChoice::Capable => (
                providers.gemini.temperature,
                providers.gemini.max_output_tokens,
                providers.gemini.web_search,
            ),
            ModelChoice::Secondary => (
                Some(providers.groq.temperature),
                Some(providers.groq.max_tokens),
                false,
            ),
        };

        ChatRequest {
            model: self.model_for(choice).to_string(),
            system: Some(self.settings.persona.clone()),
            history: history.to_vec(),
            message: message.to_string(),
            temperature,
            max_tokens,
            web_search,
        }
    }

    fn model_for(&self, choice: ModelChoice) -> &str {
        let providers = &self.settings.providers;
        match choice {
            ModelChoice::Fast => &providers.gemini.fast_model,
            ModelChoice::Capable => &providers.gemini.capable_model,
            ModelChoice::Secondary => &providers.groq.model,
        }
    }

    fn source_label(&self, choice: ModelChoice) -> String {
        format!("{}/{}", choice.provider(), self.model_for(choice))
    }
}
