//! Provider registry for managing LLM provider instances.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::{info, warn};

use super::error::LLMError;
use super::gemini::GeminiProvider;
use super::openai::OpenAICompatibleProvider;
use super::provider::{LLMProvider, Provider};
use crate::config::{Credentials, ProvidersConfig};

/// Registry of LLM providers, keyed by provider type.
///
/// Only providers with a credential are registered.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<Provider, Arc<dyn LLMProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build providers from configuration and startup credentials.
    pub fn from_config(
        config: &ProvidersConfig,
        credentials: &Credentials,
    ) -> Result<Self, LLMError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        let mut registry = Self::new();

        if let Some(ref api_key) = credentials.gemini_api_key {
            let provider = GeminiProvider::new(
                client.clone(),
                api_key.clone(),
                config.gemini.base_url.clone(),
            );
            registry.register(Provider::Gemini, Arc::new(provider));
            info!(base_url = %config.gemini.base_url, "Registered Gemini provider");
        }

        if let Some(ref api_key) = credentials.groq_api_key {
            let provider = OpenAICompatibleProvider::new(
                client,
                config.groq.base_url.clone(),
                Some(api_key.clone()),
            );
            registry.register(Provider::Groq, Arc::new(provider));
            info!(base_url = %config.groq.base_url, "Registered Groq provider");
        }

        if registry.providers.is_empty() {
            warn!(
                "No LLM providers configured. \
                Set {} or {}.",
                Provider::Gemini.api_key_env(),
                Provider::Groq.api_key_env()
            );
        }

        Ok(registry)
    }

    /// Register a provider implementation.
    pub fn register(&mut self, provider: Provider, implementation: Arc<dyn LLMProvider>) {
        self.providers.insert(provider, implementation);
    }

    /// Get a provider by type.
    pub fn get(&self, provider: &Provider) -> Option<Arc<dyn LLMProvider>> {
        self.providers.get(provider).cloned()
    }

    pub fn is_configured(&self, provider: &Provider) -> bool {
        self.providers.contains_key(provider)
    }
}
