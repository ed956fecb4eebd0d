use std::io::ErrorKind;
use std::path::Path;

use tokio::fs;

use serde::Deserialize;
use thiserror::Error;

use crate::llm::{GeminiProvider, Provider};

// ============================================================================
// Config (root)
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    /// System persona sent with every conversation.
    #[serde(default = "default_persona")]
    pub persona: String,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            persona: default_persona(),
            providers: ProvidersConfig::default(),
        }
    }
}

impl Config {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::Io(e)),
        };
        Ok(serde_saphyr::from_str(&contents)?)
    }

    /// Apply the `PORT` environment variable, if set.
    pub fn with_port_override(mut self, port: Option<String>) -> Result<Self, ConfigError> {
        if let Some(port) = port {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port))?;
        }
        Ok(self)
    }
}

fn default_persona() -> String {
    "You are a helpful, friendly assistant. Answer clearly and concisely, \
     and use Markdown when it helps readability."
        .to_string()
}

// ============================================================================
// ServerConfig
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout() -> u64 {
    60
}

// ============================================================================
// ProvidersConfig
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersConfig {
    /// Timeout for each outbound provider call.
    #[serde(default = "default_provider_timeout")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub groq: GroqConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_provider_timeout(),
            gemini: GeminiConfig::default(),
            groq: GroqConfig::default(),
        }
    }
}

fn default_provider_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
    #[serde(default = "default_fast_model")]
    pub fast_model: String,
    #[serde(default = "default_capable_model")]
    pub capable_model: String,
    /// Ground answers with Google Search.
    #[serde(default)]
    pub web_search: bool,
    /// Sampling temperature; provider default when unset.
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Output token cap; provider default when unset.
    #[serde(default)]
    pub max_output_tokens: Option<u32>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: default_gemini_base_url(),
            fast_model: default_fast_model(),
            capable_model: default_capable_model(),
            web_search: false,
            temperature: None,
            max_output_tokens: None,
        }
    }
}

fn default_gemini_base_url() -> String {
    GeminiProvider::DEFAULT_BASE_URL.to_string()
}

fn default_fast_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_capable_model() -> String {
    "gemini-2.5-pro".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroqConfig {
    #[serde(default = "default_groq_base_url")]
    pub base_url: String,
    #[serde(default = "default_groq_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            base_url: default_groq_base_url(),
            model: default_groq_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_groq_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_groq_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1024
}

// ============================================================================
// Credentials
// ============================================================================

/// Provider API keys, read once at startup.
#[derive(Clone, Default)]
pub struct Credentials {
    pub gemini_api_key: Option<String>,
    pub groq_api_key: Option<String>,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build credentials from a variable lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |provider: Provider| {
            lookup(provider.api_key_env())
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            gemini_api_key: read(Provider::Gemini),
            groq_api_key: read(Provider::Groq),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("gemini_api_key", &self.gemini_api_key.as_ref().map(|_| "***"))
            .field("groq_api_key", &self.groq_api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

// ============================================================================
// ConfigError
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_saphyr::Error),

    #[error("invalid port: {0:?}")]
    InvalidPort(String),
}

// ============================================================================
// Tests
// ============================================================================
