//! Model selection from a free-text hint.

use super::provider::Provider;

/// Which provider and variant a request is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelChoice {
    /// Gemini, fast variant.
    Fast,
    /// Gemini, capable variant.
    Capable,
    /// The OpenAI-compatible secondary provider.
    Secondary,
}

impl ModelChoice {
    /// Resolve a client model hint.
    ///
    /// Case-insensitive substring match, first match wins: `flash` → fast,
    /// `pro` → capable, `gemini` → capable, anything else → secondary.
    pub fn parse(hint: &str) -> Self {
        let hint = hint.to_lowercase();
        if hint.contains("flash") {
            ModelChoice::Fast
        } else if hint.contains("pro") || hint.contains("gemini") {
            ModelChoice::Capable
        } else {
            ModelChoice::Secondary
        }
    }

    pub fn provider(&self) -> Provider {
        match self {
            ModelChoice::Fast | ModelChoice::Capable => Provider::Gemini,
            ModelChoice::Secondary => Provider::Groq,
        }
    }
}
