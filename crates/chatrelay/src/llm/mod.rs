//! LLM provider clients for chat completions.

mod error;
mod gemini;
mod history;
mod model;
mod openai;
mod provider;
mod registry;
mod types;

pub use error::LLMError;
pub use gemini::GeminiProvider;
pub use history::{NormalizedRole, NormalizedTurn, normalize};
pub use model::ModelChoice;
pub use openai::OpenAICompatibleProvider;
pub use provider::{LLMProvider, Provider};
pub use registry::ProviderRegistry;
pub use types::{
    ChatRequest, ChatResponse, Choice, Message, Role, Turn, TurnRole, Usage, deserialize_history,
};
