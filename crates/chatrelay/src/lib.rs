//! Chatrelay - a minimal chat backend that relays conversations to Gemini or
//! an OpenAI-compatible provider.

pub mod config;
pub mod dispatch;
pub mod handlers;
pub mod llm;
pub mod response;
pub mod server;
