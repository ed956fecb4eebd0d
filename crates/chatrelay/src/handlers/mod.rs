//! HTTP request handlers.

mod chat;
mod health;
mod version;

pub use chat::{chat, clear_conversation, get_history, not_found};
pub use health::{livez, readyz};
pub use version::version;
