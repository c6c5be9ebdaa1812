//! Client side of the external chat model.
//!
//! The rest of the workspace talks to the model through [`ChatModel`], so
//! the HTTP backend can be swapped or faked in tests.

mod error;
mod ollama;
mod types;

use async_trait::async_trait;

pub use error::ModelError;
pub use ollama::{OllamaClient, DEFAULT_OLLAMA_URL};
pub use types::{ChatMessage, Role};

#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Sends one conversation and returns the text of the model's reply.
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String, ModelError>;

    /// Whether the backend answers at all.
    async fn check_health(&self) -> Result<bool, ModelError>;

    /// Identifier of the model requests are sent to.
    fn model_name(&self) -> &str;
}
