//! AI service integration for text and image generation
//!
//! Provider-agnostic traits for completion and image calls, with OpenAI
//! implementations and in-memory mocks for tests.

pub mod mock;
pub mod openai;

pub use mock::{MockChatClient, MockImageGenerationClient};
pub use openai::{OpenAiChatClient, OpenAiImageClient};

use crate::Result;
use async_trait::async_trait;

/// One completion call: a system/user message pair and its sampling settings.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[async_trait]
pub trait ChatService: Send + Sync {
    /// Return the text of the first choice. Blank output is an error.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    /// Request one square image for `prompt` and return its URL, if any.
    async fn generate_image(&self, prompt: &str) -> Result<Option<String>>;
}
