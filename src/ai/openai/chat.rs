use super::client::OpenAiHttpClient;
use super::types::{ChatCompletionRequest, ChatMessage};
use crate::ai::{ChatService, CompletionRequest};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const CHAT_TIMEOUT: Duration = Duration::from_secs(60);

pub struct OpenAiChatClient {
    http: OpenAiHttpClient,
    model: String,
}

impl OpenAiChatClient {
    pub fn new_with_client(
        api_key: String,
        model: String,
        base_url: String,
        client: Client,
    ) -> Self {
        Self {
            http: OpenAiHttpClient::new_with_client(api_key, base_url, client, CHAT_TIMEOUT),
            model,
        }
    }
}

#[async_trait]
impl ChatService for OpenAiChatClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: Some(request.system.clone()),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Some(request.user.clone()),
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        tracing::debug!(
            "Sending chat completion (model {}, max_tokens {})",
            self.model,
            request.max_tokens
        );
        let response = self.http.chat_completion(&body).await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::AiProvider("No choices in OpenAI chat response".to_string()))?;

        if choice.finish_reason.as_deref() == Some("length") {
            tracing::warn!("Chat completion hit the token limit; output may be truncated");
        }

        choice
            .message
            .content
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| Error::AiProvider("Empty response from OpenAI chat API".to_string()))
    }
}
