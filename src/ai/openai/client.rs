use super::types::{ApiErrorResponse, ChatCompletionRequest, ChatCompletionResponse};
use crate::{Error, Result};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Authenticated JSON calls against an OpenAI-compatible API.
///
/// Chat and image clients each own one of these, built over the same pooled
/// [`Client`]; only the timeout differs between them.
pub struct OpenAiHttpClient {
    pub(crate) client: Client,
    pub(crate) api_key: String,
    pub(crate) base_url: String,
    pub(crate) timeout: Duration,
}

impl OpenAiHttpClient {
    pub fn new_with_client(
        api_key: String,
        base_url: String,
        client: Client,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// POST `request` as JSON to `path` and decode the JSON reply.
    pub async fn post<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        path: &str,
        request: &Req,
    ) -> Result<Resp> {
        let url = self.endpoint(path);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .inspect_err(|e| error!("Request to {} failed: {}", path, e))?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = api_error_message(status, &body);
            error!("{} on {}", message, path);
            return Err(Error::AiProvider(message));
        }

        serde_json::from_str(&body).map_err(|e| {
            error!("Undecodable reply from {}: {} (body: {})", path, e, body);
            Error::AiProvider(format!("Failed to parse OpenAI response: {}", e))
        })
    }

    pub async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        self.post("/v1/chat/completions", request).await
    }
}

/// Prefer the message from OpenAI's `{"error": {...}}` envelope; fall back to
/// the raw body for proxies and gateways that answer in plain text.
fn api_error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(ApiErrorResponse { error }) => match error.kind {
            Some(kind) => format!(
                "OpenAI API error (status {}, {}): {}",
                status, kind, error.message
            ),
            None => format!("OpenAI API error (status {}): {}", status, error.message),
        },
        Err(_) => format!("OpenAI API error (status {}): {}", status, body.trim()),
    }
}
