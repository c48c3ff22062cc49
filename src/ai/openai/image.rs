use super::client::OpenAiHttpClient;
use super::types::{ImageGenerationRequest, ImageGenerationResponse};
use crate::ai::ImageGenerationService;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const IMAGE_TIMEOUT: Duration = Duration::from_secs(120);

/// Square size requested for every dish image.
pub const IMAGE_SIZE: &str = "256x256";

pub struct OpenAiImageClient {
    http: OpenAiHttpClient,
    model: String,
}

impl OpenAiImageClient {
    pub fn new_with_client(
        api_key: String,
        model: String,
        base_url: String,
        client: Client,
    ) -> Self {
        Self {
            http: OpenAiHttpClient::new_with_client(api_key, base_url, client, IMAGE_TIMEOUT),
            model,
        }
    }
}

#[async_trait]
impl ImageGenerationService for OpenAiImageClient {
    async fn generate_image(&self, prompt: &str) -> Result<Option<String>> {
        let request = ImageGenerationRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            n: 1,
            size: IMAGE_SIZE.to_string(),
        };

        let response: ImageGenerationResponse =
            self.http.post("/v1/images/generations", &request).await?;

        // Models that only return inline data still yield something a browser can show.
        Ok(response.data.into_iter().next().and_then(|image| {
            image.url.or_else(|| {
                image
                    .b64_json
                    .map(|b64| format!("data:image/png;base64,{}", b64))
            })
        }))
    }
}
