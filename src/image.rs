//! Dish image requests
//!
//! Wraps an [`ImageGenerationService`] so that image failures degrade to "no
//! image" instead of failing the dish.

use crate::ai::ImageGenerationService;
use tracing::{error, info, warn};

/// Longest prompt, in characters, sent to the image service.
pub const MAX_IMAGE_PROMPT_CHARS: usize = 1000;

pub struct ImageRequester {
    service: Box<dyn ImageGenerationService>,
}

impl ImageRequester {
    pub fn new(service: Box<dyn ImageGenerationService>) -> Self {
        Self { service }
    }

    /// Generate one image for `description`, returning its URL.
    ///
    /// Never fails: errors and empty results are logged and become `None`.
    pub async fn generate_image(&self, description: &str) -> Option<String> {
        let prompt = truncate_chars(description, MAX_IMAGE_PROMPT_CHARS);

        match self.service.generate_image(prompt).await {
            Ok(Some(url)) => {
                info!("Generated dish image");
                Some(url)
            }
            Ok(None) => {
                warn!("Image service returned no images");
                None
            }
            Err(e) => {
                error!("Error generating image: {}", e);
                None
            }
        }
    }
}

/// The longest prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
