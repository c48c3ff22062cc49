use super::{ChatService, CompletionRequest, ImageGenerationService};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Scripted [`ChatService`]. Responses are replayed in order and cycle once
/// exhausted; selected calls (0-based) can be made to fail.
#[derive(Clone)]
pub struct MockChatClient {
    responses: Arc<Mutex<Vec<String>>>,
    failing_calls: Arc<Mutex<HashSet<usize>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockChatClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            failing_calls: Arc::new(Mutex::new(HashSet::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push(response.into());
        self
    }

    pub fn with_failure_on_call(self, call: usize) -> Self {
        self.failing_calls.lock().unwrap().insert(call);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn get_requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockChatClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatService for MockChatClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let call = {
            let mut count = self.call_count.lock().unwrap();
            *count += 1;
            *count - 1
        };
        self.requests.lock().unwrap().push(request.clone());

        if self.failing_calls.lock().unwrap().contains(&call) {
            return Err(Error::AiProvider(format!("Mock chat failure on call {}", call)));
        }

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(format!("Mock completion for: {}", request.user))
        } else {
            Ok(responses[call % responses.len()].clone())
        }
    }
}

pub const MOCK_IMAGE_URL: &str = "https://mock-images.example.com/dish.png";

/// Scripted [`ImageGenerationService`] that records every prompt it receives.
#[derive(Clone)]
pub struct MockImageGenerationClient {
    response: Arc<Mutex<Option<String>>>,
    should_fail: Arc<Mutex<bool>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockImageGenerationClient {
    pub fn new() -> Self {
        Self {
            response: Arc::new(Mutex::new(Some(MOCK_IMAGE_URL.to_string()))),
            should_fail: Arc::new(Mutex::new(false)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_url(self, url: impl Into<String>) -> Self {
        *self.response.lock().unwrap() = Some(url.into());
        self
    }

    /// Succeed but return no image.
    pub fn with_no_image(self) -> Self {
        *self.response.lock().unwrap() = None;
        self
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn get_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Default for MockImageGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageGenerationService for MockImageGenerationClient {
    async fn generate_image(&self, prompt: &str) -> Result<Option<String>> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        if *self.should_fail.lock().unwrap() {
            return Err(Error::AiProvider("Mock image failure".to_string()));
        }

        Ok(self.response.lock().unwrap().clone())
    }
}
