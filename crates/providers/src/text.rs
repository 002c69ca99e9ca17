//! Text generation seam.

use async_trait::async_trait;

use crate::error::ProviderError;

/// One completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Overrides the client's default model.
    pub model: Option<String>,
}

impl TextRequest {
    pub fn new(prompt: impl Into<String>, max_tokens: u32, temperature: f32) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens,
            temperature,
            model: None,
        }
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }
}

/// A language model that answers a single prompt with text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(&self, request: &TextRequest) -> Result<String, ProviderError>;
}
