//! Prompt improvement and comic progression prompts.

use std::sync::Arc;

use storyloom_core::comic::{clean_progression, validate_progression_count};
use storyloom_core::error::CoreError;
use storyloom_core::extraction::JsonShape;
use storyloom_core::prompts::{self, IMPROVE_MAX_TOKENS, PROGRESSION_MAX_TOKENS, TEXT_TEMPERATURE};
use storyloom_providers::{TextGenerator, TextRequest};

use crate::structured::{call, generate_json};

pub struct PromptImprover {
    text: Arc<dyn TextGenerator>,
    model: Option<String>,
}

impl PromptImprover {
    pub fn new(text: Arc<dyn TextGenerator>) -> Self {
        Self { text, model: None }
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    /// Rewrite `prompt` into a richer scene description.
    ///
    /// Prompts shorter than 20 characters are rejected before any call.
    pub async fn improve(&self, prompt: &str) -> Result<String, CoreError> {
        prompts::validate_improve_prompt(prompt)?;

        let request = TextRequest::new(
            prompts::improve_instruction(prompt),
            IMPROVE_MAX_TOKENS,
            TEXT_TEMPERATURE,
        )
        .with_model(self.model.clone());
        let raw = call(self.text.as_ref(), &request, "improve").await?;

        let improved = raw.trim().to_string();
        if improved.is_empty() {
            return Err(CoreError::MalformedOutput {
                stage: "improve",
                reason: "empty improved prompt".to_string(),
                raw,
            });
        }
        tracing::debug!(
            original_chars = prompt.chars().count(),
            improved_chars = improved.chars().count(),
            "Prompt improved",
        );
        Ok(improved)
    }

    /// Generate `count` follow-up panel descriptions continuing `prompt`.
    pub async fn progression(&self, prompt: &str, count: u32) -> Result<Vec<String>, CoreError> {
        prompts::validate_prompt(prompt)?;
        validate_progression_count(count)?;

        let request = TextRequest::new(
            prompts::progression_instruction(prompt, count),
            PROGRESSION_MAX_TOKENS,
            TEXT_TEMPERATURE,
        )
        .with_model(self.model.clone());
        let any_prompt = |p: &Vec<String>| {
            if p.iter().all(|s| s.trim().is_empty()) {
                Err("no panel prompts returned".to_string())
            } else {
                Ok(())
            }
        };
        let raw: Vec<String> = generate_json(
            self.text.as_ref(),
            request,
            "progression",
            JsonShape::Array,
            any_prompt,
        )
        .await?;

        Ok(clean_progression(raw, count))
    }
}
