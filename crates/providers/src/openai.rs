//! Chat completions client for OpenAI-compatible APIs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_success, ProviderError};
use crate::text::{TextGenerator, TextRequest};

const PROVIDER: &str = "openai";

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// HTTP client for `POST {base_url}/chat/completions`.
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, api_key, model)
    }

    /// Reuse an existing [`reqwest::Client`] for connection pooling.
    pub fn with_client(
        client: reqwest::Client,
        base_url: String,
        api_key: String,
        model: String,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate_text(&self, request: &TextRequest) -> Result<String, ProviderError> {
        let model = request.model.as_deref().unwrap_or(&self.model);
        let body = ChatRequest {
            model,
            messages: [ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        tracing::debug!(
            model,
            max_tokens = request.max_tokens,
            prompt_chars = request.prompt.len(),
            "Sending chat completion request",
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let response = ensure_success(PROVIDER, response).await?;
        let parsed: ChatResponse = response.json().await?;

        first_content(parsed)
    }
}

fn first_content(response: ChatResponse) -> Result<String, ProviderError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| ProviderError::invalid(PROVIDER, "completion carried no message content"))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn request_body_shape() {
        let body = ChatRequest {
            model: "gpt-4o",
            messages: [ChatMessage {
                role: "user",
                content: "Hello",
            }],
            max_tokens: 300,
            temperature: 0.7,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "Hello");
        assert_eq!(json["max_tokens"], 300);
    }

    #[test]
    fn first_choice_content_is_returned() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"Once upon a time"}}]}"#,
        )
        .unwrap();
        assert_eq!(first_content(response).unwrap(), "Once upon a time");
    }

    #[test]
    fn empty_choices_is_invalid() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_matches!(
            first_content(response),
            Err(ProviderError::InvalidResponse { provider: "openai", .. })
        );
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = OpenAiClient::new(
            "https://api.test/v1/".into(),
            "key".into(),
            DEFAULT_MODEL.into(),
        );
        assert_eq!(client.base_url, "https://api.test/v1");
        assert_eq!(client.model(), DEFAULT_MODEL);
    }
}
