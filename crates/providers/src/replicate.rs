//! Replicate predictions client for text-to-image models.
//!
//! Predictions are created with `Prefer: wait`, so most responses already
//! carry the output URL. Predictions still running when the wait window
//! closes are polled until they reach a terminal status.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_success, ProviderError};
use crate::image::{GeneratedImage, ImageGenerator, ImageRequest};

const PROVIDER: &str = "replicate";

pub const DEFAULT_BASE_URL: &str = "https://api.replicate.com/v1";
pub const DEFAULT_MODEL: &str = "black-forest-labs/flux-schnell";

const POLL_INTERVAL: Duration = Duration::from_secs(1);
const MAX_POLLS: u32 = 120;

pub struct ReplicateClient {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct PredictionRequest<'a> {
    input: PredictionInput<'a>,
}

#[derive(Debug, Serialize)]
struct PredictionInput<'a> {
    prompt: &'a str,
    aspect_ratio: &'static str,
    output_format: &'static str,
    num_outputs: u32,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    id: String,
    status: PredictionStatus,
    #[serde(default)]
    output: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    urls: Option<PredictionUrls>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum PredictionStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
}

#[derive(Debug, Deserialize)]
struct PredictionUrls {
    get: String,
}

impl ReplicateClient {
    pub fn new(base_url: String, api_token: String, model: String) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, api_token, model)
    }

    pub fn with_client(
        client: reqwest::Client,
        base_url: String,
        api_token: String,
        model: String,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
            model,
        }
    }

    async fn create_prediction(&self, request: &ImageRequest) -> Result<Prediction, ProviderError> {
        let body = PredictionRequest {
            input: PredictionInput {
                prompt: &request.prompt,
                aspect_ratio: request.size.ratio_label(),
                output_format: "png",
                num_outputs: 1,
            },
        };

        let url = format!("{}/models/{}/predictions", self.base_url, self.model);
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_token)
            .header("Prefer", "wait")
            .json(&body)
            .send()
            .await?;
        let response = ensure_success(PROVIDER, response).await?;
        Ok(response.json().await?)
    }

    async fn get_prediction(&self, url: &str) -> Result<Prediction, ProviderError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_token)
            .send()
            .await?;
        let response = ensure_success(PROVIDER, response).await?;
        Ok(response.json().await?)
    }

    /// Poll until the prediction leaves `starting`/`processing`.
    async fn wait_for(&self, mut prediction: Prediction) -> Result<Prediction, ProviderError> {
        let mut polls = 0;
        while !prediction.status.is_terminal() {
            if polls >= MAX_POLLS {
                return Err(ProviderError::invalid(
                    PROVIDER,
                    format!(
                        "prediction {} did not finish after {MAX_POLLS} polls",
                        prediction.id
                    ),
                ));
            }
            let Some(url) = prediction.urls.as_ref().map(|u| u.get.clone()) else {
                return Err(ProviderError::invalid(
                    PROVIDER,
                    "pending prediction has no poll URL",
                ));
            };
            tokio::time::sleep(POLL_INTERVAL).await;
            polls += 1;
            tracing::debug!(prediction_id = %prediction.id, polls, "Polling prediction");
            prediction = self.get_prediction(&url).await?;
        }
        Ok(prediction)
    }

    async fn download(&self, url: &str) -> Result<GeneratedImage, ProviderError> {
        let response = self.client.get(url).send().await?;
        let response = ensure_success(PROVIDER, response).await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/png")
            .to_string();
        let bytes = response.bytes().await?.to_vec();
        Ok(GeneratedImage {
            bytes,
            content_type,
        })
    }
}

impl PredictionStatus {
    fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }
}

/// URL of the first output image of a finished prediction.
fn output_url(prediction: &Prediction) -> Result<&str, ProviderError> {
    match prediction.status {
        PredictionStatus::Succeeded => {}
        PredictionStatus::Failed | PredictionStatus::Canceled => {
            let reason = prediction
                .error
                .as_deref()
                .unwrap_or("prediction did not succeed");
            return Err(ProviderError::Api {
                provider: PROVIDER,
                status: 500,
                message: reason.to_string(),
            });
        }
        PredictionStatus::Starting | PredictionStatus::Processing => {
            return Err(ProviderError::invalid(
                PROVIDER,
                "prediction is still running",
            ));
        }
    }

    let output = prediction.output.as_ref();
    output
        .and_then(|o| o.as_str())
        .or_else(|| output.and_then(|o| o.get(0)).and_then(|o| o.as_str()))
        .ok_or_else(|| ProviderError::invalid(PROVIDER, "prediction output has no image URL"))
}

#[async_trait]
impl ImageGenerator for ReplicateClient {
    async fn generate_image(
        &self,
        request: &ImageRequest,
    ) -> Result<GeneratedImage, ProviderError> {
        tracing::debug!(
            model = %self.model,
            size = request.size.as_str(),
            aspect_ratio = request.size.ratio_label(),
            "Creating image prediction",
        );

        let prediction = self.create_prediction(request).await?;
        let prediction = self.wait_for(prediction).await?;
        let url = output_url(&prediction)?;

        tracing::debug!(prediction_id = %prediction.id, "Downloading prediction output");
        self.download(url).await
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn prediction(json: &str) -> Prediction {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn output_array_yields_first_url() {
        let p = prediction(
            r#"{"id":"p1","status":"succeeded","output":["https://replicate.delivery/a.png"]}"#,
        );
        assert_eq!(output_url(&p).unwrap(), "https://replicate.delivery/a.png");
    }

    #[test]
    fn output_string_is_accepted() {
        let p = prediction(r#"{"id":"p1","status":"succeeded","output":"https://x/b.png"}"#);
        assert_eq!(output_url(&p).unwrap(), "https://x/b.png");
    }

    #[test]
    fn failed_prediction_forwards_error_text() {
        let p = prediction(
            r#"{"id":"p1","status":"failed","error":"NSFW content detected"}"#,
        );
        assert_matches!(
            output_url(&p),
            Err(ProviderError::Api { message, .. }) if message == "NSFW content detected"
        );
    }

    #[test]
    fn succeeded_without_output_is_invalid() {
        let p = prediction(r#"{"id":"p1","status":"succeeded","output":null}"#);
        assert_matches!(output_url(&p), Err(ProviderError::InvalidResponse { .. }));
    }

    #[test]
    fn input_uses_ratio_label() {
        let body = PredictionRequest {
            input: PredictionInput {
                prompt: "a lighthouse",
                aspect_ratio: storyloom_core::image_size::ImageSize::TallPortrait.ratio_label(),
                output_format: "png",
                num_outputs: 1,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["input"]["aspect_ratio"], "9:16");
        assert_eq!(json["input"]["prompt"], "a lighthouse");
    }
}
