//! Text calls that must answer with a JSON literal.

use serde::de::DeserializeOwned;
use storyloom_core::error::CoreError;
use storyloom_core::extraction::{extract_json, JsonShape};
use storyloom_core::prompts::STRICT_JSON_SUFFIX;
use storyloom_providers::{TextGenerator, TextRequest};

/// Ask for a `shape` literal, parse it into `T` and check it with
/// `validate`.
///
/// A rejected answer is retried once with [`STRICT_JSON_SUFFIX`] appended
/// to the instruction. A second rejection fails with
/// [`CoreError::MalformedOutput`] carrying the raw text.
pub(crate) async fn generate_json<T, V>(
    text: &dyn TextGenerator,
    request: TextRequest,
    stage: &'static str,
    shape: JsonShape,
    validate: V,
) -> Result<T, CoreError>
where
    T: DeserializeOwned,
    V: Fn(&T) -> Result<(), String>,
{
    let raw = call(text, &request, stage).await?;
    match parse(&raw, shape, &validate) {
        Ok(value) => return Ok(value),
        Err(reason) => {
            tracing::warn!(
                stage,
                reason = %reason,
                raw_chars = raw.len(),
                "Model output rejected, retrying with stricter instructions",
            );
        }
    }

    let strict = TextRequest {
        prompt: format!("{}{STRICT_JSON_SUFFIX}", request.prompt),
        ..request
    };
    let raw = call(text, &strict, stage).await?;
    parse(&raw, shape, &validate).map_err(|reason| {
        tracing::error!(stage, reason = %reason, raw = %raw, "Model output rejected twice");
        CoreError::MalformedOutput { stage, reason, raw }
    })
}

/// Plain text call with upstream error mapping.
pub(crate) async fn call(
    text: &dyn TextGenerator,
    request: &TextRequest,
    stage: &'static str,
) -> Result<String, CoreError> {
    text.generate_text(request)
        .await
        .map_err(|e| crate::upstream(&format!("{stage} generation failed"), e))
}

fn parse<T, V>(raw: &str, shape: JsonShape, validate: &V) -> Result<T, String>
where
    T: DeserializeOwned,
    V: Fn(&T) -> Result<(), String>,
{
    let value: T = extract_json(raw, shape).map_err(|e| e.to_string())?;
    validate(&value)?;
    Ok(value)
}
