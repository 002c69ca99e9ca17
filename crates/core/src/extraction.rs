//! Strict JSON extraction from free-form language model output.
//!
//! Models wrap their JSON in prose or Markdown fences. Extraction tries, in
//! order: the whole trimmed response, the first fenced code block, then the
//! first *balanced* object or array literal. Whatever is found must parse
//! strictly into the requested type; nothing is repaired.

use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;

/// Matches a Markdown fenced block, optionally tagged `json`.
const FENCE_PATTERN: &str = r"(?s)```(?:json|JSON)?\s*\n?(.*?)```";

static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(FENCE_PATTERN).expect("valid regex"));

/// Which literal a stage expects at the top level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonShape {
    Object,
    Array,
}

impl JsonShape {
    fn open(self) -> char {
        match self {
            Self::Object => '{',
            Self::Array => '[',
        }
    }

    fn close(self) -> char {
        match self {
            Self::Object => '}',
            Self::Array => ']',
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("no JSON {0:?} literal found in model output")]
    NotFound(JsonShape),

    #[error("JSON literal does not match the expected shape: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Extract and strictly parse the first `shape` literal in `raw`.
pub fn extract_json<T: DeserializeOwned>(raw: &str, shape: JsonShape) -> Result<T, ExtractError> {
    let trimmed = raw.trim();
    if trimmed.starts_with(shape.open()) {
        if let Ok(value) = serde_json::from_str::<T>(trimmed) {
            return Ok(value);
        }
    }

    if let Some(block) = FENCE_RE.captures(raw).and_then(|c| c.get(1)) {
        let inner = block.as_str().trim();
        if inner.starts_with(shape.open()) {
            if let Some(literal) = balanced_literal(inner, shape) {
                return Ok(serde_json::from_str(literal)?);
            }
        }
    }

    let literal = balanced_literal(raw, shape).ok_or(ExtractError::NotFound(shape))?;
    Ok(serde_json::from_str(literal)?)
}

/// Find the first balanced literal opening with `shape`'s bracket.
///
/// Brackets inside string literals (including escaped quotes) are ignored.
/// Returns `None` if the literal never closes.
pub fn balanced_literal(text: &str, shape: JsonShape) -> Option<&str> {
    let start = text.find(shape.open())?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    let end = start + offset + ch.len_utf8();
                    let literal = &text[start..end];
                    return literal.ends_with(shape.close()).then_some(literal);
                }
            }
            _ => {}
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
