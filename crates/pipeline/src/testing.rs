//! Scripted provider fakes for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use storyloom_providers::{
    BlobStore, GeneratedImage, ImageGenerator, ImageRequest, ProviderError, TextGenerator,
    TextRequest,
};

pub const STRUCTURE_JSON: &str = r#"{
  "title": "The Crystal of Echoes",
  "tagline": "Some journeys change the traveler",
  "summary": "Elara follows a map to a crystal that shows the truth.",
  "outline": [
    {"beat": 1, "type": "setup", "description": "An old map"},
    {"beat": 2, "type": "inciting_incident", "description": "The map glows"},
    {"beat": 3, "type": "rising_action", "description": "Companions"},
    {"beat": 4, "type": "climax", "description": "The guardian"},
    {"beat": 5, "type": "resolution", "description": "The crystal"}
  ]
}"#;

pub const CHARACTERS_JSON: &str = r#"Here are the characters:
[
  {"id": "character1", "name": "Elara", "role": "protagonist", "arc": "cautious to brave", "traits": ["curious"]},
  {"id": "character2", "name": "Thorne", "role": "deuteragonist", "arc": "selfish to selfless", "traits": ["witty"]},
  {"id": "character3", "name": "Maevis", "role": "mentor", "arc": "isolated to connected", "traits": ["wise"]}
]"#;

pub const SCENES_JSON: &str = r#"```json
[
  {"beat": 1, "title": "The Chest", "setting": "An attic", "pov": "Elara", "conflict": "A hidden map"},
  {"beat": 3, "title": "The Woods", "setting": "A forest", "pov": "Elara", "conflict": "Strangers"},
  {"beat": 5, "title": "The Crystal", "setting": "A chamber", "pov": "Elara", "conflict": "The truth"}
]
```"#;

pub const STORY_JSON: &str = r#"[
  {"beat": 1, "paragraphs": ["The attic smelled of cedar.", "The map was warm."]},
  {"beat": 3, "paragraphs": ["The woods whispered."]},
  {"beat": 5, "paragraphs": ["The crystal showed her face."]}
]"#;

/// Answers text requests from a fixed script and records every prompt.
pub struct ScriptedText {
    answers: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedText {
    pub fn new<const N: usize>(answers: [&str; N]) -> Self {
        Self::from_results(answers.iter().map(|a| Ok(a.to_string())).collect())
    }

    pub fn from_results(answers: Vec<Result<String, String>>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A script for one successful four-stage run.
    pub fn full_run() -> Self {
        Self::new([STRUCTURE_JSON, CHARACTERS_JSON, SCENES_JSON, STORY_JSON])
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedText {
    async fn generate_text(&self, request: &TextRequest) -> Result<String, ProviderError> {
        self.prompts.lock().unwrap().push(request.prompt.clone());
        match self.answers.lock().unwrap().pop_front() {
            Some(Ok(answer)) => Ok(answer),
            Some(Err(message)) => Err(ProviderError::Api {
                provider: "fake",
                status: 500,
                message,
            }),
            None => Err(ProviderError::invalid("fake", "script exhausted")),
        }
    }
}

/// Fails the first `failures` calls, then returns a one-byte PNG stand-in.
pub struct FlakyImages {
    failures: u32,
    calls: AtomicU32,
    pub requests: Mutex<Vec<ImageRequest>>,
}

impl FlakyImages {
    pub fn new(failures: u32) -> Self {
        Self {
            failures,
            calls: AtomicU32::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageGenerator for FlakyImages {
    async fn generate_image(
        &self,
        request: &ImageRequest,
    ) -> Result<GeneratedImage, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.failures {
            return Err(ProviderError::Api {
                provider: "fake",
                status: 503,
                message: format!("busy (call {call})"),
            });
        }
        Ok(GeneratedImage {
            bytes: vec![0x89],
            content_type: "image/png".to_string(),
        })
    }
}

/// Remembers every key written.
#[derive(Default)]
pub struct MemoryBlobs {
    pub keys: Mutex<Vec<String>>,
}

#[async_trait]
impl BlobStore for MemoryBlobs {
    async fn put(
        &self,
        key: &str,
        _bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, ProviderError> {
        self.keys.lock().unwrap().push(key.to_string());
        Ok(format!("https://blobs.test/{key}"))
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<usize, ProviderError> {
        let mut keys = self.keys.lock().unwrap();
        let before = keys.len();
        keys.retain(|k| !k.starts_with(prefix));
        Ok(before - keys.len())
    }
}
