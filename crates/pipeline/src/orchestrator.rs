//! The staged story run.
//!
//! Stages run strictly in order and each instruction embeds the output of
//! the stage before it. Every accepted payload is emitted as a
//! [`StageMessage`] the moment it is available; a failure emits a single
//! `error` message and ends the run. Nothing already emitted is retracted.

use std::sync::Arc;

use storyloom_core::error::CoreError;
use storyloom_core::generation::{GenerationState, StageMessage};
use storyloom_core::prompts::{self, Stage, TEXT_TEMPERATURE};
use storyloom_core::story::{
    Character, GenerationRequest, Scene, StoryBeat, StoryPackage, StoryStructure,
};
use storyloom_providers::{TextGenerator, TextRequest};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::structured::generate_json;

/// Capacity of the stream channel. A full run emits five messages.
pub const STREAM_BUFFER: usize = 8;

pub struct StoryPipeline {
    text: Arc<dyn TextGenerator>,
    model: Option<String>,
}

impl StoryPipeline {
    pub fn new(text: Arc<dyn TextGenerator>) -> Self {
        Self { text, model: None }
    }

    /// Use `model` instead of the text client's default.
    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    // -----------------------------------------------------------------------
    // Entry points
    // -----------------------------------------------------------------------

    /// Start a run on a background task and return its message stream.
    ///
    /// The run is not cancelled when the stream is dropped; it keeps going
    /// until it completes or fails.
    pub fn stream(self: Arc<Self>, request: GenerationRequest) -> ReceiverStream<StageMessage> {
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        tokio::spawn(async move {
            let _ = self.run(request, &tx).await;
        });
        ReceiverStream::new(rx)
    }

    /// Run every stage and fold the messages into a finished package.
    pub async fn generate_package(
        &self,
        request: GenerationRequest,
    ) -> Result<StoryPackage, CoreError> {
        let (tx, mut rx) = mpsc::channel(STREAM_BUFFER);
        let started_at = chrono::Utc::now();
        let outcome = self.run(request.clone(), &tx).await;
        drop(tx);

        let mut state = GenerationState::new(request, started_at);
        while let Some(message) = rx.recv().await {
            state = state.apply(message);
        }

        // The stage error carries more detail than the message text.
        outcome?;
        state.into_package()
    }

    /// Run every stage, sending each message to `tx`.
    ///
    /// Ends with exactly one `complete` or `error` message. Send failures
    /// (the reader went away) are ignored.
    pub async fn run(
        &self,
        request: GenerationRequest,
        tx: &mpsc::Sender<StageMessage>,
    ) -> Result<(), CoreError> {
        tracing::info!(
            theme = %request.theme,
            genre = %request.genre,
            length_words = request.length_words,
            "Starting story generation",
        );

        let result = self.run_stages(&request, tx).await;
        match &result {
            Ok(()) => {
                tracing::info!(theme = %request.theme, "Story generation complete");
                emit(tx, StageMessage::Complete).await;
            }
            Err(e) => {
                tracing::warn!(theme = %request.theme, error = %e, "Story generation failed");
                let error = e.to_string();
                emit(tx, StageMessage::Error { error }).await;
            }
        }
        result
    }

    async fn run_stages(
        &self,
        request: &GenerationRequest,
        tx: &mpsc::Sender<StageMessage>,
    ) -> Result<(), CoreError> {
        let structure = self.structure(request).await?;
        let data = structure.clone();
        emit(tx, StageMessage::Structure { data }).await;

        let characters = self.characters(&structure).await?;
        emit(tx, StageMessage::Characters { data: characters }).await;

        let scenes = self.scenes(&structure).await?;
        let data = scenes.clone();
        emit(tx, StageMessage::Scenes { data }).await;

        let story = self.story(request, &scenes).await?;
        emit(tx, StageMessage::Story { data: story }).await;

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Stages
    // -----------------------------------------------------------------------

    pub async fn structure(
        &self,
        request: &GenerationRequest,
    ) -> Result<StoryStructure, CoreError> {
        let instruction = prompts::structure_instruction(request);
        self.stage(Stage::Structure, instruction, validate_structure)
            .await
    }

    pub async fn characters(
        &self,
        structure: &StoryStructure,
    ) -> Result<Vec<Character>, CoreError> {
        let instruction = prompts::characters_instruction(structure);
        let validate = |c: &Vec<Character>| non_empty(c, "characters");
        self.stage(Stage::Characters, instruction, validate).await
    }

    pub async fn scenes(&self, structure: &StoryStructure) -> Result<Vec<Scene>, CoreError> {
        let instruction = prompts::scenes_instruction(structure);
        let validate = |s: &Vec<Scene>| non_empty(s, "scenes");
        self.stage(Stage::Scenes, instruction, validate).await
    }

    pub async fn story(
        &self,
        request: &GenerationRequest,
        scenes: &[Scene],
    ) -> Result<Vec<StoryBeat>, CoreError> {
        let instruction = prompts::story_instruction(request, scenes);
        let validate = |beats: &Vec<StoryBeat>| validate_prose(beats, scenes);
        self.stage(Stage::Story, instruction, validate).await
    }

    async fn stage<T, V>(
        &self,
        stage: Stage,
        instruction: String,
        validate: V,
    ) -> Result<T, CoreError>
    where
        T: serde::de::DeserializeOwned,
        V: Fn(&T) -> Result<(), String>,
    {
        tracing::debug!(stage = stage.name(), "Running generation stage");
        let request = TextRequest::new(instruction, stage.max_tokens(), TEXT_TEMPERATURE)
            .with_model(self.model.clone());
        let shape = stage.shape();
        generate_json(self.text.as_ref(), request, stage.name(), shape, validate).await
    }
}

async fn emit(tx: &mpsc::Sender<StageMessage>, message: StageMessage) {
    let kind = message.kind();
    if tx.send(message).await.is_err() {
        tracing::debug!(kind, "Generation reader disconnected, message dropped");
    }
}

// ---------------------------------------------------------------------------
// Payload checks
// ---------------------------------------------------------------------------

fn non_empty<T>(items: &[T], what: &str) -> Result<(), String> {
    if items.is_empty() {
        return Err(format!("no {what} returned"));
    }
    Ok(())
}

fn validate_structure(structure: &StoryStructure) -> Result<(), String> {
    if structure.title.trim().is_empty() {
        return Err("structure has an empty title".to_string());
    }
    non_empty(&structure.outline, "outline beats")
}

/// Prose must have at least one paragraph and cover every scene beat.
fn validate_prose(beats: &[StoryBeat], scenes: &[Scene]) -> Result<(), String> {
    let has_prose = beats
        .iter()
        .flat_map(|b| &b.paragraphs)
        .any(|p| !p.trim().is_empty());
    if !has_prose {
        return Err("no prose paragraphs returned".to_string());
    }
    let mut missing: Vec<u32> = scenes
        .iter()
        .map(|s| s.beat)
        .filter(|beat| !beats.iter().any(|b| b.beat == *beat))
        .collect();
    missing.dedup();
    if !missing.is_empty() {
        return Err(format!("no prose for scene beats {missing:?}"));
    }
    Ok(())
}
