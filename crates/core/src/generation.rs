//! Staged generation messages and the draft reducer.
//!
//! A generation run emits [`StageMessage`]s in the fixed order
//! structure → characters → scenes → story → complete, or stops early with
//! an error. [`GenerationState::apply`] folds one message into the draft and
//! returns the next state; it never mutates a previous state and never moves
//! backwards.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::story::{Character, GenerationRequest, Scene, StoryBeat, StoryPackage, StoryStructure};
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Wire messages
// ---------------------------------------------------------------------------

/// One newline-delimited frame of the generation stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StageMessage {
    Structure { data: StoryStructure },
    Characters { data: Vec<Character> },
    Scenes { data: Vec<Scene> },
    Story { data: Vec<StoryBeat> },
    Error { error: String },
    Complete,
}

impl StageMessage {
    /// The `type` tag as it appears on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Structure { .. } => "structure",
            Self::Characters { .. } => "characters",
            Self::Scenes { .. } => "scenes",
            Self::Story { .. } => "story",
            Self::Error { .. } => "error",
            Self::Complete => "complete",
        }
    }

    /// Serialize as a single NDJSON line (trailing `\n` included).
    pub fn to_ndjson_line(&self) -> String {
        // Every variant holds plain strings, numbers and vectors.
        let mut line = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","error":"failed to encode frame: {e}"}}"#)
        });
        line.push('\n');
        line
    }
}

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

/// Where a generation run stands. Named after the last applied stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationPhase {
    Idle,
    Structure,
    Characters,
    Scenes,
    Story,
    Complete,
    Error,
}

impl GenerationPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Error)
    }

    /// The phase a content message is allowed to follow.
    fn predecessor_of(message: &StageMessage) -> Option<Self> {
        match message {
            StageMessage::Structure { .. } => Some(Self::Idle),
            StageMessage::Characters { .. } => Some(Self::Structure),
            StageMessage::Scenes { .. } => Some(Self::Characters),
            StageMessage::Story { .. } => Some(Self::Scenes),
            StageMessage::Complete => Some(Self::Story),
            StageMessage::Error { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationState {
    pub phase: GenerationPhase,
    pub draft: StoryPackage,
    pub error: Option<String>,
}

impl GenerationState {
    pub fn new(request: GenerationRequest, started_at: Timestamp) -> Self {
        Self {
            phase: GenerationPhase::Idle,
            draft: StoryPackage::empty(request, started_at),
            error: None,
        }
    }

    /// Apply one message, producing the next state.
    ///
    /// Terminal states absorb further messages unchanged. A content message
    /// that arrives out of order moves the run to [`GenerationPhase::Error`];
    /// fields applied so far are kept.
    pub fn apply(&self, message: StageMessage) -> Self {
        if self.phase.is_terminal() {
            return self.clone();
        }

        let expected = GenerationPhase::predecessor_of(&message);
        let mut next = self.clone();
        match message {
            StageMessage::Error { error } => return self.failed(error),
            other if expected != Some(self.phase) => {
                return self.failed(format!(
                    "unexpected '{}' message while in {:?} phase",
                    other.kind(),
                    self.phase
                ));
            }
            StageMessage::Structure { data } => {
                next.draft.title = data.title;
                next.draft.tagline = data.tagline;
                next.draft.summary = data.summary;
                next.draft.outline = data.outline;
                next.phase = GenerationPhase::Structure;
            }
            StageMessage::Characters { data } => {
                next.draft.characters = data;
                next.phase = GenerationPhase::Characters;
            }
            StageMessage::Scenes { data } => {
                next.draft.scenes = data;
                next.phase = GenerationPhase::Scenes;
            }
            StageMessage::Story { data } => {
                next.draft.story = data;
                next.phase = GenerationPhase::Story;
            }
            StageMessage::Complete => {
                next.draft.metadata = next.draft.compute_metadata();
                next.phase = GenerationPhase::Complete;
            }
        }
        next
    }

    /// Fold a whole sequence of messages starting from `self`.
    pub fn apply_all(&self, messages: impl IntoIterator<Item = StageMessage>) -> Self {
        messages
            .into_iter()
            .fold(self.clone(), |state, message| state.apply(message))
    }

    /// Consume a finished run, returning the draft only on success.
    ///
    /// A stream that ends before `complete` is reported as an internal error
    /// so callers never persist a half-built draft by accident.
    pub fn into_package(self) -> Result<StoryPackage, CoreError> {
        match self.phase {
            GenerationPhase::Complete => Ok(self.draft),
            GenerationPhase::Error => Err(CoreError::Upstream(
                self.error
                    .unwrap_or_else(|| "generation failed".to_string()),
            )),
            other => Err(CoreError::Internal(format!(
                "generation stream ended in {other:?} phase"
            ))),
        }
    }

    fn failed(&self, error: String) -> Self {
        Self {
            phase: GenerationPhase::Error,
            draft: self.draft.clone(),
            error: Some(error),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::story::OutlineBeat;

    fn structure() -> StageMessage {
        StageMessage::Structure {
            data: StoryStructure {
                title: "The Crystal of Echoes".into(),
                tagline: "Some journeys change the traveler".into(),
                summary: "A map, a journey, a crystal.".into(),
                outline: vec![OutlineBeat {
                    beat: 1,
                    beat_type: "setup".into(),
                    description: "A map is found".into(),
                }],
            },
        }
    }

    fn characters() -> StageMessage {
        StageMessage::Characters {
            data: vec![Character {
                id: "character1".into(),
                name: "Elara".into(),
                role: "protagonist".into(),
                arc: "cautious to brave".into(),
                traits: vec!["curious".into()],
            }],
        }
    }

    fn scenes() -> StageMessage {
        StageMessage::Scenes {
            data: vec![Scene {
                beat: 1,
                title: "Attic".into(),
                setting: "A dusty attic".into(),
                pov: "Elara".into(),
                conflict: "Curiosity versus caution".into(),
                image_url: None,
            }],
        }
    }

    fn story() -> StageMessage {
        StageMessage::Story {
            data: vec![StoryBeat {
                beat: 1,
                paragraphs: vec!["Dust drifted in the light.".into()],
            }],
        }
    }

    fn fresh() -> GenerationState {
        GenerationState::new(
            GenerationRequest::with_theme("A journey to find a magical artifact"),
            chrono::Utc::now(),
        )
    }

    #[test]
    fn full_run_reaches_complete_with_metadata() {
        let state = fresh().apply_all([
            structure(),
            characters(),
            scenes(),
            story(),
            StageMessage::Complete,
        ]);
        assert_eq!(state.phase, GenerationPhase::Complete);
        assert_eq!(state.draft.title, "The Crystal of Echoes");
        assert_eq!(state.draft.metadata.word_count, 5);
        assert_eq!(state.draft.metadata.read_time_minutes, 1);
        assert!(state.into_package().is_ok());
    }

    #[test]
    fn apply_does_not_mutate_previous_state() {
        let before = fresh();
        let after = before.apply(structure());
        assert_eq!(before.phase, GenerationPhase::Idle);
        assert!(before.draft.title.is_empty());
        assert_eq!(after.phase, GenerationPhase::Structure);
    }

    #[test]
    fn error_keeps_earlier_fields() {
        let state = fresh().apply_all([
            structure(),
            characters(),
            StageMessage::Error {
                error: "model unavailable".into(),
            },
        ]);
        assert_eq!(state.phase, GenerationPhase::Error);
        assert_eq!(state.draft.characters.len(), 1);
        assert!(state.draft.scenes.is_empty());
        assert_matches!(
            state.into_package(),
            Err(CoreError::Upstream(msg)) if msg == "model unavailable"
        );
    }

    #[test]
    fn out_of_order_stage_is_an_error() {
        let state = fresh().apply(scenes());
        assert_eq!(state.phase, GenerationPhase::Error);
        assert!(state.error.unwrap().contains("scenes"));
    }

    #[test]
    fn repeated_stage_is_an_error() {
        let state = fresh().apply_all([structure(), structure()]);
        assert_eq!(state.phase, GenerationPhase::Error);
        assert_eq!(state.draft.title, "The Crystal of Echoes");
    }

    #[test]
    fn complete_before_story_is_an_error() {
        let state = fresh().apply_all([
            structure(),
            characters(),
            scenes(),
            StageMessage::Complete,
        ]);
        assert_eq!(state.phase, GenerationPhase::Error);
    }

    #[test]
    fn terminal_states_absorb_messages() {
        let done = fresh().apply_all([
            structure(),
            characters(),
            scenes(),
            story(),
            StageMessage::Complete,
        ]);
        let again = done.apply(StageMessage::Error {
            error: "late".into(),
        });
        assert_eq!(again.phase, GenerationPhase::Complete);
        assert!(again.error.is_none());
    }

    #[test]
    fn truncated_stream_is_not_a_package() {
        let state = fresh().apply_all([structure(), characters()]);
        assert_matches!(state.into_package(), Err(CoreError::Internal(_)));
    }

    #[test]
    fn wire_format_matches_frame_shapes() {
        let line = StageMessage::Complete.to_ndjson_line();
        assert_eq!(line, "{\"type\":\"complete\"}\n");

        let err = StageMessage::Error {
            error: "boom".into(),
        };
        let v: serde_json::Value = serde_json::to_value(&err).unwrap();
        assert_eq!(v["type"], "error");
        assert_eq!(v["error"], "boom");

        let json = r#"{"type":"story","data":[{"beat":1,"paragraphs":["a"]}]}"#;
        let parsed: StageMessage = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.kind(), "story");
    }
}
