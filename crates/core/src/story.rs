//! Story package data model.
//!
//! A [`StoryPackage`] is the document that evolves while the staged
//! generation runs and is later stored verbatim in the `stories.story_data`
//! JSONB column. Field names match the JSON the front-end and the language
//! model prompts use (`beat`, `pov`, `image_url`, ...).

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Schema version written into every story package.
pub const STORY_PACKAGE_VERSION: &str = "1.0.0";

pub const DEFAULT_AUDIENCE: &str = "all ages";
pub const DEFAULT_GENRE: &str = "fantasy";
pub const DEFAULT_TONE: &str = "engaging";
pub const DEFAULT_LENGTH_WORDS: u32 = 1500;

/// Upper bound on the requested story length.
pub const MAX_LENGTH_WORDS: u32 = 20_000;

/// Average reading speed used for `read_time_minutes`.
pub const WORDS_PER_MINUTE: u32 = 200;

/// The fixed five-beat outline every structure stage must produce, in order.
pub const BEAT_TYPES: [&str; 5] = [
    "setup",
    "inciting_incident",
    "rising_action",
    "climax",
    "resolution",
];

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// What the user asked for. Immutable once a generation run starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    #[serde(default = "default_audience")]
    pub audience: String,
    #[serde(default = "default_genre")]
    pub genre: String,
    #[serde(default = "default_tone")]
    pub tone: String,
    #[serde(default = "default_length_words")]
    pub length_words: u32,
    /// Required. A missing theme is rejected by [`Self::validate`].
    #[serde(default)]
    pub theme: String,
}

fn default_audience() -> String {
    DEFAULT_AUDIENCE.to_string()
}

fn default_genre() -> String {
    DEFAULT_GENRE.to_string()
}

fn default_tone() -> String {
    DEFAULT_TONE.to_string()
}

fn default_length_words() -> u32 {
    DEFAULT_LENGTH_WORDS
}

impl GenerationRequest {
    /// Build a request for `theme` with every other field defaulted.
    pub fn with_theme(theme: impl Into<String>) -> Self {
        Self {
            audience: default_audience(),
            genre: default_genre(),
            tone: default_tone(),
            length_words: DEFAULT_LENGTH_WORDS,
            theme: theme.into(),
        }
    }

    /// Replace blank optional fields with their defaults.
    ///
    /// Form submissions send empty strings for untouched selects.
    pub fn normalized(mut self) -> Self {
        if self.audience.trim().is_empty() {
            self.audience = default_audience();
        }
        if self.genre.trim().is_empty() {
            self.genre = default_genre();
        }
        if self.tone.trim().is_empty() {
            self.tone = default_tone();
        }
        if self.length_words == 0 {
            self.length_words = DEFAULT_LENGTH_WORDS;
        }
        self
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.theme.trim().is_empty() {
            return Err(CoreError::Validation(
                "Theme is required in the request spec".to_string(),
            ));
        }
        if self.length_words > MAX_LENGTH_WORDS {
            return Err(CoreError::Validation(format!(
                "length_words must be <= {MAX_LENGTH_WORDS}, got {}",
                self.length_words
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Stage payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineBeat {
    pub beat: u32,
    #[serde(rename = "type")]
    pub beat_type: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: String,
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub arc: String,
    #[serde(default)]
    pub traits: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub beat: u32,
    pub title: String,
    #[serde(default)]
    pub setting: String,
    #[serde(default)]
    pub pov: String,
    #[serde(default)]
    pub conflict: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Prose for one beat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryBeat {
    pub beat: u32,
    #[serde(default)]
    pub paragraphs: Vec<String>,
}

/// Output of the structure stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryStructure {
    pub title: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub summary: String,
    pub outline: Vec<OutlineBeat>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryMetadata {
    pub word_count: u32,
    pub read_time_minutes: u32,
}

// ---------------------------------------------------------------------------
// Story package
// ---------------------------------------------------------------------------

/// The full draft record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryPackage {
    pub version: String,
    pub generated_at: Timestamp,
    pub request_spec: GenerationRequest,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub characters: Vec<Character>,
    #[serde(default)]
    pub outline: Vec<OutlineBeat>,
    #[serde(default)]
    pub scenes: Vec<Scene>,
    #[serde(default)]
    pub story: Vec<StoryBeat>,
    #[serde(default)]
    pub metadata: StoryMetadata,
}

/// A scene paired with the prose of its beat, for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneView<'a> {
    pub index: usize,
    pub scene: &'a Scene,
    pub paragraphs: &'a [String],
}

impl StoryPackage {
    /// An empty draft for `request`, stamped with `generated_at`.
    pub fn empty(request: GenerationRequest, generated_at: Timestamp) -> Self {
        Self {
            version: STORY_PACKAGE_VERSION.to_string(),
            generated_at,
            request_spec: request,
            title: String::new(),
            tagline: String::new(),
            summary: String::new(),
            characters: Vec::new(),
            outline: Vec::new(),
            scenes: Vec::new(),
            story: Vec::new(),
            metadata: StoryMetadata::default(),
        }
    }

    /// Prose paragraphs for `beat`, matched by beat number.
    ///
    /// Returns an empty slice when no prose entry carries that beat.
    pub fn prose_for_beat(&self, beat: u32) -> &[String] {
        self.story
            .iter()
            .find(|s| s.beat == beat)
            .map(|s| s.paragraphs.as_slice())
            .unwrap_or(&[])
    }

    /// Every scene in order, joined with its prose.
    pub fn scene_views(&self) -> Vec<SceneView<'_>> {
        self.scenes
            .iter()
            .enumerate()
            .map(|(index, scene)| SceneView {
                index,
                scene,
                paragraphs: self.prose_for_beat(scene.beat),
            })
            .collect()
    }

    /// Scenes whose beat has no matching prose entry.
    pub fn scenes_without_prose(&self) -> Vec<u32> {
        self.scenes
            .iter()
            .filter(|s| self.prose_for_beat(s.beat).is_empty())
            .map(|s| s.beat)
            .collect()
    }

    /// True when at least one prose beat has at least one paragraph.
    pub fn has_prose(&self) -> bool {
        self.story
            .iter()
            .any(|b| b.paragraphs.iter().any(|p| !p.trim().is_empty()))
    }

    /// Word count and read time over all prose paragraphs.
    pub fn compute_metadata(&self) -> StoryMetadata {
        let word_count: usize = self
            .story
            .iter()
            .flat_map(|b| b.paragraphs.iter())
            .map(|p| p.split_whitespace().count())
            .sum();
        let word_count = u32::try_from(word_count).unwrap_or(u32::MAX);
        StoryMetadata {
            word_count,
            read_time_minutes: word_count.div_ceil(WORDS_PER_MINUTE),
        }
    }

    /// Reject a package that cannot be persisted as a finished story.
    ///
    /// A completed generation without prose is a failed generation.
    pub fn validate_for_persistence(&self) -> Result<(), CoreError> {
        if !self.has_prose() {
            return Err(CoreError::Validation(
                "Story has no prose content; generation did not complete".to_string(),
            ));
        }
        Ok(())
    }

    /// Title to store in the indexed column.
    pub fn display_title(&self) -> &str {
        let title = self.title.trim();
        if title.is_empty() {
            "Untitled Story"
        } else {
            title
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
