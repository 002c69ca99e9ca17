//! Prompt construction and prompt validation.
//!
//! Every language model call in the system is built here so the wording of
//! the instructions, the sampling settings and the token budgets stay in one
//! place.

use serde::Serialize;

use crate::error::CoreError;
use crate::extraction::JsonShape;
use crate::story::{GenerationRequest, Scene, StoryStructure, BEAT_TYPES};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Minimum length (in characters) of a prompt sent for improvement.
pub const MIN_IMPROVE_PROMPT_CHARS: usize = 20;

/// Maximum length of any user-supplied prompt.
pub const MAX_PROMPT_CHARS: usize = 4_000;

/// Sampling temperature for every text call.
pub const TEXT_TEMPERATURE: f32 = 0.7;

pub const IMPROVE_MAX_TOKENS: u32 = 300;
pub const PROGRESSION_MAX_TOKENS: u32 = 600;

/// Default number of follow-up panel prompts requested per progression.
pub const DEFAULT_PROGRESSION_COUNT: u32 = 5;
pub const MAX_PROGRESSION_COUNT: u32 = 10;

/// Appended to a stage instruction when its first answer could not be parsed.
pub const STRICT_JSON_SUFFIX: &str = "\n\nIMPORTANT: Respond with the JSON only. \
Do not add commentary, Markdown fences or trailing text. \
The response must start with the opening bracket and be valid JSON.";

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// The four content stages of a story run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Structure,
    Characters,
    Scenes,
    Story,
}

impl Stage {
    pub const ORDER: [Stage; 4] = [Self::Structure, Self::Characters, Self::Scenes, Self::Story];

    pub fn name(self) -> &'static str {
        match self {
            Self::Structure => "structure",
            Self::Characters => "characters",
            Self::Scenes => "scenes",
            Self::Story => "story",
        }
    }

    /// Shape of the JSON literal the stage answers with.
    pub fn shape(self) -> JsonShape {
        match self {
            Self::Structure => JsonShape::Object,
            Self::Characters | Self::Scenes | Self::Story => JsonShape::Array,
        }
    }

    /// Output token budget for the stage.
    pub fn max_tokens(self) -> u32 {
        match self {
            Self::Structure => 1000,
            Self::Characters => 800,
            Self::Scenes => 800,
            Self::Story => 1500,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A prompt sent for improvement must be at least
/// [`MIN_IMPROVE_PROMPT_CHARS`] characters long.
pub fn validate_improve_prompt(prompt: &str) -> Result<(), CoreError> {
    let len = prompt.chars().count();
    if len < MIN_IMPROVE_PROMPT_CHARS {
        return Err(CoreError::Validation(format!(
            "Prompt must be at least {MIN_IMPROVE_PROMPT_CHARS} characters long"
        )));
    }
    validate_prompt_length(prompt)
}

/// Reject blank or oversized prompts.
pub fn validate_prompt(prompt: &str) -> Result<(), CoreError> {
    if prompt.trim().is_empty() {
        return Err(CoreError::Validation(
            "Prompt must not be empty".to_string(),
        ));
    }
    validate_prompt_length(prompt)
}

fn validate_prompt_length(prompt: &str) -> Result<(), CoreError> {
    let len = prompt.chars().count();
    if len > MAX_PROMPT_CHARS {
        return Err(CoreError::Validation(format!(
            "Prompt exceeds maximum length of {MAX_PROMPT_CHARS} characters (got {len})"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Story stage instructions
// ---------------------------------------------------------------------------

pub fn structure_instruction(request: &GenerationRequest) -> String {
    let outline: Vec<String> = BEAT_TYPES
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let beat = i + 1;
            let label = t.replace('_', " ");
            format!(
                r#"    {{"beat": {beat}, "type": "{t}", "description": "Brief {label}"}}"#
            )
        })
        .collect();

    format!(
        "Create a concise story structure for a {genre} story with this theme: {theme}\n\
         Audience: {audience}. Tone: {tone}. Target length: about {words} words.\n\n\
         Return a JSON object with:\n\
         {{\n  \"title\": \"Story title\",\n  \"tagline\": \"Short tagline\",\n  \
         \"summary\": \"2-3 sentence summary\",\n  \"outline\": [\n{outline}\n  ]\n}}",
        genre = request.genre,
        theme = request.theme,
        audience = request.audience,
        tone = request.tone,
        words = request.length_words,
        outline = outline.join(",\n"),
    )
}

pub fn characters_instruction(structure: &StoryStructure) -> String {
    format!(
        "Create 3-5 characters for this story structure: {}\n\n\
         Return a JSON array of characters:\n\
         [{{\n  \"id\": \"character1\",\n  \"name\": \"Character Name\",\n  \
         \"role\": \"protagonist/antagonist/etc\",\n  \"arc\": \"Brief character arc\",\n  \
         \"traits\": [\"trait1\", \"trait2\", \"trait3\"]\n}}]",
        to_json(structure)
    )
}

pub fn scenes_instruction(structure: &StoryStructure) -> String {
    format!(
        "Create 5-7 scenes for this story structure: {}\n\
         Every scene's \"beat\" must be one of the outline beat numbers.\n\n\
         Return a JSON array of scenes:\n\
         [{{\n  \"beat\": 1,\n  \"title\": \"Scene Title\",\n  \"setting\": \"Scene Setting\",\n  \
         \"pov\": \"Character POV\",\n  \"conflict\": \"Scene Conflict\"\n}}]",
        to_json(structure)
    )
}

pub fn story_instruction(request: &GenerationRequest, scenes: &[Scene]) -> String {
    format!(
        "Write the story content for these scenes: {}\n\
         Write for {audience} in a {tone} tone, about {words} words in total.\n\
         Include one entry for every beat number used by the scenes.\n\n\
         Return a JSON array of story beats:\n\
         [{{\n  \"beat\": 1,\n  \"paragraphs\": [\"Paragraph 1\", \"Paragraph 2\"]\n}}]",
        to_json(scenes),
        audience = request.audience,
        tone = request.tone,
        words = request.length_words,
    )
}

// ---------------------------------------------------------------------------
// Prompt improvement and comics
// ---------------------------------------------------------------------------

pub fn improve_instruction(prompt: &str) -> String {
    format!(
        "You are a comic book writer specializing in Indian mythology.\n\
         Enhance the following prompt to create a more vivid, detailed, and engaging comic \
         book scene.\n\
         Include specific elements from Indian mythology where appropriate.\n\
         Keep the improved prompt concise (under 100 words) but rich in visual and \
         narrative detail.\n\n\
         Original prompt: {prompt}\n\nImproved prompt:"
    )
}

/// Ask for `count` follow-up panel descriptions continuing `prompt`.
pub fn progression_instruction(prompt: &str, count: u32) -> String {
    format!(
        "You are writing a scrolling comic. The latest panel shows: {prompt}\n\
         Continue the story with the next {count} panels. Each panel is one short, \
         visual description (one or two sentences) that follows from the previous one.\n\n\
         Return a JSON array of {count} strings."
    )
}

/// Image prompt for a story scene illustration.
pub fn scene_image_prompt(scene: &Scene) -> String {
    format!(
        "{} with {}. High quality, detailed illustration.",
        scene.setting.trim(),
        scene.conflict.trim()
    )
}

/// Image prompt for a comic panel.
pub fn comic_panel_prompt(description: &str) -> String {
    let description = description.trim();
    format!(
        "Comic panel: {description}. Detailed, vibrant, comic book style."
    )
}

/// Title derived from a comic's initial prompt (first 50 characters).
pub fn comic_title(prompt: &str) -> String {
    let trimmed = prompt.trim();
    let mut title: String = trimmed.chars().take(50).collect();
    if trimmed.chars().count() > 50 {
        title.push_str("...");
    }
    title
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn improve_prompt_length_boundary() {
        let nineteen = "a".repeat(19);
        let twenty = "a".repeat(20);
        assert!(validate_improve_prompt(&nineteen).is_err());
        assert!(validate_improve_prompt(&twenty).is_ok());
    }

    #[test]
    fn improve_prompt_counts_characters_not_bytes() {
        // 10 two-byte characters: 20 bytes but only 10 chars.
        assert!(validate_improve_prompt(&"é".repeat(10)).is_err());
    }

    #[test]
    fn blank_prompt_rejected() {
        assert!(validate_prompt("   ").is_err());
        assert!(validate_prompt(&"x".repeat(MAX_PROMPT_CHARS + 1)).is_err());
    }

    #[test]
    fn structure_instruction_lists_all_five_beats() {
        let text = structure_instruction(&GenerationRequest::with_theme("A journey"));
        for beat in BEAT_TYPES {
            assert!(text.contains(beat), "missing {beat}");
        }
        assert!(text.contains("A journey"));
        assert!(text.contains("fantasy"));
    }

    #[test]
    fn story_instruction_embeds_scenes() {
        let scenes = vec![Scene {
            beat: 2,
            title: "The Bridge".into(),
            setting: "A rope bridge".into(),
            pov: "Mira".into(),
            conflict: "Wind".into(),
            image_url: None,
        }];
        let text = story_instruction(&GenerationRequest::with_theme("x"), &scenes);
        assert!(text.contains("The Bridge"));
    }

    #[test]
    fn scene_image_prompt_combines_setting_and_conflict() {
        let scene = Scene {
            beat: 1,
            title: "t".into(),
            setting: "A cluttered attic".into(),
            pov: "p".into(),
            conflict: "a glowing map".into(),
            image_url: None,
        };
        assert_eq!(
            scene_image_prompt(&scene),
            "A cluttered attic with a glowing map. High quality, detailed illustration."
        );
    }

    #[test]
    fn comic_title_truncates_long_prompts() {
        assert_eq!(comic_title("Short"), "Short");
        let long = "x".repeat(60);
        let title = comic_title(&long);
        assert_eq!(title.chars().count(), 53);
        assert!(title.ends_with("..."));
    }

    #[test]
    fn stage_budgets() {
        assert_eq!(Stage::Structure.max_tokens(), 1000);
        assert_eq!(Stage::Story.max_tokens(), 1500);
        assert_eq!(Stage::ORDER[2], Stage::Scenes);
        assert_eq!(Stage::Structure.shape(), JsonShape::Object);
    }
}
