//! Blob storage key conventions.
//!
//! Keys are deterministic so a regenerated illustration overwrites the
//! previous one instead of leaving orphans behind.

use crate::types::DbId;

/// Key for a story scene illustration: `{story_id}/scene-{index}.png`.
///
/// ```
/// use storyloom_core::naming::scene_image_key;
///
/// assert_eq!(scene_image_key(42, 0), "42/scene-0.png");
/// ```
pub fn scene_image_key(story_id: DbId, scene_index: u32) -> String {
    format!("{story_id}/scene-{scene_index}.png")
}

/// Key for a comic panel: `comics/{comic_id}/panel-{sequence}.png`.
pub fn comic_panel_key(comic_id: DbId, sequence_number: i32) -> String {
    format!("comics/{comic_id}/panel-{sequence_number}.png")
}

/// Prefix holding every illustration of a story.
pub fn story_prefix(story_id: DbId) -> String {
    format!("{story_id}/")
}
