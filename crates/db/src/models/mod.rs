//! Database row structs and create DTOs.

pub mod comic;
pub mod panel;
pub mod prompt_history;
pub mod story;
pub mod story_progression;
