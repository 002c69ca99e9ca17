//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod comic_repo;
pub mod panel_repo;
pub mod prompt_history_repo;
pub mod story_progression_repo;
pub mod story_repo;

pub use comic_repo::ComicRepo;
pub use panel_repo::PanelRepo;
pub use prompt_history_repo::PromptHistoryRepo;
pub use story_progression_repo::StoryProgressionRepo;
pub use story_repo::StoryRepo;
