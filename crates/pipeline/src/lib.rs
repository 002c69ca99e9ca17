//! Story generation services.
//!
//! - [`orchestrator`]: the four-stage story run, streamed or folded into a
//!   finished package.
//! - [`improver`]: prompt rewriting and comic progression prompts.
//! - [`backfill`]: image generation and storage with fixed-delay retries.

use storyloom_core::error::CoreError;
use storyloom_providers::ProviderError;

pub mod backfill;
pub mod improver;
pub mod orchestrator;
pub mod retry;
mod structured;

#[cfg(test)]
pub(crate) mod testing;

pub use backfill::{BackfillImage, ImageBackfill};
pub use improver::PromptImprover;
pub use orchestrator::StoryPipeline;
pub use retry::RetryPolicy;

/// Map a provider failure onto the domain error, keeping the upstream text.
pub fn upstream(context: &str, error: ProviderError) -> CoreError {
    CoreError::Upstream(format!("{context}: {error}"))
}
