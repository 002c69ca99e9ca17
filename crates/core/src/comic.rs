//! Comic panel rules.

use crate::error::CoreError;
use crate::prompts::MAX_PROGRESSION_COUNT;

/// First panel of every comic.
pub const FIRST_SEQUENCE_NUMBER: i32 = 1;

/// Only the most recent panels are considered for random background art.
pub const RANDOM_PANEL_POOL: i64 = 50;

pub fn validate_sequence_number(sequence_number: i32) -> Result<(), CoreError> {
    if sequence_number < FIRST_SEQUENCE_NUMBER {
        return Err(CoreError::Validation(format!(
            "sequence_number must be >= {FIRST_SEQUENCE_NUMBER}, got {sequence_number}"
        )));
    }
    Ok(())
}

pub fn validate_progression_count(count: u32) -> Result<(), CoreError> {
    if count == 0 || count > MAX_PROGRESSION_COUNT {
        return Err(CoreError::Validation(format!(
            "count must be between 1 and {MAX_PROGRESSION_COUNT}, got {count}"
        )));
    }
    Ok(())
}

/// Trim generated panel prompts, drop blanks and cap the list at `count`.
pub fn clean_progression(prompts: Vec<String>, count: u32) -> Vec<String> {
    prompts
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .take(count as usize)
        .collect()
}
