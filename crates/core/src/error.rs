use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A text, image or storage provider call failed.
    #[error("Upstream service error: {0}")]
    Upstream(String),

    /// The language model answered, but not with the JSON shape a stage needs.
    #[error("Malformed {stage} output: {reason}")]
    MalformedOutput {
        stage: &'static str,
        reason: String,
        raw: String,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}
