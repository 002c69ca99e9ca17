//! Shared response envelope types for API handlers.
//!
//! Every JSON response uses a `{ "data": ... }` envelope. The health check
//! and the generation stream are the exceptions.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
