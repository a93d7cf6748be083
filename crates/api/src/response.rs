//! Shared response envelope for API handlers.
//!
//! Resource endpoints answer with `{ "data": ... }`. Use [`DataResponse`]
//! rather than ad-hoc `serde_json::json!` so the shape is checked at compile
//! time.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
