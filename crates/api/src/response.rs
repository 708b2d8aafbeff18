//! Shared response envelope for API handlers.
//!
//! Successful responses use `{ "success": true, "data": ... }`; failures are
//! produced by [`crate::error::AppError`] as `{ "success": false, "message",
//! "code" }`.

use serde::Serialize;

/// Standard `{ "success": true, "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
