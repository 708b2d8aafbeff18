//! Extractors whose rejections use the `AppError` envelope.

use axum::extract::FromRequestParts;

use crate::error::AppError;

/// `axum::extract::Path`, but an undecodable segment (for example invalid
/// UTF-8) becomes a 400 `BAD_REQUEST` envelope instead of a plain-text body.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct PathParam<T>(pub T);
