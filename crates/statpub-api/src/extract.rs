//! Request extractors.

use axum::extract::{FromRequest, rejection::JsonRejection};

use crate::error::ApiError;

/// [`axum::Json`] whose rejections (bad syntax, unknown codes, missing
/// content type) are reported as a JSON 400 like every other input error.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}
