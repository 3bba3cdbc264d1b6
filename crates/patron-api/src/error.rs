//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error crossing the HTTP boundary becomes a tagged JSON body
//! (`{"status": "error", "message": …}`); no handler ever leaks a raw
//! exception or panic to the UI layer.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use patron_core::Error;
use serde_json::json;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
#[error(transparent)]
pub struct ApiError(#[from] pub Error);

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self.0 {
      Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
      Error::Unauthorized => StatusCode::UNAUTHORIZED,
      Error::NotFound(_) => StatusCode::NOT_FOUND,
      Error::Conflict(_) => StatusCode::CONFLICT,
      Error::InvalidTransition { .. } => StatusCode::UNPROCESSABLE_ENTITY,
      Error::Upstream(_) => StatusCode::BAD_GATEWAY,
    };
    let body = json!({ "status": "error", "message": self.0.to_string() });
    (status, Json(body)).into_response()
  }
}
