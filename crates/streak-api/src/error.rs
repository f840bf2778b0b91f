//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use streak_core::ErrorKind;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Engine(#[from] streak_core::Error),

  #[error("bad request: {0}")]
  BadRequest(String),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::Engine(e) => {
        let status = match e.kind() {
          ErrorKind::NotFound => StatusCode::NOT_FOUND,
          ErrorKind::Conflict => StatusCode::CONFLICT,
          ErrorKind::Range => StatusCode::UNPROCESSABLE_ENTITY,
          ErrorKind::Forbidden => StatusCode::FORBIDDEN,
          ErrorKind::Store => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, e.to_string())
      }
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
