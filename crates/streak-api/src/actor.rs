//! The [`Actor`] extractor.
//!
//! Session resolution happens upstream of this service; by the time a
//! request reaches the engine boundary, the caller identity has been
//! resolved to a user reference and is forwarded in the `x-actor-id`
//! header.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::ApiError;

pub const ACTOR_HEADER: &str = "x-actor-id";

/// The pre-resolved caller identity.
#[derive(Debug, Clone, Copy)]
pub struct Actor(pub Uuid);

impl<S> FromRequestParts<S> for Actor
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    let value = parts
      .headers
      .get(ACTOR_HEADER)
      .ok_or_else(|| ApiError::BadRequest(format!("missing {ACTOR_HEADER} header")))?;
    let raw = value
      .to_str()
      .map_err(|_| ApiError::BadRequest(format!("{ACTOR_HEADER} is not valid UTF-8")))?;
    let id = Uuid::parse_str(raw)
      .map_err(|_| ApiError::BadRequest(format!("{ACTOR_HEADER} is not a valid uuid")))?;
    Ok(Actor(id))
  }
}
