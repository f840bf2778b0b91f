//! Handlers for `/users` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/users` | Body: `{"username":"alice","role":"regular_user"}` |
//! | `GET`    | `/users/:id` | 404 if not found |
//! | `GET`    | `/users/by-name/:username` | 404 if not found |
//! | `DELETE` | `/users/:id` | Cascades trackers, edges, requests, level |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use streak_core::{
  store::EngineStore,
  user::{Role, User},
  Engine,
};
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub username: String,
  pub role:     Role,
}

/// `POST /users`
pub async fn create<S>(
  State(engine): State<Arc<Engine<S>>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EngineStore + 'static,
{
  let user = engine.create_user(&body.username, body.role).await?;
  Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /users/:id`
pub async fn get_one<S>(
  State(engine): State<Arc<Engine<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError>
where
  S: EngineStore + 'static,
{
  Ok(Json(engine.user(id).await?))
}

/// `GET /users/by-name/:username`
pub async fn get_by_username<S>(
  State(engine): State<Arc<Engine<S>>>,
  Path(username): Path<String>,
) -> Result<Json<User>, ApiError>
where
  S: EngineStore + 'static,
{
  Ok(Json(engine.user_by_username(&username).await?))
}

/// `DELETE /users/:id` — removes the user and everything hanging off them.
pub async fn delete_one<S>(
  State(engine): State<Arc<Engine<S>>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: EngineStore + 'static,
{
  engine.delete_user(id).await?;
  Ok(StatusCode::NO_CONTENT)
}
