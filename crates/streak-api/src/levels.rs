//! Handlers for `/levels` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/levels/:user` | Full level record; 404 before first activity |
//! | `GET`    | `/levels/:user/exp` | Experience value alone |
//! | `POST`   | `/levels/:user/recompute` | Rebuild the record from tracker state |
//! | `DELETE` | `/levels/:user` | Idempotent |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use serde_json::json;
use streak_core::{progression::LevelRecord, store::EngineStore, Engine};
use uuid::Uuid;

use crate::error::ApiError;

/// `GET /levels/:user`
pub async fn get_one<S>(
  State(engine): State<Arc<Engine<S>>>,
  Path(user): Path<Uuid>,
) -> Result<Json<LevelRecord>, ApiError>
where
  S: EngineStore + 'static,
{
  Ok(Json(engine.level_record(user).await?))
}

/// `GET /levels/:user/exp`
pub async fn get_exp<S>(
  State(engine): State<Arc<Engine<S>>>,
  Path(user): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: EngineStore + 'static,
{
  let exp = engine.exp(user).await?;
  Ok(Json(json!({ "exp": exp })))
}

/// `POST /levels/:user/recompute`
pub async fn recompute<S>(
  State(engine): State<Arc<Engine<S>>>,
  Path(user): Path<Uuid>,
) -> Result<Json<LevelRecord>, ApiError>
where
  S: EngineStore + 'static,
{
  Ok(Json(engine.update_exp(user).await?))
}

/// `DELETE /levels/:user`
pub async fn delete_one<S>(
  State(engine): State<Arc<Engine<S>>>,
  Path(user): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: EngineStore + 'static,
{
  engine.delete_level(user).await?;
  Ok(StatusCode::NO_CONTENT)
}
