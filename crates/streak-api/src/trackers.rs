//! Handlers for `/trackers` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/trackers` | Body: `{"title":"running"}` |
//! | `GET`    | `/trackers` | Every tracker the actor owns |
//! | `DELETE` | `/trackers` | `?title=` names the tracker to delete |
//! | `GET`    | `/trackers/shared` | Shared *to* the actor; optional `?title=` |
//! | `GET`    | `/trackers/:id` | 404 if not found |
//! | `POST`   | `/trackers/:title/share` | Body: `{"recipient":"<uuid>"}` |
//! | `POST`   | `/trackers/:title/unshare` | Body: `{"recipient":"<uuid>"}` |
//! | `PATCH`  | `/trackers/:title/check` | Body: `{"day":42}`; returns the recomputed level record |
//! | `PATCH`  | `/trackers/:title/uncheck` | Body: `{"day":42}`; likewise |
//! | `GET`    | `/trackers/:title/total` | Checked-day count |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use streak_core::{
  progression::LevelRecord,
  store::EngineStore,
  tracker::Tracker,
  Engine,
};
use uuid::Uuid;

use crate::{actor::Actor, error::ApiError};

// ─── Create / list ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub title: String,
}

/// `POST /trackers`
pub async fn create<S>(
  State(engine): State<Arc<Engine<S>>>,
  Actor(actor): Actor,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EngineStore + 'static,
{
  let tracker = engine.make_tracker(actor, &body.title).await?;
  Ok((StatusCode::CREATED, Json(tracker)))
}

/// `GET /trackers`
pub async fn list<S>(
  State(engine): State<Arc<Engine<S>>>,
  Actor(actor): Actor,
) -> Result<Json<Vec<Tracker>>, ApiError>
where
  S: EngineStore + 'static,
{
  Ok(Json(engine.trackers(actor).await?))
}

/// `GET /trackers/:id`
pub async fn get_one<S>(
  State(engine): State<Arc<Engine<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Tracker>, ApiError>
where
  S: EngineStore + 'static,
{
  Ok(Json(engine.tracker_by_id(id).await?))
}

// ─── Shared view ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SharedParams {
  pub title: Option<String>,
}

/// `GET /trackers/shared[?title=<title>]`
pub async fn shared<S>(
  State(engine): State<Arc<Engine<S>>>,
  Actor(actor): Actor,
  Query(params): Query<SharedParams>,
) -> Result<Json<Vec<Tracker>>, ApiError>
where
  S: EngineStore + 'static,
{
  let trackers = match params.title {
    Some(title) => engine.shared_trackers_titled(actor, &title).await?,
    None => engine.shared_trackers(actor).await?,
  };
  Ok(Json(trackers))
}

// ─── Sharing ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ShareBody {
  pub recipient: Uuid,
}

/// `POST /trackers/:title/share`
pub async fn share<S>(
  State(engine): State<Arc<Engine<S>>>,
  Actor(actor): Actor,
  Path(title): Path<String>,
  Json(body): Json<ShareBody>,
) -> Result<StatusCode, ApiError>
where
  S: EngineStore + 'static,
{
  engine.share_tracker(actor, &title, body.recipient).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /trackers/:title/unshare`
pub async fn unshare<S>(
  State(engine): State<Arc<Engine<S>>>,
  Actor(actor): Actor,
  Path(title): Path<String>,
  Json(body): Json<ShareBody>,
) -> Result<StatusCode, ApiError>
where
  S: EngineStore + 'static,
{
  engine.unshare_tracker(actor, &title, body.recipient).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Day mutations ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DayBody {
  pub day: usize,
}

/// `PATCH /trackers/:title/check`
pub async fn check<S>(
  State(engine): State<Arc<Engine<S>>>,
  Actor(actor): Actor,
  Path(title): Path<String>,
  Json(body): Json<DayBody>,
) -> Result<Json<LevelRecord>, ApiError>
where
  S: EngineStore + 'static,
{
  Ok(Json(engine.check_day(actor, &title, body.day).await?))
}

/// `PATCH /trackers/:title/uncheck`
pub async fn uncheck<S>(
  State(engine): State<Arc<Engine<S>>>,
  Actor(actor): Actor,
  Path(title): Path<String>,
  Json(body): Json<DayBody>,
) -> Result<Json<LevelRecord>, ApiError>
where
  S: EngineStore + 'static,
{
  Ok(Json(engine.uncheck_day(actor, &title, body.day).await?))
}

/// `GET /trackers/:title/total`
pub async fn total<S>(
  State(engine): State<Arc<Engine<S>>>,
  Actor(actor): Actor,
  Path(title): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EngineStore + 'static,
{
  let total = engine.total_checked_days(actor, &title).await?;
  Ok(Json(json!({ "total": total })))
}

// ─── Deletion ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
  pub title: String,
}

/// `DELETE /trackers?title=<title>`
pub async fn delete<S>(
  State(engine): State<Arc<Engine<S>>>,
  Actor(actor): Actor,
  Query(params): Query<DeleteParams>,
) -> Result<StatusCode, ApiError>
where
  S: EngineStore + 'static,
{
  engine.delete_tracker(actor, &params.title).await?;
  Ok(StatusCode::NO_CONTENT)
}
