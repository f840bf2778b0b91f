//! Handlers for `/friends` endpoints.
//!
//! Two code paths mutate the same edge set on purpose: the request cycle
//! (send/accept/reject) and the direct follow/unfollow pair. They are kept
//! separate, matching the product behaviour.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/friends` | The actor's friends |
//! | `GET`    | `/friends/followers` | Friends that are regular users |
//! | `GET`    | `/friends/followings` | Friends that are content creators |
//! | `POST`   | `/friends/follow` | Body: `{"target":"<uuid>"}` |
//! | `POST`   | `/friends/unfollow` | Body: `{"target":"<uuid>"}` |
//! | `GET`    | `/friends/requests` | Pending requests addressed to the actor |
//! | `POST`   | `/friends/requests/:to` | Send a request |
//! | `DELETE` | `/friends/requests/:to` | Withdraw a pending request |
//! | `PUT`    | `/friends/accept/:from` | Accept; creates the symmetric edge |
//! | `PUT`    | `/friends/reject/:from` | Reject; the record is consumed |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use streak_core::{friend::FriendRequest, store::EngineStore, Engine};
use uuid::Uuid;

use crate::{actor::Actor, error::ApiError};

// ─── Edges ───────────────────────────────────────────────────────────────────

/// `GET /friends`
pub async fn list<S>(
  State(engine): State<Arc<Engine<S>>>,
  Actor(actor): Actor,
) -> Result<Json<Vec<Uuid>>, ApiError>
where
  S: EngineStore + 'static,
{
  Ok(Json(engine.friends(actor).await?))
}

/// `GET /friends/followers`
pub async fn followers<S>(
  State(engine): State<Arc<Engine<S>>>,
  Actor(actor): Actor,
) -> Result<Json<Vec<Uuid>>, ApiError>
where
  S: EngineStore + 'static,
{
  Ok(Json(engine.followers(actor).await?))
}

/// `GET /friends/followings`
pub async fn followings<S>(
  State(engine): State<Arc<Engine<S>>>,
  Actor(actor): Actor,
) -> Result<Json<Vec<Uuid>>, ApiError>
where
  S: EngineStore + 'static,
{
  Ok(Json(engine.followings(actor).await?))
}

#[derive(Debug, Deserialize)]
pub struct FollowBody {
  pub target: Uuid,
}

/// `POST /friends/follow`
pub async fn follow<S>(
  State(engine): State<Arc<Engine<S>>>,
  Actor(actor): Actor,
  Json(body): Json<FollowBody>,
) -> Result<StatusCode, ApiError>
where
  S: EngineStore + 'static,
{
  engine.add_friend(actor, body.target).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /friends/unfollow`
pub async fn unfollow<S>(
  State(engine): State<Arc<Engine<S>>>,
  Actor(actor): Actor,
  Json(body): Json<FollowBody>,
) -> Result<StatusCode, ApiError>
where
  S: EngineStore + 'static,
{
  engine.remove_friend(actor, body.target).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Request cycle ───────────────────────────────────────────────────────────

/// `GET /friends/requests`
pub async fn requests<S>(
  State(engine): State<Arc<Engine<S>>>,
  Actor(actor): Actor,
) -> Result<Json<Vec<FriendRequest>>, ApiError>
where
  S: EngineStore + 'static,
{
  Ok(Json(engine.requests(actor).await?))
}

/// `POST /friends/requests/:to`
pub async fn send_request<S>(
  State(engine): State<Arc<Engine<S>>>,
  Actor(actor): Actor,
  Path(to): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EngineStore + 'static,
{
  let request = engine.send_request(actor, to).await?;
  Ok((StatusCode::CREATED, Json(request)))
}

/// `DELETE /friends/requests/:to`
pub async fn remove_request<S>(
  State(engine): State<Arc<Engine<S>>>,
  Actor(actor): Actor,
  Path(to): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: EngineStore + 'static,
{
  engine.remove_request(actor, to).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `PUT /friends/accept/:from`
pub async fn accept<S>(
  State(engine): State<Arc<Engine<S>>>,
  Actor(actor): Actor,
  Path(from): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: EngineStore + 'static,
{
  engine.accept_request(from, actor).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `PUT /friends/reject/:from`
pub async fn reject<S>(
  State(engine): State<Arc<Engine<S>>>,
  Actor(actor): Actor,
  Path(from): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: EngineStore + 'static,
{
  engine.reject_request(from, actor).await?;
  Ok(StatusCode::NO_CONTENT)
}
