//! JSON REST API for the Streak engine.
//!
//! Exposes an axum [`Router`] backed by an [`Engine`] over any
//! [`streak_core::store::EngineStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility; caller identity arrives pre-resolved in
//! the `x-actor-id` header (see [`actor::Actor`]).
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", streak_api::api_router(engine.clone()))
//! ```

pub mod actor;
pub mod error;
pub mod friends;
pub mod levels;
pub mod trackers;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, patch, post, put},
};
use streak_core::{store::EngineStore, Engine};

pub use error::ApiError;

/// Build a fully-materialised API router for `engine`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(engine: Arc<Engine<S>>) -> Router<()>
where
  S: EngineStore + 'static,
{
  Router::new()
    // Users
    .route("/users", post(users::create::<S>))
    .route(
      "/users/{id}",
      get(users::get_one::<S>).delete(users::delete_one::<S>),
    )
    .route("/users/by-name/{username}", get(users::get_by_username::<S>))
    // Trackers
    .route(
      "/trackers",
      get(trackers::list::<S>)
        .post(trackers::create::<S>)
        .delete(trackers::delete::<S>),
    )
    .route("/trackers/shared", get(trackers::shared::<S>))
    .route("/trackers/by-id/{id}", get(trackers::get_one::<S>))
    .route("/trackers/{title}/share", post(trackers::share::<S>))
    .route("/trackers/{title}/unshare", post(trackers::unshare::<S>))
    .route("/trackers/{title}/check", patch(trackers::check::<S>))
    .route("/trackers/{title}/uncheck", patch(trackers::uncheck::<S>))
    .route("/trackers/{title}/total", get(trackers::total::<S>))
    // Friends
    .route("/friends", get(friends::list::<S>))
    .route("/friends/followers", get(friends::followers::<S>))
    .route("/friends/followings", get(friends::followings::<S>))
    .route("/friends/follow", post(friends::follow::<S>))
    .route("/friends/unfollow", post(friends::unfollow::<S>))
    .route("/friends/requests", get(friends::requests::<S>))
    .route(
      "/friends/requests/{to}",
      post(friends::send_request::<S>).delete(friends::remove_request::<S>),
    )
    .route("/friends/accept/{from}", put(friends::accept::<S>))
    .route("/friends/reject/{from}", put(friends::reject::<S>))
    // Levels
    .route(
      "/levels/{user}",
      get(levels::get_one::<S>).delete(levels::delete_one::<S>),
    )
    .route("/levels/{user}/exp", get(levels::get_exp::<S>))
    .route("/levels/{user}/recompute", post(levels::recompute::<S>))
    .with_state(engine)
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{header, Request, StatusCode},
  };
  use serde_json::{json, Value};
  use streak_core::progression::LevelCurve;
  use streak_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;
  use uuid::Uuid;

  async fn app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let engine = Engine::new(Arc::new(store), LevelCurve::new(vec![10, 25, 50]));
    api_router(Arc::new(engine))
  }

  async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    actor: Option<Uuid>,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(actor) = actor {
      builder = builder.header("x-actor-id", actor.to_string());
    }
    let req = match body {
      Some(v) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(v.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  async fn create_user(app: &Router, name: &str, role: &str) -> Uuid {
    let (status, body) = send(
      app,
      "POST",
      "/users",
      None,
      Some(json!({ "username": name, "role": role })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "user creation failed: {body}");
    body["user_id"].as_str().unwrap().parse().unwrap()
  }

  // ── Trackers ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn tracker_check_flow() {
    let app = app().await;
    let alice = create_user(&app, "alice", "regular_user").await;

    let (status, body) = send(
      &app,
      "POST",
      "/trackers",
      Some(alice),
      Some(json!({ "title": "running" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["title"], "running");
    assert_eq!(body["days"].as_array().unwrap().len(), 365);

    let (status, record) = send(
      &app,
      "PATCH",
      "/trackers/running/check",
      Some(alice),
      Some(json!({ "day": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["exp"], 1);

    let (status, total) =
      send(&app, "GET", "/trackers/running/total", Some(alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(total["total"], 1);
  }

  #[tokio::test]
  async fn out_of_range_day_returns_422() {
    let app = app().await;
    let alice = create_user(&app, "alice", "regular_user").await;
    send(
      &app,
      "POST",
      "/trackers",
      Some(alice),
      Some(json!({ "title": "running" })),
    )
    .await;

    let (status, _) = send(
      &app,
      "PATCH",
      "/trackers/running/check",
      Some(alice),
      Some(json!({ "day": 365 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  }

  #[tokio::test]
  async fn unknown_tracker_returns_404() {
    let app = app().await;
    let alice = create_user(&app, "alice", "regular_user").await;

    let (status, _) = send(
      &app,
      "PATCH",
      "/trackers/running/check",
      Some(alice),
      Some(json!({ "day": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn duplicate_title_returns_409() {
    let app = app().await;
    let alice = create_user(&app, "alice", "regular_user").await;

    for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
      let (status, _) = send(
        &app,
        "POST",
        "/trackers",
        Some(alice),
        Some(json!({ "title": "running" })),
      )
      .await;
      assert_eq!(status, expected);
    }
  }

  #[tokio::test]
  async fn shared_trackers_visible_to_recipient() {
    let app = app().await;
    let alice = create_user(&app, "alice", "regular_user").await;
    let bob = create_user(&app, "bob", "regular_user").await;

    send(
      &app,
      "POST",
      "/trackers",
      Some(alice),
      Some(json!({ "title": "running" })),
    )
    .await;
    let (status, _) = send(
      &app,
      "POST",
      "/trackers/running/share",
      Some(alice),
      Some(json!({ "recipient": bob })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, shared) =
      send(&app, "GET", "/trackers/shared?title=running", Some(bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shared.as_array().unwrap().len(), 1);
  }

  // ── Access gate ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn content_creator_share_returns_403() {
    let app = app().await;
    let creator = create_user(&app, "creator", "content_creator").await;
    let bob = create_user(&app, "bob", "regular_user").await;

    send(
      &app,
      "POST",
      "/trackers",
      Some(creator),
      Some(json!({ "title": "posting" })),
    )
    .await;
    let (status, _) = send(
      &app,
      "POST",
      "/trackers/posting/share",
      Some(creator),
      Some(json!({ "recipient": bob })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
  }

  #[tokio::test]
  async fn content_creator_follow_returns_403() {
    let app = app().await;
    let creator = create_user(&app, "creator", "content_creator").await;
    let bob = create_user(&app, "bob", "regular_user").await;

    let (status, _) = send(
      &app,
      "POST",
      "/friends/follow",
      Some(creator),
      Some(json!({ "target": bob })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
  }

  #[tokio::test]
  async fn missing_actor_header_returns_400() {
    let app = app().await;
    let (status, _) = send(&app, "GET", "/trackers", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  // ── Friends ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn request_accept_flow() {
    let app = app().await;
    let alice = create_user(&app, "alice", "regular_user").await;
    let bob = create_user(&app, "bob", "regular_user").await;

    let (status, _) = send(
      &app,
      "POST",
      &format!("/friends/requests/{bob}"),
      Some(alice),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, pending) = send(&app, "GET", "/friends/requests", Some(bob), None).await;
    assert_eq!(pending.as_array().unwrap().len(), 1);

    let (status, _) = send(
      &app,
      "PUT",
      &format!("/friends/accept/{alice}"),
      Some(bob),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, friends) = send(&app, "GET", "/friends", Some(alice), None).await;
    assert_eq!(friends, json!([bob]));
    let (_, friends) = send(&app, "GET", "/friends", Some(bob), None).await;
    assert_eq!(friends, json!([alice]));
  }

  #[tokio::test]
  async fn duplicate_request_returns_409() {
    let app = app().await;
    let alice = create_user(&app, "alice", "regular_user").await;
    let bob = create_user(&app, "bob", "regular_user").await;

    let uri = format!("/friends/requests/{bob}");
    let (status, _) = send(&app, "POST", &uri, Some(alice), None).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(&app, "POST", &uri, Some(alice), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
  }

  // ── Levels ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn level_read_before_activity_returns_404() {
    let app = app().await;
    let alice = create_user(&app, "alice", "regular_user").await;

    let (status, _) =
      send(&app, "GET", &format!("/levels/{alice}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn level_record_reflects_checks() {
    let app = app().await;
    let alice = create_user(&app, "alice", "regular_user").await;

    send(
      &app,
      "POST",
      "/trackers",
      Some(alice),
      Some(json!({ "title": "running" })),
    )
    .await;
    for day in 0..10 {
      send(
        &app,
        "PATCH",
        "/trackers/running/check",
        Some(alice),
        Some(json!({ "day": day })),
      )
      .await;
    }

    let (status, record) =
      send(&app, "GET", &format!("/levels/{alice}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["exp"], 10);
    assert_eq!(record["level"], 1);
  }

  // ── Users ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn delete_user_purges_shared_view() {
    let app = app().await;
    let alice = create_user(&app, "alice", "regular_user").await;
    let bob = create_user(&app, "bob", "regular_user").await;

    send(
      &app,
      "POST",
      "/trackers",
      Some(alice),
      Some(json!({ "title": "running" })),
    )
    .await;
    send(
      &app,
      "POST",
      "/trackers/running/share",
      Some(alice),
      Some(json!({ "recipient": bob })),
    )
    .await;

    let (status, _) =
      send(&app, "DELETE", &format!("/users/{alice}"), None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, shared) = send(&app, "GET", "/trackers/shared", Some(bob), None).await;
    assert_eq!(shared, json!([]));
    let (status, _) =
      send(&app, "GET", &format!("/users/{alice}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }
}
