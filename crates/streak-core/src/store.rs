//! The `EngineStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `streak-store-sqlite`).
//! Higher layers (`streak-api`, the [`Engine`](crate::engine::Engine))
//! depend on this abstraction, not on any concrete backend.
//!
//! Methods are keyed document-store operations: equality lookups, no joins.
//! Backends are not assumed to offer multi-record transactions; the only
//! hard atomicity requirement is that a friend edge is written and removed
//! as a single unit (a reader must never observe it for one party and not
//! the other). Single-tracker day mutations must be linearizable — two
//! racing slot writes apply in some serial order, never losing an update.
//!
//! All methods return `Send` futures so the trait can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use uuid::Uuid;

use crate::{
  friend::FriendRequest,
  progression::LevelRecord,
  tracker::Tracker,
  user::{Role, User},
};

/// Abstraction over the engine's storage backend.
pub trait EngineStore: Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Create and persist a user. Fails with a duplicate-username conflict if
  /// `username` is taken.
  fn add_user(
    &self,
    username: String,
    role: Role,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Retrieve a user by id. Returns `None` if not found.
  fn user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn user_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Resolve a user's role — the authenticating collaborator's contract,
  /// consulted by the Access Gate before permitting gated mutations.
  fn role_of(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Role>, Self::Error>> + Send + '_;

  /// Delete the user record alone. Idempotent. Cascading cleanup of the
  /// user's trackers, edges, requests, and level record is the engine's
  /// responsibility.
  fn remove_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Trackers ──────────────────────────────────────────────────────────

  /// Create a tracker with all slots unchecked and an empty share set.
  /// Fails with a duplicate-title conflict if `(owner, title)` exists.
  fn add_tracker(
    &self,
    owner: Uuid,
    title: String,
  ) -> impl Future<Output = Result<Tracker, Self::Error>> + Send + '_;

  fn tracker<'a>(
    &'a self,
    owner: Uuid,
    title: &'a str,
  ) -> impl Future<Output = Result<Option<Tracker>, Self::Error>> + Send + 'a;

  fn tracker_by_id(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Tracker>, Self::Error>> + Send + '_;

  /// Every tracker the user owns.
  fn trackers_of(
    &self,
    owner: Uuid,
  ) -> impl Future<Output = Result<Vec<Tracker>, Self::Error>> + Send + '_;

  /// Set or clear one day slot and return the updated tracker.
  ///
  /// Fails not-found if the tracker is missing and out-of-range if
  /// `day ∉ [0, 364]`. Writing a slot to its current value is a no-op that
  /// still succeeds. The read-modify-write must be linearizable against
  /// other slot writes to the same tracker.
  fn set_day<'a>(
    &'a self,
    owner: Uuid,
    title: &'a str,
    day: usize,
    checked: bool,
  ) -> impl Future<Output = Result<Tracker, Self::Error>> + Send + 'a;

  /// Add `recipient` to the tracker's share set. Fails not-found if the
  /// tracker is missing, self-share if `recipient == owner`; a no-op if the
  /// recipient is already present.
  fn add_share<'a>(
    &'a self,
    owner: Uuid,
    title: &'a str,
    recipient: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Remove `recipient` from the share set. Fails not-found if the tracker
  /// is missing; a no-op if the recipient was never present.
  fn remove_share<'a>(
    &'a self,
    owner: Uuid,
    title: &'a str,
    recipient: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Ids of every tracker shared *to* this user, by any owner.
  fn shared_with(
    &self,
    recipient: Uuid,
  ) -> impl Future<Output = Result<Vec<Uuid>, Self::Error>> + Send + '_;

  /// Delete one tracker and purge it from every recipient's shared view.
  /// Idempotent — deleting an absent tracker succeeds.
  fn remove_tracker<'a>(
    &'a self,
    owner: Uuid,
    title: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Delete every tracker the user owns, purging shares. Idempotent.
  fn remove_trackers(
    &self,
    owner: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Friend graph ──────────────────────────────────────────────────────

  /// Record a pending request. Fails with a conflict if a request is
  /// already pending in either direction or the two users are already
  /// friends.
  fn add_request(
    &self,
    from: Uuid,
    to: Uuid,
  ) -> impl Future<Output = Result<FriendRequest, Self::Error>> + Send + '_;

  fn request(
    &self,
    from: Uuid,
    to: Uuid,
  ) -> impl Future<Output = Result<Option<FriendRequest>, Self::Error>> + Send + '_;

  /// Delete a pending request. Fails not-found if none exists for that
  /// direction.
  fn remove_request(
    &self,
    from: Uuid,
    to: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// All pending requests addressed *to* `user`.
  fn requests_to(
    &self,
    user: Uuid,
  ) -> impl Future<Output = Result<Vec<FriendRequest>, Self::Error>> + Send + '_;

  /// Delete every pending request `user` sent or received. Idempotent.
  fn remove_requests_of(
    &self,
    user: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Write the symmetric edge as a single atomic unit. Idempotent. Fails
  /// with a self-friend conflict if `a == b`.
  fn add_edge(
    &self,
    a: Uuid,
    b: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Remove the edge — both directions at once. Idempotent.
  fn remove_edge(
    &self,
    a: Uuid,
    b: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn has_edge(
    &self,
    a: Uuid,
    b: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// All users with a friend edge to `user`.
  fn friends_of(
    &self,
    user: Uuid,
  ) -> impl Future<Output = Result<Vec<Uuid>, Self::Error>> + Send + '_;

  // ── Levels ────────────────────────────────────────────────────────────

  /// Overwrite the user's level record unconditionally (upsert).
  fn put_level(
    &self,
    record: LevelRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn level(
    &self,
    user: Uuid,
  ) -> impl Future<Output = Result<Option<LevelRecord>, Self::Error>> + Send + '_;

  /// Delete the level record. Idempotent.
  fn remove_level(
    &self,
    user: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
