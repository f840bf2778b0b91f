//! The engagement engine — the service layer over an [`EngineStore`].
//!
//! Composes the Tracker Store, the Friend Graph, the Access Gate, and the
//! Progression Calculator by explicit constructor injection; there are no
//! ambient globals. Every boundary operation lives here and returns either
//! a payload or a typed [`Error`](crate::Error) — raw store errors never
//! cross this layer.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
  friend::FriendRequest,
  gate::{AccessGate, Op},
  progression::{LevelCurve, LevelRecord, Progression},
  store::EngineStore,
  tracker::Tracker,
  user::{Role, User},
  Error, Result,
};

pub struct Engine<S> {
  store:       Arc<S>,
  gate:        AccessGate<S>,
  progression: Progression<S>,
}

impl<S: EngineStore> Engine<S> {
  pub fn new(store: Arc<S>, curve: LevelCurve) -> Self {
    Self {
      gate:        AccessGate::new(store.clone()),
      progression: Progression::new(store.clone(), curve),
      store,
    }
  }

  // ── Users ─────────────────────────────────────────────────────────────

  pub async fn create_user(&self, username: &str, role: Role) -> Result<User> {
    self
      .store
      .add_user(username.to_owned(), role)
      .await
      .map_err(Into::into)
  }

  pub async fn user(&self, id: Uuid) -> Result<User> {
    self
      .store
      .user(id)
      .await
      .map_err(Into::into)?
      .ok_or(Error::UserNotFound(id))
  }

  pub async fn user_by_username(&self, username: &str) -> Result<User> {
    self
      .store
      .user_by_username(username)
      .await
      .map_err(Into::into)?
      .ok_or_else(|| Error::UsernameNotFound(username.to_owned()))
  }

  /// Delete a user and everything hanging off them: trackers (purging
  /// shares), friend edges, pending requests, and the level record.
  ///
  /// Every step is idempotent, so the cascade is safe to re-invoke after a
  /// partial failure.
  pub async fn delete_user(&self, user: Uuid) -> Result<()> {
    self.store.remove_trackers(user).await.map_err(Into::into)?;
    for friend in self.store.friends_of(user).await.map_err(Into::into)? {
      self.store.remove_edge(user, friend).await.map_err(Into::into)?;
    }
    self
      .store
      .remove_requests_of(user)
      .await
      .map_err(Into::into)?;
    self.store.remove_level(user).await.map_err(Into::into)?;
    self.store.remove_user(user).await.map_err(Into::into)
  }

  // ── Trackers ──────────────────────────────────────────────────────────

  pub async fn make_tracker(&self, actor: Uuid, title: &str) -> Result<Tracker> {
    self.gate.authorize(actor, Op::MakeTracker).await?;
    self
      .store
      .add_tracker(actor, title.to_owned())
      .await
      .map_err(Into::into)
  }

  pub async fn trackers(&self, owner: Uuid) -> Result<Vec<Tracker>> {
    self.store.trackers_of(owner).await.map_err(Into::into)
  }

  pub async fn tracker_by_id(&self, id: Uuid) -> Result<Tracker> {
    self
      .store
      .tracker_by_id(id)
      .await
      .map_err(Into::into)?
      .ok_or(Error::TrackerIdNotFound(id))
  }

  /// Trackers shared *to* `recipient` by any owner. Share rows whose
  /// tracker has since vanished are skipped, not errors.
  pub async fn shared_trackers(&self, recipient: Uuid) -> Result<Vec<Tracker>> {
    let ids = self.store.shared_with(recipient).await.map_err(Into::into)?;
    let mut trackers = Vec::with_capacity(ids.len());
    for id in ids {
      if let Some(tracker) =
        self.store.tracker_by_id(id).await.map_err(Into::into)?
      {
        trackers.push(tracker);
      }
    }
    Ok(trackers)
  }

  /// Shared trackers filtered to a title — "trackers with this title that
  /// anyone has shared with me".
  pub async fn shared_trackers_titled(
    &self,
    recipient: Uuid,
    title: &str,
  ) -> Result<Vec<Tracker>> {
    let mut trackers = self.shared_trackers(recipient).await?;
    trackers.retain(|t| t.title == title);
    Ok(trackers)
  }

  pub async fn share_tracker(
    &self,
    actor: Uuid,
    title: &str,
    recipient: Uuid,
  ) -> Result<()> {
    self.gate.authorize(actor, Op::ShareTracker).await?;
    self
      .store
      .add_share(actor, title, recipient)
      .await
      .map_err(Into::into)
  }

  pub async fn unshare_tracker(
    &self,
    actor: Uuid,
    title: &str,
    recipient: Uuid,
  ) -> Result<()> {
    self.gate.authorize(actor, Op::UnshareTracker).await?;
    self
      .store
      .remove_share(actor, title, recipient)
      .await
      .map_err(Into::into)
  }

  pub async fn delete_tracker(&self, actor: Uuid, title: &str) -> Result<()> {
    self.gate.authorize(actor, Op::DeleteTracker).await?;
    self
      .store
      .remove_tracker(actor, title)
      .await
      .map_err(Into::into)
  }

  /// Delete every tracker `owner` owns. Ungated: only reachable through
  /// the user-deletion cascade, not exposed to actors directly.
  pub async fn delete_trackers(&self, owner: Uuid) -> Result<()> {
    self.store.remove_trackers(owner).await.map_err(Into::into)
  }

  /// Check one day slot, then recompute the owner's level record from the
  /// full tracker set. Checking an already-checked day is a no-op that
  /// still succeeds and still recomputes.
  pub async fn check_day(
    &self,
    actor: Uuid,
    title: &str,
    day: usize,
  ) -> Result<LevelRecord> {
    self.gate.authorize(actor, Op::CheckDay).await?;
    self
      .store
      .set_day(actor, title, day, true)
      .await
      .map_err(Into::into)?;
    self.progression.recompute(actor).await
  }

  pub async fn uncheck_day(
    &self,
    actor: Uuid,
    title: &str,
    day: usize,
  ) -> Result<LevelRecord> {
    self.gate.authorize(actor, Op::UncheckDay).await?;
    self
      .store
      .set_day(actor, title, day, false)
      .await
      .map_err(Into::into)?;
    self.progression.recompute(actor).await
  }

  pub async fn total_checked_days(&self, owner: Uuid, title: &str) -> Result<u32> {
    let tracker = self
      .store
      .tracker(owner, title)
      .await
      .map_err(Into::into)?
      .ok_or_else(|| Error::TrackerNotFound {
        owner,
        title: title.to_owned(),
      })?;
    Ok(tracker.total_checked_days())
  }

  // ── Friend graph ──────────────────────────────────────────────────────

  pub async fn send_request(&self, from: Uuid, to: Uuid) -> Result<FriendRequest> {
    self.gate.authorize(from, Op::SendRequest).await?;
    self.store.add_request(from, to).await.map_err(Into::into)
  }

  pub async fn remove_request(&self, from: Uuid, to: Uuid) -> Result<()> {
    self.gate.authorize(from, Op::RemoveRequest).await?;
    self.store.remove_request(from, to).await.map_err(Into::into)
  }

  /// Accept a pending request: the edge is written first, then the request
  /// record is consumed. If the second step is lost, re-invoking converges
  /// — the edge write is idempotent and the request is still deletable.
  pub async fn accept_request(&self, from: Uuid, to: Uuid) -> Result<()> {
    self.gate.authorize(to, Op::AcceptRequest).await?;
    self
      .store
      .request(from, to)
      .await
      .map_err(Into::into)?
      .ok_or(Error::RequestNotFound { from, to })?;
    self.store.add_edge(from, to).await.map_err(Into::into)?;
    self.store.remove_request(from, to).await.map_err(Into::into)
  }

  /// Reject a pending request: the record is deleted, nothing is retained,
  /// and the pair returns to the no-request state.
  pub async fn reject_request(&self, from: Uuid, to: Uuid) -> Result<()> {
    self.gate.authorize(to, Op::RejectRequest).await?;
    self
      .store
      .request(from, to)
      .await
      .map_err(Into::into)?
      .ok_or(Error::RequestNotFound { from, to })?;
    self.store.remove_request(from, to).await.map_err(Into::into)
  }

  /// Direct edge write bypassing the request cycle — the follow operation
  /// visible at the boundary. Idempotent.
  pub async fn add_friend(&self, actor: Uuid, target: Uuid) -> Result<()> {
    self.gate.authorize(actor, Op::AddFriend).await?;
    self.store.add_edge(actor, target).await.map_err(Into::into)
  }

  /// Direct edge removal — unfollow. Idempotent.
  pub async fn remove_friend(&self, actor: Uuid, target: Uuid) -> Result<()> {
    self.gate.authorize(actor, Op::RemoveFriend).await?;
    self.store.remove_edge(actor, target).await.map_err(Into::into)
  }

  pub async fn friends(&self, user: Uuid) -> Result<Vec<Uuid>> {
    self.store.friends_of(user).await.map_err(Into::into)
  }

  pub async fn requests(&self, user: Uuid) -> Result<Vec<FriendRequest>> {
    self.store.requests_to(user).await.map_err(Into::into)
  }

  /// Friends that are not content creators.
  pub async fn followers(&self, user: Uuid) -> Result<Vec<Uuid>> {
    self.friends_with_role(user, Role::RegularUser).await
  }

  /// Friends that are content creators.
  pub async fn followings(&self, user: Uuid) -> Result<Vec<Uuid>> {
    self.friends_with_role(user, Role::ContentCreator).await
  }

  async fn friends_with_role(&self, user: Uuid, role: Role) -> Result<Vec<Uuid>> {
    let mut matched = Vec::new();
    for friend in self.store.friends_of(user).await.map_err(Into::into)? {
      if self.store.role_of(friend).await.map_err(Into::into)? == Some(role) {
        matched.push(friend);
      }
    }
    Ok(matched)
  }

  // ── Leveling ──────────────────────────────────────────────────────────

  /// Recompute and persist the level record from tracker ground truth.
  /// Caller-supplied totals are deliberately not accepted — experience is a
  /// pure function of tracker state, so trusting them would let the record
  /// drift.
  pub async fn update_exp(&self, user: Uuid) -> Result<LevelRecord> {
    self.progression.recompute(user).await
  }

  pub async fn level(&self, user: Uuid) -> Result<u32> {
    Ok(self.level_record(user).await?.level)
  }

  pub async fn exp(&self, user: Uuid) -> Result<u64> {
    Ok(self.level_record(user).await?.exp)
  }

  pub async fn level_record(&self, user: Uuid) -> Result<LevelRecord> {
    self
      .store
      .level(user)
      .await
      .map_err(Into::into)?
      .ok_or(Error::LevelNotFound(user))
  }

  pub async fn delete_level(&self, user: Uuid) -> Result<()> {
    self.store.remove_level(user).await.map_err(Into::into)
  }
}
