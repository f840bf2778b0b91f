//! Integration tests for `SqliteStore` and the engine against an in-memory
//! database.

use std::sync::Arc;

use streak_core::{
  progression::LevelCurve,
  store::EngineStore,
  tracker::DAYS_PER_YEAR,
  user::Role,
  Engine, Error,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn engine() -> Engine<SqliteStore> {
  Engine::new(Arc::new(store().await), LevelCurve::new(vec![10, 25, 50]))
}

async fn user(engine: &Engine<SqliteStore>, name: &str, role: Role) -> Uuid {
  engine.create_user(name, role).await.unwrap().user_id
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_user() {
  let s = store().await;

  let created = s.add_user("alice".into(), Role::RegularUser).await.unwrap();
  let fetched = s.user(created.user_id).await.unwrap().unwrap();

  assert_eq!(fetched.user_id, created.user_id);
  assert_eq!(fetched.username, "alice");
  assert_eq!(fetched.role, Role::RegularUser);
}

#[tokio::test]
async fn duplicate_username_conflicts() {
  let s = store().await;
  s.add_user("alice".into(), Role::RegularUser).await.unwrap();

  let err = s
    .add_user("alice".into(), Role::ContentCreator)
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(Error::DuplicateUsername(_))
  ));
}

#[tokio::test]
async fn user_by_username_resolves() {
  let e = engine().await;
  let id = user(&e, "bob", Role::ContentCreator).await;

  let fetched = e.user_by_username("bob").await.unwrap();
  assert_eq!(fetched.user_id, id);

  let err = e.user_by_username("nobody").await.unwrap_err();
  assert!(matches!(err, Error::UsernameNotFound(_)));
}

// ─── Trackers ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn make_tracker_starts_empty() {
  let e = engine().await;
  let alice = user(&e, "alice", Role::RegularUser).await;

  let tracker = e.make_tracker(alice, "running").await.unwrap();
  assert_eq!(tracker.days.len(), DAYS_PER_YEAR);
  assert!(tracker.days.iter().all(|d| !d));
  assert!(tracker.shared_with.is_empty());
  assert_eq!(e.total_checked_days(alice, "running").await.unwrap(), 0);
}

#[tokio::test]
async fn duplicate_title_conflicts() {
  let e = engine().await;
  let alice = user(&e, "alice", Role::RegularUser).await;
  e.make_tracker(alice, "running").await.unwrap();

  let err = e.make_tracker(alice, "running").await.unwrap_err();
  assert!(matches!(err, Error::DuplicateTracker { .. }));

  // A different owner may reuse the title.
  let bob = user(&e, "bob", Role::RegularUser).await;
  e.make_tracker(bob, "running").await.unwrap();
}

#[tokio::test]
async fn check_day_increments_total() {
  let e = engine().await;
  let alice = user(&e, "alice", Role::RegularUser).await;
  e.make_tracker(alice, "running").await.unwrap();

  e.check_day(alice, "running", 0).await.unwrap();
  assert_eq!(e.total_checked_days(alice, "running").await.unwrap(), 1);

  e.check_day(alice, "running", 364).await.unwrap();
  assert_eq!(e.total_checked_days(alice, "running").await.unwrap(), 2);
}

#[tokio::test]
async fn checking_a_checked_day_is_a_noop() {
  let e = engine().await;
  let alice = user(&e, "alice", Role::RegularUser).await;
  e.make_tracker(alice, "running").await.unwrap();

  e.check_day(alice, "running", 7).await.unwrap();
  e.check_day(alice, "running", 7).await.unwrap();
  assert_eq!(e.total_checked_days(alice, "running").await.unwrap(), 1);
}

#[tokio::test]
async fn check_then_uncheck_round_trips() {
  let e = engine().await;
  let alice = user(&e, "alice", Role::RegularUser).await;
  e.make_tracker(alice, "running").await.unwrap();

  let before = e.trackers(alice).await.unwrap().remove(0).days;
  e.check_day(alice, "running", 100).await.unwrap();
  e.uncheck_day(alice, "running", 100).await.unwrap();
  let after = e.trackers(alice).await.unwrap().remove(0).days;

  assert_eq!(before, after);
}

#[tokio::test]
async fn day_out_of_range_is_rejected() {
  let e = engine().await;
  let alice = user(&e, "alice", Role::RegularUser).await;
  e.make_tracker(alice, "running").await.unwrap();

  let err = e.check_day(alice, "running", 365).await.unwrap_err();
  assert!(matches!(err, Error::DayOutOfRange(365)));

  let err = e.uncheck_day(alice, "running", usize::MAX).await.unwrap_err();
  assert!(matches!(err, Error::DayOutOfRange(_)));
}

#[tokio::test]
async fn check_day_on_missing_tracker_is_not_found() {
  let e = engine().await;
  let alice = user(&e, "alice", Role::RegularUser).await;

  let err = e.check_day(alice, "running", 0).await.unwrap_err();
  assert!(matches!(err, Error::TrackerNotFound { .. }));
}

#[tokio::test]
async fn tracker_by_id_round_trips() {
  let e = engine().await;
  let alice = user(&e, "alice", Role::RegularUser).await;
  let created = e.make_tracker(alice, "running").await.unwrap();

  let fetched = e.tracker_by_id(created.tracker_id).await.unwrap();
  assert_eq!(fetched.title, "running");

  let err = e.tracker_by_id(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::TrackerIdNotFound(_)));
}

// ─── Sharing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn share_and_list_shared() {
  let e = engine().await;
  let alice = user(&e, "alice", Role::RegularUser).await;
  let bob = user(&e, "bob", Role::RegularUser).await;
  let tracker = e.make_tracker(alice, "running").await.unwrap();

  e.share_tracker(alice, "running", bob).await.unwrap();

  let shared = e.shared_trackers(bob).await.unwrap();
  assert_eq!(shared.len(), 1);
  assert_eq!(shared[0].tracker_id, tracker.tracker_id);
  assert_eq!(shared[0].shared_with, vec![bob]);

  // Owner's own list is unaffected.
  assert!(e.shared_trackers(alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn shared_trackers_filtered_by_title() {
  let e = engine().await;
  let alice = user(&e, "alice", Role::RegularUser).await;
  let carol = user(&e, "carol", Role::RegularUser).await;
  let bob = user(&e, "bob", Role::RegularUser).await;

  e.make_tracker(alice, "running").await.unwrap();
  e.make_tracker(carol, "running").await.unwrap();
  e.make_tracker(carol, "reading").await.unwrap();
  e.share_tracker(alice, "running", bob).await.unwrap();
  e.share_tracker(carol, "running", bob).await.unwrap();
  e.share_tracker(carol, "reading", bob).await.unwrap();

  let running = e.shared_trackers_titled(bob, "running").await.unwrap();
  assert_eq!(running.len(), 2);
  assert!(running.iter().all(|t| t.title == "running"));
}

#[tokio::test]
async fn self_share_conflicts() {
  let e = engine().await;
  let alice = user(&e, "alice", Role::RegularUser).await;
  e.make_tracker(alice, "running").await.unwrap();

  let err = e.share_tracker(alice, "running", alice).await.unwrap_err();
  assert!(matches!(err, Error::SelfShare));
}

#[tokio::test]
async fn sharing_twice_is_a_noop() {
  let e = engine().await;
  let alice = user(&e, "alice", Role::RegularUser).await;
  let bob = user(&e, "bob", Role::RegularUser).await;
  e.make_tracker(alice, "running").await.unwrap();

  e.share_tracker(alice, "running", bob).await.unwrap();
  e.share_tracker(alice, "running", bob).await.unwrap();
  assert_eq!(e.shared_trackers(bob).await.unwrap().len(), 1);
}

#[tokio::test]
async fn unshare_of_absent_recipient_is_a_noop() {
  let e = engine().await;
  let alice = user(&e, "alice", Role::RegularUser).await;
  let bob = user(&e, "bob", Role::RegularUser).await;
  e.make_tracker(alice, "running").await.unwrap();

  // Never shared — still succeeds.
  e.unshare_tracker(alice, "running", bob).await.unwrap();
}

#[tokio::test]
async fn unshare_on_missing_tracker_is_not_found() {
  let e = engine().await;
  let alice = user(&e, "alice", Role::RegularUser).await;
  let bob = user(&e, "bob", Role::RegularUser).await;

  let err = e.unshare_tracker(alice, "running", bob).await.unwrap_err();
  assert!(matches!(err, Error::TrackerNotFound { .. }));
}

#[tokio::test]
async fn delete_tracker_purges_shared_views() {
  let e = engine().await;
  let alice = user(&e, "alice", Role::RegularUser).await;
  let bob = user(&e, "bob", Role::RegularUser).await;
  let carol = user(&e, "carol", Role::RegularUser).await;

  e.make_tracker(alice, "running").await.unwrap();
  e.share_tracker(alice, "running", bob).await.unwrap();
  e.share_tracker(alice, "running", carol).await.unwrap();

  e.delete_tracker(alice, "running").await.unwrap();

  assert!(e.shared_trackers(bob).await.unwrap().is_empty());
  assert!(e.shared_trackers(carol).await.unwrap().is_empty());

  // Idempotent: deleting again still succeeds.
  e.delete_tracker(alice, "running").await.unwrap();
}

// ─── Friend graph ────────────────────────────────────────────────────────────

#[tokio::test]
async fn accept_creates_symmetric_edge_and_consumes_request() {
  let e = engine().await;
  let alice = user(&e, "alice", Role::RegularUser).await;
  let bob = user(&e, "bob", Role::RegularUser).await;

  e.send_request(alice, bob).await.unwrap();
  assert_eq!(e.requests(bob).await.unwrap().len(), 1);

  e.accept_request(alice, bob).await.unwrap();

  assert_eq!(e.friends(alice).await.unwrap(), vec![bob]);
  assert_eq!(e.friends(bob).await.unwrap(), vec![alice]);
  assert!(e.requests(bob).await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_request_conflicts() {
  let e = engine().await;
  let alice = user(&e, "alice", Role::RegularUser).await;
  let bob = user(&e, "bob", Role::RegularUser).await;

  e.send_request(alice, bob).await.unwrap();
  let err = e.send_request(alice, bob).await.unwrap_err();
  assert!(matches!(err, Error::DuplicateRequest { .. }));

  // The reverse direction is blocked by the same pending request.
  let err = e.send_request(bob, alice).await.unwrap_err();
  assert!(matches!(err, Error::DuplicateRequest { .. }));
}

#[tokio::test]
async fn request_between_friends_conflicts() {
  let e = engine().await;
  let alice = user(&e, "alice", Role::RegularUser).await;
  let bob = user(&e, "bob", Role::RegularUser).await;

  e.send_request(alice, bob).await.unwrap();
  e.accept_request(alice, bob).await.unwrap();

  let err = e.send_request(alice, bob).await.unwrap_err();
  assert!(matches!(err, Error::AlreadyFriends(_, _)));
}

#[tokio::test]
async fn reject_returns_pair_to_no_request() {
  let e = engine().await;
  let alice = user(&e, "alice", Role::RegularUser).await;
  let bob = user(&e, "bob", Role::RegularUser).await;

  e.send_request(alice, bob).await.unwrap();
  e.reject_request(alice, bob).await.unwrap();

  // No edge, no retained record — the pair can try again.
  assert!(e.friends(alice).await.unwrap().is_empty());
  assert!(e.requests(bob).await.unwrap().is_empty());
  e.send_request(alice, bob).await.unwrap();
}

#[tokio::test]
async fn accept_without_pending_request_is_not_found() {
  let e = engine().await;
  let alice = user(&e, "alice", Role::RegularUser).await;
  let bob = user(&e, "bob", Role::RegularUser).await;

  let err = e.accept_request(alice, bob).await.unwrap_err();
  assert!(matches!(err, Error::RequestNotFound { .. }));

  // Direction matters: a pending (alice → bob) request cannot be accepted
  // as (bob → alice).
  e.send_request(alice, bob).await.unwrap();
  let err = e.accept_request(bob, alice).await.unwrap_err();
  assert!(matches!(err, Error::RequestNotFound { .. }));
}

#[tokio::test]
async fn remove_request_without_pending_is_not_found() {
  let e = engine().await;
  let alice = user(&e, "alice", Role::RegularUser).await;
  let bob = user(&e, "bob", Role::RegularUser).await;

  let err = e.remove_request(alice, bob).await.unwrap_err();
  assert!(matches!(err, Error::RequestNotFound { .. }));
}

#[tokio::test]
async fn follow_and_unfollow_are_idempotent() {
  let e = engine().await;
  let alice = user(&e, "alice", Role::RegularUser).await;
  let creator = user(&e, "creator", Role::ContentCreator).await;

  e.add_friend(alice, creator).await.unwrap();
  e.add_friend(alice, creator).await.unwrap();
  assert_eq!(e.friends(alice).await.unwrap(), vec![creator]);
  assert_eq!(e.friends(creator).await.unwrap(), vec![alice]);

  e.remove_friend(alice, creator).await.unwrap();
  e.remove_friend(alice, creator).await.unwrap();
  assert!(e.friends(alice).await.unwrap().is_empty());
  assert!(e.friends(creator).await.unwrap().is_empty());
}

#[tokio::test]
async fn followers_and_followings_partition_by_role() {
  let e = engine().await;
  let alice = user(&e, "alice", Role::RegularUser).await;
  let bob = user(&e, "bob", Role::RegularUser).await;
  let creator = user(&e, "creator", Role::ContentCreator).await;

  e.add_friend(alice, creator).await.unwrap();
  e.send_request(bob, alice).await.unwrap();
  e.accept_request(bob, alice).await.unwrap();

  assert_eq!(e.followers(alice).await.unwrap(), vec![bob]);
  assert_eq!(e.followings(alice).await.unwrap(), vec![creator]);
}

#[tokio::test]
async fn self_friend_conflicts() {
  let e = engine().await;
  let alice = user(&e, "alice", Role::RegularUser).await;

  let err = e.add_friend(alice, alice).await.unwrap_err();
  assert!(matches!(err, Error::SelfFriend));
  let err = e.send_request(alice, alice).await.unwrap_err();
  assert!(matches!(err, Error::SelfFriend));
}

// ─── Progression ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn experience_sums_all_trackers() {
  let e = engine().await;
  let alice = user(&e, "alice", Role::RegularUser).await;

  e.make_tracker(alice, "running").await.unwrap();
  e.make_tracker(alice, "reading").await.unwrap();
  e.make_tracker(alice, "meditation").await.unwrap();

  for day in 0..3 {
    e.check_day(alice, "running", day).await.unwrap();
  }
  for day in 0..5 {
    e.check_day(alice, "reading", day).await.unwrap();
  }

  assert_eq!(e.exp(alice).await.unwrap(), 8);

  // Unchecking one of the five recomputes down to seven.
  e.uncheck_day(alice, "reading", 0).await.unwrap();
  assert_eq!(e.exp(alice).await.unwrap(), 7);
}

#[tokio::test]
async fn level_follows_the_configured_curve() {
  let e = engine().await;
  let alice = user(&e, "alice", Role::RegularUser).await;
  e.make_tracker(alice, "running").await.unwrap();

  for day in 0..9 {
    e.check_day(alice, "running", day).await.unwrap();
  }
  assert_eq!(e.level(alice).await.unwrap(), 0);

  // Crossing the first threshold (10) bumps the level.
  e.check_day(alice, "running", 9).await.unwrap();
  assert_eq!(e.level(alice).await.unwrap(), 1);
}

#[tokio::test]
async fn level_reads_before_any_activity_are_not_found() {
  let e = engine().await;
  let alice = user(&e, "alice", Role::RegularUser).await;

  assert!(matches!(
    e.level(alice).await.unwrap_err(),
    Error::LevelNotFound(_)
  ));
  assert!(matches!(
    e.exp(alice).await.unwrap_err(),
    Error::LevelNotFound(_)
  ));
}

#[tokio::test]
async fn noop_check_still_recomputes() {
  let e = engine().await;
  let alice = user(&e, "alice", Role::RegularUser).await;
  e.make_tracker(alice, "running").await.unwrap();

  e.check_day(alice, "running", 0).await.unwrap();
  e.delete_level(alice).await.unwrap();

  // Re-checking the same day is a slot no-op but still recomputes, so the
  // record reappears.
  e.check_day(alice, "running", 0).await.unwrap();
  assert_eq!(e.exp(alice).await.unwrap(), 1);
}

#[tokio::test]
async fn update_exp_restores_ground_truth() {
  let e = engine().await;
  let alice = user(&e, "alice", Role::RegularUser).await;
  e.make_tracker(alice, "running").await.unwrap();
  e.check_day(alice, "running", 0).await.unwrap();
  e.check_day(alice, "running", 1).await.unwrap();

  e.delete_level(alice).await.unwrap();
  let record = e.update_exp(alice).await.unwrap();
  assert_eq!(record.exp, 2);
}

// ─── Access gate ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn content_creator_cannot_share() {
  let e = engine().await;
  let creator = user(&e, "creator", Role::ContentCreator).await;
  let bob = user(&e, "bob", Role::RegularUser).await;
  e.make_tracker(creator, "posting").await.unwrap();

  let err = e.share_tracker(creator, "posting", bob).await.unwrap_err();
  assert!(matches!(err, Error::Forbidden(_)));

  // Rejected before any mutation — nothing was shared.
  assert!(e.shared_trackers(bob).await.unwrap().is_empty());
}

#[tokio::test]
async fn content_creator_cannot_check_days() {
  let e = engine().await;
  let creator = user(&e, "creator", Role::ContentCreator).await;
  e.make_tracker(creator, "posting").await.unwrap();

  let err = e.check_day(creator, "posting", 0).await.unwrap_err();
  assert!(matches!(err, Error::Forbidden(_)));
  assert_eq!(e.total_checked_days(creator, "posting").await.unwrap(), 0);
}

#[tokio::test]
async fn content_creator_cannot_follow() {
  let e = engine().await;
  let creator = user(&e, "creator", Role::ContentCreator).await;
  let bob = user(&e, "bob", Role::RegularUser).await;

  let err = e.add_friend(creator, bob).await.unwrap_err();
  assert!(matches!(err, Error::Forbidden(_)));
  assert!(e.friends(bob).await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_actor_on_gated_op_is_not_found() {
  let e = engine().await;
  let ghost = Uuid::new_v4();

  let err = e.check_day(ghost, "running", 0).await.unwrap_err();
  assert!(matches!(err, Error::UserNotFound(_)));
}

// ─── User deletion cascade ───────────────────────────────────────────────────

#[tokio::test]
async fn delete_user_cascades_and_is_reinvocable() {
  let e = engine().await;
  let alice = user(&e, "alice", Role::RegularUser).await;
  let bob = user(&e, "bob", Role::RegularUser).await;
  let carol = user(&e, "carol", Role::RegularUser).await;

  e.make_tracker(alice, "running").await.unwrap();
  e.check_day(alice, "running", 0).await.unwrap();
  e.share_tracker(alice, "running", bob).await.unwrap();
  e.add_friend(alice, bob).await.unwrap();
  e.send_request(alice, carol).await.unwrap();

  e.delete_user(alice).await.unwrap();

  assert!(e.trackers(alice).await.unwrap().is_empty());
  assert!(e.shared_trackers(bob).await.unwrap().is_empty());
  assert!(e.friends(bob).await.unwrap().is_empty());
  assert!(e.requests(carol).await.unwrap().is_empty());
  assert!(matches!(
    e.level(alice).await.unwrap_err(),
    Error::LevelNotFound(_)
  ));
  assert!(matches!(
    e.user(alice).await.unwrap_err(),
    Error::UserNotFound(_)
  ));

  // The cascade is idempotent.
  e.delete_user(alice).await.unwrap();
}
