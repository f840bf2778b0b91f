//! Error types for `streak-core`.

use thiserror::Error;
use uuid::Uuid;

/// Coarse classification of an [`Error`], used by boundary layers to pick a
/// response without matching on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// A referenced tracker, request, user, or level record is absent.
  NotFound,
  /// The operation would violate a uniqueness or state-machine invariant.
  Conflict,
  /// A day index outside the tracker grid.
  Range,
  /// The Access Gate rejected the actor before any mutation.
  Forbidden,
  /// The storage backend failed; not recoverable by the caller alone.
  Store,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  #[error("user not found: {0:?}")]
  UsernameNotFound(String),

  #[error("username {0:?} is already taken")]
  DuplicateUsername(String),

  #[error("tracker {title:?} not found for user {owner}")]
  TrackerNotFound { owner: Uuid, title: String },

  #[error("tracker not found: {0}")]
  TrackerIdNotFound(Uuid),

  #[error("user {owner} already has a tracker titled {title:?}")]
  DuplicateTracker { owner: Uuid, title: String },

  #[error("day index {0} is outside the 365-day tracker grid")]
  DayOutOfRange(usize),

  #[error("cannot share a tracker with its owner")]
  SelfShare,

  #[error("no pending friend request from {from} to {to}")]
  RequestNotFound { from: Uuid, to: Uuid },

  #[error("a friend request between {from} and {to} is already pending")]
  DuplicateRequest { from: Uuid, to: Uuid },

  #[error("users {0} and {1} are already friends")]
  AlreadyFriends(Uuid, Uuid),

  #[error("cannot befriend yourself")]
  SelfFriend,

  #[error("no level record for user {0}")]
  LevelNotFound(Uuid),

  #[error("user {0} is not permitted to perform this operation")]
  Forbidden(Uuid),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::UserNotFound(_)
      | Self::UsernameNotFound(_)
      | Self::TrackerNotFound { .. }
      | Self::TrackerIdNotFound(_)
      | Self::RequestNotFound { .. }
      | Self::LevelNotFound(_) => ErrorKind::NotFound,

      Self::DuplicateUsername(_)
      | Self::DuplicateTracker { .. }
      | Self::SelfShare
      | Self::DuplicateRequest { .. }
      | Self::AlreadyFriends(_, _)
      | Self::SelfFriend => ErrorKind::Conflict,

      Self::DayOutOfRange(_) => ErrorKind::Range,
      Self::Forbidden(_) => ErrorKind::Forbidden,
      Self::Store(_) => ErrorKind::Store,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
