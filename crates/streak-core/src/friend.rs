//! Friend Graph types.
//!
//! A request is a directional, stateful offer: NoRequest → Pending →
//! {Accepted, Rejected}. Only Pending requests are ever stored — accepting
//! consumes the record and writes the edge, rejecting just consumes it.
//! A friend edge is an unordered relation held once, in normalised order,
//! so symmetry can never be half-present.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A pending friend request. At most one may exist per `(from, to)` pair,
/// and at most one per pair in either direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendRequest {
  pub from:       Uuid,
  pub to:         Uuid,
  pub created_at: DateTime<Utc>,
}

/// A symmetric friendship, stored with its endpoints sorted so `(a, b)` and
/// `(b, a)` are the same edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendEdge {
  pub a: Uuid,
  pub b: Uuid,
}

impl FriendEdge {
  /// Normalise an unordered pair. Callers must reject `x == y` first.
  pub fn new(x: Uuid, y: Uuid) -> Self {
    if x <= y { Self { a: x, b: y } } else { Self { a: y, b: x } }
  }

  /// The endpoint opposite `user`, if `user` is on this edge.
  pub fn other(&self, user: Uuid) -> Option<Uuid> {
    if user == self.a {
      Some(self.b)
    } else if user == self.b {
      Some(self.a)
    } else {
      None
    }
  }
}
