//! User — the thin account record the engine hangs state off.
//!
//! Credentials and sessions live outside this crate; the engine only needs a
//! stable id, a unique username, and the role the Access Gate keys on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The account role. Immutable once assigned — there is no role-change
/// operation anywhere in the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
  RegularUser,
  ContentCreator,
}

/// A minimal account record. Trackers, friendships, and level records all
/// reference users by `user_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub user_id:    Uuid,
  pub username:   String,
  pub role:       Role,
  pub created_at: DateTime<Utc>,
}
