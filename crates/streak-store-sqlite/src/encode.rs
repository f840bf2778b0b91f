//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings. The 365-slot day array is stored as a
//! 365-character string of `'0'`/`'1'` flags so a single slot can be
//! flipped without a serialisation round trip.

use chrono::{DateTime, Utc};
use streak_core::{
  friend::FriendRequest,
  progression::LevelRecord,
  tracker::{Tracker, DAYS_PER_YEAR},
  user::{Role, User},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Role ─────────────────────────────────────────────────────────────────────

pub fn encode_role(r: Role) -> &'static str {
  match r {
    Role::RegularUser => "regular_user",
    Role::ContentCreator => "content_creator",
  }
}

pub fn decode_role(s: &str) -> Result<Role> {
  match s {
    "regular_user" => Ok(Role::RegularUser),
    "content_creator" => Ok(Role::ContentCreator),
    other => Err(Error::Corrupt(format!("unknown role: {other:?}"))),
  }
}

// ─── Day slots ───────────────────────────────────────────────────────────────

pub fn encode_days(days: &[bool]) -> String {
  days.iter().map(|d| if *d { '1' } else { '0' }).collect()
}

pub fn decode_days(s: &str) -> Result<Vec<bool>> {
  if s.len() != DAYS_PER_YEAR {
    return Err(Error::Corrupt(format!(
      "day string has {} slots, expected {DAYS_PER_YEAR}",
      s.len()
    )));
  }
  s.chars()
    .map(|c| match c {
      '0' => Ok(false),
      '1' => Ok(true),
      other => Err(Error::Corrupt(format!("unknown day flag: {other:?}"))),
    })
    .collect()
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:    String,
  pub username:   String,
  pub role:       String,
  pub created_at: String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:    decode_uuid(&self.user_id)?,
      username:   self.username,
      role:       decode_role(&self.role)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read from a `trackers` row, with its share rows attached.
pub struct RawTracker {
  pub tracker_id:  String,
  pub owner:       String,
  pub title:       String,
  pub days:        String,
  pub created_at:  String,
  pub shared_with: Vec<String>,
}

impl RawTracker {
  pub fn into_tracker(self) -> Result<Tracker> {
    Ok(Tracker {
      tracker_id:  decode_uuid(&self.tracker_id)?,
      owner:       decode_uuid(&self.owner)?,
      title:       self.title,
      days:        decode_days(&self.days)?,
      shared_with: self
        .shared_with
        .iter()
        .map(|s| decode_uuid(s))
        .collect::<Result<_>>()?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read from a `friend_requests` row.
pub struct RawRequest {
  pub from_user:  String,
  pub to_user:    String,
  pub created_at: String,
}

impl RawRequest {
  pub fn into_request(self) -> Result<FriendRequest> {
    Ok(FriendRequest {
      from:       decode_uuid(&self.from_user)?,
      to:         decode_uuid(&self.to_user)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read from a `levels` row.
pub struct RawLevel {
  pub user_id:    String,
  pub exp:        i64,
  pub level:      i64,
  pub updated_at: String,
}

impl RawLevel {
  pub fn into_record(self) -> Result<LevelRecord> {
    Ok(LevelRecord {
      user:       decode_uuid(&self.user_id)?,
      exp:        self.exp as u64,
      level:      self.level as u32,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}
