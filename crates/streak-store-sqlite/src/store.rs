//! [`SqliteStore`] — the SQLite implementation of [`EngineStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use streak_core::{
  friend::{FriendEdge, FriendRequest},
  progression::LevelRecord,
  store::EngineStore,
  tracker::{validate_day, Tracker},
  user::{Role, User},
};

use crate::{
  encode::{
    decode_uuid, encode_days, encode_dt, encode_role, encode_uuid, RawLevel,
    RawRequest, RawTracker, RawUser,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Row helpers ─────────────────────────────────────────────────────────────

/// Recipients of one tracker's share set.
fn read_shares(
  conn: &rusqlite::Connection,
  tracker_id: &str,
) -> rusqlite::Result<Vec<String>> {
  let mut stmt = conn
    .prepare("SELECT recipient FROM tracker_shares WHERE tracker_id = ?1")?;
  stmt
    .query_map(rusqlite::params![tracker_id], |r| r.get(0))?
    .collect()
}

/// Map a `trackers` row (without shares) to its column tuple.
fn tracker_columns(
  row: &rusqlite::Row<'_>,
) -> rusqlite::Result<(String, String, String, String, String)> {
  Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

const TRACKER_COLS: &str = "tracker_id, owner, title, days, created_at";

fn attach_shares(
  conn: &rusqlite::Connection,
  rows: Vec<(String, String, String, String, String)>,
) -> rusqlite::Result<Vec<RawTracker>> {
  let mut out = Vec::with_capacity(rows.len());
  for (tracker_id, owner, title, days, created_at) in rows {
    let shared_with = read_shares(conn, &tracker_id)?;
    out.push(RawTracker {
      tracker_id,
      owner,
      title,
      days,
      created_at,
      shared_with,
    });
  }
  Ok(out)
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Streak engine store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All calls
/// run serially on the connection's worker thread, which is what makes the
/// read-modify-write in [`EngineStore::set_day`] linearizable.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Resolve a tracker's id by its `(owner, title)` key.
  async fn tracker_id(&self, owner: Uuid, title: &str) -> Result<Option<String>> {
    let owner_str = encode_uuid(owner);
    let title = title.to_owned();
    let id: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT tracker_id FROM trackers WHERE owner = ?1 AND title = ?2",
              rusqlite::params![owner_str, title],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(id)
  }
}

// ─── EngineStore impl ────────────────────────────────────────────────────────

impl EngineStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────

  async fn add_user(&self, username: String, role: Role) -> Result<User> {
    let user = User {
      user_id: Uuid::new_v4(),
      username,
      role,
      created_at: Utc::now(),
    };

    let id_str   = encode_uuid(user.user_id);
    let name     = user.username.clone();
    let role_str = encode_role(role).to_owned();
    let at_str   = encode_dt(user.created_at);

    let taken: bool = self
      .conn
      .call({
        let name = name.clone();
        move |conn| {
          Ok(
            conn
              .query_row(
                "SELECT 1 FROM users WHERE username = ?1",
                rusqlite::params![name],
                |_| Ok(true),
              )
              .optional()?
              .unwrap_or(false),
          )
        }
      })
      .await?;

    if taken {
      return Err(Error::Core(streak_core::Error::DuplicateUsername(
        user.username,
      )));
    }

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, username, role, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, name, role_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(user)
  }

  async fn user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, username, role, created_at FROM users
               WHERE user_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawUser {
                  user_id:    row.get(0)?,
                  username:   row.get(1)?,
                  role:       row.get(2)?,
                  created_at: row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn user_by_username(&self, username: &str) -> Result<Option<User>> {
    let name = username.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, username, role, created_at FROM users
               WHERE username = ?1",
              rusqlite::params![name],
              |row| {
                Ok(RawUser {
                  user_id:    row.get(0)?,
                  username:   row.get(1)?,
                  role:       row.get(2)?,
                  created_at: row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn role_of(&self, id: Uuid) -> Result<Option<Role>> {
    Ok(self.user(id).await?.map(|u| u.role))
  }

  async fn remove_user(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM users WHERE user_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Trackers ──────────────────────────────────────────────────────────

  async fn add_tracker(&self, owner: Uuid, title: String) -> Result<Tracker> {
    if self.tracker_id(owner, &title).await?.is_some() {
      return Err(Error::Core(streak_core::Error::DuplicateTracker {
        owner,
        title,
      }));
    }

    let tracker = Tracker {
      tracker_id:  Uuid::new_v4(),
      owner,
      title,
      days:        vec![false; streak_core::tracker::DAYS_PER_YEAR],
      shared_with: Vec::new(),
      created_at:  Utc::now(),
    };

    let id_str    = encode_uuid(tracker.tracker_id);
    let owner_str = encode_uuid(owner);
    let title_str = tracker.title.clone();
    let days_str  = encode_days(&tracker.days);
    let at_str    = encode_dt(tracker.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO trackers (tracker_id, owner, title, days, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, owner_str, title_str, days_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(tracker)
  }

  async fn tracker(&self, owner: Uuid, title: &str) -> Result<Option<Tracker>> {
    let owner_str = encode_uuid(owner);
    let title = title.to_owned();

    let raw: Option<RawTracker> = self
      .conn
      .call(move |conn| {
        let row = conn
          .query_row(
            &format!(
              "SELECT {TRACKER_COLS} FROM trackers
               WHERE owner = ?1 AND title = ?2"
            ),
            rusqlite::params![owner_str, title],
            tracker_columns,
          )
          .optional()?;
        match row {
          Some(r) => Ok(attach_shares(conn, vec![r])?.pop()),
          None => Ok(None),
        }
      })
      .await?;

    raw.map(RawTracker::into_tracker).transpose()
  }

  async fn tracker_by_id(&self, id: Uuid) -> Result<Option<Tracker>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawTracker> = self
      .conn
      .call(move |conn| {
        let row = conn
          .query_row(
            &format!("SELECT {TRACKER_COLS} FROM trackers WHERE tracker_id = ?1"),
            rusqlite::params![id_str],
            tracker_columns,
          )
          .optional()?;
        match row {
          Some(r) => Ok(attach_shares(conn, vec![r])?.pop()),
          None => Ok(None),
        }
      })
      .await?;

    raw.map(RawTracker::into_tracker).transpose()
  }

  async fn trackers_of(&self, owner: Uuid) -> Result<Vec<Tracker>> {
    let owner_str = encode_uuid(owner);

    let raws: Vec<RawTracker> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {TRACKER_COLS} FROM trackers WHERE owner = ?1
           ORDER BY created_at"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![owner_str], tracker_columns)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(attach_shares(conn, rows)?)
      })
      .await?;

    raws.into_iter().map(RawTracker::into_tracker).collect()
  }

  async fn set_day(
    &self,
    owner: Uuid,
    title: &str,
    day: usize,
    checked: bool,
  ) -> Result<Tracker> {
    validate_day(day).map_err(Error::Core)?;

    let owner_str = encode_uuid(owner);
    let title_str = title.to_owned();

    // Read, flip, and write inside one call so racing slot writes on the
    // same tracker serialise on the connection's worker thread.
    let raw: Option<RawTracker> = self
      .conn
      .call(move |conn| {
        let row = conn
          .query_row(
            &format!(
              "SELECT {TRACKER_COLS} FROM trackers
               WHERE owner = ?1 AND title = ?2"
            ),
            rusqlite::params![owner_str, title_str],
            tracker_columns,
          )
          .optional()?;
        let Some((tracker_id, owner, title, mut days, created_at)) = row else {
          return Ok(None);
        };

        if day < days.len() {
          let flag = if checked { "1" } else { "0" };
          days.replace_range(day..day + 1, flag);
          conn.execute(
            "UPDATE trackers SET days = ?1 WHERE tracker_id = ?2",
            rusqlite::params![days, tracker_id],
          )?;
        }

        let shared_with = read_shares(conn, &tracker_id)?;
        Ok(Some(RawTracker {
          tracker_id,
          owner,
          title,
          days,
          created_at,
          shared_with,
        }))
      })
      .await?;

    match raw {
      Some(raw) => raw.into_tracker(),
      None => Err(Error::Core(streak_core::Error::TrackerNotFound {
        owner,
        title: title.to_owned(),
      })),
    }
  }

  async fn add_share(
    &self,
    owner: Uuid,
    title: &str,
    recipient: Uuid,
  ) -> Result<()> {
    if recipient == owner {
      return Err(Error::Core(streak_core::Error::SelfShare));
    }

    let Some(tracker_id) = self.tracker_id(owner, title).await? else {
      return Err(Error::Core(streak_core::Error::TrackerNotFound {
        owner,
        title: title.to_owned(),
      }));
    };

    let recipient_str = encode_uuid(recipient);
    let at_str = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO tracker_shares (tracker_id, recipient, created_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![tracker_id, recipient_str, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn remove_share(
    &self,
    owner: Uuid,
    title: &str,
    recipient: Uuid,
  ) -> Result<()> {
    let Some(tracker_id) = self.tracker_id(owner, title).await? else {
      return Err(Error::Core(streak_core::Error::TrackerNotFound {
        owner,
        title: title.to_owned(),
      }));
    };

    let recipient_str = encode_uuid(recipient);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM tracker_shares WHERE tracker_id = ?1 AND recipient = ?2",
          rusqlite::params![tracker_id, recipient_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn shared_with(&self, recipient: Uuid) -> Result<Vec<Uuid>> {
    let recipient_str = encode_uuid(recipient);

    let ids: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT tracker_id FROM tracker_shares WHERE recipient = ?1
           ORDER BY created_at",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![recipient_str], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    ids.iter().map(|s| decode_uuid(s)).collect()
  }

  async fn remove_tracker(&self, owner: Uuid, title: &str) -> Result<()> {
    let owner_str = encode_uuid(owner);
    let title = title.to_owned();

    // Purge share rows and the tracker together; absent trackers are a
    // no-op so the delete can be safely re-invoked.
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM tracker_shares WHERE tracker_id IN
             (SELECT tracker_id FROM trackers WHERE owner = ?1 AND title = ?2)",
          rusqlite::params![owner_str, title],
        )?;
        conn.execute(
          "DELETE FROM trackers WHERE owner = ?1 AND title = ?2",
          rusqlite::params![owner_str, title],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn remove_trackers(&self, owner: Uuid) -> Result<()> {
    let owner_str = encode_uuid(owner);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM tracker_shares WHERE tracker_id IN
             (SELECT tracker_id FROM trackers WHERE owner = ?1)",
          rusqlite::params![owner_str],
        )?;
        conn.execute(
          "DELETE FROM trackers WHERE owner = ?1",
          rusqlite::params![owner_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Friend graph ──────────────────────────────────────────────────────

  async fn add_request(&self, from: Uuid, to: Uuid) -> Result<FriendRequest> {
    if from == to {
      return Err(Error::Core(streak_core::Error::SelfFriend));
    }

    let from_str = encode_uuid(from);
    let to_str   = encode_uuid(to);
    let edge     = FriendEdge::new(from, to);
    let a_str    = encode_uuid(edge.a);
    let b_str    = encode_uuid(edge.b);

    let (pending, friends): (bool, bool) = self
      .conn
      .call({
        let (from_str, to_str) = (from_str.clone(), to_str.clone());
        move |conn| {
          let pending: bool = conn
            .query_row(
              "SELECT 1 FROM friend_requests
               WHERE (from_user = ?1 AND to_user = ?2)
                  OR (from_user = ?2 AND to_user = ?1)",
              rusqlite::params![from_str, to_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);

          let friends: bool = conn
            .query_row(
              "SELECT 1 FROM friend_edges WHERE user_a = ?1 AND user_b = ?2",
              rusqlite::params![a_str, b_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);

          Ok((pending, friends))
        }
      })
      .await?;

    if pending {
      return Err(Error::Core(streak_core::Error::DuplicateRequest {
        from,
        to,
      }));
    }
    if friends {
      return Err(Error::Core(streak_core::Error::AlreadyFriends(from, to)));
    }

    let request = FriendRequest {
      from,
      to,
      created_at: Utc::now(),
    };
    let at_str = encode_dt(request.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO friend_requests (from_user, to_user, created_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![from_str, to_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(request)
  }

  async fn request(&self, from: Uuid, to: Uuid) -> Result<Option<FriendRequest>> {
    let from_str = encode_uuid(from);
    let to_str   = encode_uuid(to);

    let raw: Option<RawRequest> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT from_user, to_user, created_at FROM friend_requests
               WHERE from_user = ?1 AND to_user = ?2",
              rusqlite::params![from_str, to_str],
              |row| {
                Ok(RawRequest {
                  from_user:  row.get(0)?,
                  to_user:    row.get(1)?,
                  created_at: row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRequest::into_request).transpose()
  }

  async fn remove_request(&self, from: Uuid, to: Uuid) -> Result<()> {
    let from_str = encode_uuid(from);
    let to_str   = encode_uuid(to);

    let deleted: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM friend_requests WHERE from_user = ?1 AND to_user = ?2",
          rusqlite::params![from_str, to_str],
        )?)
      })
      .await?;

    if deleted == 0 {
      return Err(Error::Core(streak_core::Error::RequestNotFound {
        from,
        to,
      }));
    }
    Ok(())
  }

  async fn requests_to(&self, user: Uuid) -> Result<Vec<FriendRequest>> {
    let user_str = encode_uuid(user);

    let raws: Vec<RawRequest> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT from_user, to_user, created_at FROM friend_requests
           WHERE to_user = ?1 ORDER BY created_at",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_str], |row| {
            Ok(RawRequest {
              from_user:  row.get(0)?,
              to_user:    row.get(1)?,
              created_at: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRequest::into_request).collect()
  }

  async fn remove_requests_of(&self, user: Uuid) -> Result<()> {
    let user_str = encode_uuid(user);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM friend_requests WHERE from_user = ?1 OR to_user = ?1",
          rusqlite::params![user_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn add_edge(&self, a: Uuid, b: Uuid) -> Result<()> {
    if a == b {
      return Err(Error::Core(streak_core::Error::SelfFriend));
    }

    let edge = FriendEdge::new(a, b);
    let a_str = encode_uuid(edge.a);
    let b_str = encode_uuid(edge.b);
    let at_str = encode_dt(Utc::now());

    // One row covers both directions, so the write is atomic by
    // construction; INSERT OR IGNORE makes it idempotent.
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO friend_edges (user_a, user_b, created_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![a_str, b_str, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn remove_edge(&self, a: Uuid, b: Uuid) -> Result<()> {
    let edge = FriendEdge::new(a, b);
    let a_str = encode_uuid(edge.a);
    let b_str = encode_uuid(edge.b);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM friend_edges WHERE user_a = ?1 AND user_b = ?2",
          rusqlite::params![a_str, b_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn has_edge(&self, a: Uuid, b: Uuid) -> Result<bool> {
    let edge = FriendEdge::new(a, b);
    let a_str = encode_uuid(edge.a);
    let b_str = encode_uuid(edge.b);

    let present: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM friend_edges WHERE user_a = ?1 AND user_b = ?2",
              rusqlite::params![a_str, b_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(present)
  }

  async fn friends_of(&self, user: Uuid) -> Result<Vec<Uuid>> {
    let user_str = encode_uuid(user);

    let rows: Vec<(String, String)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT user_a, user_b FROM friend_edges
           WHERE user_a = ?1 OR user_b = ?1 ORDER BY created_at",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_str], |r| {
            Ok((r.get(0)?, r.get(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut friends = Vec::with_capacity(rows.len());
    for (a, b) in rows {
      let edge = FriendEdge {
        a: decode_uuid(&a)?,
        b: decode_uuid(&b)?,
      };
      if let Some(other) = edge.other(user) {
        friends.push(other);
      }
    }
    Ok(friends)
  }

  // ── Levels ────────────────────────────────────────────────────────────

  async fn put_level(&self, record: LevelRecord) -> Result<()> {
    let user_str = encode_uuid(record.user);
    let exp      = record.exp as i64;
    let level    = i64::from(record.level);
    let at_str   = encode_dt(record.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO levels (user_id, exp, level, updated_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT(user_id) DO UPDATE SET
             exp = excluded.exp,
             level = excluded.level,
             updated_at = excluded.updated_at",
          rusqlite::params![user_str, exp, level, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn level(&self, user: Uuid) -> Result<Option<LevelRecord>> {
    let user_str = encode_uuid(user);

    let raw: Option<RawLevel> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, exp, level, updated_at FROM levels
               WHERE user_id = ?1",
              rusqlite::params![user_str],
              |row| {
                Ok(RawLevel {
                  user_id:    row.get(0)?,
                  exp:        row.get(1)?,
                  level:      row.get(2)?,
                  updated_at: row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawLevel::into_record).transpose()
  }

  async fn remove_level(&self, user: Uuid) -> Result<()> {
    let user_str = encode_uuid(user);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM levels WHERE user_id = ?1",
          rusqlite::params![user_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
