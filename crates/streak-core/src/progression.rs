//! Progression — the derived experience/level pair.
//!
//! Experience is always a pure function of the current checked-day totals
//! across *all* of a user's trackers at the moment of last recomputation.
//! There is no incremental update path: every recompute re-reads every
//! tracker and sums, so the stored record can never drift from the ground
//! truth of tracker state.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{store::EngineStore, tracker::Tracker, Result};

// ─── Experience ──────────────────────────────────────────────────────────────

/// Total experience for a set of per-tracker checked-day counts.
pub fn experience(counts: &[u32]) -> u64 {
  counts.iter().map(|c| u64::from(*c)).sum()
}

// ─── Level curve ─────────────────────────────────────────────────────────────

/// A monotonic step function from experience to level.
///
/// The level is the number of thresholds at or below the experience value,
/// so a user starts at level 0 and climbs one level per band crossed. The
/// thresholds are policy, not structure — the server config may replace
/// them wholesale.
#[derive(Debug, Clone)]
pub struct LevelCurve {
  thresholds: Vec<u64>,
}

impl LevelCurve {
  pub fn new(mut thresholds: Vec<u64>) -> Self {
    thresholds.sort_unstable();
    thresholds.dedup();
    Self { thresholds }
  }

  pub fn level_for(&self, exp: u64) -> u32 {
    self.thresholds.iter().take_while(|t| **t <= exp).count() as u32
  }
}

impl Default for LevelCurve {
  fn default() -> Self {
    Self::new(vec![10, 25, 50, 100, 250, 500, 1000])
  }
}

// ─── Level record ────────────────────────────────────────────────────────────

/// The stored experience/level pair — one per user, created lazily on first
/// recompute, deleted with the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelRecord {
  pub user:       Uuid,
  pub exp:        u64,
  pub level:      u32,
  pub updated_at: DateTime<Utc>,
}

// ─── Calculator ──────────────────────────────────────────────────────────────

/// Recomputes and persists a user's level record from tracker ground truth.
///
/// Recomputation is serialised per user: two checks racing on different
/// trackers of the same owner queue their recomputes instead of one
/// persisting a partially-updated aggregate over the other.
pub struct Progression<S> {
  store: Arc<S>,
  curve: LevelCurve,
  locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl<S: EngineStore> Progression<S> {
  pub fn new(store: Arc<S>, curve: LevelCurve) -> Self {
    Self {
      store,
      curve,
      locks: Mutex::new(HashMap::new()),
    }
  }

  async fn user_lock(&self, user: Uuid) -> Arc<Mutex<()>> {
    self.locks.lock().await.entry(user).or_default().clone()
  }

  /// Re-read every tracker `user` owns, sum checked-day totals, and
  /// overwrite the stored level record. Cheap and safe to repeat.
  pub async fn recompute(&self, user: Uuid) -> Result<LevelRecord> {
    let lock = self.user_lock(user).await;
    let _guard = lock.lock().await;

    let trackers = self.store.trackers_of(user).await.map_err(Into::into)?;
    let counts: Vec<u32> =
      trackers.iter().map(Tracker::total_checked_days).collect();

    let exp = experience(&counts);
    let record = LevelRecord {
      user,
      exp,
      level: self.curve.level_for(exp),
      updated_at: Utc::now(),
    };

    self
      .store
      .put_level(record.clone())
      .await
      .map_err(Into::into)?;
    Ok(record)
  }
}
