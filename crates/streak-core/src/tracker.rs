//! Tracker — a named, owned, 365-slot boolean calendar for daily habit
//! completion.
//!
//! The grid is a fixed non-leap-year calendar: day indices are
//! caller-interpreted and the store itself is calendar-agnostic. There is
//! deliberately no date or timezone logic here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Number of day slots in every tracker. Fixed at 365 — no leap-year
/// adjustment.
pub const DAYS_PER_YEAR: usize = 365;

/// Reject day indices outside the tracker grid.
pub fn validate_day(day: usize) -> Result<()> {
  if day >= DAYS_PER_YEAR {
    return Err(Error::DayOutOfRange(day));
  }
  Ok(())
}

/// A daily habit tracker. Identified by `(owner, title)` — titles are unique
/// per owner. `days` always holds exactly [`DAYS_PER_YEAR`] entries.
///
/// `shared_with` grants read access only; day mutations are owner-only at
/// the engine boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tracker {
  pub tracker_id:  Uuid,
  pub owner:       Uuid,
  pub title:       String,
  pub days:        Vec<bool>,
  pub shared_with: Vec<Uuid>,
  pub created_at:  DateTime<Utc>,
}

impl Tracker {
  /// Count of checked slots — the aggregate input to progression.
  pub fn total_checked_days(&self) -> u32 {
    self.days.iter().filter(|checked| **checked).count() as u32
  }

  /// Whether `day` is checked. `None` if the index is out of range.
  pub fn is_checked(&self, day: usize) -> Option<bool> {
    self.days.get(day).copied()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn validate_day_accepts_grid_bounds() {
    assert!(validate_day(0).is_ok());
    assert!(validate_day(364).is_ok());
  }

  #[test]
  fn validate_day_rejects_out_of_range() {
    assert!(matches!(validate_day(365), Err(Error::DayOutOfRange(365))));
    assert!(matches!(validate_day(usize::MAX), Err(Error::DayOutOfRange(_))));
  }
}
