//! Error type for `streak-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A domain-rule violation detected by the store (duplicate title,
  /// missing tracker, out-of-range day, ...).
  #[error("core error: {0}")]
  Core(#[from] streak_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored value that should be well-formed is not (e.g. a day string
  /// whose length is not 365).
  #[error("corrupt stored value: {0}")]
  Corrupt(String),
}

/// Collapse into the engine taxonomy: domain violations pass through,
/// backend faults become opaque store errors.
impl From<Error> for streak_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(core) => core,
      other => streak_core::Error::Store(Box::new(other)),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
