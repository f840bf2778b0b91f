//! SQL schema for the Streak SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id    TEXT PRIMARY KEY,
    username   TEXT NOT NULL UNIQUE,
    role       TEXT NOT NULL,   -- 'regular_user' | 'content_creator'
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS trackers (
    tracker_id TEXT PRIMARY KEY,
    owner      TEXT NOT NULL,
    title      TEXT NOT NULL,
    days       TEXT NOT NULL,   -- 365-character string of '0'/'1' slots
    created_at TEXT NOT NULL,
    UNIQUE (owner, title)
);

CREATE TABLE IF NOT EXISTS tracker_shares (
    tracker_id TEXT NOT NULL REFERENCES trackers(tracker_id),
    recipient  TEXT NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE (tracker_id, recipient)
);

-- Only pending requests are stored; accept/reject delete the row.
CREATE TABLE IF NOT EXISTS friend_requests (
    from_user  TEXT NOT NULL,
    to_user    TEXT NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE (from_user, to_user)
);

-- One row per friendship, endpoints in sorted order, so the symmetric
-- relation cannot be half-present.
CREATE TABLE IF NOT EXISTS friend_edges (
    user_a     TEXT NOT NULL,
    user_b     TEXT NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE (user_a, user_b),
    CHECK  (user_a < user_b)
);

CREATE TABLE IF NOT EXISTS levels (
    user_id    TEXT PRIMARY KEY,
    exp        INTEGER NOT NULL,
    level      INTEGER NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS trackers_owner_idx   ON trackers(owner);
CREATE INDEX IF NOT EXISTS shares_recipient_idx ON tracker_shares(recipient);
CREATE INDEX IF NOT EXISTS requests_to_idx      ON friend_requests(to_user);

PRAGMA user_version = 1;
";
