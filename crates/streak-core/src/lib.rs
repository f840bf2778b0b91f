//! Core types and trait definitions for the Streak engagement engine.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod engine;
pub mod error;
pub mod friend;
pub mod gate;
pub mod progression;
pub mod store;
pub mod tracker;
pub mod user;

pub use engine::Engine;
pub use error::{Error, ErrorKind, Result};
