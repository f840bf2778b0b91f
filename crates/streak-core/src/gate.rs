//! Access Gate — the role policy consulted before gated mutations.
//!
//! Every mutating boundary operation declares its required permission in
//! one table, and the gate evaluates that declaration uniformly before any
//! store mutation happens. A failed check is an explicit
//! [`Error::Forbidden`], never a silent no-op.

use std::sync::Arc;

use uuid::Uuid;

use crate::{store::EngineStore, user::Role, Error, Result};

// ─── Permission table ────────────────────────────────────────────────────────

/// What a boundary operation demands of its actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
  /// Any resolvable actor.
  Open,
  /// Only `RegularUser` accounts; `ContentCreator` actors are rejected.
  RegularOnly,
}

/// The mutating boundary operations, named for the permission table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
  MakeTracker,
  CheckDay,
  UncheckDay,
  ShareTracker,
  UnshareTracker,
  DeleteTracker,
  SendRequest,
  RemoveRequest,
  AcceptRequest,
  RejectRequest,
  AddFriend,
  RemoveFriend,
}

/// The single source of truth for which operations are role-gated, per the
/// visible routing policy: sharing, following, and tracker-check mutations
/// are RegularUser-only; the request cycle and tracker creation are open.
pub fn required_permission(op: Op) -> Permission {
  match op {
    Op::CheckDay
    | Op::UncheckDay
    | Op::ShareTracker
    | Op::UnshareTracker
    | Op::DeleteTracker
    | Op::AddFriend
    | Op::RemoveFriend => Permission::RegularOnly,

    Op::MakeTracker
    | Op::SendRequest
    | Op::RemoveRequest
    | Op::AcceptRequest
    | Op::RejectRequest => Permission::Open,
  }
}

// ─── Gate ────────────────────────────────────────────────────────────────────

/// Stateless policy check over a role directory, injected at construction.
pub struct AccessGate<D> {
  directory: Arc<D>,
}

impl<D: EngineStore> AccessGate<D> {
  pub fn new(directory: Arc<D>) -> Self {
    Self { directory }
  }

  /// Authorize `actor` for `op`, or fail with [`Error::Forbidden`].
  ///
  /// Called before the corresponding store mutation, never after, so a
  /// rejected actor leaves no side effects.
  pub async fn authorize(&self, actor: Uuid, op: Op) -> Result<()> {
    match required_permission(op) {
      Permission::Open => Ok(()),
      Permission::RegularOnly => {
        let role = self
          .directory
          .role_of(actor)
          .await
          .map_err(Into::into)?
          .ok_or(Error::UserNotFound(actor))?;
        match role {
          Role::RegularUser => Ok(()),
          Role::ContentCreator => Err(Error::Forbidden(actor)),
        }
      }
    }
  }
}
