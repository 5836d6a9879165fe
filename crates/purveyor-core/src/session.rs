//! Session and role model.
//!
//! A [`Session`] is an explicit value handed into every store call. The core
//! never keeps a "current user"; whoever holds the session is the actor.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Primary key of a row in the `Users` table.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// The role of an authenticated user; persisted verbatim in `UserRole`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
  Administrator,
  Staff,
}

impl Role {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Administrator => "Administrator",
      Self::Staff => "Staff",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "Administrator" => Ok(Self::Administrator),
      "Staff" => Ok(Self::Staff),
      other => Err(Error::Decode {
        column: "UserRole",
        reason: format!("unknown role {other:?}"),
      }),
    }
  }
}

impl std::fmt::Display for Role {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// The acting user for one call into the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  pub user_id:  UserId,
  pub username: String,
  pub role:     Role,
}

impl Session {
  /// Only administrators may change persisted state.
  pub fn can_mutate(&self) -> bool { self.role == Role::Administrator }

  /// Gate for every state-changing operation. `action` names the operation
  /// in the resulting [`Error::AccessDenied`].
  pub fn authorize(&self, action: &'static str) -> Result<()> {
    if self.can_mutate() {
      Ok(())
    } else {
      Err(Error::AccessDenied { action })
    }
  }
}
