//! Error types for `purveyor-core`.

use thiserror::Error;

use crate::{detail::DetailKind, session::UserId, supplier::SupplierId};

#[derive(Debug, Error)]
pub enum Error {
  /// Bad credentials or an inactive account. Deliberately carries no detail.
  #[error("authentication failed")]
  Auth,

  #[error("access denied: {action} requires an administrator session")]
  AccessDenied { action: &'static str },

  #[error("validation failed: {0}")]
  Validation(String),

  #[error("supplier not found: {0}")]
  SupplierNotFound(SupplierId),

  #[error("{kind} not found: {id}")]
  DetailNotFound { kind: DetailKind, id: i64 },

  #[error("user not found: {0}")]
  UserNotFound(UserId),

  #[error("malformed value in column {column}: {reason}")]
  Decode {
    column: &'static str,
    reason: String,
  },

  #[error("credential hashing failed: {0}")]
  Credential(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Taxonomy ────────────────────────────────────────────────────────────────

/// The caller-facing error categories. Presentation code maps each kind to a
/// distinct message; backends map their own errors onto these via
/// [`Classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Auth,
  AccessDenied,
  Validation,
  NotFound,
  Persistence,
}

/// Implemented by every error type a [`crate::store::SupplierStore`] can
/// return.
pub trait Classify {
  fn kind(&self) -> ErrorKind;
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Self::Auth => ErrorKind::Auth,
      Self::AccessDenied { .. } => ErrorKind::AccessDenied,
      Self::Validation(_) => ErrorKind::Validation,
      Self::SupplierNotFound(_)
      | Self::DetailNotFound { .. }
      | Self::UserNotFound(_) => ErrorKind::NotFound,
      // A row that cannot be decoded, or a hasher failure, is a store-side
      // fault from the caller's point of view.
      Self::Decode { .. } | Self::Credential(_) => ErrorKind::Persistence,
    }
  }
}
