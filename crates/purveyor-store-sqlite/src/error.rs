//! Error type for `purveyor-store-sqlite`.

use purveyor_core::{Classify, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Auth, access, validation and not-found failures from the domain layer.
  #[error(transparent)]
  Core(#[from] purveyor_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Self::Core(e) => e.kind(),
      Self::Database(_) | Self::Sqlite(_) | Self::DateParse(_) => {
        ErrorKind::Persistence
      }
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
