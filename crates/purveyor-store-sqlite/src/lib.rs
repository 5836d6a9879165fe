//! SQLite backend for the Purveyor supplier directory.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. Every mutation is a single
//! `BEGIN IMMEDIATE` transaction.

mod details;
mod directory;
mod encode;
mod schema;
mod store;
mod suppliers;
mod users;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
