//! Directory listing and search.
//!
//! SQLite's `LIKE` and `NOCASE` only fold ASCII, so filtering and ordering
//! are left to [`purveyor_core::directory`] to keep results identical across
//! backends.

use purveyor_core::{directory, supplier::Supplier};
use rusqlite::Connection;

use crate::{Result, suppliers};

pub fn search(conn: &Connection, term: &str) -> Result<Vec<Supplier>> {
  Ok(directory::filter_sorted(suppliers::load_all(conn)?, term))
}
