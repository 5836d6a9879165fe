//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings. Status and role enums are
//! stored as their display names ("Active", "Administrator", ...). Booleans
//! are stored as 0/1 integers.

use chrono::{DateTime, Utc};
use purveyor_core::{
  detail::{DetailId, DetailPayload, DetailRecord},
  session::{Role, Session, UserId},
  supplier::{Status, Supplier, SupplierId},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawSupplier::from_row`].
pub const SUPPLIER_COLUMNS: &str =
  "SupplierID, TIN, CompanyName, Status, DateCreated, DateUpdated, Version";

/// Raw values read directly from a `Suppliers` row.
pub struct RawSupplier {
  pub supplier_id:  i64,
  pub tin:          String,
  pub company_name: String,
  pub status:       String,
  pub date_created: String,
  pub date_updated: String,
  pub version:      i64,
}

impl RawSupplier {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      supplier_id:  row.get(0)?,
      tin:          row.get(1)?,
      company_name: row.get(2)?,
      status:       row.get(3)?,
      date_created: row.get(4)?,
      date_updated: row.get(5)?,
      version:      row.get(6)?,
    })
  }

  pub fn into_supplier(self) -> Result<Supplier> {
    Ok(Supplier {
      supplier_id:  SupplierId(self.supplier_id),
      tin:          self.tin,
      company_name: self.company_name,
      status:       Status::parse(&self.status)?,
      date_created: decode_dt(&self.date_created)?,
      date_updated: decode_dt(&self.date_updated)?,
      version:      self.version,
    })
  }
}

/// Raw values read from a detail table: `id, SupplierID, IsPrimary` followed
/// by the payload columns in schema order.
pub struct RawDetail {
  pub id:          i64,
  pub supplier_id: i64,
  pub is_primary:  bool,
  pub columns:     Vec<Option<String>>,
}

impl RawDetail {
  pub fn from_row(row: &rusqlite::Row<'_>, width: usize) -> rusqlite::Result<Self> {
    let columns = (0..width)
      .map(|i| row.get::<_, Option<String>>(3 + i))
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(Self {
      id: row.get(0)?,
      supplier_id: row.get(1)?,
      is_primary: row.get(2)?,
      columns,
    })
  }

  pub fn into_record<P: DetailPayload>(self) -> Result<DetailRecord<P>> {
    Ok(DetailRecord {
      id:          DetailId::new(self.id),
      supplier_id: SupplierId(self.supplier_id),
      payload:     P::from_columns(self.columns)?,
      is_primary:  self.is_primary,
    })
  }
}

/// Raw values read from a `Users` row.
pub struct RawUser {
  pub user_id:       i64,
  pub username:      String,
  pub password_hash: String,
  pub role:          String,
  pub status:        String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:       row.get(0)?,
      username:      row.get(1)?,
      password_hash: row.get(2)?,
      role:          row.get(3)?,
      status:        row.get(4)?,
    })
  }

  pub fn status(&self) -> Result<Status> { Ok(Status::parse(&self.status)?) }

  pub fn into_session(self) -> Result<Session> {
    Ok(Session {
      user_id:  UserId(self.user_id),
      username: self.username,
      role:     Role::parse(&self.role)?,
    })
  }
}
