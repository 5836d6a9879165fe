//! Supplier record queries. Every function runs on a connection (or
//! transaction) handed in by [`crate::SqliteStore`]; none of them commits.

use chrono::{DateTime, Utc};
use purveyor_core::{
  Error as CoreError,
  detail::{AddressValue, ContactPersonValue, EmailValue, PhoneValue},
  supplier::{Status, Supplier, SupplierFields, SupplierId, SupplierView},
};
use rusqlite::{Connection, OptionalExtension as _};

use crate::{
  Result, details,
  encode::{RawSupplier, SUPPLIER_COLUMNS, encode_dt},
};

pub fn load(conn: &Connection, id: SupplierId) -> Result<Option<Supplier>> {
  let raw = conn
    .query_row(
      &format!("SELECT {SUPPLIER_COLUMNS} FROM Suppliers WHERE SupplierID = ?1"),
      rusqlite::params![id.0],
      RawSupplier::from_row,
    )
    .optional()?;
  raw.map(RawSupplier::into_supplier).transpose()
}

pub fn require(conn: &Connection, id: SupplierId) -> Result<Supplier> {
  load(conn, id)?.ok_or_else(|| CoreError::SupplierNotFound(id).into())
}

pub fn load_all(conn: &Connection) -> Result<Vec<Supplier>> {
  let mut stmt = conn.prepare(&format!("SELECT {SUPPLIER_COLUMNS} FROM Suppliers"))?;
  let raws = stmt
    .query_map([], RawSupplier::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawSupplier::into_supplier).collect()
}

/// `fields` must already be normalised.
pub fn insert(
  conn: &Connection,
  fields: &SupplierFields,
  now: DateTime<Utc>,
) -> Result<Supplier> {
  let at = encode_dt(now);
  conn.execute(
    "INSERT INTO Suppliers (TIN, CompanyName, DateCreated, DateUpdated, Status, Version)
     VALUES (?1, ?2, ?3, ?3, ?4, 1)",
    rusqlite::params![
      fields.tin,
      fields.company_name,
      at,
      Status::Active.as_str()
    ],
  )?;
  require(conn, SupplierId(conn.last_insert_rowid()))
}

pub fn update(
  conn: &Connection,
  id: SupplierId,
  fields: &SupplierFields,
  now: DateTime<Utc>,
) -> Result<Supplier> {
  let changed = conn.execute(
    "UPDATE Suppliers
     SET TIN = ?1, CompanyName = ?2, DateUpdated = ?3, Version = Version + 1
     WHERE SupplierID = ?4",
    rusqlite::params![fields.tin, fields.company_name, encode_dt(now), id.0],
  )?;
  if changed == 0 {
    return Err(CoreError::SupplierNotFound(id).into());
  }
  require(conn, id)
}

/// Status and timestamp change in one statement.
pub fn set_status(
  conn: &Connection,
  id: SupplierId,
  status: Status,
  now: DateTime<Utc>,
) -> Result<Supplier> {
  let current = require(conn, id)?;
  if current.status == status {
    return Err(
      CoreError::Validation(format!("supplier {id} is already {status}")).into(),
    );
  }
  conn.execute(
    "UPDATE Suppliers
     SET Status = ?1, DateUpdated = ?2, Version = Version + 1
     WHERE SupplierID = ?3",
    rusqlite::params![status.as_str(), encode_dt(now), id.0],
  )?;
  require(conn, id)
}

/// Record that something owned by the supplier changed.
pub fn touch(conn: &Connection, id: SupplierId, now: DateTime<Utc>) -> Result<()> {
  let changed = conn.execute(
    "UPDATE Suppliers SET DateUpdated = ?1, Version = Version + 1 WHERE SupplierID = ?2",
    rusqlite::params![encode_dt(now), id.0],
  )?;
  if changed == 0 {
    return Err(CoreError::SupplierNotFound(id).into());
  }
  Ok(())
}

/// Run inside a read transaction so all five reads see the same state.
pub fn view(conn: &Connection, id: SupplierId) -> Result<Option<SupplierView>> {
  let Some(supplier) = load(conn, id)? else {
    return Ok(None);
  };
  Ok(Some(SupplierView {
    supplier,
    addresses: details::list::<AddressValue>(conn, id)?,
    phones: details::list::<PhoneValue>(conn, id)?,
    emails: details::list::<EmailValue>(conn, id)?,
    contact_persons: details::list::<ContactPersonValue>(conn, id)?,
  }))
}
