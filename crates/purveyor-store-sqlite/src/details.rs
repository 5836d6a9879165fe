//! The detail collection engine: one implementation of list/add/edit/delete
//! and primary designation, generic over the payload type.
//!
//! SQL is assembled from [`DetailPayload::SCHEMA`]; only compile-time
//! constants are interpolated, all values are bound parameters. Every
//! mutation also touches the owning supplier so its `DateUpdated` and
//! `Version` move with its details.

use chrono::{DateTime, Utc};
use purveyor_core::{
  Error as CoreError,
  detail::{ContactPersonValue, DetailId, DetailPayload, DetailRecord},
  supplier::{Status, SupplierId},
};
use rusqlite::{Connection, OptionalExtension as _, ToSql};

use crate::{Result, encode::RawDetail, suppliers};

fn select_sql<P: DetailPayload>(filter: &str) -> String {
  let schema = P::SCHEMA;
  format!(
    "SELECT {id}, SupplierID, IsPrimary, {columns} FROM {table} WHERE {filter}",
    id = schema.id_column,
    columns = schema.columns.join(", "),
    table = schema.table,
  )
}

fn not_found<P: DetailPayload>(id: DetailId<P>) -> crate::Error {
  CoreError::DetailNotFound { kind: P::KIND, id: id.get() }.into()
}

/// Primary first, then insertion order.
pub fn list<P: DetailPayload>(
  conn: &Connection,
  supplier_id: SupplierId,
) -> Result<Vec<DetailRecord<P>>> {
  let sql = format!(
    "{} ORDER BY IsPrimary DESC, {} ASC",
    select_sql::<P>("SupplierID = ?1"),
    P::SCHEMA.id_column,
  );
  let width = P::SCHEMA.columns.len();
  let mut stmt = conn.prepare(&sql)?;
  let raws = stmt
    .query_map(rusqlite::params![supplier_id.0], |row| {
      RawDetail::from_row(row, width)
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawDetail::into_record).collect()
}

pub fn find<P: DetailPayload>(
  conn: &Connection,
  id: DetailId<P>,
) -> Result<DetailRecord<P>> {
  let sql = select_sql::<P>(&format!("{} = ?1", P::SCHEMA.id_column));
  let width = P::SCHEMA.columns.len();
  let raw = conn
    .query_row(&sql, rusqlite::params![id.get()], |row| {
      RawDetail::from_row(row, width)
    })
    .optional()?;
  raw.ok_or_else(|| not_found(id))?.into_record()
}

/// Insert a non-primary record. The payload must already be validated.
pub fn insert<P: DetailPayload>(
  conn: &Connection,
  supplier_id: SupplierId,
  payload: &P,
  now: DateTime<Utc>,
) -> Result<DetailRecord<P>> {
  suppliers::require(conn, supplier_id)?;

  let schema = P::SCHEMA;
  let placeholders = (2..=schema.columns.len() + 1)
    .map(|i| format!("?{i}"))
    .collect::<Vec<_>>()
    .join(", ");
  let sql = format!(
    "INSERT INTO {table} (SupplierID, IsPrimary, {columns}) VALUES (?1, 0, {placeholders})",
    table = schema.table,
    columns = schema.columns.join(", "),
  );

  let values = payload.to_columns();
  let mut params: Vec<&dyn ToSql> = vec![&supplier_id.0];
  params.extend(values.iter().map(|v| v as &dyn ToSql));
  conn.execute(&sql, params.as_slice())?;

  let id = DetailId::new(conn.last_insert_rowid());
  suppliers::touch(conn, supplier_id, now)?;
  find(conn, id)
}

/// Overwrite the payload columns; `IsPrimary` is not part of the statement.
pub fn update<P: DetailPayload>(
  conn: &Connection,
  id: DetailId<P>,
  payload: &P,
  now: DateTime<Utc>,
) -> Result<DetailRecord<P>> {
  let existing = find(conn, id)?;

  let schema = P::SCHEMA;
  let assignments = schema
    .columns
    .iter()
    .enumerate()
    .map(|(i, column)| format!("{column} = ?{}", i + 1))
    .collect::<Vec<_>>()
    .join(", ");
  let sql = format!(
    "UPDATE {table} SET {assignments} WHERE {id_column} = ?{last}",
    table = schema.table,
    id_column = schema.id_column,
    last = schema.columns.len() + 1,
  );

  let values = payload.to_columns();
  let raw_id = id.get();
  let mut params: Vec<&dyn ToSql> =
    values.iter().map(|v| v as &dyn ToSql).collect();
  params.push(&raw_id);
  conn.execute(&sql, params.as_slice())?;

  suppliers::touch(conn, existing.supplier_id, now)?;
  find(conn, id)
}

/// Remove a record. A deleted primary leaves the kind with no primary.
pub fn delete<P: DetailPayload>(
  conn: &Connection,
  id: DetailId<P>,
  now: DateTime<Utc>,
) -> Result<DetailRecord<P>> {
  let existing = find(conn, id)?;
  conn.execute(
    &format!(
      "DELETE FROM {} WHERE {} = ?1",
      P::SCHEMA.table,
      P::SCHEMA.id_column
    ),
    rusqlite::params![id.get()],
  )?;
  suppliers::touch(conn, existing.supplier_id, now)?;
  Ok(existing)
}

/// Clear every sibling, then mark the target. Siblings are cleared first so
/// the partial unique index never sees two primaries.
pub fn set_primary<P: DetailPayload>(
  conn: &Connection,
  id: DetailId<P>,
  now: DateTime<Utc>,
) -> Result<DetailRecord<P>> {
  let existing = find(conn, id)?;
  let schema = P::SCHEMA;

  conn.execute(
    &format!(
      "UPDATE {table} SET IsPrimary = 0
       WHERE SupplierID = ?1 AND IsPrimary = 1 AND {id_column} != ?2",
      table = schema.table,
      id_column = schema.id_column,
    ),
    rusqlite::params![existing.supplier_id.0, id.get()],
  )?;
  conn.execute(
    &format!(
      "UPDATE {} SET IsPrimary = 1 WHERE {} = ?1",
      schema.table, schema.id_column
    ),
    rusqlite::params![id.get()],
  )?;

  suppliers::touch(conn, existing.supplier_id, now)?;
  find(conn, id)
}

pub fn set_contact_person_status(
  conn: &Connection,
  id: DetailId<ContactPersonValue>,
  status: Status,
  now: DateTime<Utc>,
) -> Result<DetailRecord<ContactPersonValue>> {
  let existing = find(conn, id)?;
  if existing.payload.status == status {
    return Err(
      CoreError::Validation(format!("contact person {id} is already {status}"))
        .into(),
    );
  }
  conn.execute(
    "UPDATE SupplierContactPersons SET Status = ?1 WHERE ContactPersonID = ?2",
    rusqlite::params![status.as_str(), id.get()],
  )?;
  suppliers::touch(conn, existing.supplier_id, now)?;
  find(conn, id)
}
