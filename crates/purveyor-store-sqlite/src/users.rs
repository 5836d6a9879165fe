//! `Users` table access for authentication and account provisioning.

use purveyor_core::{
  Error as CoreError,
  session::{Role, UserId},
  supplier::Status,
};
use rusqlite::{Connection, OptionalExtension as _};

use crate::{Result, encode::RawUser};

pub fn find_by_name(conn: &Connection, username: &str) -> Result<Option<RawUser>> {
  Ok(
    conn
      .query_row(
        "SELECT UserID, UserName, PasswordHash, UserRole, Status
         FROM Users WHERE UserName = ?1",
        rusqlite::params![username],
        RawUser::from_row,
      )
      .optional()?,
  )
}

pub fn count(conn: &Connection) -> Result<i64> {
  Ok(conn.query_row("SELECT COUNT(*) FROM Users", [], |row| row.get(0))?)
}

/// `password_hash` is a PHC string; plaintext never reaches this table.
pub fn insert(
  conn: &Connection,
  username: &str,
  password_hash: &str,
  role: Role,
) -> Result<UserId> {
  if find_by_name(conn, username)?.is_some() {
    return Err(
      CoreError::Validation(format!("username {username:?} is already taken"))
        .into(),
    );
  }
  conn.execute(
    "INSERT INTO Users (UserName, PasswordHash, UserRole, Status)
     VALUES (?1, ?2, ?3, ?4)",
    rusqlite::params![
      username,
      password_hash,
      role.as_str(),
      Status::Active.as_str()
    ],
  )?;
  Ok(UserId(conn.last_insert_rowid()))
}

pub fn set_status(conn: &Connection, user_id: UserId, status: Status) -> Result<()> {
  let current: Option<String> = conn
    .query_row(
      "SELECT Status FROM Users WHERE UserID = ?1",
      rusqlite::params![user_id.0],
      |row| row.get(0),
    )
    .optional()?;
  let current = current.ok_or(CoreError::UserNotFound(user_id))?;
  if Status::parse(&current)? == status {
    return Err(
      CoreError::Validation(format!("user {user_id} is already {status}")).into(),
    );
  }
  conn.execute(
    "UPDATE Users SET Status = ?1 WHERE UserID = ?2",
    rusqlite::params![status.as_str(), user_id.0],
  )?;
  Ok(())
}
