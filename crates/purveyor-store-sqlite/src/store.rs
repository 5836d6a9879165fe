//! [`SqliteStore`]: the SQLite implementation of [`SupplierStore`].

use std::{path::Path, time::Duration};

use chrono::Utc;
use purveyor_core::{
  Error as CoreError,
  credential,
  detail::{ContactPersonValue, DetailId, DetailPayload, DetailRecord},
  session::{Role, Session, UserId},
  store::SupplierStore,
  supplier::{Status, Supplier, SupplierFields, SupplierId, SupplierView},
};
use rusqlite::{Connection, TransactionBehavior};

use crate::{Result, details, directory, schema::SCHEMA, suppliers, users};

/// How long a writer waits for another connection's lock before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// ─── Store ───────────────────────────────────────────────────────────────────

/// A supplier directory backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All calls
/// through one store are serialised on the connection thread; separate
/// stores on the same file are serialised by SQLite's write lock, which
/// every mutation takes up front with `BEGIN IMMEDIATE`.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .call(|conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await
  }

  /// Run `f` on the connection thread, keeping domain errors intact.
  async fn call<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    T: Send + 'static,
  {
    self.conn.call(move |conn| Ok(f(conn))).await?
  }

  /// Run `f` inside a `BEGIN IMMEDIATE` transaction. The transaction commits
  /// only if `f` succeeds; on any error it is dropped and rolled back.
  pub(crate) async fn write<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    T: Send + 'static,
  {
    self
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
      })
      .await
  }

  /// Run `f` inside a deferred transaction so multi-table reads share one
  /// snapshot.
  async fn read<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    T: Send + 'static,
  {
    self
      .call(move |conn| {
        let tx = conn.transaction()?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
      })
      .await
  }

  /// Create the first administrator. Only succeeds while `Users` is empty;
  /// every later account goes through [`SupplierStore::add_user`].
  pub async fn bootstrap_admin(&self, username: &str, password: &str) -> Result<UserId> {
    let (username, hash) = new_credentials(username, password)?;

    let name = username.clone();
    let user_id = self
      .write(move |conn| {
        if users::count(conn)? > 0 {
          return Err(
            CoreError::AccessDenied { action: "bootstrap an administrator" }.into(),
          );
        }
        users::insert(conn, &name, &hash, Role::Administrator)
      })
      .await?;
    tracing::info!(user = %username, %user_id, "first administrator created");
    Ok(user_id)
  }
}

/// Trimmed username and the PHC hash of `password`.
fn new_credentials(username: &str, password: &str) -> Result<(String, String)> {
  let username = username.trim().to_owned();
  if username.is_empty() {
    return Err(CoreError::Validation("username must not be empty".into()).into());
  }
  if password.is_empty() {
    return Err(CoreError::Validation("password must not be empty".into()).into());
  }
  Ok((username, credential::hash_password(password)?))
}

fn authorize(session: &Session, action: &'static str) -> Result<()> {
  session.authorize(action).inspect_err(|_| {
    tracing::warn!(user = %session.username, role = %session.role, action, "mutation denied");
  })?;
  Ok(())
}

// ─── SupplierStore impl ──────────────────────────────────────────────────────

impl SupplierStore for SqliteStore {
  type Error = crate::Error;

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn authenticate(&self, username: &str, credential: &str) -> Result<Session> {
    let name = username.to_owned();
    let user = self
      .call(move |conn| users::find_by_name(conn, &name))
      .await?;

    // Unknown user, inactive account and wrong password look the same.
    let accepted = match &user {
      Some(user) => {
        user.status()? == Status::Active
          && credential::verify_password(credential, &user.password_hash)
      }
      None => false,
    };
    match user {
      Some(user) if accepted => user.into_session(),
      _ => {
        tracing::warn!(user = %username, "authentication failed");
        Err(CoreError::Auth.into())
      }
    }
  }

  async fn add_user(
    &self,
    session: &Session,
    username: &str,
    password: &str,
    role: Role,
  ) -> Result<UserId> {
    authorize(session, "add user")?;
    let (username, hash) = new_credentials(username, password)?;

    let name = username.clone();
    let user_id = self
      .write(move |conn| users::insert(conn, &name, &hash, role))
      .await?;
    tracing::info!(by = %session.username, user = %username, %role, %user_id, "user added");
    Ok(user_id)
  }

  async fn set_user_status(
    &self,
    session: &Session,
    user_id: UserId,
    status: Status,
  ) -> Result<()> {
    authorize(session, "change user status")?;
    self
      .write(move |conn| users::set_status(conn, user_id, status))
      .await?;
    tracing::info!(by = %session.username, %user_id, %status, "user status changed");
    Ok(())
  }

  // ── Suppliers ─────────────────────────────────────────────────────────────

  async fn create_supplier(
    &self,
    session: &Session,
    fields: SupplierFields,
  ) -> Result<Supplier> {
    authorize(session, "create supplier")?;
    let fields = fields.normalized()?;

    let supplier = self
      .write(move |conn| suppliers::insert(conn, &fields, Utc::now()))
      .await?;
    tracing::info!(
      by = %session.username,
      supplier_id = %supplier.supplier_id,
      company = %supplier.company_name,
      "supplier created"
    );
    Ok(supplier)
  }

  async fn update_supplier(
    &self,
    session: &Session,
    id: SupplierId,
    fields: SupplierFields,
  ) -> Result<Supplier> {
    authorize(session, "update supplier")?;
    let fields = fields.normalized()?;

    let supplier = self
      .write(move |conn| suppliers::update(conn, id, &fields, Utc::now()))
      .await?;
    tracing::info!(by = %session.username, supplier_id = %id, "supplier updated");
    Ok(supplier)
  }

  async fn set_supplier_status(
    &self,
    session: &Session,
    id: SupplierId,
    status: Status,
  ) -> Result<Supplier> {
    authorize(session, "change supplier status")?;

    let supplier = self
      .write(move |conn| suppliers::set_status(conn, id, status, Utc::now()))
      .await?;
    tracing::info!(by = %session.username, supplier_id = %id, %status, "supplier status changed");
    Ok(supplier)
  }

  async fn get_supplier(&self, id: SupplierId) -> Result<Option<Supplier>> {
    self.call(move |conn| suppliers::load(conn, id)).await
  }

  async fn get_full(&self, id: SupplierId) -> Result<Option<SupplierView>> {
    self.read(move |conn| suppliers::view(conn, id)).await
  }

  // ── Details ───────────────────────────────────────────────────────────────

  async fn list_details<P: DetailPayload>(
    &self,
    supplier_id: SupplierId,
  ) -> Result<Vec<DetailRecord<P>>> {
    self
      .read(move |conn| {
        suppliers::require(conn, supplier_id)?;
        details::list::<P>(conn, supplier_id)
      })
      .await
  }

  async fn add_detail<P: DetailPayload>(
    &self,
    session: &Session,
    supplier_id: SupplierId,
    payload: P,
  ) -> Result<DetailRecord<P>> {
    authorize(session, "add detail")?;
    payload.validate()?;

    let record = self
      .write(move |conn| details::insert(conn, supplier_id, &payload, Utc::now()))
      .await?;
    tracing::info!(
      by = %session.username,
      kind = %P::KIND,
      supplier_id = %supplier_id,
      id = %record.id,
      "detail added"
    );
    Ok(record)
  }

  async fn edit_detail<P: DetailPayload>(
    &self,
    session: &Session,
    id: DetailId<P>,
    payload: P,
  ) -> Result<DetailRecord<P>> {
    authorize(session, "edit detail")?;
    payload.validate()?;

    let record = self
      .write(move |conn| details::update(conn, id, &payload, Utc::now()))
      .await?;
    tracing::info!(
      by = %session.username,
      kind = %P::KIND,
      supplier_id = %record.supplier_id,
      %id,
      "detail edited"
    );
    Ok(record)
  }

  async fn delete_detail<P: DetailPayload>(
    &self,
    session: &Session,
    id: DetailId<P>,
  ) -> Result<()> {
    authorize(session, "delete detail")?;

    let removed = self
      .write(move |conn| details::delete(conn, id, Utc::now()))
      .await?;
    tracing::info!(
      by = %session.username,
      kind = %P::KIND,
      supplier_id = %removed.supplier_id,
      %id,
      was_primary = removed.is_primary,
      "detail deleted"
    );
    Ok(())
  }

  async fn set_primary<P: DetailPayload>(
    &self,
    session: &Session,
    id: DetailId<P>,
  ) -> Result<DetailRecord<P>> {
    authorize(session, "set primary detail")?;

    let record = self
      .write(move |conn| details::set_primary(conn, id, Utc::now()))
      .await?;
    tracing::info!(
      by = %session.username,
      kind = %P::KIND,
      supplier_id = %record.supplier_id,
      %id,
      "primary detail set"
    );
    Ok(record)
  }

  async fn set_contact_person_status(
    &self,
    session: &Session,
    id: DetailId<ContactPersonValue>,
    status: Status,
  ) -> Result<DetailRecord<ContactPersonValue>> {
    authorize(session, "change contact person status")?;

    let record = self
      .write(move |conn| {
        details::set_contact_person_status(conn, id, status, Utc::now())
      })
      .await?;
    tracing::info!(
      by = %session.username,
      supplier_id = %record.supplier_id,
      %id,
      %status,
      "contact person status changed"
    );
    Ok(record)
  }

  // ── Directory ─────────────────────────────────────────────────────────────

  async fn list_suppliers(&self) -> Result<Vec<Supplier>> {
    self.call(|conn| directory::search(conn, "")).await
  }

  async fn search_suppliers(&self, term: &str) -> Result<Vec<Supplier>> {
    let term = term.to_owned();
    self.call(move |conn| directory::search(conn, &term)).await
  }
}
