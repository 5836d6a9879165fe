//! The `SupplierStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `purveyor-store-sqlite`). Presentation code depends on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use crate::{
  Classify,
  detail::{ContactPersonValue, DetailId, DetailPayload, DetailRecord},
  session::{Role, Session, UserId},
  supplier::{Status, Supplier, SupplierFields, SupplierId, SupplierView},
};

/// Abstraction over a supplier directory backend.
///
/// Every method that takes a [`Session`] changes state and checks
/// [`Session::authorize`] before touching the store. Each such call is one
/// transaction: it either commits completely or leaves the store as it was.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait SupplierStore: Send + Sync {
  type Error: std::error::Error + Classify + Send + Sync + 'static;

  // ── Sessions ──────────────────────────────────────────────────────────

  /// Verify `credential` against an active account and return its session.
  fn authenticate<'a>(
    &'a self,
    username: &'a str,
    credential: &'a str,
  ) -> impl Future<Output = Result<Session, Self::Error>> + Send + 'a;

  /// Create an account with a salted hash of `password`. Administrators
  /// only; the first account of an empty store is a backend concern.
  fn add_user<'a>(
    &'a self,
    session: &'a Session,
    username: &'a str,
    password: &'a str,
    role: Role,
  ) -> impl Future<Output = Result<UserId, Self::Error>> + Send + 'a;

  /// Activate or deactivate an account.
  fn set_user_status<'a>(
    &'a self,
    session: &'a Session,
    user_id: UserId,
    status: Status,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Suppliers ─────────────────────────────────────────────────────────

  /// Create an `Active` supplier with empty detail collections.
  fn create_supplier<'a>(
    &'a self,
    session: &'a Session,
    fields: SupplierFields,
  ) -> impl Future<Output = Result<Supplier, Self::Error>> + Send + 'a;

  fn update_supplier<'a>(
    &'a self,
    session: &'a Session,
    id: SupplierId,
    fields: SupplierFields,
  ) -> impl Future<Output = Result<Supplier, Self::Error>> + Send + 'a;

  /// Move a supplier to `status`, which must differ from its current one.
  fn set_supplier_status<'a>(
    &'a self,
    session: &'a Session,
    id: SupplierId,
    status: Status,
  ) -> impl Future<Output = Result<Supplier, Self::Error>> + Send + 'a;

  fn get_supplier(
    &self,
    id: SupplierId,
  ) -> impl Future<Output = Result<Option<Supplier>, Self::Error>> + Send + '_;

  /// The supplier and all four detail collections, read as one snapshot.
  /// Returns `None` if the supplier does not exist.
  fn get_full(
    &self,
    id: SupplierId,
  ) -> impl Future<Output = Result<Option<SupplierView>, Self::Error>> + Send + '_;

  // ── Details ───────────────────────────────────────────────────────────

  /// Primary record first, then insertion order.
  fn list_details<P: DetailPayload>(
    &self,
    supplier_id: SupplierId,
  ) -> impl Future<Output = Result<Vec<DetailRecord<P>>, Self::Error>> + Send + '_;

  /// New records are never primary; designation is always explicit.
  fn add_detail<'a, P: DetailPayload>(
    &'a self,
    session: &'a Session,
    supplier_id: SupplierId,
    payload: P,
  ) -> impl Future<Output = Result<DetailRecord<P>, Self::Error>> + Send + 'a;

  /// Replace the payload; `is_primary` is left alone.
  fn edit_detail<'a, P: DetailPayload>(
    &'a self,
    session: &'a Session,
    id: DetailId<P>,
    payload: P,
  ) -> impl Future<Output = Result<DetailRecord<P>, Self::Error>> + Send + 'a;

  /// Deleting the primary record does not promote a sibling.
  fn delete_detail<'a, P: DetailPayload>(
    &'a self,
    session: &'a Session,
    id: DetailId<P>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Make `id` the only primary record of its kind for its supplier.
  fn set_primary<'a, P: DetailPayload>(
    &'a self,
    session: &'a Session,
    id: DetailId<P>,
  ) -> impl Future<Output = Result<DetailRecord<P>, Self::Error>> + Send + 'a;

  /// Toggle a contact person's own status; independent of the supplier's.
  fn set_contact_person_status<'a>(
    &'a self,
    session: &'a Session,
    id: DetailId<ContactPersonValue>,
    status: Status,
  ) -> impl Future<Output = Result<DetailRecord<ContactPersonValue>, Self::Error>>
  + Send
  + 'a;

  // ── Directory ─────────────────────────────────────────────────────────

  /// All suppliers in directory order (see [`crate::directory::sort`]).
  fn list_suppliers(
    &self,
  ) -> impl Future<Output = Result<Vec<Supplier>, Self::Error>> + Send + '_;

  /// Suppliers whose company name or TIN contains `term`, case-insensitively.
  /// A blank term is the same as [`SupplierStore::list_suppliers`].
  fn search_suppliers<'a>(
    &'a self,
    term: &'a str,
  ) -> impl Future<Output = Result<Vec<Supplier>, Self::Error>> + Send + 'a;
}
