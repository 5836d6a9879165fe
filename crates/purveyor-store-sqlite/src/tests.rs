//! Integration tests for `SqliteStore` against an in-memory database.

use std::{
  sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
  },
  time::Duration,
};

use purveyor_core::{
  Classify, Error as CoreError, ErrorKind,
  detail::{
    AddressValue, ContactPersonValue, DetailId, DetailKind, DetailPayload,
    DetailRecord, EmailValue, PhoneValue,
  },
  session::{Role, Session, UserId},
  store::SupplierStore,
  supplier::{Status, Supplier, SupplierFields, SupplierId},
};

use tracing_subscriber::{
  Layer, Registry,
  layer::{Context, SubscriberExt as _},
};

use crate::{Error, SqliteStore, suppliers};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn admin() -> Session {
  Session {
    user_id:  UserId(1),
    username: "admin".into(),
    role:     Role::Administrator,
  }
}

fn staff() -> Session {
  Session {
    user_id:  UserId(2),
    username: "clerk".into(),
    role:     Role::Staff,
  }
}

async fn supplier(s: &SqliteStore, tin: &str, name: &str) -> Supplier {
  s.create_supplier(&admin(), SupplierFields::new(tin, name))
    .await
    .unwrap()
}

async fn acme(s: &SqliteStore) -> Supplier { supplier(s, "123-456", "Acme Corp").await }

fn address(line1: &str) -> AddressValue {
  AddressValue {
    line1:             line1.into(),
    line2:             None,
    city_municipality: "Pasig".into(),
    province:          "Metro Manila".into(),
    postal_code:       Some("1600".into()),
    address_type:      "Billing".into(),
  }
}

fn phone(number: &str) -> PhoneValue {
  PhoneValue { number: number.into(), number_type: "Mobile".into() }
}

fn email(addr: &str) -> EmailValue {
  EmailValue { email: addr.into(), email_type: "Work".into() }
}

fn primaries<P>(records: &[DetailRecord<P>]) -> usize {
  records.iter().filter(|r| r.is_primary).count()
}

/// Give the clock room to move so timestamp comparisons are strict.
async fn tick() { tokio::time::sleep(Duration::from_millis(5)).await }

fn assert_kind(err: &Error, kind: ErrorKind) {
  assert_eq!(err.kind(), kind, "unexpected error: {err}");
}

// ─── Suppliers ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_supplier_starts_active_and_empty() {
  let s = store().await;
  let created = acme(&s).await;

  assert_eq!(created.tin, "123-456");
  assert_eq!(created.company_name, "Acme Corp");
  assert_eq!(created.status, Status::Active);
  assert_eq!(created.date_created, created.date_updated);
  assert_eq!(created.version, 1);

  let view = s.get_full(created.supplier_id).await.unwrap().unwrap();
  assert_eq!(view.supplier, created);
  assert!(view.addresses.is_empty());
  assert!(view.phones.is_empty());
  assert!(view.emails.is_empty());
  assert!(view.contact_persons.is_empty());
}

#[tokio::test]
async fn create_supplier_trims_fields() {
  let s = store().await;
  let created = supplier(&s, "  777 ", "\tGlobex  ").await;
  assert_eq!(created.tin, "777");
  assert_eq!(created.company_name, "Globex");
}

#[tokio::test]
async fn create_with_empty_company_name_persists_nothing() {
  let s = store().await;

  let err = s
    .create_supplier(&admin(), SupplierFields::new("123-456", "  "))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::Validation(_))));

  let err = s
    .create_supplier(&admin(), SupplierFields::new("", "Acme Corp"))
    .await
    .unwrap_err();
  assert_kind(&err, ErrorKind::Validation);

  assert!(s.list_suppliers().await.unwrap().is_empty());
}

#[tokio::test]
async fn update_supplier_refreshes_timestamp_and_version() {
  let s = store().await;
  let created = acme(&s).await;
  tick().await;

  let updated = s
    .update_supplier(
      &admin(),
      created.supplier_id,
      SupplierFields::new("123-456-789", "Acme Corporation"),
    )
    .await
    .unwrap();

  assert_eq!(updated.tin, "123-456-789");
  assert_eq!(updated.company_name, "Acme Corporation");
  assert_eq!(updated.date_created, created.date_created);
  assert!(updated.date_updated > created.date_updated);
  assert_eq!(updated.version, created.version + 1);
}

#[tokio::test]
async fn update_validates_and_checks_existence() {
  let s = store().await;
  let created = acme(&s).await;

  let err = s
    .update_supplier(&admin(), created.supplier_id, SupplierFields::new("1", ""))
    .await
    .unwrap_err();
  assert_kind(&err, ErrorKind::Validation);

  let err = s
    .update_supplier(&admin(), SupplierId(999), SupplierFields::new("1", "X"))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(CoreError::SupplierNotFound(SupplierId(999)))
  ));

  let unchanged = s.get_supplier(created.supplier_id).await.unwrap().unwrap();
  assert_eq!(unchanged, created);
}

#[tokio::test]
async fn status_change_scenario() {
  let s = store().await;
  let created = acme(&s).await;

  let found = s.search_suppliers("acme").await.unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(found[0].supplier_id, created.supplier_id);

  let err = s
    .set_supplier_status(&staff(), created.supplier_id, Status::Inactive)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::AccessDenied { .. })));
  let still = s.get_supplier(created.supplier_id).await.unwrap().unwrap();
  assert_eq!(still.status, Status::Active);
  assert_eq!(still.date_updated, created.date_updated);

  tick().await;
  let changed = s
    .set_supplier_status(&admin(), created.supplier_id, Status::Inactive)
    .await
    .unwrap();
  assert_eq!(changed.status, Status::Inactive);
  assert!(changed.date_updated > created.date_updated);
  assert_eq!(changed.version, created.version + 1);
}

#[tokio::test]
async fn status_is_reversible_but_must_change() {
  let s = store().await;
  let id = acme(&s).await.supplier_id;

  let err = s
    .set_supplier_status(&admin(), id, Status::Active)
    .await
    .unwrap_err();
  assert_kind(&err, ErrorKind::Validation);

  s.set_supplier_status(&admin(), id, Status::Inactive).await.unwrap();
  let back = s
    .set_supplier_status(&admin(), id, Status::Inactive.toggled())
    .await
    .unwrap();
  assert_eq!(back.status, Status::Active);
  assert_eq!(back.version, 3);

  let err = s
    .set_supplier_status(&admin(), SupplierId(42), Status::Inactive)
    .await
    .unwrap_err();
  assert_kind(&err, ErrorKind::NotFound);
}

#[tokio::test]
async fn staff_cannot_mutate_anything() {
  let s = store().await;
  let id = acme(&s).await.supplier_id;
  let addr = s.add_detail(&admin(), id, address("1 Main St")).await.unwrap();
  let person = s
    .add_detail(&admin(), id, ContactPersonValue::new("Ana", "Reyes"))
    .await
    .unwrap();
  let before = s.get_full(id).await.unwrap().unwrap();

  let clerk = staff();
  let errors = vec![
    s.create_supplier(&clerk, SupplierFields::new("9", "Initech"))
      .await
      .unwrap_err(),
    s.update_supplier(&clerk, id, SupplierFields::new("9", "Initech"))
      .await
      .unwrap_err(),
    s.set_supplier_status(&clerk, id, Status::Inactive)
      .await
      .unwrap_err(),
    s.add_detail(&clerk, id, phone("555-0100")).await.unwrap_err(),
    s.edit_detail(&clerk, addr.id, address("2 Side St"))
      .await
      .unwrap_err(),
    s.set_primary(&clerk, addr.id).await.unwrap_err(),
    s.delete_detail(&clerk, addr.id).await.unwrap_err(),
    s.set_contact_person_status(&clerk, person.id, Status::Inactive)
      .await
      .unwrap_err(),
    s.set_user_status(&clerk, UserId(1), Status::Inactive)
      .await
      .unwrap_err(),
    s.add_user(&clerk, "eve", "pw", Role::Administrator)
      .await
      .unwrap_err(),
  ];
  for err in &errors {
    assert_kind(err, ErrorKind::AccessDenied);
  }

  // Access is checked before validation.
  let err = s
    .create_supplier(&clerk, SupplierFields::new("", ""))
    .await
    .unwrap_err();
  assert_kind(&err, ErrorKind::AccessDenied);

  let after = s.get_full(id).await.unwrap().unwrap();
  assert_eq!(before, after);
  assert_eq!(s.list_suppliers().await.unwrap().len(), 1);
}

#[tokio::test]
async fn get_full_missing_supplier_is_none() {
  let s = store().await;
  assert!(s.get_full(SupplierId(1)).await.unwrap().is_none());
  assert!(s.get_supplier(SupplierId(1)).await.unwrap().is_none());
}

#[tokio::test]
async fn get_full_collects_all_four_kinds() {
  let s = store().await;
  let id = acme(&s).await.supplier_id;
  let other = supplier(&s, "999", "Globex").await.supplier_id;

  s.add_detail(&admin(), id, address("1 Main St")).await.unwrap();
  s.add_detail(&admin(), id, phone("555-0100")).await.unwrap();
  s.add_detail(&admin(), id, phone("555-0101")).await.unwrap();
  s.add_detail(&admin(), id, email("orders@acme.test")).await.unwrap();
  s.add_detail(&admin(), id, ContactPersonValue::new("Ana", "Reyes"))
    .await
    .unwrap();
  s.add_detail(&admin(), other, phone("555-0199")).await.unwrap();

  let view = s.get_full(id).await.unwrap().unwrap();
  assert_eq!(view.addresses.len(), 1);
  assert_eq!(view.phones.len(), 2);
  assert_eq!(view.emails.len(), 1);
  assert_eq!(view.contact_persons.len(), 1);
  assert!(view.phones.iter().all(|p| p.supplier_id == id));
  assert_eq!(view.supplier.version, 6);
}

// ─── Details ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn added_details_are_never_primary() {
  let s = store().await;
  let id = acme(&s).await.supplier_id;

  let first = s.add_detail(&admin(), id, address("1 Main St")).await.unwrap();
  assert!(!first.is_primary);
  assert_eq!(first.supplier_id, id);
  assert_eq!(first.payload, address("1 Main St"));

  let listed: Vec<DetailRecord<AddressValue>> = s.list_details(id).await.unwrap();
  assert_eq!(listed, vec![first]);
  assert_eq!(primaries(&listed), 0);
}

#[tokio::test]
async fn add_detail_rejects_invalid_payload_and_unknown_supplier() {
  let s = store().await;
  let id = acme(&s).await.supplier_id;

  let err = s
    .add_detail(&admin(), id, email("not-an-email"))
    .await
    .unwrap_err();
  assert_kind(&err, ErrorKind::Validation);

  let err = s
    .add_detail(&admin(), SupplierId(77), phone("555-0100"))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(CoreError::SupplierNotFound(SupplierId(77)))
  ));

  let emails = s.list_details::<EmailValue>(id).await.unwrap();
  assert!(emails.is_empty());
  let untouched = s.get_supplier(id).await.unwrap().unwrap();
  assert_eq!(untouched.version, 1);
}

#[tokio::test]
async fn list_details_of_unknown_supplier_is_not_found() {
  let s = store().await;
  let err = s.list_details::<PhoneValue>(SupplierId(5)).await.unwrap_err();
  assert_kind(&err, ErrorKind::NotFound);
}

#[tokio::test]
async fn list_orders_primary_first_then_insertion() {
  let s = store().await;
  let id = acme(&s).await.supplier_id;

  let a = s.add_detail(&admin(), id, phone("A")).await.unwrap();
  let b = s.add_detail(&admin(), id, phone("B")).await.unwrap();
  let c = s.add_detail(&admin(), id, phone("C")).await.unwrap();

  let order = |records: Vec<DetailRecord<PhoneValue>>| {
    records.into_iter().map(|r| r.id).collect::<Vec<_>>()
  };

  assert_eq!(order(s.list_details(id).await.unwrap()), vec![a.id, b.id, c.id]);

  s.set_primary(&admin(), c.id).await.unwrap();
  assert_eq!(order(s.list_details(id).await.unwrap()), vec![c.id, a.id, b.id]);

  // Same state, same order.
  assert_eq!(order(s.list_details(id).await.unwrap()), vec![c.id, a.id, b.id]);
}

#[tokio::test]
async fn set_primary_swaps_the_primary() {
  let s = store().await;
  let id = acme(&s).await.supplier_id;

  let a = s.add_detail(&admin(), id, address("A St")).await.unwrap();
  let b = s.add_detail(&admin(), id, address("B St")).await.unwrap();
  s.set_primary(&admin(), a.id).await.unwrap();

  let promoted = s.set_primary(&admin(), b.id).await.unwrap();
  assert!(promoted.is_primary);

  let listed = s.list_details::<AddressValue>(id).await.unwrap();
  assert_eq!(listed[0].id, b.id);
  assert!(listed[0].is_primary);
  assert!(listed[1..].iter().all(|r| !r.is_primary));
  assert_eq!(primaries(&listed), 1);
}

#[tokio::test]
async fn set_primary_twice_is_stable() {
  let s = store().await;
  let id = acme(&s).await.supplier_id;
  let a = s.add_detail(&admin(), id, email("a@acme.test")).await.unwrap();

  s.set_primary(&admin(), a.id).await.unwrap();
  s.set_primary(&admin(), a.id).await.unwrap();

  let listed = s.list_details::<EmailValue>(id).await.unwrap();
  assert_eq!(primaries(&listed), 1);
  assert!(listed[0].is_primary);
}

#[tokio::test]
async fn primary_is_scoped_to_supplier_and_kind() {
  let s = store().await;
  let acme_id = acme(&s).await.supplier_id;
  let globex_id = supplier(&s, "999", "Globex").await.supplier_id;

  let acme_addr = s.add_detail(&admin(), acme_id, address("A St")).await.unwrap();
  let globex_addr = s
    .add_detail(&admin(), globex_id, address("G St"))
    .await
    .unwrap();
  let acme_phone = s.add_detail(&admin(), acme_id, phone("555")).await.unwrap();

  s.set_primary(&admin(), acme_addr.id).await.unwrap();
  s.set_primary(&admin(), globex_addr.id).await.unwrap();
  s.set_primary(&admin(), acme_phone.id).await.unwrap();

  let acme_addrs = s.list_details::<AddressValue>(acme_id).await.unwrap();
  let globex_addrs = s.list_details::<AddressValue>(globex_id).await.unwrap();
  let acme_phones = s.list_details::<PhoneValue>(acme_id).await.unwrap();
  assert!(acme_addrs[0].is_primary);
  assert!(globex_addrs[0].is_primary);
  assert!(acme_phones[0].is_primary);
}

#[tokio::test]
async fn at_most_one_primary_through_mixed_operations() {
  let s = store().await;
  let id = acme(&s).await.supplier_id;

  let mut ids = Vec::new();
  for n in 0..4 {
    let rec = s
      .add_detail(&admin(), id, phone(&format!("555-010{n}")))
      .await
      .unwrap();
    ids.push(rec.id);
  }

  s.set_primary(&admin(), ids[1]).await.unwrap();
  s.set_primary(&admin(), ids[3]).await.unwrap();
  s.edit_detail(&admin(), ids[3], phone("555-9999")).await.unwrap();
  s.set_primary(&admin(), ids[0]).await.unwrap();
  s.delete_detail(&admin(), ids[2]).await.unwrap();
  s.set_primary(&admin(), ids[1]).await.unwrap();

  let listed = s.list_details::<PhoneValue>(id).await.unwrap();
  assert_eq!(listed.len(), 3);
  assert_eq!(primaries(&listed), 1);
  assert_eq!(listed[0].id, ids[1]);
}

#[tokio::test]
async fn concurrent_set_primary_leaves_exactly_one() {
  let s = store().await;
  let id = acme(&s).await.supplier_id;

  let mut ids = Vec::new();
  for n in 0..8 {
    let rec = s
      .add_detail(&admin(), id, address(&format!("{n} Main St")))
      .await
      .unwrap();
    ids.push(rec.id);
  }

  let handles: Vec<_> = ids
    .iter()
    .map(|&detail_id| {
      let s = s.clone();
      tokio::spawn(async move { s.set_primary(&admin(), detail_id).await })
    })
    .collect();
  for handle in handles {
    handle.await.unwrap().unwrap();
  }

  let listed = s.list_details::<AddressValue>(id).await.unwrap();
  assert_eq!(primaries(&listed), 1);
}

#[tokio::test]
async fn deleting_the_primary_does_not_promote() {
  let s = store().await;
  let id = acme(&s).await.supplier_id;

  let a = s.add_detail(&admin(), id, email("a@acme.test")).await.unwrap();
  s.add_detail(&admin(), id, email("b@acme.test")).await.unwrap();
  s.set_primary(&admin(), a.id).await.unwrap();

  s.delete_detail(&admin(), a.id).await.unwrap();

  let listed = s.list_details::<EmailValue>(id).await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(primaries(&listed), 0);
}

#[tokio::test]
async fn edit_keeps_primary_flag_and_replaces_payload() {
  let s = store().await;
  let id = acme(&s).await.supplier_id;
  let a = s.add_detail(&admin(), id, address("A St")).await.unwrap();
  s.set_primary(&admin(), a.id).await.unwrap();

  let mut changed = address("A Street, Unit 4");
  changed.line2 = Some("Building B".into());
  changed.address_type = "Shipping".into();
  let edited = s.edit_detail(&admin(), a.id, changed.clone()).await.unwrap();

  assert!(edited.is_primary);
  assert_eq!(edited.payload, changed);
}

#[tokio::test]
async fn unknown_detail_ids_are_not_found() {
  let s = store().await;
  acme(&s).await;
  let ghost: DetailId<PhoneValue> = DetailId::new(404);

  let err = s.edit_detail(&admin(), ghost, phone("1")).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(CoreError::DetailNotFound { kind: DetailKind::Phone, id: 404 })
  ));
  assert_kind(
    &s.delete_detail(&admin(), ghost).await.unwrap_err(),
    ErrorKind::NotFound,
  );
  assert_kind(
    &s.set_primary(&admin(), ghost).await.unwrap_err(),
    ErrorKind::NotFound,
  );
}

#[tokio::test]
async fn detail_mutations_touch_the_supplier() {
  let s = store().await;
  let created = acme(&s).await;
  let id = created.supplier_id;

  tick().await;
  let rec = s.add_detail(&admin(), id, phone("555")).await.unwrap();
  let after_add = s.get_supplier(id).await.unwrap().unwrap();
  assert!(after_add.date_updated > created.date_updated);

  tick().await;
  s.set_primary(&admin(), rec.id).await.unwrap();
  let after_primary = s.get_supplier(id).await.unwrap().unwrap();
  assert!(after_primary.date_updated > after_add.date_updated);

  tick().await;
  s.edit_detail(&admin(), rec.id, phone("556")).await.unwrap();
  let after_edit = s.get_supplier(id).await.unwrap().unwrap();
  assert!(after_edit.date_updated > after_primary.date_updated);

  tick().await;
  s.delete_detail(&admin(), rec.id).await.unwrap();
  let after_delete = s.get_supplier(id).await.unwrap().unwrap();
  assert!(after_delete.date_updated > after_edit.date_updated);

  assert_eq!(after_delete.version, created.version + 4);
  assert_eq!(after_delete.date_created, created.date_created);
}

#[tokio::test]
async fn contact_person_status_is_independent_of_supplier() {
  let s = store().await;
  let id = acme(&s).await.supplier_id;

  let mut person = ContactPersonValue::new("Ana", "Reyes");
  person.position = Some("Purchasing".into());
  person.email = Some("ana@acme.test".into());
  let rec = s.add_detail(&admin(), id, person).await.unwrap();
  assert_eq!(rec.payload.status, Status::Active);

  let off = s
    .set_contact_person_status(&admin(), rec.id, Status::Inactive)
    .await
    .unwrap();
  assert_eq!(off.payload.status, Status::Inactive);
  assert_eq!(off.payload.position.as_deref(), Some("Purchasing"));

  let sup = s.get_supplier(id).await.unwrap().unwrap();
  assert_eq!(sup.status, Status::Active);

  let err = s
    .set_contact_person_status(&admin(), rec.id, Status::Inactive)
    .await
    .unwrap_err();
  assert_kind(&err, ErrorKind::Validation);

  // Deactivating the supplier leaves its contacts alone.
  s.set_supplier_status(&admin(), id, Status::Inactive).await.unwrap();
  s.set_contact_person_status(&admin(), rec.id, Status::Active)
    .await
    .unwrap();
  let view = s.get_full(id).await.unwrap().unwrap();
  assert_eq!(view.supplier.status, Status::Inactive);
  assert_eq!(view.contact_persons[0].payload.status, Status::Active);
}

// ─── Directory ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_is_case_insensitive_by_name_then_id() {
  let s = store().await;
  let zeta = supplier(&s, "1", "zeta supply").await;
  let alpha1 = supplier(&s, "2", "Alpha Traders").await;
  let mid = supplier(&s, "3", "Midland").await;
  let alpha2 = supplier(&s, "4", "alpha traders").await;

  let ids: Vec<_> = s
    .list_suppliers()
    .await
    .unwrap()
    .into_iter()
    .map(|sup| sup.supplier_id)
    .collect();
  assert_eq!(
    ids,
    vec![
      alpha1.supplier_id,
      alpha2.supplier_id,
      mid.supplier_id,
      zeta.supplier_id
    ]
  );
}

#[tokio::test]
async fn search_matches_name_or_tin() {
  let s = store().await;
  let acme = acme(&s).await;
  let globex = supplier(&s, "ACME-TIN-9", "Globex").await;
  supplier(&s, "000", "Initech").await;

  let found = s.search_suppliers("  ACME ").await.unwrap();
  let ids: Vec<_> = found.iter().map(|sup| sup.supplier_id).collect();
  assert_eq!(ids, vec![acme.supplier_id, globex.supplier_id]);

  let by_tin = s.search_suppliers("456").await.unwrap();
  assert_eq!(by_tin.len(), 1);
  assert_eq!(by_tin[0].supplier_id, acme.supplier_id);

  assert!(s.search_suppliers("umbrella").await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_search_equals_list() {
  let s = store().await;
  supplier(&s, "1", "beta").await;
  supplier(&s, "2", "Alpha").await;
  supplier(&s, "3", "Gamma").await;

  let listed = s.list_suppliers().await.unwrap();
  assert_eq!(s.search_suppliers("").await.unwrap(), listed);
  assert_eq!(s.search_suppliers(" \t ").await.unwrap(), listed);
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn authenticate_returns_session_with_role() {
  let s = store().await;
  let admin_id = s.bootstrap_admin("root", "correct horse").await.unwrap();
  s.add_user(&admin(), "clerk", "battery staple", Role::Staff)
    .await
    .unwrap();

  let session = s.authenticate("root", "correct horse").await.unwrap();
  assert_eq!(session.user_id, admin_id);
  assert_eq!(session.username, "root");
  assert!(session.can_mutate());

  let session = s.authenticate("clerk", "battery staple").await.unwrap();
  assert_eq!(session.role, Role::Staff);
  assert!(!session.can_mutate());
}

#[tokio::test]
async fn authenticate_rejects_bad_credentials_and_inactive_accounts() {
  let s = store().await;
  let clerk = s
    .add_user(&admin(), "clerk", "pw", Role::Staff)
    .await
    .unwrap();

  let err = s.authenticate("clerk", "nope").await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::Auth)));
  assert_kind(&s.authenticate("ghost", "pw").await.unwrap_err(), ErrorKind::Auth);

  s.set_user_status(&admin(), clerk, Status::Inactive).await.unwrap();
  assert_kind(&s.authenticate("clerk", "pw").await.unwrap_err(), ErrorKind::Auth);
}

/// Counts `WARN` events emitted while installed.
#[derive(Clone, Default)]
struct WarnCounter(Arc<AtomicUsize>);

impl WarnCounter {
  fn get(&self) -> usize { self.0.load(Ordering::SeqCst) }
}

impl<S: tracing::Subscriber> Layer<S> for WarnCounter {
  fn on_event(&self, event: &tracing::Event<'_>, _: Context<'_, S>) {
    if *event.metadata().level() == tracing::Level::WARN {
      self.0.fetch_add(1, Ordering::SeqCst);
    }
  }
}

#[tokio::test]
async fn every_failed_login_is_logged() {
  let s = store().await;
  s.add_user(&admin(), "clerk", "pw", Role::Staff).await.unwrap();
  let gone = s.add_user(&admin(), "gone", "pw", Role::Staff).await.unwrap();
  s.set_user_status(&admin(), gone, Status::Inactive).await.unwrap();

  let warnings = WarnCounter::default();
  let _guard =
    tracing::subscriber::set_default(Registry::default().with(warnings.clone()));

  s.authenticate("ghost", "pw").await.unwrap_err();
  assert_eq!(warnings.get(), 1);
  s.authenticate("clerk", "wrong").await.unwrap_err();
  assert_eq!(warnings.get(), 2);
  s.authenticate("gone", "pw").await.unwrap_err();
  assert_eq!(warnings.get(), 3);

  s.authenticate("clerk", "pw").await.unwrap();
  assert_eq!(warnings.get(), 3);
}

#[tokio::test]
async fn staff_cannot_create_administrators() {
  let s = store().await;
  s.bootstrap_admin("root", "pw").await.unwrap();
  s.add_user(&admin(), "clerk", "pw", Role::Staff).await.unwrap();
  let clerk = s.authenticate("clerk", "pw").await.unwrap();

  let err = s
    .add_user(&clerk, "eve", "pw", Role::Administrator)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::AccessDenied { .. })));

  // No account was written, so there is nothing to log in with.
  assert_kind(&s.authenticate("eve", "pw").await.unwrap_err(), ErrorKind::Auth);
}

#[tokio::test]
async fn bootstrap_only_works_on_an_empty_store() {
  let s = store().await;
  let root = s.bootstrap_admin("  root ", "pw").await.unwrap();
  let session = s.authenticate("root", "pw").await.unwrap();
  assert_eq!(session.user_id, root);
  assert_eq!(session.role, Role::Administrator);

  let err = s.bootstrap_admin("eve", "pw").await.unwrap_err();
  assert_kind(&err, ErrorKind::AccessDenied);
  assert_kind(&s.authenticate("eve", "pw").await.unwrap_err(), ErrorKind::Auth);

  assert_kind(
    &store().await.bootstrap_admin("", "pw").await.unwrap_err(),
    ErrorKind::Validation,
  );
}

#[tokio::test]
async fn passwords_are_stored_hashed() {
  let s = store().await;
  s.bootstrap_admin("root", "plaintext-pw").await.unwrap();

  let stored: String = s
    .conn
    .call(|conn| {
      Ok(conn.query_row(
        "SELECT PasswordHash FROM Users WHERE UserName = 'root'",
        [],
        |row| row.get(0),
      )?)
    })
    .await
    .unwrap();
  assert!(stored.starts_with("$argon2"));
  assert!(!stored.contains("plaintext-pw"));
}

#[tokio::test]
async fn add_user_validates_input() {
  let s = store().await;
  s.bootstrap_admin("root", "pw").await.unwrap();

  assert_kind(
    &s.add_user(&admin(), "root", "other", Role::Staff)
      .await
      .unwrap_err(),
    ErrorKind::Validation,
  );
  assert_kind(
    &s.add_user(&admin(), "  ", "pw", Role::Staff).await.unwrap_err(),
    ErrorKind::Validation,
  );
  assert_kind(
    &s.add_user(&admin(), "x", "", Role::Staff).await.unwrap_err(),
    ErrorKind::Validation,
  );
  assert_kind(
    &s.set_user_status(&admin(), UserId(99), Status::Inactive)
      .await
      .unwrap_err(),
    ErrorKind::NotFound,
  );
}

// ─── Storage guarantees ──────────────────────────────────────────────────────

#[tokio::test]
async fn failed_write_rolls_back_everything() {
  let s = store().await;

  let err = s
    .write(|conn| {
      suppliers::insert(
        conn,
        &SupplierFields::new("1", "Half Written"),
        chrono::Utc::now(),
      )?;
      Err::<(), _>(CoreError::Validation("abort".into()).into())
    })
    .await
    .unwrap_err();
  assert_kind(&err, ErrorKind::Validation);

  assert!(s.list_suppliers().await.unwrap().is_empty());
}

#[tokio::test]
async fn database_failure_mid_transaction_rolls_back() {
  let s = store().await;
  let id = acme(&s).await.supplier_id;
  let a = s.add_detail(&admin(), id, phone("1")).await.unwrap();
  let b = s.add_detail(&admin(), id, phone("2")).await.unwrap();
  s.set_primary(&admin(), a.id).await.unwrap();
  let before = s.get_full(id).await.unwrap().unwrap();

  let raw_b = b.id.get();
  let err = s
    .write(move |conn| {
      suppliers::insert(
        conn,
        &SupplierFields::new("2", "Half Written"),
        chrono::Utc::now(),
      )?;
      suppliers::touch(conn, id, chrono::Utc::now())?;
      // Second primary for the same supplier: the unique index refuses it.
      conn.execute(
        "UPDATE SupplierContactNumbers SET IsPrimary = 1 WHERE ContactNumberID = ?1",
        [raw_b],
      )?;
      Ok(())
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Sqlite(_)));
  assert_kind(&err, ErrorKind::Persistence);

  let listed = s.list_suppliers().await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(s.get_full(id).await.unwrap().unwrap(), before);
}

#[tokio::test]
async fn storage_rejects_a_second_primary() {
  let s = store().await;
  let id = acme(&s).await.supplier_id;
  let a = s.add_detail(&admin(), id, phone("1")).await.unwrap();
  let b = s.add_detail(&admin(), id, phone("2")).await.unwrap();
  s.set_primary(&admin(), a.id).await.unwrap();

  let raw_b = b.id.get();
  let outcome = s
    .conn
    .call(move |conn| {
      Ok(conn.execute(
        "UPDATE SupplierContactNumbers SET IsPrimary = 1 WHERE ContactNumberID = ?1",
        [raw_b],
      ))
    })
    .await
    .unwrap();
  assert!(outcome.is_err());
}

fn table_columns(conn: &rusqlite::Connection, table: &str) -> Vec<String> {
  let mut stmt = conn
    .prepare(&format!("PRAGMA table_info({table})"))
    .unwrap();
  stmt
    .query_map([], |row| row.get::<_, String>(1))
    .unwrap()
    .collect::<rusqlite::Result<Vec<_>>>()
    .unwrap()
}

#[tokio::test]
async fn schema_matches_detail_contracts() {
  let s = store().await;
  let schemas = [
    AddressValue::SCHEMA,
    PhoneValue::SCHEMA,
    EmailValue::SCHEMA,
    ContactPersonValue::SCHEMA,
  ];

  for schema in schemas {
    let columns = s
      .conn
      .call(move |conn| Ok(table_columns(conn, schema.table)))
      .await
      .unwrap();
    for expected in schema
      .columns
      .iter()
      .chain(&[schema.id_column, "SupplierID", "IsPrimary"])
    {
      assert!(
        columns.iter().any(|c| c == expected),
        "{} is missing column {expected}",
        schema.table
      );
    }
  }
}
