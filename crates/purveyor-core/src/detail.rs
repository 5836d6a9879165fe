//! Detail records: the contact-detail collections owned by a supplier.
//!
//! All four kinds share one shape ([`DetailRecord`]) and one engine; they
//! differ only in their payload type. Each payload implements
//! [`DetailPayload`], which carries the persisted table/column contract and
//! the kind's validation rules.

use std::{fmt, hash::Hash, marker::PhantomData};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result, supplier::{Status, SupplierId}};

// ─── Kind ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailKind {
  Address,
  Phone,
  Email,
  ContactPerson,
}

impl fmt::Display for DetailKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Address => "address",
      Self::Phone => "phone number",
      Self::Email => "email address",
      Self::ContactPerson => "contact person",
    })
  }
}

// ─── Typed id ────────────────────────────────────────────────────────────────

/// Primary key of a detail row, tagged with its payload type so that an
/// address id cannot be handed to a phone-number operation.
pub struct DetailId<P> {
  raw:   i64,
  _kind: PhantomData<fn() -> P>,
}

impl<P> DetailId<P> {
  pub const fn new(raw: i64) -> Self { Self { raw, _kind: PhantomData } }

  pub const fn get(self) -> i64 { self.raw }
}

impl<P> Clone for DetailId<P> {
  fn clone(&self) -> Self { *self }
}

impl<P> Copy for DetailId<P> {}

impl<P> PartialEq for DetailId<P> {
  fn eq(&self, other: &Self) -> bool { self.raw == other.raw }
}

impl<P> Eq for DetailId<P> {}

impl<P> PartialOrd for DetailId<P> {
  fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
    Some(self.cmp(other))
  }
}

impl<P> Ord for DetailId<P> {
  fn cmp(&self, other: &Self) -> std::cmp::Ordering { self.raw.cmp(&other.raw) }
}

impl<P> Hash for DetailId<P> {
  fn hash<H: std::hash::Hasher>(&self, state: &mut H) { self.raw.hash(state) }
}

impl<P> fmt::Debug for DetailId<P> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "DetailId({})", self.raw)
  }
}

impl<P> fmt::Display for DetailId<P> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.raw)
  }
}

impl<P> Serialize for DetailId<P> {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(self.raw)
  }
}

impl<'de, P> Deserialize<'de> for DetailId<P> {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    i64::deserialize(deserializer).map(Self::new)
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// One row of a detail table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRecord<P> {
  pub id:          DetailId<P>,
  /// Back-reference to the owning supplier.
  pub supplier_id: SupplierId,
  pub payload:     P,
  pub is_primary:  bool,
}

// ─── Payload contract ────────────────────────────────────────────────────────

/// The persisted layout of one detail kind. Column names are the
/// interoperability contract with existing data and must not change.
#[derive(Debug, Clone, Copy)]
pub struct DetailSchema {
  pub table:     &'static str,
  pub id_column: &'static str,
  /// Payload columns, in the order used by [`DetailPayload::to_columns`].
  pub columns:   &'static [&'static str],
}

/// Implemented by each of the four payload types.
///
/// Every payload column is text or NULL, so a row is exchanged with the
/// backend as a vector of optional strings in [`DetailSchema::columns`]
/// order.
pub trait DetailPayload:
  Clone + fmt::Debug + PartialEq + Send + Sync + 'static
{
  const KIND: DetailKind;
  const SCHEMA: DetailSchema;

  /// Reject payloads with missing required fields.
  fn validate(&self) -> Result<()>;

  /// Column values in schema order. Strings are trimmed; blank optional
  /// fields become `None`.
  fn to_columns(&self) -> Vec<Option<String>>;

  fn from_columns(columns: Vec<Option<String>>) -> Result<Self>;
}

/// Sequential reader over a row produced by the backend.
struct Columns {
  names:  std::slice::Iter<'static, &'static str>,
  values: std::vec::IntoIter<Option<String>>,
}

impl Columns {
  fn new(schema: &DetailSchema, values: Vec<Option<String>>) -> Self {
    Self { names: schema.columns.iter(), values: values.into_iter() }
  }

  fn optional(&mut self) -> Option<String> {
    self.names.next();
    self.values.next().flatten()
  }

  fn required(&mut self) -> Result<String> {
    let column = self.names.next().copied().unwrap_or("<extra>");
    self.values.next().flatten().ok_or(Error::Decode {
      column,
      reason: "unexpected NULL".into(),
    })
  }
}

fn text(s: &str) -> Option<String> { Some(s.trim().to_owned()) }

fn opt_text(s: &Option<String>) -> Option<String> {
  s.as_deref()
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::to_owned)
}

fn require(value: &str, what: &str) -> Result<()> {
  if value.trim().is_empty() {
    Err(Error::Validation(format!("{what} must not be empty")))
  } else {
    Ok(())
  }
}

/// `local@domain` with both halves non-empty and no whitespace.
fn is_email(s: &str) -> bool {
  let s = s.trim();
  match s.split_once('@') {
    Some((local, domain)) => {
      !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && !s.chars().any(char::is_whitespace)
    }
    None => false,
  }
}

// ─── Address ─────────────────────────────────────────────────────────────────

/// A postal address (`SupplierAddresses`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressValue {
  pub line1:             String,
  pub line2:             Option<String>,
  pub city_municipality: String,
  pub province:          String,
  pub postal_code:       Option<String>,
  /// Categorical tag, e.g. "Billing" or "Shipping".
  pub address_type:      String,
}

impl DetailPayload for AddressValue {
  const KIND: DetailKind = DetailKind::Address;
  const SCHEMA: DetailSchema = DetailSchema {
    table:     "SupplierAddresses",
    id_column: "AddressID",
    columns:   &[
      "AddressLine1",
      "AddressLine2",
      "CityMunicipality",
      "Province",
      "PostalCode",
      "AddressType",
    ],
  };

  fn validate(&self) -> Result<()> {
    require(&self.line1, "address line 1")?;
    require(&self.city_municipality, "city/municipality")?;
    require(&self.province, "province")?;
    require(&self.address_type, "address type")
  }

  fn to_columns(&self) -> Vec<Option<String>> {
    vec![
      text(&self.line1),
      opt_text(&self.line2),
      text(&self.city_municipality),
      text(&self.province),
      opt_text(&self.postal_code),
      text(&self.address_type),
    ]
  }

  fn from_columns(columns: Vec<Option<String>>) -> Result<Self> {
    let mut c = Columns::new(&Self::SCHEMA, columns);
    Ok(Self {
      line1:             c.required()?,
      line2:             c.optional(),
      city_municipality: c.required()?,
      province:          c.required()?,
      postal_code:       c.optional(),
      address_type:      c.required()?,
    })
  }
}

// ─── Phone ───────────────────────────────────────────────────────────────────

/// A contact number (`SupplierContactNumbers`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneValue {
  pub number:      String,
  /// e.g. "Mobile", "Landline", "Fax".
  pub number_type: String,
}

impl DetailPayload for PhoneValue {
  const KIND: DetailKind = DetailKind::Phone;
  const SCHEMA: DetailSchema = DetailSchema {
    table:     "SupplierContactNumbers",
    id_column: "ContactNumberID",
    columns:   &["ContactNumber", "NumberType"],
  };

  fn validate(&self) -> Result<()> {
    require(&self.number, "contact number")?;
    require(&self.number_type, "number type")
  }

  fn to_columns(&self) -> Vec<Option<String>> {
    vec![text(&self.number), text(&self.number_type)]
  }

  fn from_columns(columns: Vec<Option<String>>) -> Result<Self> {
    let mut c = Columns::new(&Self::SCHEMA, columns);
    Ok(Self { number: c.required()?, number_type: c.required()? })
  }
}

// ─── Email ───────────────────────────────────────────────────────────────────

/// An email address (`SupplierEmails`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailValue {
  pub email:      String,
  pub email_type: String,
}

impl DetailPayload for EmailValue {
  const KIND: DetailKind = DetailKind::Email;
  const SCHEMA: DetailSchema = DetailSchema {
    table:     "SupplierEmails",
    id_column: "EmailID",
    columns:   &["Email", "EmailType"],
  };

  fn validate(&self) -> Result<()> {
    require(&self.email, "email")?;
    if !is_email(&self.email) {
      return Err(Error::Validation(format!(
        "{:?} is not an email address",
        self.email
      )));
    }
    require(&self.email_type, "email type")
  }

  fn to_columns(&self) -> Vec<Option<String>> {
    vec![text(&self.email), text(&self.email_type)]
  }

  fn from_columns(columns: Vec<Option<String>>) -> Result<Self> {
    let mut c = Columns::new(&Self::SCHEMA, columns);
    Ok(Self { email: c.required()?, email_type: c.required()? })
  }
}

// ─── Contact person ──────────────────────────────────────────────────────────

/// A named contact at the supplier (`SupplierContactPersons`). Has no type
/// tag, but carries its own activation status independent of the supplier's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPersonValue {
  pub first_name:     String,
  pub last_name:      String,
  pub position:       Option<String>,
  pub email:          Option<String>,
  pub contact_number: Option<String>,
  pub status:         Status,
}

impl ContactPersonValue {
  /// An active contact with only the required fields set.
  pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
    Self {
      first_name:     first_name.into(),
      last_name:      last_name.into(),
      position:       None,
      email:          None,
      contact_number: None,
      status:         Status::Active,
    }
  }
}

impl DetailPayload for ContactPersonValue {
  const KIND: DetailKind = DetailKind::ContactPerson;
  const SCHEMA: DetailSchema = DetailSchema {
    table:     "SupplierContactPersons",
    id_column: "ContactPersonID",
    columns:   &[
      "FirstName",
      "LastName",
      "Position",
      "Email",
      "ContactNumber",
      "Status",
    ],
  };

  fn validate(&self) -> Result<()> {
    require(&self.first_name, "first name")?;
    require(&self.last_name, "last name")?;
    match opt_text(&self.email) {
      Some(email) if !is_email(&email) => Err(Error::Validation(format!(
        "{email:?} is not an email address"
      ))),
      _ => Ok(()),
    }
  }

  fn to_columns(&self) -> Vec<Option<String>> {
    vec![
      text(&self.first_name),
      text(&self.last_name),
      opt_text(&self.position),
      opt_text(&self.email),
      opt_text(&self.contact_number),
      Some(self.status.as_str().to_owned()),
    ]
  }

  fn from_columns(columns: Vec<Option<String>>) -> Result<Self> {
    let mut c = Columns::new(&Self::SCHEMA, columns);
    Ok(Self {
      first_name:     c.required()?,
      last_name:      c.required()?,
      position:       c.optional(),
      email:          c.optional(),
      contact_number: c.optional(),
      status:         Status::parse(&c.required()?)?,
    })
  }
}
