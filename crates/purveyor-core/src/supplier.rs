//! Supplier, the master record that owns the four detail collections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  detail::{AddressValue, ContactPersonValue, DetailRecord, EmailValue, PhoneValue},
};

/// Primary key of a row in the `Suppliers` table. Assigned by the store.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SupplierId(pub i64);

impl std::fmt::Display for SupplierId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Activation status. Used by suppliers, contact persons and user accounts;
/// persisted verbatim in the `Status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Status {
  #[default]
  Active,
  Inactive,
}

impl Status {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Active => "Active",
      Self::Inactive => "Inactive",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "Active" => Ok(Self::Active),
      "Inactive" => Ok(Self::Inactive),
      other => Err(Error::Decode {
        column: "Status",
        reason: format!("unknown status {other:?}"),
      }),
    }
  }

  /// The other state of the binary lifecycle.
  pub fn toggled(self) -> Self {
    match self {
      Self::Active => Self::Inactive,
      Self::Inactive => Self::Active,
    }
  }
}

impl std::fmt::Display for Status {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Supplier ────────────────────────────────────────────────────────────────

/// One row of the `Suppliers` table. Also serves as the directory summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
  pub supplier_id:  SupplierId,
  pub tin:          String,
  pub company_name: String,
  pub status:       Status,
  /// Server-assigned; never changes after creation.
  pub date_created: DateTime<Utc>,
  /// Refreshed by every mutation of the supplier or any of its details.
  pub date_updated: DateTime<Utc>,
  /// Incremented in the same transaction as `date_updated`.
  pub version:      i64,
}

/// Editable basic fields, input to create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierFields {
  pub tin:          String,
  pub company_name: String,
}

impl SupplierFields {
  pub fn new(tin: impl Into<String>, company_name: impl Into<String>) -> Self {
    Self { tin: tin.into(), company_name: company_name.into() }
  }

  /// Trim both fields and reject blanks.
  pub fn normalized(self) -> Result<Self> {
    let tin = self.tin.trim().to_owned();
    let company_name = self.company_name.trim().to_owned();
    if tin.is_empty() {
      return Err(Error::Validation("TIN must not be empty".into()));
    }
    if company_name.is_empty() {
      return Err(Error::Validation("company name must not be empty".into()));
    }
    Ok(Self { tin, company_name })
  }
}

// ─── Materialised view ───────────────────────────────────────────────────────

/// A supplier with all four detail collections, read as one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierView {
  pub supplier:        Supplier,
  pub addresses:       Vec<DetailRecord<AddressValue>>,
  pub phones:          Vec<DetailRecord<PhoneValue>>,
  pub emails:          Vec<DetailRecord<EmailValue>>,
  pub contact_persons: Vec<DetailRecord<ContactPersonValue>>,
}
