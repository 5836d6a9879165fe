//! Administrative front end for a Purveyor supplier directory.
//!
//! The binary in `main.rs` only parses arguments and prints; everything it
//! does against the store lives here so it can be exercised in tests.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use purveyor_core::{
  session::{Role, Session, UserId},
  store::SupplierStore,
  supplier::{Supplier, SupplierId, SupplierView},
};
use purveyor_store_sqlite::SqliteStore;
use serde::Deserialize;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime configuration, deserialised from `purveyor.toml` and `PURVEYOR_*`
/// environment variables.
#[derive(Deserialize, Clone, Debug)]
pub struct CliConfig {
  pub store_path: PathBuf,
}

impl CliConfig {
  /// Layer the optional TOML file at `path` under the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("PURVEYOR"))
      .build()
      .context("failed to read config file")?;

    let mut cfg: Self = settings
      .try_deserialize()
      .context("failed to deserialise CliConfig")?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    Ok(cfg)
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Commands ─────────────────────────────────────────────────────────────────

/// Parse a role name as typed on the command line.
pub fn parse_role(raw: &str) -> anyhow::Result<Role> {
  match raw.trim().to_ascii_lowercase().as_str() {
    "admin" | "administrator" => Ok(Role::Administrator),
    "staff" => Ok(Role::Staff),
    other => anyhow::bail!("unknown role {other:?} (expected admin or staff)"),
  }
}

/// Create the first administrator of an empty store.
pub async fn bootstrap(
  store: &SqliteStore,
  username: &str,
  password: &str,
) -> anyhow::Result<UserId> {
  store
    .bootstrap_admin(username, password)
    .await
    .with_context(|| format!("failed to create administrator {username:?}"))
}

pub async fn login<S>(store: &S, username: &str, password: &str) -> anyhow::Result<Session>
where
  S: SupplierStore,
{
  store
    .authenticate(username, password)
    .await
    .with_context(|| format!("failed to log in as {username:?}"))
}

pub async fn add_user<S>(
  store: &S,
  session: &Session,
  username: &str,
  password: &str,
  role: Role,
) -> anyhow::Result<UserId>
where
  S: SupplierStore,
{
  store
    .add_user(session, username, password, role)
    .await
    .with_context(|| format!("failed to add user {username:?}"))
}

/// The whole directory, or the subset matching `term`.
pub async fn directory<S>(store: &S, term: Option<&str>) -> anyhow::Result<Vec<Supplier>>
where
  S: SupplierStore,
{
  let found = match term {
    Some(term) => store.search_suppliers(term).await,
    None => store.list_suppliers().await,
  };
  found.context("failed to query the directory")
}

pub async fn show<S>(store: &S, id: i64) -> anyhow::Result<SupplierView>
where
  S: SupplierStore,
{
  store
    .get_full(SupplierId(id))
    .await
    .with_context(|| format!("failed to load supplier {id}"))?
    .with_context(|| format!("supplier {id} does not exist"))
}
