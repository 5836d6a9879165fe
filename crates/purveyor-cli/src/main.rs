//! `purveyor` — administration for a Purveyor supplier directory.
//!
//! Reads `purveyor.toml` (or the path given with `--config`), layered under
//! `PURVEYOR_*` environment variables, and opens the SQLite store it names.
//!
//! # Usage
//!
//! ```
//! purveyor hash-password
//! purveyor bootstrap root
//! purveyor add-user alice --role staff --as root
//! purveyor list
//! purveyor search acme
//! purveyor show 42
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use purveyor_cli::CliConfig;
use purveyor_core::credential;
use purveyor_store_sqlite::SqliteStore;
use serde::Serialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "purveyor", version, about = "Purveyor supplier directory admin")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "purveyor.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Print the argon2 hash for a password entered on stdin.
  HashPassword,

  /// Create the first administrator of an empty store; the password is
  /// read from stdin.
  Bootstrap { username: String },

  /// Create a login account as an existing administrator. Both passwords
  /// are read from stdin, the administrator's first.
  AddUser {
    username: String,
    /// `admin` or `staff`.
    #[arg(long, default_value = "staff")]
    role:     String,
    /// Administrator to act as.
    #[arg(long = "as", value_name = "ADMIN")]
    admin:    String,
  },

  /// Print every supplier, ordered by company name.
  List,

  /// Print suppliers whose company name or TIN contains TERM.
  Search { term: String },

  /// Print one supplier with all of its details.
  Show { id: i64 },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  match cli.command {
    Command::HashPassword => {
      let password = read_password("Password")?;
      println!("{}", credential::hash_password(&password)?);
    }
    Command::Bootstrap { username } => {
      let store = open_store(&cli.config).await?;
      let password = read_password("Password")?;
      println!("{}", purveyor_cli::bootstrap(&store, &username, &password).await?);
    }
    Command::AddUser { username, role, admin } => {
      let role = purveyor_cli::parse_role(&role)?;
      let store = open_store(&cli.config).await?;
      let session =
        purveyor_cli::login(&store, &admin, &read_password("Administrator password")?)
          .await?;
      let password = read_password("Password")?;
      let user_id =
        purveyor_cli::add_user(&store, &session, &username, &password, role).await?;
      println!("{user_id}");
    }
    Command::List => {
      let store = open_store(&cli.config).await?;
      print_json(&purveyor_cli::directory(&store, None).await?)?;
    }
    Command::Search { term } => {
      let store = open_store(&cli.config).await?;
      print_json(&purveyor_cli::directory(&store, Some(&term)).await?)?;
    }
    Command::Show { id } => {
      let store = open_store(&cli.config).await?;
      print_json(&purveyor_cli::show(&store, id).await?)?;
    }
  }

  Ok(())
}

async fn open_store(config: &Path) -> anyhow::Result<SqliteStore> {
  let cfg = CliConfig::load(config)?;
  let store = SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;
  tracing::debug!(path = ?cfg.store_path, "store opened");
  Ok(store)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
  let out = serde_json::to_string_pretty(value).context("failed to encode output")?;
  println!("{out}");
  Ok(())
}

/// Read a password from stdin.
fn read_password(prompt: &str) -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  eprint!("{prompt}: ");
  io::stderr().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}
