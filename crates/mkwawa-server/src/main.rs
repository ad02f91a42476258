//! Parish registry server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store, wires the NextSMS, Open-Elevation and local-disk collaborators,
//! and serves the JSON API under `/api`.
//!
//! # Password hash generation
//!
//! To generate the argon2 PHC string for an `[[operators]]` entry:
//!
//! ```text
//! cargo run -p mkwawa-server -- --hash-password
//! ```

mod config;
mod elevation;
mod files;
mod sms;

use std::path::PathBuf;

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use axum::Router;
use clap::Parser;
use mkwawa_api::{AppState, AuthConfig, api_router};
use mkwawa_core::{collab::Collaborators, parish::Parish};
use mkwawa_store_sqlite::SqliteStore;
use rand_core::OsRng;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{config::ServerConfig, elevation::OpenElevation, files::LocalFiles, sms::NextSms};

#[derive(Parser)]
#[command(author, version, about = "KKKT Mkwawa parish registry server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

/// The production collaborators.
struct ServerCollaborators {
  sms:       NextSms,
  elevation: OpenElevation,
  files:     LocalFiles,
}

impl Collaborators for ServerCollaborators {
  type Elevation = OpenElevation;
  type Files = LocalFiles;
  type Sms = NextSms;

  fn sms(&self) -> &NextSms { &self.sms }

  fn elevation(&self) -> &OpenElevation { &self.elevation }

  fn files(&self) -> &LocalFiles { &self.files }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Helper mode: hash a password and exit.
  if cli.hash_password {
    let password = read_password()?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
      .to_string();
    println!("{hash}");
    return Ok(());
  }

  let cfg = ServerConfig::load(&cli.config)?;

  if let Some(parent) = cfg.database_path.parent()
    && !parent.as_os_str().is_empty()
  {
    tokio::fs::create_dir_all(parent)
      .await
      .with_context(|| format!("failed to create {parent:?}"))?;
  }
  let store = SqliteStore::open(&cfg.database_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.database_path))?;

  let sms = NextSms::new(cfg.sms.clone()).context("failed to build SMS client")?;
  if !sms.is_configured() {
    tracing::warn!("SMS credentials missing; approval and notification texts will be skipped");
  }
  let collab = ServerCollaborators {
    sms,
    elevation: OpenElevation::new(cfg.elevation.clone())
      .context("failed to build elevation client")?,
    files: LocalFiles::new(&cfg.media_root),
  };

  if cfg.operators.is_empty() {
    tracing::warn!("no operators configured; only self-service signup is available");
  }
  let parish = Parish::new(store, collab).with_account_request_url(&cfg.account_request_url);
  let state = AppState::new(parish, AuthConfig { operators: cfg.operators.clone() });

  let app = Router::new().nest("/api", api_router(state));
  let address = cfg.address();

  tracing::info!(media_root = ?cfg.media_root, "Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_owned())
}
