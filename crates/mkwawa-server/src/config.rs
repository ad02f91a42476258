//! Server configuration: `config.toml` layered with `MKWAWA_*` environment
//! variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use mkwawa_api::Operator;
use mkwawa_core::notification::DEFAULT_ACCOUNT_REQUEST_URL;
use serde::Deserialize;

// ─── Configuration ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                String,
  #[serde(default = "default_port")]
  pub port:                u16,
  pub database_path:       PathBuf,
  /// Root directory for uploaded certificates, passports, photos and
  /// receipts.
  pub media_root:          PathBuf,
  #[serde(default = "default_account_request_url")]
  pub account_request_url: String,
  #[serde(default)]
  pub sms:                 SmsConfig,
  #[serde(default)]
  pub elevation:           ElevationConfig,
  #[serde(default)]
  pub operators:           Vec<Operator>,
}

/// NextSMS credentials. Messages are skipped while either credential is
/// empty.
#[derive(Debug, Deserialize, Clone)]
pub struct SmsConfig {
  #[serde(default = "default_sms_base_url")]
  pub base_url:  String,
  #[serde(default)]
  pub username:  String,
  #[serde(default)]
  pub password:  String,
  #[serde(default = "default_sender_id")]
  pub sender_id: String,
}

impl Default for SmsConfig {
  fn default() -> Self {
    Self {
      base_url:  default_sms_base_url(),
      username:  String::new(),
      password:  String::new(),
      sender_id: default_sender_id(),
    }
  }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ElevationConfig {
  #[serde(default = "default_elevation_base_url")]
  pub base_url: String,
}

impl Default for ElevationConfig {
  fn default() -> Self { Self { base_url: default_elevation_base_url() } }
}

fn default_host() -> String { "127.0.0.1".into() }

fn default_port() -> u16 { 8000 }

fn default_account_request_url() -> String { DEFAULT_ACCOUNT_REQUEST_URL.into() }

fn default_sms_base_url() -> String { "https://messaging-service.co.tz".into() }

fn default_sender_id() -> String { "KIZITA SOFT".into() }

fn default_elevation_base_url() -> String { "https://api.open-elevation.com".into() }

// ─── Loading ──────────────────────────────────────────────────────────────────

impl ServerConfig {
  /// Read `path` (optional) and the environment. Nested keys use a double
  /// underscore, e.g. `MKWAWA_SMS__PASSWORD`.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = ::config::Config::builder()
      .add_source(::config::File::from(path).required(false))
      .add_source(
        ::config::Environment::with_prefix("MKWAWA")
          .prefix_separator("_")
          .separator("__"),
      )
      .build()
      .context("failed to read config file")?;

    let mut cfg: ServerConfig = settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")?;
    cfg.database_path = expand_tilde(&cfg.database_path);
    cfg.media_root = expand_tilde(&cfg.media_root);
    Ok(cfg)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
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

#[cfg(test)]
mod tests {
  use mkwawa_core::auth::Role;

  use super::*;

  fn write_config(contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("mkwawa-{}.toml", uuid::Uuid::new_v4()));
    std::fs::write(&path, contents).unwrap();
    path
  }

  #[test]
  fn minimal_file_fills_defaults() {
    let path = write_config(
      r#"
        database_path = "/var/lib/mkwawa/parish.db"
        media_root    = "/var/lib/mkwawa/media"
      "#,
    );
    let cfg = ServerConfig::load(&path).unwrap();
    assert_eq!(cfg.address(), "127.0.0.1:8000");
    assert_eq!(cfg.account_request_url, DEFAULT_ACCOUNT_REQUEST_URL);
    assert_eq!(cfg.sms.base_url, "https://messaging-service.co.tz");
    assert!(cfg.sms.username.is_empty());
    assert_eq!(cfg.elevation.base_url, "https://api.open-elevation.com");
    assert!(cfg.operators.is_empty());
    std::fs::remove_file(path).ok();
  }

  #[test]
  fn operators_and_sections_are_read() {
    let path = write_config(
      r#"
        port          = 9000
        database_path = "parish.db"
        media_root    = "media"

        [sms]
        username  = "parish"
        password  = "secret"
        sender_id = "KKKT"

        [[operators]]
        username      = "hazina"
        password_hash = "$argon2id$v=19$stub"
        role          = "ParishTreasurer"
      "#,
    );
    let cfg = ServerConfig::load(&path).unwrap();
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.sms.sender_id, "KKKT");
    assert_eq!(cfg.operators.len(), 1);
    assert_eq!(cfg.operators[0].role, Role::ParishTreasurer);
    std::fs::remove_file(path).ok();
  }

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(expand_tilde(Path::new("~/media")), PathBuf::from(home).join("media"));
    assert_eq!(expand_tilde(Path::new("/srv/media")), PathBuf::from("/srv/media"));
  }
}
