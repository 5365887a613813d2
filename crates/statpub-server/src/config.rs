//! Runtime configuration, read from `config.toml` plus `STATPUB_*`
//! environment overrides.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use serde::Deserialize;

/// Runtime server configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                       String,
  #[serde(default = "default_port")]
  pub port:                       u16,
  #[serde(default = "default_store_path")]
  pub store_path:                 PathBuf,
  /// Base URL of the table-building service. Data blocks report
  /// "unavailable" when unset.
  pub table_builder_url:          Option<String>,
  #[serde(default = "default_table_builder_timeout")]
  pub table_builder_timeout_secs: u64,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 5080 }

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/statpub/statpub.db") }

fn default_table_builder_timeout() -> u64 { 10 }

impl ServerConfig {
  /// Load from `path` (optional) and the environment. `STATPUB_PORT=8080`
  /// overrides `port`, and so on.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("STATPUB"))
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn table_builder_timeout(&self) -> Duration {
    Duration::from_secs(self.table_builder_timeout_secs)
  }

  /// The store path with a leading `~` expanded.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
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
