//! statpub-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store, optionally loads a JSON fixture, and serves the API over HTTP.
//!
//! ```text
//! cargo run -p statpub-server -- --seed crates/statpub-server/fixtures/pupil-absence.json
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use statpub_server::{
  ServerConfig,
  seed::{self, Fixture},
  tables::Tables,
};
use statpub_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Statistics publishing content server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Load a JSON fixture into the store before serving. The store must be
  /// empty.
  #[arg(long)]
  seed: Option<PathBuf>,

  /// Exit after seeding instead of serving.
  #[arg(long, requires = "seed")]
  seed_only: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let server_cfg = ServerConfig::load(&cli.config)?;

  let store_path = server_cfg.resolved_store_path();
  if let Some(parent) = store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  tracing::info!(path = ?store_path, "store opened");

  if let Some(path) = &cli.seed {
    let fixture = Fixture::from_path(path)?;
    seed::apply(&store, fixture)
      .await
      .with_context(|| format!("failed to seed from {path:?}"))?;
    if cli.seed_only {
      return Ok(());
    }
  }

  let tables = Tables::from_config(
    server_cfg.table_builder_url.as_deref(),
    server_cfg.table_builder_timeout(),
  )
  .context("failed to build table-builder client")?;
  match &server_cfg.table_builder_url {
    Some(url) => tracing::info!(%url, "resolving data blocks via table builder"),
    None => tracing::warn!("no table_builder_url configured; data blocks will be unavailable"),
  }

  let app = statpub_api::api_router(Arc::new(store), Arc::new(tables));
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
