//! patron-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered with
//! `PATRON_*` environment variables, opens the SQLite store, and serves the
//! engagement API over HTTP. The `contact` stanza accepts the canonical
//! configuration shape or either legacy serialization.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use patron_server::{ServerConfig, app};
use patron_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Patron customer-engagement server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
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

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("PATRON"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let contact = server_cfg
    .contact
    .clone()
    .into_config()
    .context("invalid contact configuration")?;

  // Open the SQLite store.
  let store = SqliteStore::open(&server_cfg.store_path)
    .await
    .with_context(|| {
      format!("failed to open store at {:?}", server_cfg.store_path)
    })?;

  let router = app(Arc::new(store), contact, server_cfg.reviews.clone());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, router).await.context("server error")?;

  Ok(())
}
