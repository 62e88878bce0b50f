//! charter-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves the charter workflow API over HTTP.
//!
//! Settings can also arrive through the environment with a `CHARTER`
//! prefix, e.g. `CHARTER_PORT=8080`.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use axum::Router;
use charter_core::provision::{AcademicTerm, FixedTerm, NoActiveTerm, TermSource};
use charter_store_sqlite::SqliteStore;
use clap::Parser;
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(author, version, about = "Club charter workflow server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

/// Top-level server configuration, deserialised from TOML and environment.
#[derive(Debug, Clone, Deserialize)]
struct ServerConfig {
  #[serde(default = "default_host")]
  host: String,
  #[serde(default = "default_port")]
  port: u16,
  #[serde(default = "default_store_path")]
  store_path: PathBuf,
  /// The currently active academic term. Approvals fail with a
  /// configuration fault while this is unset.
  active_term: Option<TermConfig>,
}

#[derive(Debug, Clone, Deserialize)]
struct TermConfig {
  term_id: Uuid,
  name:    String,
}

fn default_host() -> String {
  "127.0.0.1".to_string()
}

fn default_port() -> u16 {
  8080
}

fn default_store_path() -> PathBuf {
  PathBuf::from("charter.db")
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

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("CHARTER"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let terms: Arc<dyn TermSource> = match &server_cfg.active_term {
    Some(term) => {
      tracing::info!(term = %term.name, "active academic term configured");
      Arc::new(FixedTerm(AcademicTerm {
        term_id: term.term_id,
        name:    term.name.clone(),
      }))
    }
    None => {
      tracing::warn!(
        "no active academic term configured; approvals will be refused"
      );
      Arc::new(NoActiveTerm)
    }
  };

  // Open SQLite store.
  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path, terms)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let app = Router::new()
    .nest("/api", charter_api::api_router(Arc::new(store)))
    .layer(TraceLayer::new_for_http());

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
