//! HTTP server assembly for Registro.
//!
//! Loads [`ServerConfig`], opens the SQLite store, and mounts the JSON API
//! under `/api` behind CORS, request tracing and panic recovery.

use std::{
  any::Any,
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{
  Json, Router,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use registro_core::store::GradeStore;
use registro_store_sqlite::SqliteStore;
use serde::Deserialize;
use serde_json::json;
use tower_http::{
  catch_panic::CatchPanicLayer,
  cors::{self, CorsLayer},
  trace::TraceLayer,
};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Environment variables with this prefix override file settings, e.g.
/// `REGISTRO_PORT=8080`.
pub const ENV_PREFIX: &str = "REGISTRO";

/// Stands in for `database_path` to select a throwaway in-memory store.
pub const IN_MEMORY: &str = ":memory:";

/// Runtime server configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:          String,
  pub port:          u16,
  pub database_path: PathBuf,
  /// Number of pooled SQLite connections (file-backed stores only).
  pub pool_size:     usize,
}

impl ServerConfig {
  /// Layer built-in defaults, the optional TOML file at `path`, and
  /// `REGISTRO_*` environment variables, in increasing precedence.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .set_default("host", "0.0.0.0")?
      .set_default("port", 5000_i64)?
      .set_default("database_path", "registro.db")?
      .set_default("pool_size", 4_i64)?
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Open the store named by `cfg`, creating the schema if needed.
pub async fn open_store(
  cfg: &ServerConfig,
) -> registro_store_sqlite::Result<SqliteStore> {
  if cfg.database_path == Path::new(IN_MEMORY) {
    tracing::warn!("using an in-memory store; data is lost on exit");
    return SqliteStore::open_in_memory().await;
  }
  let path = expand_tilde(&cfg.database_path);
  SqliteStore::open(&path, cfg.pool_size).await
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

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application: the API under `/api` (CORS open to any
/// origin), a JSON 404 for everything else, request tracing, and a JSON 500
/// for handler panics.
pub fn app<S>(store: Arc<S>) -> Router
where
  S: GradeStore + 'static,
{
  let api = registro_api::api_router(store).layer(
    CorsLayer::new()
      .allow_origin(cors::Any)
      .allow_methods(cors::Any)
      .allow_headers(cors::Any),
  );

  harden(
    Router::new()
      .nest("/api", api)
      .fallback(registro_api::route_not_found),
  )
}

fn harden(router: Router) -> Router {
  router
    .layer(CatchPanicLayer::custom(panic_response))
    .layer(TraceLayer::new_for_http())
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
  let detail = err
    .downcast_ref::<String>()
    .map(String::as_str)
    .or_else(|| err.downcast_ref::<&str>().copied())
    .unwrap_or("unknown panic");
  tracing::error!(panic = detail, "handler panicked");

  (
    StatusCode::INTERNAL_SERVER_ERROR,
    Json(json!({ "success": false, "error": "internal server error" })),
  )
    .into_response()
}

/// Resolve on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      tracing::error!(error = %e, "failed to listen for Ctrl+C");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
      Ok(mut sig) => {
        sig.recv().await;
      }
      Err(e) => {
        tracing::error!(error = %e, "failed to listen for SIGTERM");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
    _ = terminate => tracing::info!("received SIGTERM, shutting down"),
  }
}

// ─── Integration tests ────────────────────────────────────────────────────────
