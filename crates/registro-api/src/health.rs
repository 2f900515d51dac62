//! Liveness and readiness probes.
//!
//! `GET /health` always answers 200 with `status: "ok"` and reports the store
//! state alongside. `GET /ready` answers 503 while the store is unreachable.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use registro_core::store::GradeStore;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthBody {
  pub status:   &'static str,
  /// `"connected"` or `"error: <reason>"`.
  pub database: String,
}

#[derive(Debug, Serialize)]
pub struct ReadyBody {
  pub status:   &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub database: Option<String>,
}

/// `GET /health`
pub async fn health<S>(State(store): State<Arc<S>>) -> Json<HealthBody>
where
  S: GradeStore,
{
  let database = match store.ping().await {
    Ok(()) => "connected".to_string(),
    Err(e) => {
      tracing::warn!(error = %e, "health check: store unreachable");
      format!("error: {e}")
    }
  };
  Json(HealthBody { status: "ok", database })
}

/// `GET /ready`
pub async fn ready<S>(State(store): State<Arc<S>>) -> (StatusCode, Json<ReadyBody>)
where
  S: GradeStore,
{
  match store.ping().await {
    Ok(()) => (
      StatusCode::OK,
      Json(ReadyBody { status: "ready", database: None }),
    ),
    Err(e) => (
      StatusCode::SERVICE_UNAVAILABLE,
      Json(ReadyBody {
        status:   "unavailable",
        database: Some(format!("error: {e}")),
      }),
    ),
  }
}
