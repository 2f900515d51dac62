//! JSON REST API for Registro.
//!
//! Exposes an axum [`Router`] backed by any [`registro_core::store::GradeStore`].
//! CORS, tracing and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", registro_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod grades;
pub mod health;

use std::sync::Arc;

use axum::{Json, Router, routing::get};
use registro_core::store::GradeStore;
use serde::Serialize;

pub use error::{ApiError, route_not_found};

/// Success envelope: `{"success": true, "data": ...}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
  pub success: bool,
  pub data:    T,
}

pub(crate) fn ok<T>(data: T) -> Json<Envelope<T>> {
  Json(Envelope { success: true, data })
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: GradeStore + 'static,
{
  Router::new()
    .route("/grades", get(grades::list::<S>).post(grades::create::<S>))
    .route("/grades/{id}", get(grades::get_one::<S>).put(grades::update::<S>))
    .route("/health", get(health::health::<S>))
    .route("/ready", get(health::ready::<S>))
    .fallback(route_not_found)
    .with_state(store)
}

// ─── Integration tests ────────────────────────────────────────────────────────
