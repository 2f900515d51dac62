//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every failure leaves the service as `{"success": false, "error": "..."}`;
//! validation failures also carry the full `errors` list.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("validation failed: {}", .0.join("; "))]
  Validation(Vec<String>),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<registro_core::Error> for ApiError {
  fn from(e: registro_core::Error) -> Self {
    match e {
      registro_core::Error::Validation(errs) => Self::Validation(errs.messages()),
      other => Self::BadRequest(other.to_string()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, body) = match self {
      ApiError::NotFound(m) => {
        (StatusCode::NOT_FOUND, json!({ "success": false, "error": m }))
      }
      ApiError::BadRequest(m) => {
        (StatusCode::BAD_REQUEST, json!({ "success": false, "error": m }))
      }
      ApiError::Validation(errors) => (
        StatusCode::BAD_REQUEST,
        json!({ "success": false, "error": "validation failed", "errors": errors }),
      ),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store error");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          json!({ "success": false, "error": e.to_string() }),
        )
      }
    };
    (status, Json(body)).into_response()
  }
}

/// Fallback for paths that match no route.
pub async fn route_not_found() -> ApiError {
  ApiError::NotFound("endpoint not found".to_string())
}
