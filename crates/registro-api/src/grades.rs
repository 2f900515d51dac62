//! Handlers for `/grades` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/grades` | Most recent `grade_date` first |
//! | `GET`  | `/grades/{id}` | 404 if not found |
//! | `POST` | `/grades` | Body: `student_name`, `subject`, `grade`, `grade_date`; returns 201 |
//! | `PUT`  | `/grades/{id}` | Body: any of `subject`, `grade`, `grade_date` |
//!
//! Bodies are taken as raw bytes so that a missing, malformed or oversized
//! body gets the same JSON error envelope as every other failure.

use std::sync::Arc;

use axum::{
  Json,
  body::Bytes,
  extract::{
    Path, State,
    rejection::{BytesRejection, PathRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use registro_core::{
  grade::{CreatedGrade, GradePatch, GradeRecord, NewGrade},
  request,
  store::GradeStore,
};
use tracing::info;

use crate::{Envelope, error::ApiError, ok};

/// Non-numeric ids match no grade, so they get the generic not-found reply.
fn grade_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
  path
    .map(|Path(id)| id)
    .map_err(|_| ApiError::NotFound("endpoint not found".to_string()))
}

/// A body that could not be read (e.g. over the size limit) is a bad request.
fn body_bytes(body: Result<Bytes, BytesRejection>) -> Result<Bytes, ApiError> {
  body.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

fn grade_not_found(id: i64) -> ApiError {
  ApiError::NotFound(format!("grade {id} not found"))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /grades`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Envelope<Vec<GradeRecord>>>, ApiError>
where
  S: GradeStore,
{
  let grades = store
    .list_grades()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(ok(grades))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /grades/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Envelope<GradeRecord>>, ApiError>
where
  S: GradeStore,
{
  let id = grade_id(path)?;
  let grade = store
    .get_grade(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| grade_not_found(id))?;
  Ok(ok(grade))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /grades`: returns 201 with the stored [`CreatedGrade`].
pub async fn create<S>(
  State(store): State<Arc<S>>,
  body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: GradeStore,
{
  let body = request::parse_body(&body_bytes(body)?)?;
  let input = NewGrade::from_body(&body)?;

  let created: CreatedGrade = store
    .record_grade(input)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  info!(
    grade_id = created.id,
    student_id = created.student_id,
    "grade recorded"
  );
  Ok((StatusCode::CREATED, ok(created)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /grades/{id}`: partial update; returns the re-read record.
///
/// A missing grade is reported as 404 before the fields are validated.
pub async fn update<S>(
  State(store): State<Arc<S>>,
  path: Result<Path<i64>, PathRejection>,
  body: Result<Bytes, BytesRejection>,
) -> Result<Json<Envelope<GradeRecord>>, ApiError>
where
  S: GradeStore,
{
  let id = grade_id(path)?;
  let body = request::parse_body(&body_bytes(body)?)?;

  let exists = store
    .grade_exists(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  if !exists {
    return Err(grade_not_found(id));
  }

  let patch = GradePatch::from_body(&body)?;
  store
    .update_grade(id, patch)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  info!(grade_id = id, "grade updated");

  let grade = store
    .get_grade(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| grade_not_found(id))?;
  Ok(ok(grade))
}
