//! The `GradeStore` trait.
//!
//! Implemented by storage backends (e.g. `registro-store-sqlite`). The HTTP
//! layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  grade::{CreatedGrade, GradePatch, GradeRecord, NewGrade},
  student::Student,
};

/// Abstraction over a grade book backend.
///
/// Every mutating method either commits in full or leaves the store
/// untouched. All methods return `Send` futures so the trait can be used
/// behind `axum` on a multi-threaded runtime.
pub trait GradeStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Grades ────────────────────────────────────────────────────────────

  /// All grades joined with their student, most recent `grade_date` first;
  /// ties go to the most recently recorded grade.
  fn list_grades(
    &self,
  ) -> impl Future<Output = Result<Vec<GradeRecord>, Self::Error>> + Send + '_;

  /// A single joined grade. Returns `None` if not found.
  fn get_grade(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<GradeRecord>, Self::Error>> + Send + '_;

  fn grade_exists(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Record a grade, creating the named student first if no student with
  /// that exact name exists. Both writes share one transaction.
  fn record_grade(
    &self,
    input: NewGrade,
  ) -> impl Future<Output = Result<CreatedGrade, Self::Error>> + Send + '_;

  /// Apply `patch` to grade `id`. Returns the number of rows changed (0 if
  /// the grade does not exist).
  fn update_grade(
    &self,
    id: i64,
    patch: GradePatch,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Students ──────────────────────────────────────────────────────────

  /// Look a student up by exact name.
  fn find_student<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Student>, Self::Error>> + Send + 'a;

  /// Delete a student and, by cascade, all of their grades. Returns the
  /// number of student rows removed.
  fn delete_student(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Liveness ──────────────────────────────────────────────────────────

  /// Round-trip a trivial statement to prove the backend is reachable.
  fn ping(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
