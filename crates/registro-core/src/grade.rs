//! Grade types: what the service reads back, what it writes, and the
//! structured patch used for partial updates.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Lowest admissible grade (inclusive).
pub const MIN_GRADE: u8 = 0;
/// Highest admissible grade (inclusive).
pub const MAX_GRADE: u8 = 10;
/// Longest subject name the store accepts.
pub const MAX_SUBJECT_LEN: usize = 50;

// ─── Read model ──────────────────────────────────────────────────────────────

/// A grade joined with its student: the projection returned by list, fetch
/// and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeRecord {
  pub id:           i64,
  pub student_id:   i64,
  /// The student's name, exposed as `name` on the wire.
  #[serde(rename = "name")]
  pub student_name: String,
  pub subject:      String,
  pub grade:        u8,
  pub grade_date:   NaiveDate,
  pub created_at:   DateTime<Utc>,
}

/// The record returned by a successful create. The student name is echoed
/// from the request rather than read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedGrade {
  pub id:           i64,
  pub student_id:   i64,
  pub student_name: String,
  pub subject:      String,
  pub grade:        u8,
  pub grade_date:   NaiveDate,
  pub created_at:   DateTime<Utc>,
}

// ─── Write model ─────────────────────────────────────────────────────────────

/// Input to [`crate::store::GradeStore::record_grade`]. Already validated and
/// trimmed; `created_at` is always set by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGrade {
  pub student_name: String,
  pub subject:      String,
  pub grade:        u8,
  pub grade_date:   NaiveDate,
}

/// A partial update: `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GradePatch {
  pub subject:    Option<String>,
  pub grade:      Option<u8>,
  pub grade_date: Option<NaiveDate>,
}

impl GradePatch {
  pub fn is_empty(&self) -> bool {
    self.subject.is_none() && self.grade.is_none() && self.grade_date.is_none()
  }
}
