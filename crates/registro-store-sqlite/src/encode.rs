//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings (microsecond
//! precision, `Z` suffix) so that lexical order is chronological order.
//! Calendar dates are stored as `YYYY-MM-DD`.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use registro_core::{grade::GradeRecord, student::Student};
use rusqlite::Row;

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

/// A `students` row as read from SQLite, before timestamp decoding.
pub struct RawStudent {
  pub id:         i64,
  pub name:       String,
  pub created_at: String,
}

impl RawStudent {
  /// Column order: `id, name, created_at`.
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      name:       row.get(1)?,
      created_at: row.get(2)?,
    })
  }

  pub fn into_student(self) -> Result<Student> {
    Ok(Student {
      id:         self.id,
      name:       self.name,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// A joined grade row as read from SQLite.
pub struct RawGradeRecord {
  pub id:           i64,
  pub student_id:   i64,
  pub student_name: String,
  pub subject:      String,
  pub grade:        u8,
  pub grade_date:   String,
  pub created_at:   String,
}

impl RawGradeRecord {
  /// Column order: `id, student_id, name, subject, grade, grade_date,
  /// created_at`.
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      student_id:   row.get(1)?,
      student_name: row.get(2)?,
      subject:      row.get(3)?,
      grade:        row.get(4)?,
      grade_date:   row.get(5)?,
      created_at:   row.get(6)?,
    })
  }

  pub fn into_record(self) -> Result<GradeRecord> {
    Ok(GradeRecord {
      id:           self.id,
      student_id:   self.student_id,
      student_name: self.student_name,
      subject:      self.subject,
      grade:        self.grade,
      grade_date:   decode_date(&self.grade_date)?,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}
