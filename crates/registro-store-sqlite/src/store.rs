//! [`SqliteStore`], the SQLite implementation of [`GradeStore`].

use std::path::Path;

use chrono::{SubsecRound as _, Utc};
use rusqlite::{OptionalExtension as _, types::Value};
use tracing::debug;

use registro_core::{
  grade::{CreatedGrade, GradePatch, GradeRecord, NewGrade},
  store::GradeStore,
  student::Student,
};

use crate::{
  Result,
  encode::{RawGradeRecord, RawStudent, encode_date, encode_dt},
  gateway::Gateway,
};

// ─── Statements ──────────────────────────────────────────────────────────────

const LIST_GRADES: &str = "
SELECT g.id, g.student_id, s.name, g.subject, g.grade, g.grade_date, g.created_at
FROM grades g
INNER JOIN students s ON g.student_id = s.id
ORDER BY g.grade_date DESC, g.created_at DESC, g.id DESC";

const GET_GRADE: &str = "
SELECT g.id, g.student_id, s.name, g.subject, g.grade, g.grade_date, g.created_at
FROM grades g
INNER JOIN students s ON g.student_id = s.id
WHERE g.id = ?1";

const GRADE_EXISTS: &str = "SELECT 1 FROM grades WHERE id = ?1";

const FIND_STUDENT: &str = "SELECT id, name, created_at FROM students WHERE name = ?1";

const INSERT_STUDENT: &str = "INSERT INTO students (name, created_at) VALUES (?1, ?2)";

const INSERT_GRADE: &str = "
INSERT INTO grades (student_id, subject, grade, grade_date, created_at)
VALUES (?1, ?2, ?3, ?4, ?5)";

/// A `NULL` parameter leaves its column as it was.
const UPDATE_GRADE: &str = "
UPDATE grades
SET subject    = COALESCE(?1, subject),
    grade      = COALESCE(?2, grade),
    grade_date = COALESCE(?3, grade_date)
WHERE id = ?4";

const DELETE_STUDENT: &str = "DELETE FROM students WHERE id = ?1";

/// `None` binds as SQL `NULL`.
fn nullable<T: Into<Value>>(value: Option<T>) -> Value {
  value.map_or(Value::Null, Into::into)
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A grade book backed by SQLite.
///
/// Cloning is cheap; the gateway's pool is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  gateway: Gateway,
}

impl SqliteStore {
  /// Open (or create) a store at `path` with `pool_size` connections and run
  /// schema initialisation.
  pub async fn open(path: impl AsRef<Path>, pool_size: usize) -> Result<Self> {
    Self::with_gateway(Gateway::open(path, pool_size).await?).await
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    Self::with_gateway(Gateway::open_in_memory().await?).await
  }

  async fn with_gateway(gateway: Gateway) -> Result<Self> {
    gateway.ensure_schema().await?;
    Ok(Self { gateway })
  }

  /// The underlying gateway, for statements the trait does not cover.
  pub fn gateway(&self) -> &Gateway { &self.gateway }
}

// ─── GradeStore impl ─────────────────────────────────────────────────────────

impl GradeStore for SqliteStore {
  type Error = crate::Error;

  // ── Grades ────────────────────────────────────────────────────────────────

  async fn list_grades(&self) -> Result<Vec<GradeRecord>> {
    self
      .gateway
      .query(LIST_GRADES, Vec::new(), RawGradeRecord::from_row)
      .await?
      .into_iter()
      .map(RawGradeRecord::into_record)
      .collect()
  }

  async fn get_grade(&self, id: i64) -> Result<Option<GradeRecord>> {
    self
      .gateway
      .query(GET_GRADE, vec![Value::Integer(id)], RawGradeRecord::from_row)
      .await?
      .into_iter()
      .next()
      .map(RawGradeRecord::into_record)
      .transpose()
  }

  async fn grade_exists(&self, id: i64) -> Result<bool> {
    let rows = self
      .gateway
      .query(GRADE_EXISTS, vec![Value::Integer(id)], |_| Ok(()))
      .await?;
    Ok(!rows.is_empty())
  }

  async fn record_grade(&self, input: NewGrade) -> Result<CreatedGrade> {
    // Truncated to the stored precision so the echoed record matches a read.
    let created_at = Utc::now().trunc_subsecs(6);
    let at_str     = encode_dt(created_at);
    let date_str   = encode_date(input.grade_date);
    let name       = input.student_name.clone();
    let subject    = input.subject.clone();
    let grade      = input.grade;

    // Lookup-or-create and the grade insert share one immediate transaction,
    // so concurrent creates for the same unseen name serialise on the write
    // lock and reuse a single student row.
    let (id, student_id) = self
      .gateway
      .transaction(move |tx| {
        let existing: Option<i64> = tx
          .query_row(FIND_STUDENT, rusqlite::params![name], |r| r.get(0))
          .optional()?;

        let student_id = match existing {
          Some(id) => id,
          None => {
            tx.execute(INSERT_STUDENT, rusqlite::params![name, at_str])?;
            let id = tx.last_insert_rowid();
            debug!(student_id = id, name = %name, "created student");
            id
          }
        };

        tx.execute(
          INSERT_GRADE,
          rusqlite::params![student_id, subject, grade, date_str, at_str],
        )?;
        Ok((tx.last_insert_rowid(), student_id))
      })
      .await?;

    Ok(CreatedGrade {
      id,
      student_id,
      student_name: input.student_name,
      subject:      input.subject,
      grade:        input.grade,
      grade_date:   input.grade_date,
      created_at,
    })
  }

  async fn update_grade(&self, id: i64, patch: GradePatch) -> Result<usize> {
    let params = vec![
      nullable(patch.subject),
      nullable(patch.grade.map(i64::from)),
      nullable(patch.grade_date.map(encode_date)),
      Value::Integer(id),
    ];
    self.gateway.update(UPDATE_GRADE, params).await
  }

  // ── Students ──────────────────────────────────────────────────────────────

  async fn find_student(&self, name: &str) -> Result<Option<Student>> {
    self
      .gateway
      .query(
        FIND_STUDENT,
        vec![Value::Text(name.to_owned())],
        RawStudent::from_row,
      )
      .await?
      .into_iter()
      .next()
      .map(RawStudent::into_student)
      .transpose()
  }

  async fn delete_student(&self, id: i64) -> Result<usize> {
    self
      .gateway
      .delete(DELETE_STUDENT, vec![Value::Integer(id)])
      .await
  }

  // ── Liveness ──────────────────────────────────────────────────────────────

  async fn ping(&self) -> Result<()> { self.gateway.ping().await }
}
