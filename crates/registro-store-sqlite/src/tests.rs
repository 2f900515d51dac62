//! Integration tests for `SqliteStore` against in-memory and on-disk databases.

use chrono::NaiveDate;
use registro_core::{
  grade::{GradePatch, NewGrade},
  store::GradeStore,
};
use rusqlite::types::Value;

use crate::{Gateway, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_grade(name: &str, subject: &str, grade: u8, on: NaiveDate) -> NewGrade {
  NewGrade {
    student_name: name.into(),
    subject:      subject.into(),
    grade,
    grade_date:   on,
  }
}

// ─── Gateway ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn ensure_schema_is_idempotent() {
  let s = store().await;
  s.gateway().ensure_schema().await.unwrap();
  s.gateway().ensure_schema().await.unwrap();
  s.ping().await.unwrap();
}

#[tokio::test]
async fn gateway_primitives_report_ids_and_counts() {
  let s = store().await;
  let gw = s.gateway();

  let first = gw
    .insert(
      "INSERT INTO students (name, created_at) VALUES (?1, ?2)",
      vec![Value::from("Anna".to_owned()), Value::from("2026-01-01T00:00:00.000000Z".to_owned())],
    )
    .await
    .unwrap();
  let second = gw
    .insert(
      "INSERT INTO students (name, created_at) VALUES (?1, ?2)",
      vec![Value::from("Bruno".to_owned()), Value::from("2026-01-01T00:00:00.000000Z".to_owned())],
    )
    .await
    .unwrap();
  assert!(second > first);

  let changed = gw
    .update(
      "UPDATE students SET name = ?1 WHERE id = ?2",
      vec![Value::from("Anna Bianchi".to_owned()), Value::Integer(first)],
    )
    .await
    .unwrap();
  assert_eq!(changed, 1);

  let missing = gw
    .update(
      "UPDATE students SET name = ?1 WHERE id = ?2",
      vec![Value::from("Nobody".to_owned()), Value::Integer(9_999)],
    )
    .await
    .unwrap();
  assert_eq!(missing, 0);

  let names = gw
    .query("SELECT name FROM students ORDER BY id", Vec::new(), |r| r.get::<_, String>(0))
    .await
    .unwrap();
  assert_eq!(names, ["Anna Bianchi", "Bruno"]);

  let removed = gw
    .delete("DELETE FROM students WHERE id = ?1", vec![Value::Integer(second)])
    .await
    .unwrap();
  assert_eq!(removed, 1);
}

#[tokio::test]
async fn failed_insert_rolls_back() {
  let s = store().await;
  let gw = s.gateway();

  gw.insert(
    "INSERT INTO students (name, created_at) VALUES (?1, ?2)",
    vec![Value::from("Anna".to_owned()), Value::from("2026-01-01T00:00:00.000000Z".to_owned())],
  )
  .await
  .unwrap();

  // Unique constraint on students.name.
  let dup = gw
    .insert(
      "INSERT INTO students (name, created_at) VALUES (?1, ?2)",
      vec![Value::from("Anna".to_owned()), Value::from("2026-01-01T00:00:00.000000Z".to_owned())],
    )
    .await;
  assert!(dup.is_err());

  // A transaction whose second statement fails leaves no trace of the first.
  let partial = gw
    .transaction(|tx| {
      tx.execute(
        "INSERT INTO students (name, created_at) VALUES ('Carla', 'x')",
        [],
      )?;
      tx.execute(
        "INSERT INTO grades (student_id, subject, grade, grade_date, created_at)
         VALUES (9999, 'Storia', 5, '2026-01-01', 'x')",
        [],
      )?;
      Ok(())
    })
    .await;
  assert!(partial.is_err(), "foreign key should reject the grade");

  let count = gw
    .query("SELECT COUNT(*) FROM students", Vec::new(), |r| r.get::<_, i64>(0))
    .await
    .unwrap();
  assert_eq!(count, [1]);
}

#[tokio::test]
async fn grade_range_is_enforced_by_the_table() {
  let s = store().await;
  let created = s
    .record_grade(new_grade("Anna", "Storia", 6, date(2026, 1, 1)))
    .await
    .unwrap();

  let result = s
    .gateway()
    .update(
      "UPDATE grades SET grade = ?1 WHERE id = ?2",
      vec![Value::Integer(11), Value::Integer(created.id)],
    )
    .await;
  assert!(result.is_err());

  let fetched = s.get_grade(created.id).await.unwrap().unwrap();
  assert_eq!(fetched.grade, 6);
}

// ─── Grades ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn record_and_fetch_grade() {
  let s = store().await;

  let created = s
    .record_grade(new_grade("Mario Rossi", "Matematica", 8, date(2026, 1, 28)))
    .await
    .unwrap();
  assert_eq!(created.student_name, "Mario Rossi");
  assert_eq!(created.grade, 8);

  let fetched = s.get_grade(created.id).await.unwrap().unwrap();
  assert_eq!(fetched.id, created.id);
  assert_eq!(fetched.student_id, created.student_id);
  assert_eq!(fetched.student_name, "Mario Rossi");
  assert_eq!(fetched.subject, "Matematica");
  assert_eq!(fetched.grade, 8);
  assert_eq!(fetched.grade_date, date(2026, 1, 28));
  assert_eq!(fetched.created_at, created.created_at);

  let all = s.list_grades().await.unwrap();
  assert_eq!(all, vec![fetched]);
}

#[tokio::test]
async fn get_grade_missing_returns_none() {
  let s = store().await;
  assert!(s.get_grade(42).await.unwrap().is_none());
  assert!(!s.grade_exists(42).await.unwrap());
}

#[tokio::test]
async fn list_on_empty_store_is_empty() {
  let s = store().await;
  assert!(s.list_grades().await.unwrap().is_empty());
}

#[tokio::test]
async fn list_orders_by_date_then_recency() {
  let s = store().await;

  let old = s
    .record_grade(new_grade("Anna", "Storia", 6, date(2026, 1, 10)))
    .await
    .unwrap();
  let tie_first = s
    .record_grade(new_grade("Bruno", "Storia", 7, date(2026, 2, 1)))
    .await
    .unwrap();
  let tie_second = s
    .record_grade(new_grade("Carla", "Storia", 9, date(2026, 2, 1)))
    .await
    .unwrap();

  let ids: Vec<i64> = s.list_grades().await.unwrap().iter().map(|g| g.id).collect();
  assert_eq!(ids, [tie_second.id, tie_first.id, old.id]);
}

#[tokio::test]
async fn same_name_reuses_student() {
  let s = store().await;

  let a = s
    .record_grade(new_grade("Mario Rossi", "Matematica", 8, date(2026, 1, 28)))
    .await
    .unwrap();
  let b = s
    .record_grade(new_grade("Mario Rossi", "Italiano", 6, date(2026, 1, 29)))
    .await
    .unwrap();
  assert_eq!(a.student_id, b.student_id);

  let student = s.find_student("Mario Rossi").await.unwrap().unwrap();
  assert_eq!(student.id, a.student_id);

  let count = s
    .gateway()
    .query("SELECT COUNT(*) FROM students", Vec::new(), |r| r.get::<_, i64>(0))
    .await
    .unwrap();
  assert_eq!(count, [1]);
}

#[tokio::test]
async fn student_lookup_is_exact() {
  let s = store().await;
  s.record_grade(new_grade("Mario Rossi", "Matematica", 8, date(2026, 1, 28)))
    .await
    .unwrap();

  assert!(s.find_student("mario rossi").await.unwrap().is_none());
  assert!(s.find_student("Mario").await.unwrap().is_none());
}

#[tokio::test]
async fn concurrent_creates_for_unseen_name_share_student() {
  let s = store().await;

  let (a, b) = tokio::join!(
    s.record_grade(new_grade("Nuovo Studente", "Fisica", 5, date(2026, 3, 1))),
    s.record_grade(new_grade("Nuovo Studente", "Chimica", 7, date(2026, 3, 1))),
  );
  let (a, b) = (a.unwrap(), b.unwrap());
  assert_eq!(a.student_id, b.student_id);
  assert_ne!(a.id, b.id);
}

#[tokio::test]
async fn update_touches_only_supplied_columns() {
  let s = store().await;
  let created = s
    .record_grade(new_grade("Anna", "Storia", 6, date(2026, 1, 10)))
    .await
    .unwrap();

  let changed = s
    .update_grade(created.id, GradePatch { grade: Some(9), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(changed, 1);

  let after = s.get_grade(created.id).await.unwrap().unwrap();
  assert_eq!(after.grade, 9);
  assert_eq!(after.subject, "Storia");
  assert_eq!(after.grade_date, date(2026, 1, 10));
  assert_eq!(after.created_at, created.created_at);

  s.update_grade(created.id, GradePatch {
    subject:    Some("Geografia".into()),
    grade:      None,
    grade_date: Some(date(2026, 4, 2)),
  })
  .await
  .unwrap();

  let after = s.get_grade(created.id).await.unwrap().unwrap();
  assert_eq!(after.grade, 9);
  assert_eq!(after.subject, "Geografia");
  assert_eq!(after.grade_date, date(2026, 4, 2));
}

#[tokio::test]
async fn update_missing_grade_changes_nothing() {
  let s = store().await;
  let changed = s
    .update_grade(7, GradePatch { grade: Some(3), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(changed, 0);
}

// ─── Students ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn deleting_student_cascades_to_grades() {
  let s = store().await;

  let gone = s
    .record_grade(new_grade("Anna", "Storia", 6, date(2026, 1, 10)))
    .await
    .unwrap();
  s.record_grade(new_grade("Anna", "Latino", 7, date(2026, 1, 11)))
    .await
    .unwrap();
  let kept = s
    .record_grade(new_grade("Bruno", "Storia", 8, date(2026, 1, 12)))
    .await
    .unwrap();

  let removed = s.delete_student(gone.student_id).await.unwrap();
  assert_eq!(removed, 1);

  let remaining = s.list_grades().await.unwrap();
  assert_eq!(remaining.len(), 1);
  assert_eq!(remaining[0].id, kept.id);
  assert!(s.find_student("Anna").await.unwrap().is_none());
}

#[tokio::test]
async fn deleting_missing_student_returns_zero() {
  let s = store().await;
  assert_eq!(s.delete_student(123).await.unwrap(), 0);
}

// ─── On-disk pool ────────────────────────────────────────────────────────────

#[tokio::test]
async fn pooled_file_store_serialises_writers() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("registro.db");

  let s = SqliteStore::open(&path, 4).await.unwrap();
  assert_eq!(s.gateway().pool_size(), 4);

  let handles: Vec<_> = (0..8u8)
    .map(|i| {
      let s = s.clone();
      tokio::spawn(async move {
        s.record_grade(new_grade("Concorrente", "Fisica", i % 11, date(2026, 5, 1)))
          .await
      })
    })
    .collect();

  let mut student_ids = Vec::new();
  for handle in handles {
    student_ids.push(handle.await.unwrap().unwrap().student_id);
  }
  student_ids.dedup();
  assert_eq!(student_ids.len(), 1);
  assert_eq!(s.list_grades().await.unwrap().len(), 8);

  // A second gateway over the same file sees the committed rows.
  let reopened = SqliteStore::open(&path, 1).await.unwrap();
  assert_eq!(reopened.list_grades().await.unwrap().len(), 8);
}

#[tokio::test]
async fn in_memory_gateway_has_one_connection() {
  let gw = Gateway::open_in_memory().await.unwrap();
  assert_eq!(gw.pool_size(), 1);
}
