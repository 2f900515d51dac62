//! SQL schema for the Registro SQLite store.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`, so it is
/// run on every start-up.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS students (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL    -- RFC 3339 UTC, fixed width; server-assigned
);

-- Removing a student removes every grade that references it.
CREATE TABLE IF NOT EXISTS grades (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id  INTEGER NOT NULL REFERENCES students(id) ON DELETE CASCADE,
    subject     TEXT NOT NULL,
    grade       INTEGER NOT NULL CHECK (grade BETWEEN 0 AND 10),
    grade_date  TEXT NOT NULL,   -- YYYY-MM-DD
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS grades_student_idx ON grades(student_id);
CREATE INDEX IF NOT EXISTS grades_date_idx    ON grades(grade_date DESC, created_at DESC);
";

/// Applied to every pooled connection before it is handed out. Foreign-key
/// enforcement is per connection in SQLite and cannot change inside a
/// transaction.
pub const CONNECTION_PRAGMAS: &str = "PRAGMA foreign_keys = ON;";

/// Applied additionally to file-backed connections.
pub const FILE_PRAGMAS: &str = "PRAGMA journal_mode = WAL;";
