//! Student, created implicitly the first time a grade names them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest student name the store accepts.
pub const MAX_NAME_LEN: usize = 100;

/// A student row. Names are unique across the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
  pub id:         i64,
  pub name:       String,
  /// Server-assigned timestamp; never changes after creation.
  pub created_at: DateTime<Utc>,
}
