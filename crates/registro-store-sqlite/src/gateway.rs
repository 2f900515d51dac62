//! [`Gateway`], the single point of access to the SQLite database.
//!
//! The gateway owns a fixed pool of [`tokio_rusqlite::Connection`]s opened up
//! front. Each statement closure runs on one pooled connection's thread with
//! exclusive `&mut` access for its whole duration, so no connection is ever
//! used by two requests at once.
//!
//! Mutating primitives run inside a `BEGIN IMMEDIATE` transaction: commit on
//! success, rollback (on drop) before the error is returned.

use std::{
  path::Path,
  sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
  },
  time::Duration,
};

use rusqlite::{Row, Transaction, TransactionBehavior, params_from_iter, types::Value};
use tracing::{debug, info, warn};

use crate::{
  Result,
  schema::{CONNECTION_PRAGMAS, FILE_PRAGMAS, SCHEMA},
};

/// Positional statement parameters (`?1`, `?2`, ...).
pub type Params = Vec<Value>;

/// How long a writer waits for the database lock before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

struct Pool {
  conns: Vec<tokio_rusqlite::Connection>,
  next:  AtomicUsize,
}

/// A pooled SQLite gateway.
///
/// Cloning is cheap; the pool is reference-counted.
#[derive(Clone)]
pub struct Gateway {
  pool: Arc<Pool>,
}

impl Gateway {
  /// Open `pool_size` connections (at least one) to the database file at
  /// `path`, creating it if needed.
  pub async fn open(path: impl AsRef<Path>, pool_size: usize) -> Result<Self> {
    let path = path.as_ref();
    let size = pool_size.max(1);

    let mut conns = Vec::with_capacity(size);
    for _ in 0..size {
      let conn = tokio_rusqlite::Connection::open(path).await?;
      configure(&conn, true).await?;
      conns.push(conn);
    }

    info!(path = %path.display(), pool_size = size, "opened sqlite pool");
    Ok(Self::from_connections(conns))
  }

  /// Open an in-memory database. Separate in-memory connections never share
  /// data, so the pool holds exactly one.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    configure(&conn, false).await?;
    debug!("opened in-memory sqlite database");
    Ok(Self::from_connections(vec![conn]))
  }

  fn from_connections(conns: Vec<tokio_rusqlite::Connection>) -> Self {
    Self {
      pool: Arc::new(Pool { conns, next: AtomicUsize::new(0) }),
    }
  }

  pub fn pool_size(&self) -> usize { self.pool.conns.len() }

  /// Round-robin over the pool.
  fn connection(&self) -> &tokio_rusqlite::Connection {
    let i = self.pool.next.fetch_add(1, Ordering::Relaxed);
    &self.pool.conns[i % self.pool.conns.len()]
  }

  // ── Schema ────────────────────────────────────────────────────────────────

  /// Create the `students` and `grades` tables if they are absent. Safe to
  /// run on every start-up and from several processes at once.
  pub async fn ensure_schema(&self) -> Result<()> {
    self
      .connection()
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    info!("schema created or verified");
    Ok(())
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// Run a read-only statement and map every row with `map`.
  pub async fn query<T, F>(
    &self,
    sql: &'static str,
    params: Params,
    map: F,
  ) -> Result<Vec<T>>
  where
    T: Send + 'static,
    F: Fn(&Row<'_>) -> rusqlite::Result<T> + Send + 'static,
  {
    let rows = self
      .connection()
      .call(move |conn| {
        let mut stmt = conn.prepare_cached(sql)?;
        debug_assert!(stmt.readonly(), "query() given a mutating statement");
        let rows = stmt
          .query_map(params_from_iter(params), |row| map(row))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  /// Round-trip `SELECT 1` on a pooled connection.
  pub async fn ping(&self) -> Result<()> {
    self
      .connection()
      .call(|conn| {
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  /// Run `f` inside one immediate transaction. Commits if `f` succeeds;
  /// otherwise the transaction is rolled back and the error returned.
  pub async fn transaction<T, F>(&self, f: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&Transaction<'_>) -> rusqlite::Result<T> + Send + 'static,
  {
    let result = self
      .connection()
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
      })
      .await;

    if let Err(e) = &result {
      warn!(error = %e, "transaction rolled back");
    }
    Ok(result?)
  }

  /// Execute an `INSERT`; returns the generated row id.
  pub async fn insert(&self, sql: &'static str, params: Params) -> Result<i64> {
    self
      .transaction(move |tx| {
        tx.execute(sql, params_from_iter(params))?;
        Ok(tx.last_insert_rowid())
      })
      .await
  }

  /// Execute an `UPDATE`; returns the number of rows changed.
  pub async fn update(&self, sql: &'static str, params: Params) -> Result<usize> {
    self.execute(sql, params).await
  }

  /// Execute a `DELETE`; returns the number of rows removed.
  pub async fn delete(&self, sql: &'static str, params: Params) -> Result<usize> {
    self.execute(sql, params).await
  }

  async fn execute(&self, sql: &'static str, params: Params) -> Result<usize> {
    self
      .transaction(move |tx| tx.execute(sql, params_from_iter(params)))
      .await
  }
}

async fn configure(conn: &tokio_rusqlite::Connection, file_backed: bool) -> Result<()> {
  conn
    .call(move |conn| {
      conn.busy_timeout(BUSY_TIMEOUT)?;
      conn.execute_batch(CONNECTION_PRAGMAS)?;
      if file_backed {
        conn.execute_batch(FILE_PRAGMAS)?;
      }
      Ok(())
    })
    .await?;
  Ok(())
}
