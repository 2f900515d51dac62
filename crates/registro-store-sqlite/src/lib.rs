//! SQLite backend for the Registro grade book.
//!
//! [`Gateway`] owns the connection pool and the transaction boundaries;
//! [`SqliteStore`] expresses every [`registro_core::store::GradeStore`]
//! operation as parameterised SQL run through it. All database access happens
//! on [`tokio_rusqlite`] connection threads, never on the async runtime.

mod encode;
mod schema;
mod store;

pub mod error;
pub mod gateway;

pub use error::{Error, Result};
pub use gateway::{Gateway, Params};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
