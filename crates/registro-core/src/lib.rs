//! Core types and trait definitions for the Registro grade book.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! store and API crates depend on it; it depends on nothing of theirs.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod grade;
pub mod request;
pub mod store;
pub mod student;

pub use error::{Error, Result, ValidationError, ValidationErrors};
