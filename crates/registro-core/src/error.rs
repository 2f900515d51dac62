//! Error types for `registro-core`.

use std::fmt;

use thiserror::Error;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("{field} is required")]
  Missing { field: &'static str },

  #[error("{field} must be a string")]
  NotAString { field: &'static str },

  #[error("{field} cannot be empty")]
  Empty { field: &'static str },

  #[error("{field} exceeds maximum length of {max} characters")]
  TooLong { field: &'static str, max: usize },

  #[error("{field} must be an integer")]
  NotAnInteger { field: &'static str },

  #[error("{field} must be between {min} and {max}")]
  OutOfRange { field: &'static str, min: u8, max: u8 },

  #[error("{field} must be a valid date in YYYY-MM-DD format")]
  InvalidDate { field: &'static str },
}

/// Every validation failure found in one request, in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
  /// Human-readable messages, one per failure.
  pub fn messages(&self) -> Vec<String> {
    self.0.iter().map(ToString::to_string).collect()
  }
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.messages().join("; "))
  }
}

impl std::error::Error for ValidationErrors {}

/// A request the service cannot act on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("request body is missing or is not a JSON object")]
  MissingBody,

  #[error("invalid request: {0}")]
  Validation(ValidationErrors),

  #[error("nothing to update: supply at least one of subject, grade, grade_date")]
  NothingToUpdate,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
