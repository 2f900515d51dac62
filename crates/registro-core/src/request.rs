//! Request parsing and validation for the grade endpoints.
//!
//! Bodies arrive as raw bytes. [`parse_body`] rejects anything that is not a
//! JSON object; the field checks then run over every field and collect all
//! failures instead of stopping at the first one.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::{
  Error, Result, ValidationError, ValidationErrors,
  grade::{GradePatch, MAX_GRADE, MAX_SUBJECT_LEN, MIN_GRADE, NewGrade},
  student::MAX_NAME_LEN,
};

/// A JSON request body that is known to be an object.
pub type Body = Map<String, Value>;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a raw request body. Empty input, malformed JSON and non-object
/// values all fail with [`Error::MissingBody`].
pub fn parse_body(bytes: &[u8]) -> Result<Body> {
  match serde_json::from_slice::<Value>(bytes) {
    Ok(Value::Object(map)) => Ok(map),
    _ => Err(Error::MissingBody),
  }
}

// ─── Field checks ────────────────────────────────────────────────────────────

fn check_text(
  field: &'static str,
  value: &Value,
  max: usize,
) -> Result<String, ValidationError> {
  let text = value
    .as_str()
    .ok_or(ValidationError::NotAString { field })?
    .trim();
  if text.is_empty() {
    return Err(ValidationError::Empty { field });
  }
  if text.chars().count() > max {
    return Err(ValidationError::TooLong { field, max });
  }
  Ok(text.to_owned())
}

/// Accepts JSON integers, integral floats (`8.0`) and strings holding an
/// integer (`"8"`).
fn check_grade(field: &'static str, value: &Value) -> Result<u8, ValidationError> {
  let not_int = ValidationError::NotAnInteger { field };
  let n: i64 = match value {
    Value::Number(n) => match n.as_i64() {
      Some(i) => i,
      None => n
        .as_f64()
        .filter(|f| f.is_finite() && f.fract() == 0.0)
        .map(|f| f as i64)
        .ok_or(not_int)?,
    },
    Value::String(s) => s.trim().parse().map_err(|_| not_int)?,
    _ => return Err(not_int),
  };

  if !(i64::from(MIN_GRADE)..=i64::from(MAX_GRADE)).contains(&n) {
    return Err(ValidationError::OutOfRange {
      field,
      min: MIN_GRADE,
      max: MAX_GRADE,
    });
  }
  Ok(n as u8)
}

fn check_date(
  field: &'static str,
  value: &Value,
) -> Result<NaiveDate, ValidationError> {
  let text = value
    .as_str()
    .ok_or(ValidationError::NotAString { field })?
    .trim();
  if text.is_empty() {
    return Err(ValidationError::Empty { field });
  }
  // chrono accepts unpadded fields and signed or 5-digit years; only the
  // canonical ten-character form is stored, so grade dates sort as text.
  NaiveDate::parse_from_str(text, DATE_FORMAT)
    .ok()
    .filter(|date| text.len() == 10 && date.format(DATE_FORMAT).to_string() == text)
    .ok_or(ValidationError::InvalidDate { field })
}

/// Run `check` on a field that must be present and non-null.
fn required<T>(
  body: &Body,
  field: &'static str,
  errors: &mut Vec<ValidationError>,
  check: impl FnOnce(&Value) -> Result<T, ValidationError>,
) -> Option<T> {
  match body.get(field) {
    None | Some(Value::Null) => {
      errors.push(ValidationError::Missing { field });
      None
    }
    Some(value) => check(value).map_err(|e| errors.push(e)).ok(),
  }
}

/// Run `check` only when the field was supplied. An explicit `null` counts as
/// supplied and fails the check.
fn optional<T>(
  body: &Body,
  field: &'static str,
  errors: &mut Vec<ValidationError>,
  check: impl FnOnce(&Value) -> Result<T, ValidationError>,
) -> Option<T> {
  let value = body.get(field)?;
  check(value).map_err(|e| errors.push(e)).ok()
}

// ─── Create ──────────────────────────────────────────────────────────────────

impl NewGrade {
  /// Validate a create body. All four fields are required.
  pub fn from_body(body: &Body) -> Result<Self> {
    let mut errors = Vec::new();

    let student_name = required(body, "student_name", &mut errors, |v| {
      check_text("student_name", v, MAX_NAME_LEN)
    });
    let subject = required(body, "subject", &mut errors, |v| {
      check_text("subject", v, MAX_SUBJECT_LEN)
    });
    let grade = required(body, "grade", &mut errors, |v| check_grade("grade", v));
    let grade_date = required(body, "grade_date", &mut errors, |v| {
      check_date("grade_date", v)
    });

    match (student_name, subject, grade, grade_date) {
      (Some(student_name), Some(subject), Some(grade), Some(grade_date))
        if errors.is_empty() =>
      {
        Ok(Self { student_name, subject, grade, grade_date })
      }
      _ => Err(Error::Validation(ValidationErrors(errors))),
    }
  }
}

// ─── Update ──────────────────────────────────────────────────────────────────

impl GradePatch {
  /// Validate an update body. Only `subject`, `grade` and `grade_date` are
  /// recognised; other keys are ignored. Validation failures take precedence
  /// over [`Error::NothingToUpdate`].
  pub fn from_body(body: &Body) -> Result<Self> {
    let mut errors = Vec::new();

    let patch = Self {
      subject:    optional(body, "subject", &mut errors, |v| {
        check_text("subject", v, MAX_SUBJECT_LEN)
      }),
      grade:      optional(body, "grade", &mut errors, |v| check_grade("grade", v)),
      grade_date: optional(body, "grade_date", &mut errors, |v| {
        check_date("grade_date", v)
      }),
    };

    if !errors.is_empty() {
      return Err(Error::Validation(ValidationErrors(errors)));
    }
    if patch.is_empty() {
      return Err(Error::NothingToUpdate);
    }
    Ok(patch)
  }
}
