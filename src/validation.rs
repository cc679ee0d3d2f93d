//! Per-field validation errors and mapping of database constraint violations
//! into the error kinds the API reports: validation failures (per-field,
//! recoverable) and reference-integrity violations (delete blocked).

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde::Serialize;
use std::fmt;

/// A single field-level validation failure.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Collected validation failures for one request, reported per-field.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Ok(()) when no failures were collected, Err(self) otherwise.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "validation failed: {}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Delete was blocked because other rows still reference the entity.
#[derive(Debug, Clone)]
pub struct DeleteProtected {
    pub entity: &'static str,
}

impl fmt::Display for DeleteProtected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} cannot be deleted while referencing records exist",
            self.entity
        )
    }
}

impl std::error::Error for DeleteProtected {}

/// Translate a unique-constraint or foreign-key violation on write into a
/// field-level validation error. `constraints` maps Postgres constraint
/// names to the offending field; unmatched errors pass through unchanged.
pub fn map_constraint_violation(
    err: DieselError,
    constraints: &[(&'static str, &'static str, &'static str)],
) -> anyhow::Error {
    if let DieselError::DatabaseError(ref kind, ref info) = err
        && matches!(
            kind,
            DatabaseErrorKind::UniqueViolation | DatabaseErrorKind::ForeignKeyViolation
        )
        && let Some(name) = info.constraint_name()
    {
        for (constraint, field, message) in constraints {
            if name == *constraint {
                return ValidationErrors::single(*field, *message).into();
            }
        }
    }
    err.into()
}

/// Translate a foreign-key violation on delete into a `DeleteProtected`
/// error; anything else passes through unchanged.
pub fn map_delete_protected(err: DieselError, entity: &'static str) -> anyhow::Error {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            DeleteProtected { entity }.into()
        }
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_result() {
        assert!(ValidationErrors::new().into_result().is_ok());

        let mut errors = ValidationErrors::new();
        errors.push("registration_marks", "already in use");
        let err = errors.into_result().unwrap_err();
        assert_eq!(err.0.len(), 1);
        assert_eq!(err.0[0].field, "registration_marks");
    }

    #[test]
    fn test_display_lists_fields() {
        let mut errors = ValidationErrors::new();
        errors.push("number_of_landings", "must be at least 1");
        errors.push("departure_location", "must be a 4-letter ICAO code");
        let rendered = errors.to_string();
        assert!(rendered.contains("number_of_landings"));
        assert!(rendered.contains("departure_location"));
    }
}
