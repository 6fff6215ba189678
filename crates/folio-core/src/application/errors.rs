//! Field-level validation errors
//!
//! Validators accumulate these instead of stopping at the first problem, so
//! the admin surface can show every issue at once.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One violated rule on one input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    /// Create a field error
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Ordered list of field errors carried by `Error::ValidationFailed`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn as_slice(&self) -> &[FieldError] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether any error was reported against `field`
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }
}

impl From<Vec<FieldError>> for ValidationErrors {
    fn from(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

/// Outcome of validating a candidate record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<FieldError>,
}

impl ValidationReport {
    /// Build a report; it is valid exactly when no errors were collected
    pub fn from_errors(errors: Vec<FieldError>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    /// Errors reported against a single field
    pub fn errors_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldError> {
        self.errors.iter().filter(move |e| e.field == field)
    }

    /// Convert into a `Result`, failing with every collected error
    pub fn into_result(self) -> Result<()> {
        if self.is_valid {
            Ok(())
        } else {
            Err(Error::ValidationFailed(self.errors.into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_error_display() {
        let err = FieldError::new("title", "Title is required");
        assert_eq!(err.to_string(), "title: Title is required");
    }

    #[test]
    fn test_empty_report_is_valid() {
        let report = ValidationReport::from_errors(Vec::new());
        assert!(report.is_valid);
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn test_report_keeps_order_and_fails() {
        let report = ValidationReport::from_errors(vec![
            FieldError::new("title", "too short"),
            FieldError::new("githubLink", "bad url"),
        ]);
        assert!(!report.is_valid);
        assert_eq!(report.errors_for("githubLink").count(), 1);

        let err = report.into_result().unwrap_err();
        let fields: Vec<_> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["title", "githubLink"]);
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let report = ValidationReport::from_errors(vec![FieldError::new("overview", "short")]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["isValid"], false);
        assert_eq!(json["errors"][0]["field"], "overview");
    }
}
