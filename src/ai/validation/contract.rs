//! Output Contract Checks
//!
//! Reads typed fields from a model's JSON output while recording every
//! contract violation, so a single error lists all problems at once.

use serde_json::Value;
use std::fmt;

use crate::types::{LogsiftError, Result, ValidationError, ValidationErrorKind};

/// Severity levels for validation issues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSeverity {
    /// Contract violation, response is unusable
    Error,
    /// Response usable after coercion
    Warning,
}

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueSeverity::Error => write!(f, "ERROR"),
            IssueSeverity::Warning => write!(f, "WARN"),
        }
    }
}

/// A single validation issue
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub severity: IssueSeverity,
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn error(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Error,
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn warning(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Warning,
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.field, self.message)
    }
}

/// Typed reader over one model response
///
/// Accessors never fail; they return a neutral value and record an issue.
/// Call [`OutputReader::finish`] to turn recorded errors into a `Schema` error.
pub struct OutputReader<'a> {
    value: &'a Value,
    issues: Vec<ValidationIssue>,
}

impl<'a> OutputReader<'a> {
    pub fn new(value: &'a Value) -> Self {
        let mut issues = Vec::new();
        if !value.is_object() {
            issues.push(ValidationIssue::error(
                "$",
                format!("response must be a JSON object, got {}", type_name(value)),
            ));
        }
        Self { value, issues }
    }

    /// The response as a JSON object, if it is one
    pub fn object(&self) -> Option<&'a serde_json::Map<String, Value>> {
        self.value.as_object()
    }

    /// Whether the response carries a non-null `key`
    pub fn has(&self, key: &str) -> bool {
        self.value.get(key).is_some_and(|v| !v.is_null())
    }

    /// Required string field (may be empty; blank text is placeholder-filled later)
    pub fn require_str(&mut self, key: &str) -> String {
        match self.value.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => {
                self.issues
                    .push(ValidationIssue::error(key, "missing required field"));
                String::new()
            }
            Some(other) => {
                self.issues.push(ValidationIssue::error(
                    key,
                    format!("expected string, got {}", type_name(other)),
                ));
                String::new()
            }
        }
    }

    /// Optional string field
    pub fn optional_str(&mut self, key: &str) -> Option<String> {
        match self.value.get(key) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Null) | None => None,
            Some(other) => {
                self.issues.push(ValidationIssue::error(
                    key,
                    format!("expected string, got {}", type_name(other)),
                ));
                None
            }
        }
    }

    /// String array; a missing field reads as empty, non-string items are dropped
    pub fn str_array(&mut self, key: &str) -> Vec<String> {
        match self.value.get(key) {
            Some(Value::Array(items)) => {
                let strings: Vec<String> = items
                    .iter()
                    .filter_map(|item| item.as_str().map(String::from))
                    .collect();
                if strings.len() != items.len() {
                    self.issues.push(ValidationIssue::warning(
                        key,
                        format!("dropped {} non-string items", items.len() - strings.len()),
                    ));
                }
                strings
            }
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                self.issues.push(ValidationIssue::error(
                    key,
                    format!("expected array of strings, got {}", type_name(other)),
                ));
                Vec::new()
            }
        }
    }

    /// Boolean flag; a missing flag reads as `false`
    pub fn flag(&mut self, key: &str) -> bool {
        match self.value.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::Null) | None => false,
            Some(other) => {
                self.issues.push(ValidationIssue::error(
                    key,
                    format!("expected boolean, got {}", type_name(other)),
                ));
                false
            }
        }
    }

    /// Required confidence score, clamped to [0, 1]
    ///
    /// Numeric strings are accepted with a warning. Non-finite or missing
    /// values are contract errors.
    pub fn confidence(&mut self, key: &str) -> f64 {
        let raw = match self.value.get(key) {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => {
                let parsed = s.trim().parse::<f64>().ok();
                if parsed.is_some() {
                    self.issues
                        .push(ValidationIssue::warning(key, "numeric string coerced"));
                }
                parsed
            }
            _ => None,
        };

        match raw {
            Some(score) if score.is_finite() => {
                if !(0.0..=1.0).contains(&score) {
                    self.issues.push(ValidationIssue::warning(
                        key,
                        format!("{} clamped to [0, 1]", score),
                    ));
                }
                score.clamp(0.0, 1.0)
            }
            _ => {
                self.issues.push(ValidationIssue::error(
                    key,
                    "missing or not a finite number",
                ));
                0.0
            }
        }
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Warning)
    }

    /// Fails with a `Schema` validation error when any error was recorded
    pub fn finish(self) -> Result<()> {
        let errors: Vec<&ValidationIssue> = self
            .issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Error)
            .collect();

        let Some(first) = errors.first() else {
            return Ok(());
        };

        let message = errors
            .iter()
            .map(|i| format!("{}: {}", i.field, i.message))
            .collect::<Vec<_>>()
            .join("; ");

        Err(LogsiftError::Validation(
            ValidationError::new(ValidationErrorKind::Schema, message).with_field(&first.field),
        ))
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reads_summarizer_shape() {
        let value = json!({
            "summary": "NoneType has no attribute 'id'",
            "rootCause": "user lookup returned None",
            "impact": "Payments fail for guest users",
            "confidenceScore": 0.9,
            "isIntermittent": false,
            "needsFix": true
        });
        let mut reader = OutputReader::new(&value);
        assert_eq!(reader.require_str("summary"), "NoneType has no attribute 'id'");
        assert!(reader.flag("needsFix"));
        assert!(!reader.flag("isIntermittent"));
        assert!((reader.confidence("confidenceScore") - 0.9).abs() < f64::EPSILON);
        assert!(reader.finish().is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let value = json!({"summary": 42, "needsFix": "yes"});
        let mut reader = OutputReader::new(&value);
        reader.require_str("summary");
        reader.require_str("rootCause");
        reader.flag("needsFix");
        reader.confidence("confidenceScore");
        assert_eq!(reader.issues().len(), 4);

        let err = reader.finish().unwrap_err();
        match err {
            LogsiftError::Validation(v) => {
                assert_eq!(v.kind, ValidationErrorKind::Schema);
                assert_eq!(v.field.as_deref(), Some("summary"));
                assert!(v.message.contains("rootCause: missing required field"));
                assert!(v.message.contains("confidenceScore"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_confidence_clamped_with_warning() {
        let value = json!({"a": 1.7, "b": -0.2, "c": "0.4"});
        let mut reader = OutputReader::new(&value);
        assert_eq!(reader.confidence("a"), 1.0);
        assert_eq!(reader.confidence("b"), 0.0);
        assert!((reader.confidence("c") - 0.4).abs() < f64::EPSILON);
        assert_eq!(reader.warnings().count(), 3);
        assert!(reader.finish().is_ok());
    }

    #[test]
    fn test_non_numeric_confidence_string_is_error() {
        let value = json!({"confidenceScore": "high"});
        let mut reader = OutputReader::new(&value);
        reader.confidence("confidenceScore");
        assert!(reader.finish().is_err());
    }

    #[test]
    fn test_non_object_response() {
        let value = json!(["not", "an", "object"]);
        let reader = OutputReader::new(&value);
        assert!(reader.finish().is_err());
    }

    #[test]
    fn test_str_array_drops_non_strings() {
        let value = json!({"relevantFrames": ["a.py:12", 7, "b.py:3"]});
        let mut reader = OutputReader::new(&value);
        assert_eq!(reader.str_array("relevantFrames"), vec!["a.py:12", "b.py:3"]);
        assert_eq!(reader.str_array("missing"), Vec::<String>::new());
        assert!(reader.finish().is_ok());
    }
}
