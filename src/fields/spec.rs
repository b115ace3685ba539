//! Field declarations and the single-field validation pass.

use chrono::{Local, NaiveDate};
use serde_json::Value;

use crate::fields::kind::FieldKind;

/// Outcome of validating one field or a whole shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub reason: String,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            reason: String::new(),
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            reason: reason.into(),
        }
    }
}

/// A named, immutable field definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    name: &'static str,
    kind: FieldKind,
    required: bool,
    nullable: bool,
}

impl FieldSpec {
    /// Optional, non-nullable field of the given kind.
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            nullable: false,
        }
    }

    pub const fn required(self) -> Self {
        Self { required: true, ..self }
    }

    pub const fn nullable(self) -> Self {
        Self { nullable: true, ..self }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// True when the value passes this field's emptiness rule.
    pub fn is_filled(&self, value: Option<&Value>) -> bool {
        value.is_some_and(|v| self.kind.is_filled(v))
    }

    /// Validate against today's local date.
    pub fn validate(&self, value: Option<&Value>) -> ValidationResult {
        self.validate_on(value, Local::now().date_naive())
    }

    /// Validate a raw value. `None` and JSON `null` both count as absent.
    ///
    /// Checks run in a fixed order: required, optional-absent, emptiness by
    /// the kind's own rule, then the kind's validity rule.
    pub fn validate_on(&self, value: Option<&Value>, today: NaiveDate) -> ValidationResult {
        let value = match value.filter(|v| !v.is_null()) {
            Some(v) => v,
            None if self.required => {
                return ValidationResult::invalid(format!("field '{}' is required", self.name));
            }
            None => return ValidationResult::valid(),
        };

        if !self.nullable && !self.kind.is_filled(value) {
            return ValidationResult::invalid(format!("field '{}' is empty", self.name));
        }

        match self.kind.check(value, today) {
            Ok(()) => ValidationResult::valid(),
            Err(e) => ValidationResult::invalid(format!(
                "field '{}', invalid value: {} ({})",
                self.name,
                display_value(value),
                e
            )),
        }
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
