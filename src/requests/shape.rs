//! Request shapes and per-call instances.

use chrono::{Local, NaiveDate};
use serde_json::{Map, Value};

use crate::fields::{parse_date, phone_digits, FieldSpec, ValidationResult};

/// Joins per-field reasons in an aggregated result.
pub const REASON_SEPARATOR: &str = "; ";

/// Prefix of every aggregated field-validation reason.
pub const INVALID_FIELDS_PREFIX: &str = "Invalid fields: ";

/// A fixed, ordered list of field specs identifying one request type.
#[derive(Debug, Clone)]
pub struct RequestShape {
    name: &'static str,
    fields: Vec<FieldSpec>,
}

impl RequestShape {
    pub fn builder(name: &'static str) -> ShapeBuilder {
        ShapeBuilder {
            name,
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Bind caller-supplied values. Keys the shape does not declare are dropped.
    pub fn bind(&self, raw: &Map<String, Value>) -> RequestInstance<'_> {
        let values = self
            .fields
            .iter()
            .filter_map(|f| raw.get(f.name()).map(|v| (f.name().to_string(), v.clone())))
            .collect();
        RequestInstance { shape: self, values }
    }

    /// Bind a raw JSON value. Anything other than an object binds no fields.
    pub fn bind_value(&self, raw: &Value) -> RequestInstance<'_> {
        match raw.as_object() {
            Some(map) => self.bind(map),
            None => RequestInstance {
                shape: self,
                values: Map::new(),
            },
        }
    }
}

/// Builds a [`RequestShape`] one field at a time.
#[derive(Debug)]
pub struct ShapeBuilder {
    name: &'static str,
    fields: Vec<FieldSpec>,
}

impl ShapeBuilder {
    pub fn field(mut self, spec: FieldSpec) -> Self {
        debug_assert!(
            self.fields.iter().all(|f| f.name() != spec.name()),
            "duplicate field '{}' in shape '{}'",
            spec.name(),
            self.name
        );
        self.fields.push(spec);
        self
    }

    pub fn build(self) -> RequestShape {
        RequestShape {
            name: self.name,
            fields: self.fields,
        }
    }
}

/// A shape bound to the raw values of a single call.
#[derive(Debug, Clone)]
pub struct RequestInstance<'a> {
    shape: &'a RequestShape,
    values: Map<String, Value>,
}

impl<'a> RequestInstance<'a> {
    pub fn shape(&self) -> &'a RequestShape {
        self.shape
    }

    /// Raw value as supplied, including an explicit `null`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Present with a non-null value.
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| !v.is_null())
    }

    pub fn validate(&self) -> ValidationResult {
        self.validate_on(Local::now().date_naive())
    }

    /// Check every field and aggregate all failures into one result.
    pub fn validate_on(&self, today: NaiveDate) -> ValidationResult {
        let reasons: Vec<String> = self
            .shape
            .fields()
            .iter()
            .map(|f| f.validate_on(self.get(f.name()), today))
            .filter(|res| !res.is_valid)
            .map(|res| res.reason)
            .collect();

        if reasons.is_empty() {
            ValidationResult::valid()
        } else {
            ValidationResult::invalid(format!(
                "{}{}",
                INVALID_FIELDS_PREFIX,
                reasons.join(REASON_SEPARATOR)
            ))
        }
    }

    /// Names of fields whose value passes that field's emptiness rule.
    pub fn filled_fields(&self) -> Vec<&'static str> {
        self.shape
            .fields()
            .iter()
            .filter(|f| f.is_filled(self.get(f.name())))
            .map(|f| f.name())
            .collect()
    }

    pub fn str_value(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn int_value(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    pub fn date_value(&self, name: &str) -> Option<NaiveDate> {
        self.str_value(name).and_then(|s| parse_date(s).ok())
    }

    pub fn phone_value(&self, name: &str) -> Option<String> {
        self.get(name).and_then(phone_digits)
    }

    pub fn ids_value(&self, name: &str) -> Option<Vec<i64>> {
        self.get(name)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_i64).collect())
    }

    pub fn map_value(&self, name: &str) -> Option<&Map<String, Value>> {
        self.get(name).and_then(Value::as_object)
    }
}
