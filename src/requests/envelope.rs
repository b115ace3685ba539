//! The outer method request wrapping method-specific arguments.

use once_cell::sync::Lazy;
use serde_json::{Map, Value};

use crate::fields::{FieldKind, FieldSpec};
use crate::requests::shape::{RequestInstance, RequestShape};
use crate::requests::RequestArgs;

static ENVELOPE: Lazy<RequestShape> = Lazy::new(|| {
    RequestShape::builder("method_request")
        .field(FieldSpec::new("account", FieldKind::Char).nullable())
        .field(FieldSpec::new("login", FieldKind::Char).required().nullable())
        .field(FieldSpec::new("token", FieldKind::Char).required().nullable())
        .field(FieldSpec::new("arguments", FieldKind::Arguments).required().nullable())
        .field(FieldSpec::new("method", FieldKind::Char).required())
        .build()
});

/// Validated envelope fields.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodRequest {
    pub account: Option<String>,
    pub login: String,
    pub token: String,
    pub method: String,
    pub arguments: Value,
}

impl MethodRequest {
    pub fn is_admin(&self, admin_login: &str) -> bool {
        self.login == admin_login
    }
}

impl RequestArgs for MethodRequest {
    fn shape() -> &'static RequestShape {
        &ENVELOPE
    }

    fn from_instance(instance: &RequestInstance<'_>) -> Self {
        let text = |name: &str| instance.str_value(name).unwrap_or_default().to_string();
        Self {
            account: instance.str_value("account").map(str::to_string),
            login: text("login"),
            token: text("token"),
            method: text("method"),
            arguments: Value::Object(
                instance.map_value("arguments").cloned().unwrap_or_else(Map::new),
            ),
        }
    }
}
