//! Per-call diagnostics.

use serde::Serialize;

/// What a handler reports about the call it served.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    pub has: Option<Vec<String>>,
    pub nclients: Option<usize>,
}

impl Diagnostics {
    pub fn with_has(fields: &[&str]) -> Self {
        Self {
            has: Some(fields.iter().map(|f| f.to_string()).collect()),
            ..Default::default()
        }
    }

    pub fn with_nclients(count: usize) -> Self {
        Self {
            nclients: Some(count),
            ..Default::default()
        }
    }
}

/// Log record of one call. Starts with a request id; handlers add the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Context {
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nclients: Option<usize>,
}

impl Context {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            has: None,
            nclients: None,
        }
    }

    /// Fold handler diagnostics in. Later values overwrite earlier ones.
    pub fn merge(&mut self, diagnostics: Diagnostics) {
        if diagnostics.has.is_some() {
            self.has = diagnostics.has;
        }
        if diagnostics.nclients.is_some() {
            self.nclients = diagnostics.nclients;
        }
    }
}
