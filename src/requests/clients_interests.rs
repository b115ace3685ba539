//! Arguments of the `clients_interests` method.

use chrono::NaiveDate;
use once_cell::sync::Lazy;

use crate::fields::{FieldKind, FieldSpec};
use crate::requests::shape::{RequestInstance, RequestShape};
use crate::requests::RequestArgs;

static CLIENTS_INTERESTS: Lazy<RequestShape> = Lazy::new(|| {
    RequestShape::builder("clients_interests")
        .field(FieldSpec::new("client_ids", FieldKind::ClientIds).required())
        .field(FieldSpec::new("date", FieldKind::Date).nullable())
        .build()
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientsInterestsArgs {
    pub client_ids: Vec<i64>,
    pub date: Option<NaiveDate>,
}

impl RequestArgs for ClientsInterestsArgs {
    fn shape() -> &'static RequestShape {
        &CLIENTS_INTERESTS
    }

    fn from_instance(instance: &RequestInstance<'_>) -> Self {
        Self {
            client_ids: instance.ids_value("client_ids").unwrap_or_default(),
            date: instance.date_value("date"),
        }
    }
}
