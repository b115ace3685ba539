//! Arguments of the `online_score` method.

use chrono::NaiveDate;
use once_cell::sync::Lazy;

use crate::fields::{FieldKind, FieldSpec, Gender, ValidationResult};
use crate::requests::shape::{RequestInstance, RequestShape};
use crate::requests::RequestArgs;

static ONLINE_SCORE: Lazy<RequestShape> = Lazy::new(|| {
    RequestShape::builder("online_score")
        .field(FieldSpec::new("first_name", FieldKind::Char).nullable())
        .field(FieldSpec::new("last_name", FieldKind::Char).nullable())
        .field(FieldSpec::new("email", FieldKind::Email).nullable())
        .field(FieldSpec::new("phone", FieldKind::Phone).nullable())
        .field(FieldSpec::new("birthday", FieldKind::BirthDay).nullable())
        .field(FieldSpec::new("gender", FieldKind::Gender).nullable())
        .build()
});

/// At least one of these pairs must have both members set.
pub const REQUIRED_PAIRS: [(&str, &str); 3] = [
    ("phone", "email"),
    ("first_name", "last_name"),
    ("gender", "birthday"),
];

pub const MISSING_PAIR_REASON: &str = "One or more value pairs must be present: \
     'phone - email' or 'first_name - last_name' or 'gender - birthday'";

/// Identity fields used to compute a score.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnlineScoreArgs {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub gender: Option<Gender>,
}

impl RequestArgs for OnlineScoreArgs {
    fn shape() -> &'static RequestShape {
        &ONLINE_SCORE
    }

    fn cross_validate(instance: &RequestInstance<'_>) -> ValidationResult {
        let has_pair = REQUIRED_PAIRS
            .iter()
            .any(|(a, b)| instance.is_set(a) && instance.is_set(b));
        if has_pair {
            ValidationResult::valid()
        } else {
            ValidationResult::invalid(MISSING_PAIR_REASON)
        }
    }

    fn from_instance(instance: &RequestInstance<'_>) -> Self {
        let text = |name: &str| instance.str_value(name).map(str::to_string);
        Self {
            first_name: text("first_name"),
            last_name: text("last_name"),
            email: text("email"),
            phone: instance.phone_value("phone"),
            birthday: instance.date_value("birthday"),
            gender: instance
                .int_value("gender")
                .and_then(|raw| Gender::try_from(raw).ok()),
        }
    }
}
