//! Per-kind emptiness and validity rules.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

/// Oldest accepted birthday, in years of [`DAYS_PER_YEAR`] days.
pub const MAX_YEARS_FOR_BIRTHDAY: i64 = 70;

/// Fixed year length for the birthday window. No leap-year correction.
pub const DAYS_PER_YEAR: i64 = 365;

pub const PHONE_LENGTH: usize = 11;

const PHONE_PREFIX: char = '7';

static DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{2})\.(\d{2})\.(\d{4})$").expect("valid date pattern"));

/// The closed set of scalar domains a field can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Char,
    Arguments,
    Email,
    Phone,
    Date,
    BirthDay,
    Gender,
    ClientIds,
}

/// Why a present, non-empty value was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("not '{0}' type")]
    WrongType(&'static str),

    #[error("'@' not present")]
    MissingAt,

    #[error("not digit")]
    NotDigits,

    #[error("must be {} digits", PHONE_LENGTH)]
    PhoneLength,

    #[error("must start by '{}'", PHONE_PREFIX)]
    PhonePrefix,

    #[error("does not match 'DD.MM.YYYY' pattern")]
    DatePattern,

    #[error("not a calendar date")]
    NotCalendarDate,

    #[error("older than {} years", MAX_YEARS_FOR_BIRTHDAY)]
    TooOld,

    #[error("must be one of <0, 1, 2>")]
    UnknownGender,

    #[error("one or more elements not 'int' type")]
    NonIntegerId,

    #[error("one or more elements outside the signed 64-bit range")]
    IdOutOfRange,
}

impl FieldKind {
    /// Emptiness rule: true when the value counts as filled for this kind.
    pub fn is_filled(self, value: &Value) -> bool {
        match self {
            FieldKind::Char | FieldKind::Email | FieldKind::Date | FieldKind::BirthDay => {
                value.as_str().is_some_and(|s| !s.is_empty())
            }
            FieldKind::Arguments => value.as_object().is_some_and(|m| !m.is_empty()),
            FieldKind::Phone => is_integer(value) || value.as_str().is_some_and(|s| !s.is_empty()),
            FieldKind::Gender => value.as_i64().is_some(),
            FieldKind::ClientIds => value.as_array().is_some_and(|items| !items.is_empty()),
        }
    }

    /// Validity rule. `today` anchors the birthday window.
    pub fn check(self, value: &Value, today: NaiveDate) -> Result<(), FieldError> {
        match self {
            FieldKind::Char => expect_str(value).map(|_| ()),
            FieldKind::Arguments => {
                if value.is_object() {
                    Ok(())
                } else {
                    Err(FieldError::WrongType("dict"))
                }
            }
            FieldKind::Email => {
                if expect_str(value)?.contains('@') {
                    Ok(())
                } else {
                    Err(FieldError::MissingAt)
                }
            }
            FieldKind::Phone => check_phone(value),
            FieldKind::Date => parse_date(expect_str(value)?).map(|_| ()),
            FieldKind::BirthDay => {
                let date = parse_date(expect_str(value)?)?;
                let age_days = today.signed_duration_since(date).num_days();
                if age_days > MAX_YEARS_FOR_BIRTHDAY * DAYS_PER_YEAR {
                    Err(FieldError::TooOld)
                } else {
                    Ok(())
                }
            }
            FieldKind::Gender => {
                let raw = value.as_i64().ok_or(FieldError::WrongType("int"))?;
                Gender::try_from(raw).map(|_| ())
            }
            FieldKind::ClientIds => {
                let items = value.as_array().ok_or(FieldError::WrongType("list"))?;
                if !items.iter().all(is_integer) {
                    return Err(FieldError::NonIntegerId);
                }
                if items.iter().all(|item| item.as_i64().is_some()) {
                    Ok(())
                } else {
                    Err(FieldError::IdOutOfRange)
                }
            }
        }
    }
}

/// Parse a `DD.MM.YYYY` string into a calendar date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, FieldError> {
    let caps = DATE_PATTERN.captures(raw).ok_or(FieldError::DatePattern)?;
    let part = |i: usize| -> Result<u32, FieldError> {
        caps.get(i)
            .and_then(|m| m.as_str().parse().ok())
            .ok_or(FieldError::DatePattern)
    };
    let (day, month, year) = (part(1)?, part(2)?, part(3)?);
    let year = i32::try_from(year).map_err(|_| FieldError::NotCalendarDate)?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or(FieldError::NotCalendarDate)
}

/// Digits of a phone value, whether it arrived as a number or a string.
pub fn phone_digits(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        _ => None,
    }
}

fn check_phone(value: &Value) -> Result<(), FieldError> {
    let digits = phone_digits(value).ok_or(FieldError::WrongType("int, str"))?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(FieldError::NotDigits);
    }
    if digits.len() != PHONE_LENGTH {
        return Err(FieldError::PhoneLength);
    }
    if !digits.starts_with(PHONE_PREFIX) {
        return Err(FieldError::PhonePrefix);
    }
    Ok(())
}

fn expect_str(value: &Value) -> Result<&str, FieldError> {
    value.as_str().ok_or(FieldError::WrongType("str"))
}

// Booleans are not integers here, unlike in some JSON consumers.
fn is_integer(value: &Value) -> bool {
    matches!(value, Value::Number(n) if n.is_i64() || n.is_u64())
}

/// Gender codes accepted by the `Gender` kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Unknown = 0,
    Male = 1,
    Female = 2,
}

impl TryFrom<i64> for Gender {
    type Error = FieldError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Gender::Unknown),
            1 => Ok(Gender::Male),
            2 => Ok(Gender::Female),
            _ => Err(FieldError::UnknownGender),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_phone_accepts_string_and_number() {
        assert!(FieldKind::Phone.check(&json!("79991234567"), today()).is_ok());
        assert!(FieldKind::Phone.check(&json!(79991234567u64), today()).is_ok());
    }

    #[test]
    fn test_phone_rejections() {
        let check = |value: Value| FieldKind::Phone.check(&value, today());
        assert_eq!(check(json!("7999123456")), Err(FieldError::PhoneLength));
        assert_eq!(check(json!("799912345678")), Err(FieldError::PhoneLength));
        assert_eq!(check(json!("89991234567")), Err(FieldError::PhonePrefix));
        assert_eq!(check(json!(89991234567u64)), Err(FieldError::PhonePrefix));
        assert_eq!(check(json!("7999123456a")), Err(FieldError::NotDigits));
        assert_eq!(check(json!(-7999123456i64)), Err(FieldError::NotDigits));
        assert!(check(json!(7.9)).is_err());
        assert!(check(json!(true)).is_err());
    }

    #[test]
    fn test_date_formats() {
        let check = |value: Value| FieldKind::Date.check(&value, today());
        assert!(check(json!("21.04.2019")).is_ok());
        assert_eq!(check(json!("2019.04.01")), Err(FieldError::DatePattern));
        assert_eq!(check(json!("21-04-2019")), Err(FieldError::DatePattern));
        assert_eq!(check(json!("04/01/1999")), Err(FieldError::DatePattern));
        assert_eq!(check(json!("33.04.2019")), Err(FieldError::NotCalendarDate));
        assert_eq!(check(json!("29.02.2019")), Err(FieldError::NotCalendarDate));
        assert!(check(json!("29.02.2020")).is_ok());
    }

    #[test]
    fn test_birthday_window_uses_fixed_year_length() {
        let check = |value: Value| FieldKind::BirthDay.check(&value, today());
        let limit = today() - Duration::days(MAX_YEARS_FOR_BIRTHDAY * DAYS_PER_YEAR);
        let at_limit = json!(limit.format("%d.%m.%Y").to_string());
        let past_limit = json!((limit - Duration::days(1)).format("%d.%m.%Y").to_string());

        assert!(check(at_limit).is_ok());
        assert_eq!(check(past_limit), Err(FieldError::TooOld));
        assert!(check(json!("21.04.2000")).is_ok());
        assert_eq!(check(json!("21.04.1920")), Err(FieldError::TooOld));
    }

    #[test]
    fn test_gender_set() {
        let check = |value: Value| FieldKind::Gender.check(&value, today());
        for code in 0..=2 {
            assert!(check(json!(code)).is_ok());
        }
        assert_eq!(check(json!(5)), Err(FieldError::UnknownGender));
        assert_eq!(check(json!(-1)), Err(FieldError::UnknownGender));
        assert_eq!(check(json!("1")), Err(FieldError::WrongType("int")));
        assert_eq!(check(json!(true)), Err(FieldError::WrongType("int")));
    }

    #[test]
    fn test_client_ids() {
        let check = |value: Value| FieldKind::ClientIds.check(&value, today());
        assert!(check(json!([1, 2])).is_ok());
        assert!(check(json!([i64::MAX, i64::MIN])).is_ok());
        assert_eq!(check(json!(["1", "2"])), Err(FieldError::NonIntegerId));
        assert_eq!(check(json!([1, 1.5])), Err(FieldError::NonIntegerId));
        assert_eq!(check(json!(1)), Err(FieldError::WrongType("list")));
    }

    #[test]
    fn test_client_ids_beyond_i64_are_out_of_range() {
        let check = |value: Value| FieldKind::ClientIds.check(&value, today());
        assert_eq!(check(json!([u64::MAX])), Err(FieldError::IdOutOfRange));
        assert_eq!(check(json!([1, i64::MAX as u64 + 1])), Err(FieldError::IdOutOfRange));
        assert_eq!(check(json!([u64::MAX, "x"])), Err(FieldError::NonIntegerId));
    }

    #[test]
    fn test_emptiness_is_per_kind() {
        assert!(FieldKind::Phone.is_filled(&json!(0)));
        assert!(!FieldKind::Phone.is_filled(&json!("")));
        assert!(FieldKind::Gender.is_filled(&json!(0)));
        assert!(!FieldKind::Gender.is_filled(&json!("")));
        assert!(!FieldKind::Arguments.is_filled(&json!({})));
        assert!(!FieldKind::Arguments.is_filled(&json!("{'a': 1}")));
        assert!(!FieldKind::ClientIds.is_filled(&json!([])));
        assert!(!FieldKind::Char.is_filled(&json!(123)));
    }

    #[test]
    fn test_email_requires_at() {
        assert!(FieldKind::Email.check(&json!("q@q"), today()).is_ok());
        assert_eq!(FieldKind::Email.check(&json!("qqq"), today()), Err(FieldError::MissingAt));
        assert_eq!(FieldKind::Email.check(&json!(1), today()), Err(FieldError::WrongType("str")));
    }
}
