//! Data type rules for attribute values.
//!
//! Everything here is pure: the caller resolves the ENUM option (if any)
//! beforehand, so the rules can be exercised without a database.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

use crate::entities::{attribute_option, category_attribute, AttrDataType};
use crate::models::{AttributeValue, ValidatedValue, ValueCandidate};

/// The rule a rejected value broke
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ValueRule {
    TypeMismatch,
    MaxLength,
    Pattern,
    MinNumber,
    MaxNumber,
    NumberOutOfRange,
    InvalidDate,
    MissingOption,
    ForeignOption,
}

/// Why a candidate value was rejected for an attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error, ToSchema)]
#[error("{attribute}: {message}")]
pub struct ValidationFailure {
    /// Name of the attribute the value was meant for
    pub attribute: String,
    pub rule: ValueRule,
    pub message: String,
}

impl ValidationFailure {
    fn new(attribute: &category_attribute::Model, rule: ValueRule, message: String) -> Self {
        Self {
            attribute: attribute.name.clone(),
            rule,
            message,
        }
    }
}

/// Compiles a stored pattern so that it must match the whole value.
pub fn anchored_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{})$", pattern))
}

/// Checks `candidate` against `attribute` and returns the typed value.
///
/// `option` is the option referenced by `candidate.option_id`, as found by
/// the caller; `None` when there is no such option.
pub fn validate_value(
    attribute: &category_attribute::Model,
    candidate: &ValueCandidate,
    option: Option<&attribute_option::Model>,
) -> Result<ValidatedValue, ValidationFailure> {
    let value = match attribute.data_type {
        AttrDataType::Text => validate_text(attribute, candidate.value.as_ref())?,
        AttrDataType::Number => validate_number(attribute, candidate.value.as_ref())?,
        AttrDataType::Boolean => match candidate.value.as_ref() {
            Some(JsonValue::Bool(flag)) => AttributeValue::Boolean(*flag),
            _ => {
                return Err(ValidationFailure::new(
                    attribute,
                    ValueRule::TypeMismatch,
                    "Value must be a boolean for BOOLEAN attribute".to_string(),
                ))
            }
        },
        AttrDataType::Date => validate_date(attribute, candidate.value.as_ref())?,
        AttrDataType::Enum => validate_option(attribute, candidate, option)?,
    };

    Ok(ValidatedValue::new(attribute.id, value))
}

fn validate_text(
    attribute: &category_attribute::Model,
    value: Option<&JsonValue>,
) -> Result<AttributeValue, ValidationFailure> {
    let text = match value {
        Some(JsonValue::String(text)) => text,
        _ => {
            return Err(ValidationFailure::new(
                attribute,
                ValueRule::TypeMismatch,
                "Value must be a string for TEXT attribute".to_string(),
            ))
        }
    };

    if let Some(max_length) = attribute.max_length {
        let limit = usize::try_from(max_length).unwrap_or(0);
        let length = text.chars().count();
        if length > limit {
            return Err(ValidationFailure::new(
                attribute,
                ValueRule::MaxLength,
                format!(
                    "Value exceeds maximum length of {} (got {})",
                    max_length, length
                ),
            ));
        }
    }

    if let Some(pattern) = attribute.regex.as_deref() {
        let regex = anchored_pattern(pattern).map_err(|_| {
            ValidationFailure::new(
                attribute,
                ValueRule::Pattern,
                format!("Pattern '{}' is not a valid regular expression", pattern),
            )
        })?;
        if !regex.is_match(text) {
            return Err(ValidationFailure::new(
                attribute,
                ValueRule::Pattern,
                format!("Value does not match required pattern '{}'", pattern),
            ));
        }
    }

    Ok(AttributeValue::Text(text.clone()))
}

fn validate_number(
    attribute: &category_attribute::Model,
    value: Option<&JsonValue>,
) -> Result<AttributeValue, ValidationFailure> {
    let number = match value.map(coerce_number) {
        Some(Coerced::Number(number)) => number,
        Some(Coerced::OutOfRange(raw)) => {
            return Err(ValidationFailure::new(
                attribute,
                ValueRule::NumberOutOfRange,
                format!(
                    "Value {} is outside the supported numeric range (up to 28 significant digits)",
                    raw
                ),
            ))
        }
        Some(Coerced::NotNumeric) | None => {
            return Err(ValidationFailure::new(
                attribute,
                ValueRule::TypeMismatch,
                "Value must be a number for NUMBER attribute".to_string(),
            ))
        }
    };

    if let Some(min) = attribute.min_number {
        if number < min {
            return Err(ValidationFailure::new(
                attribute,
                ValueRule::MinNumber,
                format!("Value must be at least {} (got {})", min, number),
            ));
        }
    }

    if let Some(max) = attribute.max_number {
        if number > max {
            return Err(ValidationFailure::new(
                attribute,
                ValueRule::MaxNumber,
                format!("Value must be at most {} (got {})", max, number),
            ));
        }
    }

    Ok(AttributeValue::Number(number))
}

enum Coerced {
    Number(Decimal),
    /// Finite and numeric, but beyond what `Decimal` holds
    OutOfRange(String),
    NotNumeric,
}

/// JSON numbers and numeric strings are accepted; nothing else coerces.
fn coerce_number(value: &JsonValue) -> Coerced {
    let raw = match value {
        JsonValue::Number(number) => number.to_string(),
        JsonValue::String(text) => text.trim().to_string(),
        _ => return Coerced::NotNumeric,
    };
    if raw.is_empty() {
        return Coerced::NotNumeric;
    }

    match Decimal::from_str(&raw).or_else(|_| Decimal::from_scientific(&raw)) {
        Ok(number) => Coerced::Number(number),
        Err(_) => match raw.parse::<f64>() {
            Ok(float) if float.is_finite() => Coerced::OutOfRange(raw),
            _ => Coerced::NotNumeric,
        },
    }
}

fn validate_date(
    attribute: &category_attribute::Model,
    value: Option<&JsonValue>,
) -> Result<AttributeValue, ValidationFailure> {
    value
        .and_then(JsonValue::as_str)
        .and_then(parse_date)
        .map(AttributeValue::Date)
        .ok_or_else(|| {
            ValidationFailure::new(
                attribute,
                ValueRule::InvalidDate,
                "Value must be a valid date (RFC 3339 timestamp or YYYY-MM-DD) for DATE attribute"
                    .to_string(),
            )
        })
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

fn validate_option(
    attribute: &category_attribute::Model,
    candidate: &ValueCandidate,
    option: Option<&attribute_option::Model>,
) -> Result<AttributeValue, ValidationFailure> {
    let Some(option_id) = candidate.option_id else {
        return Err(ValidationFailure::new(
            attribute,
            ValueRule::MissingOption,
            "optionId is required for ENUM attribute".to_string(),
        ));
    };

    match option {
        Some(option) if option.id == option_id && option.attribute_id == attribute.id => {
            Ok(AttributeValue::Enum(option.id))
        }
        _ => Err(ValidationFailure::new(
            attribute,
            ValueRule::ForeignOption,
            format!("Option {} is not an option of this attribute", option_id),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use uuid::Uuid;

    fn attribute(data_type: AttrDataType) -> category_attribute::Model {
        let now = Utc::now();
        category_attribute::Model {
            id: Uuid::new_v4(),
            category_id: Uuid::new_v4(),
            name: "Attr".to_string(),
            slug: "attr".to_string(),
            data_type,
            is_required: false,
            display_order: 0,
            min_number: None,
            max_number: None,
            regex: None,
            max_length: None,
            hint: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn option_of(attribute_id: Uuid) -> attribute_option::Model {
        attribute_option::Model {
            id: Uuid::new_v4(),
            attribute_id,
            value: "M".to_string(),
            code: Some("m".to_string()),
            sort_order: 3,
            is_default: true,
            created_at: Utc::now(),
        }
    }

    fn rule_of(result: Result<ValidatedValue, ValidationFailure>) -> ValueRule {
        result.expect_err("value should be rejected").rule
    }

    #[rstest]
    #[case(json!(12))]
    #[case(json!(true))]
    #[case(json!(null))]
    #[case(json!(["a"]))]
    fn text_requires_a_string(#[case] raw: JsonValue) {
        let attr = attribute(AttrDataType::Text);
        assert_eq!(
            rule_of(validate_value(&attr, &ValueCandidate::raw(raw), None)),
            ValueRule::TypeMismatch
        );
    }

    #[test]
    fn text_max_length_counts_characters() {
        let mut attr = attribute(AttrDataType::Text);
        attr.max_length = Some(5);

        let accepted = validate_value(&attr, &ValueCandidate::raw(json!("crème")), None).unwrap();
        assert_eq!(accepted.value(), &AttributeValue::Text("crème".into()));
        assert_eq!(accepted.attribute_id(), attr.id);

        let failure =
            validate_value(&attr, &ValueCandidate::raw(json!("crèmes")), None).unwrap_err();
        assert_eq!(failure.rule, ValueRule::MaxLength);
        assert!(failure.message.contains("maximum length of 5"));
        assert_eq!(failure.attribute, "Attr");
    }

    #[test]
    fn text_pattern_must_match_whole_value() {
        let mut attr = attribute(AttrDataType::Text);
        attr.regex = Some("[A-Z]{3}".to_string());

        assert!(validate_value(&attr, &ValueCandidate::raw(json!("ABC")), None).is_ok());
        assert_eq!(
            rule_of(validate_value(&attr, &ValueCandidate::raw(json!("xABCx")), None)),
            ValueRule::Pattern
        );
    }

    #[test]
    fn broken_stored_pattern_rejects_instead_of_panicking() {
        let mut attr = attribute(AttrDataType::Text);
        attr.regex = Some("([".to_string());
        assert_eq!(
            rule_of(validate_value(&attr, &ValueCandidate::raw(json!("x")), None)),
            ValueRule::Pattern
        );
    }

    #[rstest]
    #[case(json!(42), dec!(42))]
    #[case(json!(20), dec!(20))]
    #[case(json!(60), dec!(60))]
    #[case(json!(" 33.5 "), dec!(33.5))]
    #[case(json!(4.25e1), dec!(42.5))]
    fn number_within_bounds_is_accepted(#[case] raw: JsonValue, #[case] expected: Decimal) {
        let mut attr = attribute(AttrDataType::Number);
        attr.min_number = Some(dec!(20));
        attr.max_number = Some(dec!(60));

        let accepted = validate_value(&attr, &ValueCandidate::raw(raw), None).unwrap();
        assert_eq!(accepted.into_value(), AttributeValue::Number(expected));
    }

    #[rstest]
    #[case(json!(15), ValueRule::MinNumber)]
    #[case(json!(60.01), ValueRule::MaxNumber)]
    #[case(json!("abc"), ValueRule::TypeMismatch)]
    #[case(json!(""), ValueRule::TypeMismatch)]
    #[case(json!(true), ValueRule::TypeMismatch)]
    #[case(json!(null), ValueRule::TypeMismatch)]
    #[case(json!(1e300), ValueRule::NumberOutOfRange)]
    #[case(json!("-4.5e40"), ValueRule::NumberOutOfRange)]
    #[case(json!("NaN"), ValueRule::TypeMismatch)]
    #[case(json!("inf"), ValueRule::TypeMismatch)]
    fn number_rejections(#[case] raw: JsonValue, #[case] rule: ValueRule) {
        let mut attr = attribute(AttrDataType::Number);
        attr.min_number = Some(dec!(20));
        attr.max_number = Some(dec!(60));

        assert_eq!(
            rule_of(validate_value(&attr, &ValueCandidate::raw(raw), None)),
            rule
        );
    }

    #[test]
    fn number_without_bounds_accepts_negatives() {
        let attr = attribute(AttrDataType::Number);
        assert!(validate_value(&attr, &ValueCandidate::raw(json!(-7)), None).is_ok());
    }

    #[rstest]
    #[case(json!("true"))]
    #[case(json!(1))]
    #[case(json!(null))]
    fn boolean_is_strict(#[case] raw: JsonValue) {
        let attr = attribute(AttrDataType::Boolean);
        assert_eq!(
            rule_of(validate_value(&attr, &ValueCandidate::raw(raw), None)),
            ValueRule::TypeMismatch
        );
    }

    #[test]
    fn boolean_accepts_false() {
        let attr = attribute(AttrDataType::Boolean);
        let accepted = validate_value(&attr, &ValueCandidate::raw(json!(false)), None).unwrap();
        assert_eq!(accepted.into_value(), AttributeValue::Boolean(false));
    }

    #[rstest]
    #[case("2024-03-01T10:30:00Z")]
    #[case("2024-03-01T10:30:00+02:00")]
    #[case("2024-03-01")]
    fn date_accepts_timestamps_and_calendar_dates(#[case] raw: &str) {
        let attr = attribute(AttrDataType::Date);
        let accepted = validate_value(&attr, &ValueCandidate::raw(json!(raw)), None).unwrap();
        assert_matches!(accepted.value(), AttributeValue::Date(_));
    }

    #[test]
    fn calendar_date_is_stored_as_utc_midnight() {
        let attr = attribute(AttrDataType::Date);
        let accepted =
            validate_value(&attr, &ValueCandidate::raw(json!("2024-02-29")), None).unwrap();
        assert_eq!(
            accepted.into_value(),
            AttributeValue::Date("2024-02-29T00:00:00Z".parse().unwrap())
        );
    }

    #[rstest]
    #[case(json!("2023-02-30"))]
    #[case(json!("yesterday"))]
    #[case(json!(1700000000))]
    fn date_rejections(#[case] raw: JsonValue) {
        let attr = attribute(AttrDataType::Date);
        assert_eq!(
            rule_of(validate_value(&attr, &ValueCandidate::raw(raw), None)),
            ValueRule::InvalidDate
        );
    }

    #[test]
    fn enum_requires_an_option_id() {
        let attr = attribute(AttrDataType::Enum);
        assert_eq!(
            rule_of(validate_value(&attr, &ValueCandidate::raw(json!("M")), None)),
            ValueRule::MissingOption
        );
    }

    #[test]
    fn enum_accepts_own_option_and_ignores_raw_value() {
        let attr = attribute(AttrDataType::Enum);
        let option = option_of(attr.id);
        let candidate = ValueCandidate {
            value: Some(json!(123)),
            option_id: Some(option.id),
        };

        let accepted = validate_value(&attr, &candidate, Some(&option)).unwrap();
        assert_eq!(accepted.into_value(), AttributeValue::Enum(option.id));
    }

    #[test]
    fn enum_rejects_option_of_another_attribute() {
        let attr = attribute(AttrDataType::Enum);
        let foreign = option_of(Uuid::new_v4());

        assert_eq!(
            rule_of(validate_value(
                &attr,
                &ValueCandidate::option(foreign.id),
                Some(&foreign)
            )),
            ValueRule::ForeignOption
        );
        assert_eq!(
            rule_of(validate_value(
                &attr,
                &ValueCandidate::option(Uuid::new_v4()),
                None
            )),
            ValueRule::ForeignOption
        );
    }

    #[test]
    fn constraints_of_other_types_are_ignored() {
        let mut attr = attribute(AttrDataType::Boolean);
        attr.max_length = Some(1);
        attr.min_number = Some(dec!(100));
        assert!(validate_value(&attr, &ValueCandidate::raw(json!(true)), None).is_ok());
    }

    #[test]
    fn failure_display_names_attribute() {
        let failure = ValidationFailure {
            attribute: "Length".into(),
            rule: ValueRule::MinNumber,
            message: "Value must be at least 20 (got 15)".into(),
        };
        assert_eq!(failure.to_string(), "Length: Value must be at least 20 (got 15)");
        assert_eq!(failure.rule.to_string(), "min_number");
    }
}
