use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{product_attribute_value, AttrDataType};

/// A typed attribute value. The variant always matches the data type of the
/// attribute it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttributeValue {
    Text(String),
    Number(Decimal),
    Boolean(bool),
    Date(DateTime<Utc>),
    /// Reference to an option of the owning ENUM attribute
    Enum(Uuid),
}

impl AttributeValue {
    pub fn data_type(&self) -> AttrDataType {
        match self {
            Self::Text(_) => AttrDataType::Text,
            Self::Number(_) => AttrDataType::Number,
            Self::Boolean(_) => AttrDataType::Boolean,
            Self::Date(_) => AttrDataType::Date,
            Self::Enum(_) => AttrDataType::Enum,
        }
    }

    pub fn option_id(&self) -> Option<Uuid> {
        match self {
            Self::Enum(id) => Some(*id),
            _ => None,
        }
    }

    /// Column layout for persistence: the slot for this variant is set and
    /// every other slot is `None`.
    pub(crate) fn slots(&self) -> ValueSlots {
        let mut slots = ValueSlots::default();
        match self {
            Self::Text(text) => slots.value_text = Some(text.clone()),
            Self::Number(number) => slots.value_number = Some(*number),
            Self::Boolean(flag) => slots.value_bool = Some(*flag),
            Self::Date(date) => slots.value_date = Some(*date),
            Self::Enum(option_id) => slots.option_id = Some(*option_id),
        }
        slots
    }

    /// Reads the slot selected by `data_type` from a stored row.
    ///
    /// Returns `None` when that slot is empty.
    pub fn from_record(
        record: &product_attribute_value::Model,
        data_type: AttrDataType,
    ) -> Option<Self> {
        match data_type {
            AttrDataType::Text => record.value_text.clone().map(Self::Text),
            AttrDataType::Number => record.value_number.map(Self::Number),
            AttrDataType::Boolean => record.value_bool.map(Self::Boolean),
            AttrDataType::Date => record.value_date.map(Self::Date),
            AttrDataType::Enum => record.option_id.map(Self::Enum),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ValueSlots {
    pub value_text: Option<String>,
    pub value_number: Option<Decimal>,
    pub value_bool: Option<bool>,
    pub value_date: Option<DateTime<Utc>>,
    pub option_id: Option<Uuid>,
}

/// Untyped input for an attribute value: a raw JSON value and, for ENUM
/// attributes, the id of the chosen option.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ValueCandidate {
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub value: Option<JsonValue>,
    #[serde(default)]
    pub option_id: Option<Uuid>,
}

impl ValueCandidate {
    pub fn raw(value: JsonValue) -> Self {
        Self {
            value: Some(value),
            option_id: None,
        }
    }

    pub fn option(option_id: Uuid) -> Self {
        Self {
            value: None,
            option_id: Some(option_id),
        }
    }
}

/// A value that passed validation against a specific attribute definition.
///
/// Only `services::attribute_validator` can build one, so every stored value
/// went through the data type rules first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedValue {
    attribute_id: Uuid,
    value: AttributeValue,
}

impl ValidatedValue {
    pub(crate) fn new(attribute_id: Uuid, value: AttributeValue) -> Self {
        Self {
            attribute_id,
            value,
        }
    }

    pub fn attribute_id(&self) -> Uuid {
        self.attribute_id
    }

    pub fn value(&self) -> &AttributeValue {
        &self.value
    }

    pub fn into_value(self) -> AttributeValue {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn record(slots: ValueSlots) -> product_attribute_value::Model {
        let now = Utc::now();
        product_attribute_value::Model {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            attribute_id: Uuid::new_v4(),
            value_text: slots.value_text,
            value_number: slots.value_number,
            value_bool: slots.value_bool,
            value_date: slots.value_date,
            option_id: slots.option_id,
            created_at: now,
            updated_at: now,
        }
    }

    fn populated(slots: &ValueSlots) -> usize {
        [
            slots.value_text.is_some(),
            slots.value_number.is_some(),
            slots.value_bool.is_some(),
            slots.value_date.is_some(),
            slots.option_id.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }

    #[test]
    fn each_variant_populates_exactly_its_own_slot() {
        let values = vec![
            AttributeValue::Text("Black".into()),
            AttributeValue::Number(dec!(42)),
            AttributeValue::Boolean(false),
            AttributeValue::Date(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()),
            AttributeValue::Enum(Uuid::new_v4()),
        ];

        for value in values {
            let slots = value.slots();
            assert_eq!(populated(&slots), 1, "{:?}", value);

            let stored = record(slots);
            assert_eq!(
                AttributeValue::from_record(&stored, value.data_type()),
                Some(value.clone())
            );
        }
    }

    #[test]
    fn reading_with_another_data_type_finds_nothing() {
        let stored = record(AttributeValue::Text("Nike".into()).slots());
        assert_eq!(AttributeValue::from_record(&stored, AttrDataType::Number), None);
        assert_eq!(AttributeValue::from_record(&stored, AttrDataType::Enum), None);
    }

    #[test]
    fn option_id_only_for_enum_values() {
        let id = Uuid::new_v4();
        assert_eq!(AttributeValue::Enum(id).option_id(), Some(id));
        assert_eq!(AttributeValue::Boolean(true).option_id(), None);
    }

    #[test]
    fn serializes_with_data_type_tag() {
        let json = serde_json::to_value(AttributeValue::Boolean(true)).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "BOOLEAN", "value": true }));
    }
}
