use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Stored value of one attribute for one product.
///
/// `(product_id, category_attribute_id)` is unique. Exactly one of the value
/// columns is populated, the one matching the attribute's data type; rows are
/// only written from a `ValidatedValue`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = ProductAttributeValue)]
#[sea_orm(table_name = "product_attribute_values")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub product_id: Uuid,
    #[sea_orm(column_name = "category_attribute_id")]
    pub attribute_id: Uuid,
    #[sea_orm(nullable)]
    pub value_text: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))", nullable)]
    pub value_number: Option<Decimal>,
    #[sea_orm(nullable)]
    pub value_bool: Option<bool>,
    #[sea_orm(nullable)]
    pub value_date: Option<DateTime<Utc>>,
    #[sea_orm(nullable)]
    pub option_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,

    #[sea_orm(
        belongs_to = "super::category_attribute::Entity",
        from = "Column::AttributeId",
        to = "super::category_attribute::Column::Id"
    )]
    Attribute,

    #[sea_orm(
        belongs_to = "super::attribute_option::Entity",
        from = "Column::OptionId",
        to = "super::attribute_option::Column::Id"
    )]
    SelectedOption,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::category_attribute::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attribute.def()
    }
}

impl Related<super::attribute_option::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SelectedOption.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
