use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Selectable option of an ENUM attribute
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = AttributeOption)]
#[sea_orm(table_name = "attribute_options")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(column_name = "category_attribute_id")]
    pub attribute_id: Uuid,
    pub value: String,
    #[sea_orm(nullable)]
    pub code: Option<String>,
    pub sort_order: i32,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category_attribute::Entity",
        from = "Column::AttributeId",
        to = "super::category_attribute::Column::Id"
    )]
    Attribute,
}

impl Related<super::category_attribute::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attribute.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
