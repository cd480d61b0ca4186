use crate::{
    entities::{
        attribute_option, category_attribute, product_attribute_value, AttrDataType,
        AttributeOption, AttributeOptionModel, Category, CategoryAttribute,
        CategoryAttributeModel, ProductAttributeValue,
    },
    errors::ServiceError,
    services::attribute_validator::anchored_pattern,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Attribute schema registry: per-category attribute definitions and the
/// option sets of ENUM attributes.
#[derive(Clone)]
pub struct AttributeService {
    db: Arc<DatabaseConnection>,
}

impl AttributeService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Define a new attribute on an existing category
    #[instrument(skip(self))]
    pub async fn define_attribute(
        &self,
        input: DefineAttributeInput,
    ) -> Result<AttributeDefinition, ServiceError> {
        let category_exists = Category::find_by_id(input.category_id)
            .one(&*self.db)
            .await?
            .is_some();
        if !category_exists {
            return Err(ServiceError::ReferenceNotFound(format!(
                "Category {} not found",
                input.category_id
            )));
        }

        input.check_constraints()?;
        self.ensure_unique_slug(input.category_id, &input.slug)
            .await?;

        let attribute_id = Uuid::new_v4();
        let now = Utc::now();

        let attribute = category_attribute::ActiveModel {
            id: Set(attribute_id),
            category_id: Set(input.category_id),
            name: Set(input.name),
            slug: Set(input.slug),
            data_type: Set(input.data_type),
            is_required: Set(input.is_required),
            display_order: Set(input.display_order),
            min_number: Set(input.min_number),
            max_number: Set(input.max_number),
            regex: Set(input.regex),
            max_length: Set(input.max_length),
            hint: Set(input.hint),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let attribute = attribute.insert(&*self.db).await?;

        info!(
            "Defined {} attribute {} on category {}",
            attribute.data_type, attribute_id, attribute.category_id
        );
        Ok(AttributeDefinition {
            attribute,
            options: Vec::new(),
            usage_count: 0,
        })
    }

    /// Add an option to an ENUM attribute
    #[instrument(skip(self))]
    pub async fn define_option(
        &self,
        input: DefineOptionInput,
    ) -> Result<AttributeOptionModel, ServiceError> {
        let attribute = CategoryAttribute::find_by_id(input.attribute_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::ReferenceNotFound(format!(
                    "Attribute {} not found",
                    input.attribute_id
                ))
            })?;

        if attribute.data_type != AttrDataType::Enum {
            return Err(ServiceError::InvalidOperation(format!(
                "Options can only be added to ENUM attributes ('{}' is {})",
                attribute.name, attribute.data_type
            )));
        }

        let option = attribute_option::ActiveModel {
            id: Set(Uuid::new_v4()),
            attribute_id: Set(attribute.id),
            value: Set(input.value),
            code: Set(input.code),
            sort_order: Set(input.sort_order),
            is_default: Set(input.is_default),
            created_at: Set(Utc::now()),
        };

        let option = option.insert(&*self.db).await?;

        info!("Added option {} to attribute {}", option.id, attribute.id);
        Ok(option)
    }

    /// Definitions of a category ordered by display order, each with its options
    #[instrument(skip(self))]
    pub async fn list_by_category(
        &self,
        category_id: Uuid,
    ) -> Result<Vec<AttributeDefinition>, ServiceError> {
        load_definitions(&*self.db, category_id).await
    }

    #[instrument(skip(self))]
    pub async fn get_attribute(
        &self,
        attribute_id: Uuid,
    ) -> Result<AttributeDefinition, ServiceError> {
        let attribute = CategoryAttribute::find_by_id(attribute_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Attribute {} not found", attribute_id))
            })?;

        let options = AttributeOption::find()
            .filter(attribute_option::Column::AttributeId.eq(attribute_id))
            .order_by_asc(attribute_option::Column::SortOrder)
            .order_by_asc(attribute_option::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        let usage_count = ProductAttributeValue::find()
            .filter(product_attribute_value::Column::AttributeId.eq(attribute_id))
            .count(&*self.db)
            .await?;

        Ok(AttributeDefinition {
            attribute,
            options,
            usage_count,
        })
    }

    /// Delete an attribute and its options. Blocked while any product holds
    /// a value for it.
    #[instrument(skip(self))]
    pub async fn delete_attribute(&self, attribute_id: Uuid) -> Result<(), ServiceError> {
        let definition = self.get_attribute(attribute_id).await?;

        if definition.usage_count > 0 {
            warn!(
                attribute_id = %attribute_id,
                usage_count = definition.usage_count,
                "refusing to delete attribute in use"
            );
            return Err(ServiceError::InvalidOperation(format!(
                "Cannot delete attribute '{}': {} product value(s) reference it",
                definition.attribute.name, definition.usage_count
            )));
        }

        let txn = self.db.begin().await?;
        AttributeOption::delete_many()
            .filter(attribute_option::Column::AttributeId.eq(attribute_id))
            .exec(&txn)
            .await?;
        CategoryAttribute::delete_by_id(attribute_id)
            .exec(&txn)
            .await?;
        txn.commit().await?;

        info!("Deleted attribute {}", attribute_id);
        Ok(())
    }

    async fn ensure_unique_slug(&self, category_id: Uuid, slug: &str) -> Result<(), ServiceError> {
        let taken = CategoryAttribute::find()
            .filter(category_attribute::Column::CategoryId.eq(category_id))
            .filter(category_attribute::Column::Slug.eq(slug))
            .one(&*self.db)
            .await?
            .is_some();

        if taken {
            return Err(ServiceError::Conflict(format!(
                "Attribute slug {} already exists in category {}",
                slug, category_id
            )));
        }

        Ok(())
    }
}

/// Loads every definition of `category_id` with options and usage counts.
pub(crate) async fn load_definitions<C: ConnectionTrait>(
    db: &C,
    category_id: Uuid,
) -> Result<Vec<AttributeDefinition>, ServiceError> {
    let attributes = CategoryAttribute::find()
        .filter(category_attribute::Column::CategoryId.eq(category_id))
        .order_by_asc(category_attribute::Column::DisplayOrder)
        .order_by_asc(category_attribute::Column::CreatedAt)
        .all(db)
        .await?;

    if attributes.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = attributes.iter().map(|attribute| attribute.id).collect();

    let mut options_by_attribute: HashMap<Uuid, Vec<AttributeOptionModel>> = HashMap::new();
    for option in AttributeOption::find()
        .filter(attribute_option::Column::AttributeId.is_in(ids.clone()))
        .order_by_asc(attribute_option::Column::SortOrder)
        .order_by_asc(attribute_option::Column::CreatedAt)
        .all(db)
        .await?
    {
        options_by_attribute
            .entry(option.attribute_id)
            .or_default()
            .push(option);
    }

    let usage: HashMap<Uuid, i64> = ProductAttributeValue::find()
        .select_only()
        .column(product_attribute_value::Column::AttributeId)
        .column_as(
            Expr::col(product_attribute_value::Column::Id).count(),
            "usage_count",
        )
        .filter(product_attribute_value::Column::AttributeId.is_in(ids))
        .group_by(product_attribute_value::Column::AttributeId)
        .into_tuple::<(Uuid, i64)>()
        .all(db)
        .await?
        .into_iter()
        .collect();

    Ok(attributes
        .into_iter()
        .map(|attribute| AttributeDefinition {
            options: options_by_attribute
                .remove(&attribute.id)
                .unwrap_or_default(),
            usage_count: usage
                .get(&attribute.id)
                .map(|count| *count as u64)
                .unwrap_or(0),
            attribute,
        })
        .collect())
}

/// Input for defining an attribute
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefineAttributeInput {
    pub category_id: Uuid,
    pub name: String,
    pub slug: String,
    pub data_type: AttrDataType,
    pub is_required: bool,
    pub display_order: i32,
    pub min_number: Option<Decimal>,
    pub max_number: Option<Decimal>,
    pub regex: Option<String>,
    pub max_length: Option<i32>,
    pub hint: Option<String>,
}

impl DefineAttributeInput {
    /// Optional, unconstrained attribute with display order 0
    pub fn new(
        category_id: Uuid,
        name: impl Into<String>,
        slug: impl Into<String>,
        data_type: AttrDataType,
    ) -> Self {
        Self {
            category_id,
            name: name.into(),
            slug: slug.into(),
            data_type,
            is_required: false,
            display_order: 0,
            min_number: None,
            max_number: None,
            regex: None,
            max_length: None,
            hint: None,
        }
    }

    fn check_constraints(&self) -> Result<(), ServiceError> {
        if self.data_type == AttrDataType::Number {
            if let (Some(min), Some(max)) = (self.min_number, self.max_number) {
                if min > max {
                    return Err(ServiceError::InvalidConstraint(format!(
                        "minNumber ({}) cannot be greater than maxNumber ({})",
                        min, max
                    )));
                }
            }
        }

        if let Some(max_length) = self.max_length {
            if max_length < 0 {
                return Err(ServiceError::InvalidConstraint(format!(
                    "maxLength cannot be negative (got {})",
                    max_length
                )));
            }
        }

        if let Some(pattern) = self.regex.as_deref() {
            anchored_pattern(pattern).map_err(|err| {
                ServiceError::InvalidConstraint(format!(
                    "regex '{}' does not compile: {}",
                    pattern, err
                ))
            })?;
        }

        Ok(())
    }
}

/// Input for adding an option to an ENUM attribute
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefineOptionInput {
    pub attribute_id: Uuid,
    pub value: String,
    pub code: Option<String>,
    pub sort_order: i32,
    pub is_default: bool,
}

impl DefineOptionInput {
    pub fn new(attribute_id: Uuid, value: impl Into<String>) -> Self {
        Self {
            attribute_id,
            value: value.into(),
            code: None,
            sort_order: 0,
            is_default: false,
        }
    }
}

/// An attribute definition with its options and the number of stored
/// values referencing it
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AttributeDefinition {
    #[serde(flatten)]
    pub attribute: CategoryAttributeModel,
    pub options: Vec<AttributeOptionModel>,
    pub usage_count: u64,
}
