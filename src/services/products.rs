use crate::{
    entities::{
        attribute_option, category, category_attribute, product, product_attribute_value,
        AttrDataType, AttributeOption, AttributeOptionModel, Category, CategoryAttribute,
        CategoryAttributeModel, CategoryModel, Product, ProductAttributeValue,
        ProductAttributeValueModel, ProductModel, ProductStatus,
    },
    errors::ServiceError,
    models::{AttributeValue, ValueCandidate},
    services::{
        attribute_validator::validate_value,
        attributes::{load_definitions, AttributeDefinition},
    },
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

const DEFAULT_LIMIT: u64 = 20;
const MAX_LIMIT: u64 = 100;

/// Product lifecycle manager: product CRUD, attribute value upserts and the
/// draft to active activation gate.
#[derive(Clone)]
pub struct ProductService {
    db: Arc<DatabaseConnection>,
    default_limit: u64,
    max_limit: u64,
}

impl ProductService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
        }
    }

    /// Overrides the page size used when `list` gets no limit and the cap
    /// applied to explicit limits.
    pub fn with_page_sizes(mut self, default_limit: u64, max_limit: u64) -> Self {
        self.max_limit = max_limit.max(1);
        self.default_limit = default_limit.clamp(1, self.max_limit);
        self
    }

    /// Create a product in an existing category
    #[instrument(skip(self))]
    pub async fn create(&self, input: CreateProductInput) -> Result<ProductModel, ServiceError> {
        ensure_non_negative_price(input.price)?;
        ensure_non_negative_stock(input.stock_quantity)?;
        self.ensure_category_exists(input.category_id).await?;
        self.ensure_unique_sku(&input.sku, None).await?;

        let product_id = Uuid::new_v4();
        let now = Utc::now();

        let product = product::ActiveModel {
            id: Set(product_id),
            name: Set(input.name),
            sku: Set(input.sku),
            description: Set(input.description),
            price: Set(input.price),
            stock_quantity: Set(input.stock_quantity),
            status: Set(input.status),
            category_id: Set(input.category_id),
            is_active: Set(input.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let product = product.insert(&*self.db).await?;

        info!("Created product: {}", product_id);
        Ok(product)
    }

    /// Product with its category schema and every stored value
    #[instrument(skip(self))]
    pub async fn get(&self, product_id: Uuid) -> Result<ProductDetail, ServiceError> {
        let product = self.find(product_id).await?;

        let category = Category::find_by_id(product.category_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::InternalError(format!(
                    "Category {} of product {} is missing",
                    product.category_id, product_id
                ))
            })?;
        let attributes = load_definitions(&*self.db, category.id).await?;

        let records = ProductAttributeValue::find()
            .filter(product_attribute_value::Column::ProductId.eq(product_id))
            .all(&*self.db)
            .await?;
        let values = self.attach(records).await?;

        Ok(ProductDetail {
            product,
            category: ProductCategory {
                category,
                attributes,
            },
            values,
        })
    }

    /// One page of products, newest first
    #[instrument(skip(self))]
    pub async fn list(&self, query: ProductListQuery) -> Result<ProductPage, ServiceError> {
        let mut db_query = Product::find();

        if let Some(category_id) = query.category_id {
            db_query = db_query.filter(product::Column::CategoryId.eq(category_id));
        }
        if let Some(status) = query.status {
            db_query = db_query.filter(product::Column::Status.eq(status));
        }

        let total = db_query.clone().count(&*self.db).await?;

        let page = query.page.unwrap_or(1).max(1);
        let limit = query
            .limit
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit);
        let offset = page_offset(page, limit)?;

        let products = db_query
            .order_by_desc(product::Column::CreatedAt)
            .order_by_asc(product::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(&*self.db)
            .await?;

        let category_ids: Vec<Uuid> = products
            .iter()
            .map(|product| product.category_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let categories: HashMap<Uuid, CategoryModel> = Category::find()
            .filter(category::Column::Id.is_in(category_ids))
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|category| (category.id, category))
            .collect();

        let product_ids: Vec<Uuid> = products.iter().map(|product| product.id).collect();
        let value_counts: HashMap<Uuid, i64> = ProductAttributeValue::find()
            .select_only()
            .column(product_attribute_value::Column::ProductId)
            .column_as(
                Expr::col(product_attribute_value::Column::Id).count(),
                "value_count",
            )
            .filter(product_attribute_value::Column::ProductId.is_in(product_ids))
            .group_by(product_attribute_value::Column::ProductId)
            .into_tuple::<(Uuid, i64)>()
            .all(&*self.db)
            .await?
            .into_iter()
            .collect();

        let data = products
            .into_iter()
            .map(|product| ProductListItem {
                category: categories.get(&product.category_id).cloned(),
                value_count: value_counts
                    .get(&product.id)
                    .map(|count| *count as u64)
                    .unwrap_or(0),
                product,
            })
            .collect();

        Ok(ProductPage {
            data,
            meta: PageMeta::new(page, limit, total),
        })
    }

    /// Partially update a product. Status changes here skip the activation
    /// gate; stored values are kept when the category changes.
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        product_id: Uuid,
        input: UpdateProductInput,
    ) -> Result<ProductModel, ServiceError> {
        let existing = self.find(product_id).await?;

        if let Some(price) = input.price {
            ensure_non_negative_price(price)?;
        }
        if let Some(stock_quantity) = input.stock_quantity {
            ensure_non_negative_stock(stock_quantity)?;
        }
        if let Some(category_id) = input.category_id {
            self.ensure_category_exists(category_id).await?;
        }
        if let Some(ref sku) = input.sku {
            self.ensure_unique_sku(sku, Some(product_id)).await?;
        }

        let mut active: product::ActiveModel = existing.into();

        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(sku) = input.sku {
            active.sku = Set(sku);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(price) = input.price {
            active.price = Set(price);
        }
        if let Some(stock_quantity) = input.stock_quantity {
            active.stock_quantity = Set(stock_quantity);
        }
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        if let Some(category_id) = input.category_id {
            active.category_id = Set(category_id);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());

        let product = active.update(&*self.db).await?;

        info!("Updated product: {}", product_id);
        Ok(product)
    }

    /// Delete a product together with its stored values
    #[instrument(skip(self))]
    pub async fn remove(&self, product_id: Uuid) -> Result<(), ServiceError> {
        self.find(product_id).await?;

        let txn = self.db.begin().await?;
        let removed = ProductAttributeValue::delete_many()
            .filter(product_attribute_value::Column::ProductId.eq(product_id))
            .exec(&txn)
            .await?;
        Product::delete_by_id(product_id).exec(&txn).await?;
        txn.commit().await?;

        info!(
            "Deleted product {} and {} attribute value(s)",
            product_id, removed.rows_affected
        );
        Ok(())
    }

    /// Validate a candidate value and store it as the product's value for
    /// the attribute, replacing any previous value.
    #[instrument(skip(self))]
    pub async fn set_attribute_value(
        &self,
        input: SetAttributeValueInput,
    ) -> Result<StoredValue, ServiceError> {
        let product = Product::find_by_id(input.product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::ReferenceNotFound(format!("Product {} not found", input.product_id))
            })?;

        let attribute = CategoryAttribute::find_by_id(input.attribute_id)
            .one(&*self.db)
            .await?
            .filter(|attribute| attribute.category_id == product.category_id)
            .ok_or_else(|| {
                ServiceError::ReferenceNotFound(format!(
                    "Attribute {} not found in category {}",
                    input.attribute_id, product.category_id
                ))
            })?;

        let option = match (attribute.data_type, input.candidate.option_id) {
            (AttrDataType::Enum, Some(option_id)) => Some(
                AttributeOption::find_by_id(option_id)
                    .one(&*self.db)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::ReferenceNotFound(format!(
                            "Option {} not found",
                            option_id
                        ))
                    })?,
            ),
            _ => None,
        };

        let validated = validate_value(&attribute, &input.candidate, option.as_ref())?;
        let slots = validated.value().slots();
        let now = Utc::now();

        let record = product_attribute_value::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product.id),
            attribute_id: Set(validated.attribute_id()),
            value_text: Set(slots.value_text),
            value_number: Set(slots.value_number),
            value_bool: Set(slots.value_bool),
            value_date: Set(slots.value_date),
            option_id: Set(slots.option_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        ProductAttributeValue::insert(record)
            .on_conflict(
                OnConflict::columns([
                    product_attribute_value::Column::ProductId,
                    product_attribute_value::Column::AttributeId,
                ])
                .update_columns([
                    product_attribute_value::Column::ValueText,
                    product_attribute_value::Column::ValueNumber,
                    product_attribute_value::Column::ValueBool,
                    product_attribute_value::Column::ValueDate,
                    product_attribute_value::Column::OptionId,
                    product_attribute_value::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec_without_returning(&*self.db)
            .await?;

        let record = ProductAttributeValue::find()
            .filter(product_attribute_value::Column::ProductId.eq(product.id))
            .filter(product_attribute_value::Column::AttributeId.eq(attribute.id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::InternalError(format!(
                    "Value of attribute {} for product {} vanished after upsert",
                    attribute.id, product.id
                ))
            })?;

        info!(
            "Set {} value of attribute {} on product {}",
            attribute.data_type, attribute.id, product.id
        );
        Ok(StoredValue::new(record, attribute, option))
    }

    /// Move a product to ACTIVE once every required attribute of its
    /// category has a stored value.
    #[instrument(skip(self))]
    pub async fn activate(&self, product_id: Uuid) -> Result<ProductDetail, ServiceError> {
        let product = self.find(product_id).await?;

        let required = CategoryAttribute::find()
            .filter(category_attribute::Column::CategoryId.eq(product.category_id))
            .filter(category_attribute::Column::IsRequired.eq(true))
            .order_by_asc(category_attribute::Column::DisplayOrder)
            .order_by_asc(category_attribute::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        let present: HashSet<Uuid> = ProductAttributeValue::find()
            .select_only()
            .column(product_attribute_value::Column::AttributeId)
            .filter(product_attribute_value::Column::ProductId.eq(product_id))
            .into_tuple::<Uuid>()
            .all(&*self.db)
            .await?
            .into_iter()
            .collect();

        let missing: Vec<String> = required
            .into_iter()
            .filter(|attribute| !present.contains(&attribute.id))
            .map(|attribute| attribute.name)
            .collect();

        if !missing.is_empty() {
            warn!(
                product_id = %product_id,
                missing = ?missing,
                "activation blocked by missing required attributes"
            );
            return Err(ServiceError::IncompleteAttributes(missing));
        }

        let mut active: product::ActiveModel = product.into();
        active.status = Set(ProductStatus::Active);
        active.updated_at = Set(Utc::now());
        active.update(&*self.db).await?;

        info!("Activated product: {}", product_id);
        self.get(product_id).await
    }

    async fn find(&self, product_id: Uuid) -> Result<ProductModel, ServiceError> {
        Product::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))
    }

    /// Pairs stored rows with their attribute and option, in display order.
    async fn attach(
        &self,
        records: Vec<ProductAttributeValueModel>,
    ) -> Result<Vec<StoredValue>, ServiceError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let attribute_ids: Vec<Uuid> = records.iter().map(|record| record.attribute_id).collect();
        let attributes: HashMap<Uuid, CategoryAttributeModel> = CategoryAttribute::find()
            .filter(category_attribute::Column::Id.is_in(attribute_ids))
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|attribute| (attribute.id, attribute))
            .collect();

        let option_ids: Vec<Uuid> = records.iter().filter_map(|record| record.option_id).collect();
        let mut options: HashMap<Uuid, AttributeOptionModel> = HashMap::new();
        if !option_ids.is_empty() {
            options = AttributeOption::find()
                .filter(attribute_option::Column::Id.is_in(option_ids))
                .all(&*self.db)
                .await?
                .into_iter()
                .map(|option| (option.id, option))
                .collect();
        }

        let mut values = Vec::with_capacity(records.len());
        for record in records {
            let attribute = attributes.get(&record.attribute_id).cloned().ok_or_else(|| {
                ServiceError::InternalError(format!(
                    "Attribute {} of stored value {} is missing",
                    record.attribute_id, record.id
                ))
            })?;
            let option = record.option_id.and_then(|id| options.get(&id).cloned());
            values.push(StoredValue::new(record, attribute, option));
        }

        values.sort_by(|a, b| {
            (a.attribute.display_order, a.attribute.created_at)
                .cmp(&(b.attribute.display_order, b.attribute.created_at))
        });
        Ok(values)
    }

    async fn ensure_category_exists(&self, category_id: Uuid) -> Result<(), ServiceError> {
        Category::find_by_id(category_id)
            .one(&*self.db)
            .await?
            .map(|_| ())
            .ok_or_else(|| {
                ServiceError::ReferenceNotFound(format!("Category {} not found", category_id))
            })
    }

    async fn ensure_unique_sku(
        &self,
        sku: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let mut query = Product::find().filter(product::Column::Sku.eq(sku));
        if let Some(id) = exclude_id {
            query = query.filter(product::Column::Id.ne(id));
        }

        if query.one(&*self.db).await?.is_some() {
            return Err(ServiceError::Conflict(format!("SKU {} already exists", sku)));
        }

        Ok(())
    }
}

/// Rows to skip for a 1-based `page`; the result must fit a signed 64-bit
/// SQL OFFSET.
fn page_offset(page: u64, limit: u64) -> Result<u64, ServiceError> {
    (page - 1)
        .checked_mul(limit)
        .filter(|offset| i64::try_from(*offset).is_ok())
        .ok_or_else(|| {
            ServiceError::InvalidInput(format!(
                "page {} is out of range for a page size of {}",
                page, limit
            ))
        })
}

fn ensure_non_negative_price(price: Decimal) -> Result<(), ServiceError> {
    if price < Decimal::ZERO {
        return Err(ServiceError::InvalidInput(format!(
            "price cannot be negative (got {})",
            price
        )));
    }
    Ok(())
}

fn ensure_non_negative_stock(stock_quantity: i32) -> Result<(), ServiceError> {
    if stock_quantity < 0 {
        return Err(ServiceError::InvalidInput(format!(
            "stock_quantity cannot be negative (got {})",
            stock_quantity
        )));
    }
    Ok(())
}

/// Input for creating a product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub status: ProductStatus,
    pub category_id: Uuid,
    pub is_active: bool,
}

impl CreateProductInput {
    /// Active draft product with no stock and no description
    pub fn new(
        name: impl Into<String>,
        sku: impl Into<String>,
        price: Decimal,
        category_id: Uuid,
    ) -> Self {
        Self {
            name: name.into(),
            sku: sku.into(),
            description: None,
            price,
            stock_quantity: 0,
            status: ProductStatus::Draft,
            category_id,
            is_active: true,
        }
    }
}

/// Partial product update; `description: Some(None)` clears the description
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub description: Option<Option<String>>,
    pub price: Option<Decimal>,
    pub stock_quantity: Option<i32>,
    pub status: Option<ProductStatus>,
    pub category_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

/// Filters and paging for `list`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub category_id: Option<Uuid>,
    pub status: Option<ProductStatus>,
}

/// Input for setting one attribute value on a product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetAttributeValueInput {
    pub product_id: Uuid,
    pub attribute_id: Uuid,
    #[serde(flatten)]
    pub candidate: ValueCandidate,
}

impl SetAttributeValueInput {
    pub fn new(product_id: Uuid, attribute_id: Uuid, candidate: ValueCandidate) -> Self {
        Self {
            product_id,
            attribute_id,
            candidate,
        }
    }
}

/// A stored value row with the attribute it belongs to and the chosen
/// option for ENUM attributes. `value` is the typed reading of the row.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct StoredValue {
    #[serde(flatten)]
    pub record: ProductAttributeValueModel,
    pub value: Option<AttributeValue>,
    pub attribute: CategoryAttributeModel,
    pub option: Option<AttributeOptionModel>,
}

impl StoredValue {
    fn new(
        record: ProductAttributeValueModel,
        attribute: CategoryAttributeModel,
        option: Option<AttributeOptionModel>,
    ) -> Self {
        Self {
            value: AttributeValue::from_record(&record, attribute.data_type),
            record,
            attribute,
            option,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ProductCategory {
    #[serde(flatten)]
    pub category: CategoryModel,
    pub attributes: Vec<AttributeDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: ProductModel,
    pub category: ProductCategory,
    pub values: Vec<StoredValue>,
}

impl ProductDetail {
    pub fn value_of(&self, attribute_id: Uuid) -> Option<&StoredValue> {
        self.values
            .iter()
            .find(|stored| stored.record.attribute_id == attribute_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ProductListItem {
    #[serde(flatten)]
    pub product: ProductModel,
    pub category: Option<CategoryModel>,
    pub value_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PageMeta {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl PageMeta {
    pub fn new(page: u64, limit: u64, total: u64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + limit - 1) / limit
        };
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ProductPage {
    pub data: Vec<ProductListItem>,
    pub meta: PageMeta,
}
