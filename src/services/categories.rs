use crate::{
    entities::{
        attribute_option, category, category_attribute, product, AttributeOption, Category,
        CategoryAttribute, CategoryModel, Product, ProductModel,
    },
    errors::ServiceError,
    services::attributes::{load_definitions, AttributeDefinition},
};
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Number of products sampled into a category detail view.
pub const DEFAULT_RECENT_PRODUCTS_LIMIT: u64 = 10;

/// Category tree manager
#[derive(Clone)]
pub struct CategoryService {
    db: Arc<DatabaseConnection>,
    recent_products_limit: u64,
}

impl CategoryService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            recent_products_limit: DEFAULT_RECENT_PRODUCTS_LIMIT,
        }
    }

    pub fn with_recent_products_limit(mut self, limit: u64) -> Self {
        self.recent_products_limit = limit;
        self
    }

    /// Create a category, optionally under an existing parent
    #[instrument(skip(self))]
    pub async fn create(&self, input: CreateCategoryInput) -> Result<CategorySummary, ServiceError> {
        if let Some(parent_id) = input.parent_id {
            self.ensure_parent_exists(parent_id).await?;
        }
        self.ensure_unique_slug(&input.slug, None).await?;

        let category_id = Uuid::new_v4();
        let now = Utc::now();

        let category = category::ActiveModel {
            id: Set(category_id),
            name: Set(input.name),
            slug: Set(input.slug),
            description: Set(input.description),
            parent_id: Set(input.parent_id),
            is_active: Set(input.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let category = category.insert(&*self.db).await?;

        info!("Created category: {}", category_id);
        self.summarize(category).await
    }

    /// Partially update a category
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        category_id: Uuid,
        input: UpdateCategoryInput,
    ) -> Result<CategorySummary, ServiceError> {
        let existing = self.find(category_id).await?;

        if let Some(Some(parent_id)) = input.parent_id {
            if parent_id == category_id {
                return Err(ServiceError::InvalidOperation(
                    "A category cannot be its own parent".to_string(),
                ));
            }
            self.ensure_parent_exists(parent_id).await?;
        }
        if let Some(ref slug) = input.slug {
            self.ensure_unique_slug(slug, Some(category_id)).await?;
        }

        let mut active: category::ActiveModel = existing.into();

        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(slug) = input.slug {
            active.slug = Set(slug);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(parent_id) = input.parent_id {
            active.parent_id = Set(parent_id);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());

        let category = active.update(&*self.db).await?;

        info!("Updated category: {}", category_id);
        self.summarize(category).await
    }

    /// Delete a category that has neither child categories nor products.
    /// Its attribute definitions and their options are deleted with it.
    #[instrument(skip(self))]
    pub async fn delete(&self, category_id: Uuid) -> Result<(), ServiceError> {
        self.find(category_id).await?;

        let children = Category::find()
            .filter(category::Column::ParentId.eq(category_id))
            .count(&*self.db)
            .await?;
        let products = Product::find()
            .filter(product::Column::CategoryId.eq(category_id))
            .count(&*self.db)
            .await?;

        if children > 0 || products > 0 {
            warn!(
                category_id = %category_id,
                children,
                products,
                "refusing to delete category with dependents"
            );
            return Err(ServiceError::InvalidOperation(format!(
                "Cannot delete category with {} subcategories and {} products",
                children, products
            )));
        }

        // Attribute definitions belong to the category and go with it.
        let attribute_ids: Vec<Uuid> = CategoryAttribute::find()
            .select_only()
            .column(category_attribute::Column::Id)
            .filter(category_attribute::Column::CategoryId.eq(category_id))
            .into_tuple()
            .all(&*self.db)
            .await?;

        let txn = self.db.begin().await?;
        if !attribute_ids.is_empty() {
            AttributeOption::delete_many()
                .filter(attribute_option::Column::AttributeId.is_in(attribute_ids))
                .exec(&txn)
                .await?;
            CategoryAttribute::delete_many()
                .filter(category_attribute::Column::CategoryId.eq(category_id))
                .exec(&txn)
                .await?;
        }
        Category::delete_by_id(category_id).exec(&txn).await?;
        txn.commit().await?;

        info!("Deleted category: {}", category_id);
        Ok(())
    }

    /// Category with parent, children, counts, attribute definitions and the
    /// most recently created products
    #[instrument(skip(self))]
    pub async fn get(&self, category_id: Uuid) -> Result<CategoryDetail, ServiceError> {
        let category = self.find(category_id).await?;
        let summary = self.summarize(category).await?;

        let attributes = load_definitions(&*self.db, category_id).await?;
        let recent_products = Product::find()
            .filter(product::Column::CategoryId.eq(category_id))
            .order_by_desc(product::Column::CreatedAt)
            .limit(self.recent_products_limit)
            .all(&*self.db)
            .await?;

        Ok(CategoryDetail {
            summary,
            attributes,
            recent_products,
        })
    }

    /// All categories ordered by name
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<CategorySummary>, ServiceError> {
        let categories = Category::find()
            .order_by_asc(category::Column::Name)
            .all(&*self.db)
            .await?;

        let attribute_counts: HashMap<Uuid, i64> = CategoryAttribute::find()
            .select_only()
            .column(category_attribute::Column::CategoryId)
            .column_as(Expr::col(category_attribute::Column::Id).count(), "count")
            .group_by(category_attribute::Column::CategoryId)
            .into_tuple::<(Uuid, i64)>()
            .all(&*self.db)
            .await?
            .into_iter()
            .collect();

        let product_counts: HashMap<Uuid, i64> = Product::find()
            .select_only()
            .column(product::Column::CategoryId)
            .column_as(Expr::col(product::Column::Id).count(), "count")
            .group_by(product::Column::CategoryId)
            .into_tuple::<(Uuid, i64)>()
            .all(&*self.db)
            .await?
            .into_iter()
            .collect();

        let by_id: HashMap<Uuid, CategoryModel> = categories
            .iter()
            .map(|category| (category.id, category.clone()))
            .collect();
        let mut children_of: HashMap<Uuid, Vec<CategoryModel>> = HashMap::new();
        for category in &categories {
            if let Some(parent_id) = category.parent_id {
                children_of
                    .entry(parent_id)
                    .or_default()
                    .push(category.clone());
            }
        }

        Ok(categories
            .into_iter()
            .map(|category| {
                let children = children_of.remove(&category.id).unwrap_or_default();
                let counts = CategoryCounts {
                    children: children.len() as u64,
                    attributes: count_of(&attribute_counts, category.id),
                    products: count_of(&product_counts, category.id),
                };
                CategorySummary {
                    parent: category
                        .parent_id
                        .and_then(|parent_id| by_id.get(&parent_id).cloned()),
                    children,
                    counts,
                    category,
                }
            })
            .collect())
    }

    async fn find(&self, category_id: Uuid) -> Result<CategoryModel, ServiceError> {
        Category::find_by_id(category_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Category {} not found", category_id)))
    }

    async fn summarize(&self, category: CategoryModel) -> Result<CategorySummary, ServiceError> {
        let parent = match category.parent_id {
            Some(parent_id) => Category::find_by_id(parent_id).one(&*self.db).await?,
            None => None,
        };

        let children = Category::find()
            .filter(category::Column::ParentId.eq(category.id))
            .order_by_asc(category::Column::Name)
            .all(&*self.db)
            .await?;

        let attributes = CategoryAttribute::find()
            .filter(category_attribute::Column::CategoryId.eq(category.id))
            .count(&*self.db)
            .await?;
        let products = Product::find()
            .filter(product::Column::CategoryId.eq(category.id))
            .count(&*self.db)
            .await?;

        Ok(CategorySummary {
            counts: CategoryCounts {
                children: children.len() as u64,
                attributes,
                products,
            },
            parent,
            children,
            category,
        })
    }

    async fn ensure_parent_exists(&self, parent_id: Uuid) -> Result<(), ServiceError> {
        Category::find_by_id(parent_id)
            .one(&*self.db)
            .await?
            .map(|_| ())
            .ok_or_else(|| {
                ServiceError::ReferenceNotFound(format!(
                    "Parent category {} not found",
                    parent_id
                ))
            })
    }

    async fn ensure_unique_slug(
        &self,
        slug: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let mut query = Category::find().filter(category::Column::Slug.eq(slug));
        if let Some(id) = exclude_id {
            query = query.filter(category::Column::Id.ne(id));
        }

        if query.one(&*self.db).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Category slug {} already exists",
                slug
            )));
        }

        Ok(())
    }
}

fn count_of(counts: &HashMap<Uuid, i64>, id: Uuid) -> u64 {
    counts.get(&id).map(|count| *count as u64).unwrap_or(0)
}

/// Input for creating a category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategoryInput {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub is_active: bool,
}

impl CreateCategoryInput {
    /// Active root category without description
    pub fn new(name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
            description: None,
            parent_id: None,
            is_active: true,
        }
    }

    pub fn under(mut self, parent_id: Uuid) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

/// Partial category update. For the nullable fields the outer `Option` says
/// whether the field is touched and the inner one is the new value, so
/// `parent_id: Some(None)` moves the category to the root.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCategoryInput {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<Option<String>>,
    pub parent_id: Option<Option<Uuid>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct CategoryCounts {
    pub children: u64,
    pub attributes: u64,
    pub products: u64,
}

/// A category with its direct neighbours in the tree and aggregate counts
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CategorySummary {
    #[serde(flatten)]
    pub category: CategoryModel,
    pub parent: Option<CategoryModel>,
    pub children: Vec<CategoryModel>,
    pub counts: CategoryCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CategoryDetail {
    #[serde(flatten)]
    pub summary: CategorySummary,
    pub attributes: Vec<AttributeDefinition>,
    pub recent_products: Vec<ProductModel>,
}
