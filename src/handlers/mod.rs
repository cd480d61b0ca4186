pub mod attributes;
pub mod categories;
pub mod common;
pub mod products;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::services::{
    attributes::AttributeService, categories::CategoryService, products::ProductService,
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub categories: Arc<CategoryService>,
    pub attributes: Arc<AttributeService>,
    pub products: Arc<ProductService>,
}

impl AppServices {
    /// Build the services with default paging and sample sizes.
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self {
            categories: Arc::new(CategoryService::new(db_pool.clone())),
            attributes: Arc::new(AttributeService::new(db_pool.clone())),
            products: Arc::new(ProductService::new(db_pool)),
        }
    }

    /// Build the services with the page sizes and sample sizes from `config`.
    pub fn from_config(db_pool: Arc<DbPool>, config: &AppConfig) -> Self {
        let categories = CategoryService::new(db_pool.clone())
            .with_recent_products_limit(u64::from(config.recent_products_limit));
        let products = ProductService::new(db_pool.clone()).with_page_sizes(
            u64::from(config.api_default_page_size),
            u64::from(config.api_max_page_size),
        );

        Self {
            categories: Arc::new(categories),
            attributes: Arc::new(AttributeService::new(db_pool)),
            products: Arc::new(products),
        }
    }
}
