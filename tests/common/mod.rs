#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use catalog_admin::{
    config::AppConfig,
    db::{self, DbConfig},
    entities::{AttrDataType, AttributeOptionModel, ProductModel},
    services::{
        attributes::{AttributeDefinition, DefineAttributeInput, DefineOptionInput},
        categories::CreateCategoryInput,
        products::CreateProductInput,
    },
    AppState,
};
use rust_decimal_macros::dec;
use serde_json::Value;
use tower::ServiceExt;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

/// Helper harness for spinning up an application state backed by an
/// in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Construct a new test application with a fresh, migrated database.
    pub async fn new() -> Self {
        let cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );

        // In-memory SQLite lives inside a single connection
        let db_config = DbConfig::single_connection(cfg.database_url.clone());
        Self::build(cfg, &db_config).await
    }

    /// Test application on a SQLite file behind a pool of several
    /// connections, so requests can really run side by side.
    pub async fn on_file(path: &std::path::Path, max_connections: u32) -> Self {
        let cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", path.display()),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        let db_config = DbConfig {
            max_connections,
            ..DbConfig::single_connection(cfg.database_url.clone())
        };
        Self::build(cfg, &db_config).await
    }

    async fn build(cfg: AppConfig, db_config: &DbConfig) -> Self {
        let pool = db::establish_connection_with_config(db_config)
            .await
            .expect("failed to create test database");

        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg);
        let router = catalog_admin::app_router(state.clone(), CorsLayer::permissive());

        Self { router, state }
    }

    /// Send a request against the router.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// GET with a single extra header.
    pub async fn router_request_with_header(
        &self,
        uri: &str,
        name: &str,
        value: &str,
    ) -> axum::response::Response {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(name, value)
            .body(Body::empty())
            .expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Sends a request and returns the status with the decoded JSON body
    /// (`Value::Null` for empty bodies).
    pub async fn request_json(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let response = self.request(method, uri, body).await;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body is not JSON")
        };
        (status, json)
    }

    pub async fn create_category(&self, name: &str, slug: &str) -> Uuid {
        self.state
            .services
            .categories
            .create(CreateCategoryInput::new(name, slug))
            .await
            .expect("seed category")
            .category
            .id
    }

    pub async fn create_child_category(&self, name: &str, slug: &str, parent_id: Uuid) -> Uuid {
        self.state
            .services
            .categories
            .create(CreateCategoryInput::new(name, slug).under(parent_id))
            .await
            .expect("seed child category")
            .category
            .id
    }

    pub async fn define_attribute(&self, input: DefineAttributeInput) -> AttributeDefinition {
        self.state
            .services
            .attributes
            .define_attribute(input)
            .await
            .expect("seed attribute")
    }

    pub async fn define_options(&self, attribute_id: Uuid, values: &[&str]) -> Vec<AttributeOptionModel> {
        let mut options = Vec::new();
        for (index, value) in values.iter().enumerate() {
            let mut input = DefineOptionInput::new(attribute_id, *value);
            input.sort_order = index as i32 + 1;
            options.push(
                self.state
                    .services
                    .attributes
                    .define_option(input)
                    .await
                    .expect("seed option"),
            );
        }
        options
    }

    pub async fn create_product(&self, sku: &str, category_id: Uuid) -> ProductModel {
        self.state
            .services
            .products
            .create(CreateProductInput::new(
                format!("Product {sku}"),
                sku,
                dec!(100),
                category_id,
            ))
            .await
            .expect("seed product")
    }

    /// The "Dresses" catalog: required ENUM Size (XS..XL), optional TEXT
    /// Color (max 50 chars) and optional NUMBER Length (20..=60).
    pub async fn dresses(&self) -> Dresses {
        let category_id = self.create_category("Dresses", "dresses").await;

        let mut size = DefineAttributeInput::new(category_id, "Size", "size", AttrDataType::Enum);
        size.is_required = true;
        size.display_order = 1;
        let size = self.define_attribute(size).await;

        let mut color =
            DefineAttributeInput::new(category_id, "Color", "color", AttrDataType::Text);
        color.display_order = 2;
        color.max_length = Some(50);
        let color = self.define_attribute(color).await;

        let mut length =
            DefineAttributeInput::new(category_id, "Length", "length", AttrDataType::Number);
        length.display_order = 3;
        length.min_number = Some(dec!(20));
        length.max_number = Some(dec!(60));
        let length = self.define_attribute(length).await;

        let sizes = self
            .define_options(size.attribute.id, &["XS", "S", "M", "L", "XL"])
            .await;

        Dresses {
            category_id,
            size,
            color,
            length,
            sizes,
        }
    }
}

pub struct Dresses {
    pub category_id: Uuid,
    pub size: AttributeDefinition,
    pub color: AttributeDefinition,
    pub length: AttributeDefinition,
    pub sizes: Vec<AttributeOptionModel>,
}

impl Dresses {
    pub fn size_option(&self, value: &str) -> Uuid {
        self.sizes
            .iter()
            .find(|option| option.value == value)
            .map(|option| option.id)
            .expect("unknown size")
    }
}
