//! Seed data script - populates the database with a small demo catalog
//!
//! Run with: cargo run --bin seed-data
//!
//! This creates:
//! - "Dresses" with Size (ENUM, XS-XL), Color (TEXT) and Length (NUMBER 20-60)
//! - "Shoes" with Size (ENUM, 6-11), Brand (TEXT) and Waterproof (BOOLEAN)
//! - One draft product per category with every attribute filled in
//!
//! Values go through the product service, so they are validated exactly like
//! values set over the API.

use anyhow::Context;
use rust_decimal_macros::dec;
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use catalog_admin::{
    config, db,
    entities::{AttrDataType, AttributeOptionModel},
    models::ValueCandidate,
    services::{
        attributes::{AttributeDefinition, AttributeService, DefineAttributeInput, DefineOptionInput},
        categories::{CategoryService, CreateCategoryInput},
        products::{CreateProductInput, ProductService, SetAttributeValueInput},
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = config::load_config().context("failed to load configuration")?;
    config::init_tracing(cfg.log_level(), cfg.log_json);

    info!("=== Catalog Admin Seed Data ===");

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| cfg.database_url.clone());
    let mut db_config = db::DbConfig::from(&cfg);
    db_config.url = database_url;

    info!("Connecting to database: {}", db_config.url);
    let conn = db::establish_connection_with_config(&db_config).await?;
    db::run_migrations(&conn).await?;
    let conn = Arc::new(conn);

    let seeder = Seeder {
        categories: CategoryService::new(conn.clone()),
        attributes: AttributeService::new(conn.clone()),
        products: ProductService::new(conn),
    };

    seed_dresses(&seeder).await?;
    seed_shoes(&seeder).await?;

    info!("Database seeded: categories Dresses and Shoes, 2 draft products");
    Ok(())
}

struct Seeder {
    categories: CategoryService,
    attributes: AttributeService,
    products: ProductService,
}

impl Seeder {
    async fn category(&self, name: &str, slug: &str, description: &str) -> anyhow::Result<Uuid> {
        let mut input = CreateCategoryInput::new(name, slug);
        input.description = Some(description.to_string());
        let category = self
            .categories
            .create(input)
            .await
            .with_context(|| format!("creating category {name}"))?;
        info!("  Created category {}", name);
        Ok(category.category.id)
    }

    async fn attribute(&self, input: DefineAttributeInput) -> anyhow::Result<AttributeDefinition> {
        let name = input.name.clone();
        self.attributes
            .define_attribute(input)
            .await
            .with_context(|| format!("defining attribute {name}"))
    }

    /// Adds `values` in order; the value at `default_index` is the default.
    async fn options(
        &self,
        attribute_id: Uuid,
        values: &[&str],
        default_index: usize,
    ) -> anyhow::Result<Vec<AttributeOptionModel>> {
        let mut options = Vec::with_capacity(values.len());
        for (index, value) in values.iter().enumerate() {
            let mut input = DefineOptionInput::new(attribute_id, *value);
            input.code = Some(value.to_lowercase());
            input.sort_order = index as i32 + 1;
            input.is_default = index == default_index;
            options.push(self.attributes.define_option(input).await?);
        }
        Ok(options)
    }

    async fn set(
        &self,
        product_id: Uuid,
        attribute_id: Uuid,
        candidate: ValueCandidate,
    ) -> anyhow::Result<()> {
        self.products
            .set_attribute_value(SetAttributeValueInput::new(
                product_id,
                attribute_id,
                candidate,
            ))
            .await?;
        Ok(())
    }
}

fn option_id(options: &[AttributeOptionModel], value: &str) -> anyhow::Result<Uuid> {
    options
        .iter()
        .find(|option| option.value == value)
        .map(|option| option.id)
        .with_context(|| format!("option {value} was not seeded"))
}

async fn seed_dresses(seeder: &Seeder) -> anyhow::Result<()> {
    let category_id = seeder
        .category("Dresses", "dresses", "Women's dresses and formal wear")
        .await?;

    let mut size = DefineAttributeInput::new(category_id, "Size", "size", AttrDataType::Enum);
    size.is_required = true;
    size.display_order = 1;
    let size = seeder.attribute(size).await?;

    let mut color = DefineAttributeInput::new(category_id, "Color", "color", AttrDataType::Text);
    color.is_required = true;
    color.display_order = 2;
    color.max_length = Some(50);
    let color = seeder.attribute(color).await?;

    let mut length = DefineAttributeInput::new(
        category_id,
        "Length (inches)",
        "length",
        AttrDataType::Number,
    );
    length.display_order = 3;
    length.min_number = Some(dec!(20));
    length.max_number = Some(dec!(60));
    let length = seeder.attribute(length).await?;

    let sizes = seeder
        .options(size.attribute.id, &["XS", "S", "M", "L", "XL"], 2)
        .await?;

    let mut dress = CreateProductInput::new(
        "Elegant Black Dress",
        "DRESS-BLK-001",
        dec!(129.99),
        category_id,
    );
    dress.description = Some("Classic black cocktail dress perfect for evening events".into());
    dress.stock_quantity = 15;
    let dress = seeder.products.create(dress).await?;

    seeder
        .set(
            dress.id,
            size.attribute.id,
            ValueCandidate::option(option_id(&sizes, "M")?),
        )
        .await?;
    seeder
        .set(dress.id, color.attribute.id, ValueCandidate::raw(json!("Black")))
        .await?;
    seeder
        .set(dress.id, length.attribute.id, ValueCandidate::raw(json!(42)))
        .await?;

    info!("  Created product {} with 3 values", dress.sku);
    Ok(())
}

async fn seed_shoes(seeder: &Seeder) -> anyhow::Result<()> {
    let category_id = seeder
        .category("Shoes", "shoes", "Footwear for all occasions")
        .await?;

    let mut size = DefineAttributeInput::new(category_id, "Size", "size", AttrDataType::Enum);
    size.is_required = true;
    size.display_order = 1;
    let size = seeder.attribute(size).await?;

    let mut brand = DefineAttributeInput::new(category_id, "Brand", "brand", AttrDataType::Text);
    brand.is_required = true;
    brand.display_order = 2;
    brand.max_length = Some(100);
    let brand = seeder.attribute(brand).await?;

    let mut waterproof = DefineAttributeInput::new(
        category_id,
        "Waterproof",
        "waterproof",
        AttrDataType::Boolean,
    );
    waterproof.display_order = 3;
    let waterproof = seeder.attribute(waterproof).await?;

    let sizes = seeder
        .options(size.attribute.id, &["6", "7", "8", "9", "10", "11"], 3)
        .await?;

    let mut shoes = CreateProductInput::new(
        "Athletic Running Shoes",
        "SHOE-RUN-001",
        dec!(89.99),
        category_id,
    );
    shoes.description = Some("Comfortable running shoes with excellent support".into());
    shoes.stock_quantity = 25;
    let shoes = seeder.products.create(shoes).await?;

    seeder
        .set(
            shoes.id,
            size.attribute.id,
            ValueCandidate::option(option_id(&sizes, "9")?),
        )
        .await?;
    seeder
        .set(shoes.id, brand.attribute.id, ValueCandidate::raw(json!("Nike")))
        .await?;
    seeder
        .set(
            shoes.id,
            waterproof.attribute.id,
            ValueCandidate::raw(json!(false)),
        )
        .await?;

    info!("  Created product {} with 3 values", shoes.sku);
    Ok(())
}
