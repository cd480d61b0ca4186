use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Catalog Admin API",
        version = "1.0.0",
        description = r#"
# Catalog Admin API

Administration of an e-commerce catalog whose product schema is data:
categories form a tree, each category defines typed attributes, and
products carry values for the attributes of their category.

## Attribute values

Values are validated against the attribute definition when they are set:

- `TEXT`: string, optional `max_length` and `regex` (whole value must match)
- `NUMBER`: number or numeric string, optional `min_number` / `max_number`
- `BOOLEAN`: `true` or `false`
- `DATE`: RFC 3339 timestamp or `YYYY-MM-DD`
- `ENUM`: `option_id` of one of the attribute's options

A product can only be activated through `POST /products/{id}/activate`
once every required attribute of its category has a value.

## Error Handling

```json
{
  "error": "Bad Request",
  "code": "incomplete_attributes",
  "message": "Missing required attributes: Size",
  "fields": ["Size"],
  "request_id": "8f4e...",
  "timestamp": "2024-01-01T00:00:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Categories", description = "Category tree endpoints"),
        (name = "Attributes", description = "Attribute schema endpoints"),
        (name = "Products", description = "Product lifecycle and attribute value endpoints")
    ),
    paths(
        // Categories
        crate::handlers::categories::create_category,
        crate::handlers::categories::list_categories,
        crate::handlers::categories::get_category,
        crate::handlers::categories::update_category,
        crate::handlers::categories::delete_category,

        // Attributes
        crate::handlers::attributes::define_attribute,
        crate::handlers::attributes::define_option,
        crate::handlers::attributes::list_category_attributes,
        crate::handlers::attributes::get_attribute,
        crate::handlers::attributes::delete_attribute,

        // Products
        crate::handlers::products::create_product,
        crate::handlers::products::list_products,
        crate::handlers::products::get_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,
        crate::handlers::products::set_attribute_value,
        crate::handlers::products::activate_product,
    ),
    components(
        schemas(
            // Entities
            crate::entities::CategoryModel,
            crate::entities::CategoryAttributeModel,
            crate::entities::AttributeOptionModel,
            crate::entities::ProductModel,
            crate::entities::ProductAttributeValueModel,
            crate::entities::AttrDataType,
            crate::entities::ProductStatus,
            crate::models::AttributeValue,

            // Category types
            crate::handlers::categories::CreateCategoryRequest,
            crate::handlers::categories::UpdateCategoryRequest,
            crate::services::categories::CategorySummary,
            crate::services::categories::CategoryCounts,
            crate::services::categories::CategoryDetail,

            // Attribute types
            crate::handlers::attributes::DefineAttributeRequest,
            crate::handlers::attributes::DefineOptionRequest,
            crate::services::attributes::AttributeDefinition,

            // Product types
            crate::handlers::products::CreateProductRequest,
            crate::handlers::products::UpdateProductRequest,
            crate::handlers::products::SetAttributeValueRequest,
            crate::services::products::ProductDetail,
            crate::services::products::ProductCategory,
            crate::services::products::StoredValue,
            crate::services::products::ProductListItem,
            crate::services::products::ProductPage,
            crate::services::products::PageMeta,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
