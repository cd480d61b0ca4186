use crate::entities::ProductStatus;
use crate::handlers::common::{
    created_response, deserialize_some, map_service_error, no_content_response,
    normalize_optional_string, require_non_blank, success_response, validate_input,
};
use crate::{
    errors::ApiError,
    models::ValueCandidate,
    services::products::{
        CreateProductInput, ProductListQuery, SetAttributeValueInput, UpdateProductInput,
    },
    AppState,
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Creates the router for product endpoints
pub fn products_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/values", post(set_attribute_value))
        .route("/:id/activate", post(activate_product))
        .route(
            "/:id",
            get(get_product)
                .patch(update_product)
                .delete(delete_product),
        )
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 64))]
    pub sku: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock_quantity: Option<i32>,
    pub status: Option<ProductStatus>,
    pub category_id: Uuid,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub sku: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub price: Option<Decimal>,
    pub stock_quantity: Option<i32>,
    pub status: Option<ProductStatus>,
    pub category_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListProductsParams {
    /// 1-based page number
    pub page: Option<u64>,
    /// Page size, clamped to the configured maximum
    pub limit: Option<u64>,
    pub category_id: Option<Uuid>,
    pub status: Option<ProductStatus>,
}

/// Body for setting one attribute value. `value` carries TEXT, NUMBER,
/// BOOLEAN and DATE values; ENUM attributes use `option_id` instead.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SetAttributeValueRequest {
    pub product_id: Uuid,
    pub attribute_id: Uuid,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub value: Option<Value>,
    #[serde(default)]
    pub option_id: Option<Uuid>,
}

/// Create a product
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = crate::entities::ProductModel),
        (status = 400, description = "Invalid payload or unknown category", body = crate::errors::ErrorResponse),
        (status = 409, description = "SKU already in use", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let CreateProductRequest {
        name,
        sku,
        description,
        price,
        stock_quantity,
        status,
        category_id,
        is_active,
    } = payload;

    let input = CreateProductInput {
        name: require_non_blank(name, "name")?,
        sku: require_non_blank(sku, "sku")?,
        description: normalize_optional_string(description),
        price,
        stock_quantity: stock_quantity.unwrap_or(0),
        status: status.unwrap_or_default(),
        category_id,
        is_active: is_active.unwrap_or(true),
    };

    let product = state
        .services
        .products
        .create(input)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(product))
}

/// List products with pagination
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(ListProductsParams),
    responses(
        (status = 200, description = "Products, newest first", body = crate::services::products::ProductPage)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ListProductsParams>,
) -> Result<impl IntoResponse, ApiError> {
    let ListProductsParams {
        page,
        limit,
        category_id,
        status,
    } = params;

    let page = state
        .services
        .products
        .list(ProductListQuery {
            page,
            limit,
            category_id,
            status,
        })
        .await
        .map_err(map_service_error)?;

    Ok(success_response(page))
}

/// Get a product with its category schema and stored values
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product retrieved", body = crate::services::products::ProductDetail),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .services
        .products
        .get(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(product))
}

/// Update a product. Status changes here are not gated.
#[utoipa::path(
    patch,
    path = "/api/v1/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = crate::entities::ProductModel),
        (status = 400, description = "Invalid payload or unknown category", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "SKU already in use", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let UpdateProductRequest {
        name,
        sku,
        description,
        price,
        stock_quantity,
        status,
        category_id,
        is_active,
    } = payload;

    let input = UpdateProductInput {
        name: name
            .map(|value| require_non_blank(value, "name"))
            .transpose()?,
        sku: sku
            .map(|value| require_non_blank(value, "sku"))
            .transpose()?,
        description: description.map(normalize_optional_string),
        price,
        stock_quantity,
        status,
        category_id,
        is_active,
    };

    let product = state
        .services
        .products
        .update(id, input)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(product))
}

/// Delete a product and its stored values
#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .products
        .remove(id)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}

/// Set (insert or replace) one attribute value on a product
#[utoipa::path(
    post,
    path = "/api/v1/products/values",
    request_body = SetAttributeValueRequest,
    responses(
        (status = 200, description = "Value stored", body = crate::services::products::StoredValue),
        (status = 400, description = "Value rejected or unknown product, attribute or option", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn set_attribute_value(
    State(state): State<AppState>,
    Json(payload): Json<SetAttributeValueRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let SetAttributeValueRequest {
        product_id,
        attribute_id,
        value,
        option_id,
    } = payload;

    let input = SetAttributeValueInput::new(
        product_id,
        attribute_id,
        ValueCandidate { value, option_id },
    );

    let stored = state
        .services
        .products
        .set_attribute_value(input)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(stored))
}

/// Activate a product once every required attribute has a value
#[utoipa::path(
    post,
    path = "/api/v1/products/{id}/activate",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product activated", body = crate::services::products::ProductDetail),
        (status = 400, description = "Required attributes are missing", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn activate_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .services
        .products
        .activate(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(product))
}
