use crate::entities::AttrDataType;
use crate::handlers::common::{
    created_response, map_service_error, no_content_response, normalize_optional_string,
    require_non_blank, success_response, validate_input,
};
use crate::{
    errors::ApiError,
    services::attributes::{DefineAttributeInput, DefineOptionInput},
    AppState,
};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Creates the router for attribute schema endpoints
pub fn attributes_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(define_attribute))
        .route("/options", post(define_option))
        .route("/category/:category_id", get(list_category_attributes))
        .route("/:id", get(get_attribute).delete(delete_attribute))
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct DefineAttributeRequest {
    pub category_id: Uuid,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 255))]
    pub slug: String,
    pub data_type: AttrDataType,
    pub is_required: Option<bool>,
    pub display_order: Option<i32>,
    pub min_number: Option<Decimal>,
    pub max_number: Option<Decimal>,
    pub regex: Option<String>,
    pub max_length: Option<i32>,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct DefineOptionRequest {
    pub attribute_id: Uuid,
    #[validate(length(min = 1, max = 255))]
    pub value: String,
    #[validate(length(max = 64))]
    pub code: Option<String>,
    pub sort_order: Option<i32>,
    pub is_default: Option<bool>,
}

/// Define an attribute on a category
#[utoipa::path(
    post,
    path = "/api/v1/attributes",
    request_body = DefineAttributeRequest,
    responses(
        (status = 201, description = "Attribute defined", body = crate::services::attributes::AttributeDefinition),
        (status = 400, description = "Invalid payload, constraint or unknown category", body = crate::errors::ErrorResponse),
        (status = 409, description = "Slug already used in this category", body = crate::errors::ErrorResponse)
    ),
    tag = "Attributes"
)]
pub async fn define_attribute(
    State(state): State<AppState>,
    Json(payload): Json<DefineAttributeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let DefineAttributeRequest {
        category_id,
        name,
        slug,
        data_type,
        is_required,
        display_order,
        min_number,
        max_number,
        regex,
        max_length,
        hint,
    } = payload;

    let input = DefineAttributeInput {
        category_id,
        name: require_non_blank(name, "name")?,
        slug: require_non_blank(slug, "slug")?,
        data_type,
        is_required: is_required.unwrap_or(false),
        display_order: display_order.unwrap_or(0),
        min_number,
        max_number,
        // Patterns are stored exactly as given; whitespace may be significant
        regex: regex.filter(|pattern| !pattern.is_empty()),
        max_length,
        hint: normalize_optional_string(hint),
    };

    let attribute = state
        .services
        .attributes
        .define_attribute(input)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(attribute))
}

/// Add an option to an ENUM attribute
#[utoipa::path(
    post,
    path = "/api/v1/attributes/options",
    request_body = DefineOptionRequest,
    responses(
        (status = 201, description = "Option defined", body = crate::entities::AttributeOptionModel),
        (status = 400, description = "Unknown attribute or attribute is not an ENUM", body = crate::errors::ErrorResponse)
    ),
    tag = "Attributes"
)]
pub async fn define_option(
    State(state): State<AppState>,
    Json(payload): Json<DefineOptionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let DefineOptionRequest {
        attribute_id,
        value,
        code,
        sort_order,
        is_default,
    } = payload;

    let input = DefineOptionInput {
        attribute_id,
        value: require_non_blank(value, "value")?,
        code: normalize_optional_string(code),
        sort_order: sort_order.unwrap_or(0),
        is_default: is_default.unwrap_or(false),
    };

    let option = state
        .services
        .attributes
        .define_option(input)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(option))
}

/// List the attribute definitions of a category
#[utoipa::path(
    get,
    path = "/api/v1/attributes/category/{category_id}",
    params(
        ("category_id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Definitions in display order", body = Vec<crate::services::attributes::AttributeDefinition>)
    ),
    tag = "Attributes"
)]
pub async fn list_category_attributes(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let attributes = state
        .services
        .attributes
        .list_by_category(category_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(attributes))
}

/// Get one attribute definition
#[utoipa::path(
    get,
    path = "/api/v1/attributes/{id}",
    params(
        ("id" = Uuid, Path, description = "Attribute ID")
    ),
    responses(
        (status = 200, description = "Attribute retrieved", body = crate::services::attributes::AttributeDefinition),
        (status = 404, description = "Attribute not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Attributes"
)]
pub async fn get_attribute(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let attribute = state
        .services
        .attributes
        .get_attribute(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(attribute))
}

/// Delete an attribute that no product uses
#[utoipa::path(
    delete,
    path = "/api/v1/attributes/{id}",
    params(
        ("id" = Uuid, Path, description = "Attribute ID")
    ),
    responses(
        (status = 204, description = "Attribute deleted"),
        (status = 400, description = "Attribute is still in use", body = crate::errors::ErrorResponse),
        (status = 404, description = "Attribute not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Attributes"
)]
pub async fn delete_attribute(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .attributes
        .delete_attribute(id)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}
