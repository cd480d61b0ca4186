use crate::handlers::common::{
    created_response, deserialize_some, map_service_error, no_content_response,
    normalize_optional_string, require_non_blank, success_response, validate_input,
};
use crate::{
    errors::ApiError,
    services::categories::{CreateCategoryInput, UpdateCategoryInput},
    AppState,
};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Creates the router for category endpoints
pub fn categories_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route(
            "/:id",
            get(get_category)
                .patch(update_category)
                .delete(delete_category),
        )
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 255))]
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

/// Partial update. Sending `"parent_id": null` moves the category to the
/// root; leaving the field out keeps the current parent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<Uuid>)]
    pub parent_id: Option<Option<Uuid>>,
    pub is_active: Option<bool>,
}

/// Create a category
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = crate::services::categories::CategorySummary),
        (status = 400, description = "Invalid payload or unknown parent", body = crate::errors::ErrorResponse),
        (status = 409, description = "Slug already in use", body = crate::errors::ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let CreateCategoryRequest {
        name,
        slug,
        description,
        parent_id,
        is_active,
    } = payload;

    let input = CreateCategoryInput {
        name: require_non_blank(name, "name")?,
        slug: require_non_blank(slug, "slug")?,
        description: normalize_optional_string(description),
        parent_id,
        is_active: is_active.unwrap_or(true),
    };

    let category = state
        .services
        .categories
        .create(input)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(category))
}

/// List all categories with parent, children and counts
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    responses(
        (status = 200, description = "Categories ordered by name", body = Vec<crate::services::categories::CategorySummary>)
    ),
    tag = "Categories"
)]
pub async fn list_categories(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let categories = state
        .services
        .categories
        .list()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(categories))
}

/// Get a category with its attributes and most recent products
#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category retrieved", body = crate::services::categories::CategoryDetail),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state
        .services
        .categories
        .get(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(category))
}

/// Update a category
#[utoipa::path(
    patch,
    path = "/api/v1/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = crate::services::categories::CategorySummary),
        (status = 400, description = "Invalid payload, self-parenting or unknown parent", body = crate::errors::ErrorResponse),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Slug already in use", body = crate::errors::ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let UpdateCategoryRequest {
        name,
        slug,
        description,
        parent_id,
        is_active,
    } = payload;

    let input = UpdateCategoryInput {
        name: name
            .map(|value| require_non_blank(value, "name"))
            .transpose()?,
        slug: slug
            .map(|value| require_non_blank(value, "slug"))
            .transpose()?,
        description: description.map(normalize_optional_string),
        parent_id,
        is_active,
    };

    let category = state
        .services
        .categories
        .update(id, input)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(category))
}

/// Delete a category without children or products
#[utoipa::path(
    delete,
    path = "/api/v1/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 400, description = "Category still has children or products", body = crate::errors::ErrorResponse),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .categories
        .delete(id)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}
