mod common;

use axum::http::{Method, StatusCode};
use catalog_admin::{entities::AttrDataType, services::attributes::DefineAttributeInput};
use common::TestApp;
use serde_json::{json, Value};

fn id_of(body: &Value) -> String {
    body["data"]["id"]
        .as_str()
        .expect("response carries data.id")
        .to_string()
}

#[tokio::test]
async fn category_crud_over_http() {
    let app = TestApp::new().await;

    let (status, apparel) = app
        .request_json(
            Method::POST,
            "/api/v1/categories",
            Some(json!({ "name": "Apparel", "slug": "apparel" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(apparel["success"], json!(true));
    let apparel_id = id_of(&apparel);

    let (status, dresses) = app
        .request_json(
            Method::POST,
            "/api/v1/categories",
            Some(json!({
                "name": "  Dresses  ",
                "slug": "dresses",
                "parent_id": apparel_id,
                "description": "Day and evening"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(dresses["data"]["name"], json!("Dresses"));
    assert_eq!(dresses["data"]["parent"]["id"], json!(apparel_id));
    let dresses_id = id_of(&dresses);

    let (status, listed) = app
        .request_json(Method::GET, "/api/v1/categories", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["data"].as_array().map(Vec::len), Some(2));

    let (status, moved) = app
        .request_json(
            Method::PATCH,
            &format!("/api/v1/categories/{dresses_id}"),
            Some(json!({ "parent_id": null })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["data"]["parent_id"], Value::Null);
    assert_eq!(moved["data"]["description"], json!("Day and evening"));

    let (status, body) = app
        .request_json(
            Method::DELETE,
            &format!("/api/v1/categories/{dresses_id}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, missing) = app
        .request_json(
            Method::GET,
            &format!("/api/v1/categories/{dresses_id}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(missing["code"], json!("not_found"));
}

#[tokio::test]
async fn blank_and_duplicate_categories_are_rejected() {
    let app = TestApp::new().await;
    app.create_category("Shoes", "shoes").await;

    let (status, body) = app
        .request_json(
            Method::POST,
            "/api/v1/categories",
            Some(json!({ "name": "   ", "slug": "blank" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("invalid_input"));

    let (status, body) = app
        .request_json(
            Method::POST,
            "/api/v1/categories",
            Some(json!({ "name": "Shoes 2", "slug": "shoes" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], json!("conflict"));
}

#[tokio::test]
async fn deleting_a_parent_category_is_a_bad_request() {
    let app = TestApp::new().await;
    let apparel = app.create_category("Apparel", "apparel").await;
    app.create_child_category("Dresses", "dresses", apparel).await;

    let (status, body) = app
        .request_json(
            Method::DELETE,
            &format!("/api/v1/categories/{apparel}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("invalid_operation"));
}

#[tokio::test]
async fn attribute_definitions_over_http() {
    let app = TestApp::new().await;
    let shoes = app.create_category("Shoes", "shoes").await;

    let (status, size) = app
        .request_json(
            Method::POST,
            "/api/v1/attributes",
            Some(json!({
                "category_id": shoes,
                "name": "Size",
                "slug": "size",
                "data_type": "ENUM",
                "is_required": true
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(size["data"]["data_type"], json!("ENUM"));
    assert_eq!(size["data"]["usage_count"], json!(0));
    let size_id = id_of(&size);

    let (status, option) = app
        .request_json(
            Method::POST,
            "/api/v1/attributes/options",
            Some(json!({ "attribute_id": size_id, "value": "9", "is_default": true })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(option["data"]["value"], json!("9"));

    let (status, listed) = app
        .request_json(
            Method::GET,
            &format!("/api/v1/attributes/category/{shoes}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["data"][0]["options"][0]["value"], json!("9"));

    let (status, inverted) = app
        .request_json(
            Method::POST,
            "/api/v1/attributes",
            Some(json!({
                "category_id": shoes,
                "name": "Heel",
                "slug": "heel",
                "data_type": "NUMBER",
                "min_number": 10,
                "max_number": 2
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(inverted["code"], json!("invalid_constraint"));

    let (status, _) = app
        .request_json(
            Method::DELETE,
            &format!("/api/v1/attributes/{size_id}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .request_json(Method::GET, &format!("/api/v1/attributes/{size_id}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn product_lifecycle_over_http() {
    let app = TestApp::new().await;
    let dresses = app.dresses().await;

    let (status, created) = app
        .request_json(
            Method::POST,
            "/api/v1/products",
            Some(json!({
                "name": "Elegant Black Dress",
                "sku": "DRESS-BLK-001",
                "price": "129.99",
                "stock_quantity": 15,
                "category_id": dresses.category_id
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["data"]["status"], json!("DRAFT"));
    let product_id = id_of(&created);

    let (status, blocked) = app
        .request_json(
            Method::POST,
            &format!("/api/v1/products/{product_id}/activate"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(blocked["code"], json!("incomplete_attributes"));
    assert_eq!(blocked["fields"], json!(["Size"]));

    let (status, rejected) = app
        .request_json(
            Method::POST,
            "/api/v1/products/values",
            Some(json!({
                "product_id": product_id,
                "attribute_id": dresses.length.attribute.id,
                "value": 15
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(rejected["code"], json!("validation_failed"));
    assert_eq!(rejected["fields"], json!(["Length"]));

    let (status, stored) = app
        .request_json(
            Method::POST,
            "/api/v1/products/values",
            Some(json!({
                "product_id": product_id,
                "attribute_id": dresses.size.attribute.id,
                "option_id": dresses.size_option("M")
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["data"]["option"]["value"], json!("M"));

    let (status, active) = app
        .request_json(
            Method::POST,
            &format!("/api/v1/products/{product_id}/activate"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(active["data"]["status"], json!("ACTIVE"));
    assert_eq!(active["data"]["values"].as_array().map(Vec::len), Some(1));

    let (status, page) = app
        .request_json(
            Method::GET,
            &format!(
                "/api/v1/products?category_id={}&status=ACTIVE&limit=5",
                dresses.category_id
            ),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["data"]["meta"]["total"], json!(1));
    assert_eq!(page["data"]["meta"]["limit"], json!(5));
    assert_eq!(page["data"]["data"][0]["value_count"], json!(1));

    let (status, renamed) = app
        .request_json(
            Method::PATCH,
            &format!("/api/v1/products/{product_id}"),
            Some(json!({ "name": "Little Black Dress", "description": null })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["data"]["name"], json!("Little Black Dress"));

    let (status, _) = app
        .request_json(
            Method::DELETE,
            &format!("/api/v1/products/{product_id}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, gone) = app
        .request_json(
            Method::GET,
            &format!("/api/v1/products/{product_id}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(gone["code"], json!("not_found"));
}

#[tokio::test]
async fn duplicate_sku_and_unknown_category_over_http() {
    let app = TestApp::new().await;
    let shoes = app.create_category("Shoes", "shoes").await;
    app.create_product("SHOE-1", shoes).await;

    let (status, body) = app
        .request_json(
            Method::POST,
            "/api/v1/products",
            Some(json!({
                "name": "Runner",
                "sku": "SHOE-1",
                "price": "10",
                "category_id": shoes
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], json!("conflict"));

    let (status, body) = app
        .request_json(
            Method::POST,
            "/api/v1/products",
            Some(json!({
                "name": "Runner",
                "sku": "SHOE-2",
                "price": "10",
                "category_id": uuid::Uuid::new_v4()
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("reference_not_found"));
}

#[tokio::test]
async fn boolean_values_are_not_coerced_over_http() {
    let app = TestApp::new().await;
    let shoes = app.create_category("Shoes", "shoes").await;
    let waterproof = app
        .define_attribute(DefineAttributeInput::new(
            shoes,
            "Waterproof",
            "waterproof",
            AttrDataType::Boolean,
        ))
        .await;
    let product = app.create_product("SHOE-1", shoes).await;

    let (status, body) = app
        .request_json(
            Method::POST,
            "/api/v1/products/values",
            Some(json!({
                "product_id": product.id,
                "attribute_id": waterproof.attribute.id,
                "value": "yes"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("validation_failed"));
    assert_eq!(body["fields"], json!(["Waterproof"]));
}

#[tokio::test]
async fn responses_echo_the_request_id() {
    let app = TestApp::new().await;

    let response = app
        .router_request_with_header("/api/v1/categories", "x-request-id", "trace-me-42")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("trace-me-42")
    );

    let generated = app.request(Method::GET, "/api/v1/categories", None).await;
    assert!(generated.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn health_and_openapi_endpoints() {
    let app = TestApp::new().await;

    let (status, health) = app.request_json(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], json!("up"));

    let (status, ready) = app.request_json(Method::GET, "/health/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ready["ready"], json!(true));
    assert_eq!(ready["database"], json!("up"));

    let (status, doc) = app
        .request_json(Method::GET, "/api-docs/openapi.json", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/v1/products/{id}/activate"].is_object());
}

#[tokio::test]
async fn oversized_page_number_is_a_bad_request() {
    let app = TestApp::new().await;

    let (status, body) = app
        .request_json(
            Method::GET,
            "/api/v1/products?page=18446744073709551615",
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("invalid_input"));
}
