/*!
 * # Health Check Module
 *
 * - Basic health check (`/health`) - process is up
 * - Readiness check (`/health/ready`) - database answers a ping
 * - Version (`/health/version`) - crate version
 */

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error};

/// Basic health status
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Up,
    Down,
}

/// Readiness report
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Readiness {
    pub ready: bool,
    pub database: HealthStatus,
    pub timestamp: DateTime<Utc>,
}

/// Basic health check endpoint
pub async fn health_check() -> impl IntoResponse {
    debug!("Health check endpoint called");

    (
        StatusCode::OK,
        Json(json!({
            "status": HealthStatus::Up,
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": Utc::now().to_rfc3339(),
        })),
    )
}

/// Readiness check endpoint
pub async fn readiness_check(State(db): State<Arc<DatabaseConnection>>) -> impl IntoResponse {
    debug!("Readiness check endpoint called");

    let database = match crate::db::check_connection(&db).await {
        Ok(()) => HealthStatus::Up,
        Err(e) => {
            error!("Database health check failed: {}", e);
            HealthStatus::Down
        }
    };

    let status_code = match database {
        HealthStatus::Up => StatusCode::OK,
        HealthStatus::Down => StatusCode::SERVICE_UNAVAILABLE,
    };

    (
        status_code,
        Json(Readiness {
            ready: database == HealthStatus::Up,
            database,
            timestamp: Utc::now(),
        }),
    )
}

/// Returns build and version information
pub async fn version_info() -> impl IntoResponse {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Creates router with health check endpoints
pub fn health_routes(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/version", get(version_info))
        .with_state(db)
}
