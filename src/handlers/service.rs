// handlers/service.rs - service description and health probe

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::database::DatabaseManager;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /
pub async fn root() -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "description": env!("CARGO_PKG_DESCRIPTION"),
        "endpoints": {
            "health": "/health",
            "presales": "/api/presales/*",
            "development": "/api/development/*",
            "attachment": "/api/attachment/*",
            "menu": "/api/menu/*",
            "authorization": "/api/authorization/*",
            "user": "/api/user/*",
            "userrole": "/api/userrole/*",
            "login": "/api/login/*"
        }
    })))
}

/// GET /health - 200 when the database answers, 503 otherwise
pub async fn health() -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "message": "Database unavailable",
                    "error": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "database": "unavailable"
                    }
                })),
            )
        }
    }
}
