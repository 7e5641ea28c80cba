use crate::error::AppError;
use axum::{http::Uri, response::Json};
use serde_json::{Value, json};

/// Service banner listing the public endpoints
pub async fn api_info() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Sales Leaderboard API is running",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "leaderboard": "GET /api/sales/leaderboard",
            "addSale": "POST /api/sales",
            "addBulkSales": "POST /api/sales/bulk",
            "getAllSales": "GET /api/sales",
            "deleteAllSales": "DELETE /api/sales",
            "health": "GET /health"
        }
    }))
}

/// Fallback for unknown routes
pub async fn not_found(uri: Uri) -> AppError {
    tracing::debug!(path = %uri.path(), "No route matched");
    AppError::NotFound("Route not found".to_string())
}
