use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up"))
)]
#[axum::debug_handler]
pub async fn health() -> impl IntoResponse {
    let body = json!({
        "status": "ok",
    });
    (StatusCode::OK, Json(body))
}

#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Entry points of the app"))
)]
#[axum::debug_handler]
pub async fn index() -> impl IntoResponse {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "views": {
            "dashboard": "/dashboard/{company_id}",
            "experience": "/experiences/{experience_id}",
        },
    }))
}
