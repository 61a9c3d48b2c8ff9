use axum::{response::IntoResponse, Json};
use utoipa::OpenApi;

use crate::routes::{dashboard, experience, health, roster, users};

#[derive(OpenApi)]
#[openapi(
    info(title = "Whop app backend"),
    paths(
        health::health,
        health::index,
        dashboard::dashboard,
        experience::experience,
        roster::list_authorized_users,
        users::list_users,
        users::count_users,
        users::get_user,
        users::delete_user,
    )
)]
pub struct ApiDoc;

#[axum::debug_handler]
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
