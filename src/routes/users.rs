use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};

use crate::{
    dto::view_dto::UserCountResponse,
    error::{Error, Result},
    middleware::auth::CompanyAdmin,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Mirrored users, newest first"),
        (status = 401, description = "No identity on the request"),
        (status = 403, description = "Caller is not an admin of the app's company")
    )
)]
#[axum::debug_handler]
pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let users = state.user_mirror.list().await?;
    Ok(Json(users))
}

#[utoipa::path(
    get,
    path = "/api/users/count",
    responses(
        (status = 200, description = "Number of mirrored users"),
        (status = 401, description = "No identity on the request"),
        (status = 403, description = "Caller is not an admin of the app's company")
    )
)]
#[axum::debug_handler]
pub async fn count_users(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let count = state.user_mirror.count().await?;
    Ok(Json(UserCountResponse { count }))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(
        ("id" = String, Path, description = "Whop user id")
    ),
    responses(
        (status = 200, description = "Mirrored user"),
        (status = 404, description = "User has never been mirrored")
    )
)]
#[axum::debug_handler]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let user = state
        .user_mirror
        .get_by_id(&id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("User {} not found", id)))?;
    Ok(Json(user))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(
        ("id" = String, Path, description = "Whop user id")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User has never been mirrored")
    )
)]
#[axum::debug_handler]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(admin): Extension<CompanyAdmin>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    if !state.user_mirror.delete(&id).await? {
        return Err(Error::NotFound(format!("User {} not found", id)));
    }
    tracing::info!(user_id = %id, deleted_by = %admin.user_id, company_id = %admin.company_id, "mirrored user removed via admin API");
    Ok(StatusCode::NO_CONTENT)
}
