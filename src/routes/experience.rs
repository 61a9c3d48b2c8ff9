use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::IntoResponse,
};

use crate::{error::Result, models::whop::ResourceId, AppState};

/// Also serves company ids, which is where non-admins land from the dashboard.
#[utoipa::path(
    get,
    path = "/experiences/{experience_id}",
    params(
        ("experience_id" = String, Path, description = "Whop experience, product or company id")
    ),
    responses(
        (status = 200, description = "Member view"),
        (status = 303, description = "No identity on the request"),
        (status = 400, description = "Malformed resource id")
    )
)]
#[axum::debug_handler]
pub async fn experience(
    State(state): State<AppState>,
    Path(experience_id): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    let resource = ResourceId::parse(&experience_id)?;
    Ok(state.view_service.experience(&headers, &resource).await)
}
