use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::IntoResponse,
};

use crate::{
    error::{Error, Result},
    models::whop::ResourceId,
    AppState,
};

#[utoipa::path(
    get,
    path = "/dashboard/{company_id}",
    params(
        ("company_id" = String, Path, description = "Whop company id (biz_...)")
    ),
    responses(
        (status = 200, description = "Admin dashboard for the company"),
        (status = 303, description = "No identity, or caller is not a company admin"),
        (status = 400, description = "Malformed company id")
    )
)]
#[axum::debug_handler]
pub async fn dashboard(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    let company = ResourceId::parse(&company_id)?;
    if !company.is_company() {
        return Err(Error::BadRequest(format!("{} is not a company id", company)));
    }
    Ok(state.view_service.dashboard(&headers, &company).await)
}
