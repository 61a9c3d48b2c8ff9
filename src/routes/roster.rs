use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Json},
};

use crate::{
    dto::roster_dto::{RosterPageResponse, RosterQuery},
    error::{Error, Result},
    models::whop::ResourceId,
    services::identity_service::{resolve_user_id, Subject},
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/companies/{company_id}/authorized-users",
    params(
        ("company_id" = String, Path, description = "Whop company id (biz_...)"),
        ("user_id" = Option<String>, Query, description = "Only this user"),
        ("role" = Option<String>, Query, description = "Only this role"),
        ("first" = Option<u32>, Query, description = "Page size from the start (1-100)"),
        ("last" = Option<u32>, Query, description = "Page size from the end (1-100)"),
        ("after" = Option<String>, Query, description = "Cursor"),
        ("before" = Option<String>, Query, description = "Cursor")
    ),
    responses(
        (status = 200, description = "One page of authorized users"),
        (status = 400, description = "Malformed company id or page window"),
        (status = 401, description = "No identity on the request"),
        (status = 403, description = "Caller is not a company admin"),
        (status = 502, description = "Whop request failed")
    )
)]
#[axum::debug_handler]
pub async fn list_authorized_users(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
    Query(query): Query<RosterQuery>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    let company = ResourceId::parse(&company_id)?;
    let user_id = resolve_user_id(state.identity.as_ref(), &headers)
        .ok_or_else(|| Error::Unauthorized("Missing Whop user token".to_string()))?;

    state
        .access_service
        .require_admin(&company, Subject::User(&user_id))
        .await?;

    let page = state.roster_service.fetch_page(&company, &query).await?;
    Ok(Json(RosterPageResponse {
        company_id: company.to_string(),
        authorized_users: page.data,
        page_info: page.page_info,
    }))
}
