use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::{
    models::whop::ResourceId,
    services::identity_service::{resolve_user_id, Subject},
    AppState,
};

/// Inserted into request extensions once the caller is known to administer `WHOP_COMPANY_ID`.
#[derive(Debug, Clone)]
pub struct CompanyAdmin {
    pub user_id: String,
    pub company_id: String,
}

pub async fn require_company_admin(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(user_id) = resolve_user_id(state.identity.as_ref(), req.headers()) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error":"missing_identity"})),
        )
            .into_response();
    };

    let Some(company) = state
        .config
        .whop_company_id
        .as_deref()
        .and_then(|id| ResourceId::parse(id).ok())
        .filter(ResourceId::is_company)
    else {
        tracing::warn!("WHOP_COMPANY_ID is unset or invalid; admin API is closed");
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"error":"admin_company_not_configured"})),
        )
            .into_response();
    };

    if !state
        .access_service
        .is_admin(&company, Subject::User(&user_id))
        .await
    {
        return (StatusCode::FORBIDDEN, Json(json!({"error":"forbidden"}))).into_response();
    }

    req.extensions_mut().insert(CompanyAdmin {
        user_id,
        company_id: company.to_string(),
    });
    next.run(req).await
}
