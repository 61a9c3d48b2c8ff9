pub mod dashboard;
pub mod docs;
pub mod experience;
pub mod health;
pub mod roster;
pub mod users;

use axum::{middleware, routing::get, Router};

use crate::{middleware::auth::require_company_admin, AppState};

/// Every route of the app, with state applied. Cross-cutting layers are added by the caller.
pub fn router(state: AppState) -> Router {
    let base_routes = Router::new()
        .route("/", get(health::index))
        .route("/health", get(health::health))
        .route("/api-docs/openapi.json", get(docs::openapi_json));

    let views = Router::new()
        .route("/dashboard/:company_id", get(dashboard::dashboard))
        .route("/experiences/:experience_id", get(experience::experience));

    let roster_api = Router::new().route(
        "/api/companies/:company_id/authorized-users",
        get(roster::list_authorized_users),
    );

    let users_api = Router::new()
        .route("/api/users", get(users::list_users))
        .route("/api/users/count", get(users::count_users))
        .route(
            "/api/users/:id",
            get(users::get_user).delete(users::delete_user),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_company_admin,
        ));

    base_routes
        .merge(views)
        .merge(roster_api)
        .merge(users_api)
        .with_state(state)
}
