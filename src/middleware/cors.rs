use axum::http::{header, HeaderName, Method};
use tower_http::cors::{Any, CorsLayer};

use crate::services::identity_service::USER_TOKEN_HEADER;

/// The app is embedded in Whop's iframe, so any origin may call it.
pub fn app_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([Method::GET, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::ACCEPT,
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static(USER_TOKEN_HEADER),
        ])
        .allow_origin(Any)
}
