#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, Response},
    Router,
};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;
use whop_app_backend::{
    config::{Config, LogFormat, DEFAULT_ROSTER_PAGE_SIZE, DEFAULT_WHOP_TOKEN_ISSUER},
    database::user_repository::UserRepository,
    error::Result,
    models::user::{MirroredUser, UpsertUser},
    routes,
    services::{
        identity_service::{WhopTokenVerifier, USER_TOKEN_HEADER},
        whop_service::WhopService,
    },
    utils::avatar::{AvatarStyle, DEFAULT_AVATAR_TEMPLATE},
    AppState,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const PUBLIC_KEY: &str = include_str!("../fixtures/token_public_key.pem");
pub const SIGNING_KEY: &str = include_str!("../fixtures/token_signing_key.pem");
pub const FOREIGN_KEY: &str = include_str!("../fixtures/foreign_signing_key.pem");
pub const APP_ID: &str = "app_test";
pub const COMPANY_ID: &str = "biz_99";

/// `UserRepository` over a map, with the same upsert semantics as the Postgres one.
#[derive(Default)]
pub struct InMemoryUserRepository {
    rows: Mutex<HashMap<String, MirroredUser>>,
}

impl InMemoryUserRepository {
    pub fn snapshot(&self, id: &str) -> Option<MirroredUser> {
        self.rows.lock().unwrap().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn upsert(&self, user: &UpsertUser) -> Result<MirroredUser> {
        let mut rows = self.rows.lock().unwrap();
        let created_at = rows
            .get(&user.id)
            .map(|existing| existing.created_at)
            .unwrap_or(user.seen_at);
        let row = MirroredUser {
            id: user.id.clone(),
            username: user.username.clone(),
            name: user.name.clone(),
            bio: user.bio.clone(),
            profile_picture_url: Some(user.profile_picture_url.clone()),
            created_at,
            updated_at: user.seen_at,
            last_login_at: Some(user.seen_at),
        };
        rows.insert(row.id.clone(), row.clone());
        Ok(row)
    }

    async fn list(&self) -> Result<Vec<MirroredUser>> {
        let mut rows: Vec<_> = self.rows.lock().unwrap().values().cloned().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<MirroredUser>> {
        Ok(self.snapshot(id))
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.len() as i64)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.rows.lock().unwrap().remove(id).is_some())
    }
}

pub fn test_config(whop_base_url: &str) -> Config {
    Config {
        server_address: "127.0.0.1:0".to_string(),
        database_url: "postgres://unused".to_string(),
        database_max_connections: 1,
        whop_api_key: "test-key".to_string(),
        whop_api_base_url: whop_base_url.to_string(),
        whop_app_id: Some(APP_ID.to_string()),
        whop_company_id: Some(COMPANY_ID.to_string()),
        whop_token_public_key: Some(PUBLIC_KEY.to_string()),
        whop_token_issuer: DEFAULT_WHOP_TOKEN_ISSUER.to_string(),
        avatar_url_template: DEFAULT_AVATAR_TEMPLATE.to_string(),
        avatar_style: AvatarStyle::default(),
        roster_page_size: DEFAULT_ROSTER_PAGE_SIZE,
        sign_in_path: "/".to_string(),
        log_format: LogFormat::Pretty,
    }
}

pub fn sign_token(sub: &str, pem: &str) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = json!({
        "sub": sub,
        "iss": DEFAULT_WHOP_TOKEN_ISSUER,
        "aud": APP_ID,
        "iat": now,
        "exp": now + 600,
    });
    let key = EncodingKey::from_ec_pem(pem.as_bytes()).expect("signing key");
    encode(&Header::new(Algorithm::ES256), &claims, &key).expect("token")
}

pub fn user_token(sub: &str) -> String {
    sign_token(sub, SIGNING_KEY)
}

pub struct TestApp {
    pub whop: MockServer,
    pub repo: Arc<InMemoryUserRepository>,
    pub router: Router,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let whop = MockServer::start().await;
        Self::with_config(whop, |_| {})
    }

    pub fn with_config(whop: MockServer, tweak: impl FnOnce(&mut Config)) -> Self {
        let mut config = test_config(&whop.uri());
        tweak(&mut config);

        let identity = Arc::new(WhopTokenVerifier::from_config(&config).expect("verifier"));
        let client = Arc::new(WhopService::from_config(&config).expect("whop client"));
        let repo = Arc::new(InMemoryUserRepository::default());
        let state = AppState::from_parts(Arc::new(config), identity, client, repo.clone());

        Self {
            whop,
            repo,
            router: routes::router(state),
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response<Body> {
        self.send("GET", uri, token).await
    }

    pub async fn send(&self, method: &str, uri: &str, token: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(USER_TOKEN_HEADER, token);
        }
        self.router
            .clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    pub async fn mock_user(&self, id: &str, username: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/users/{}", id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": id,
                "username": username,
                "name": null,
                "bio": null,
                "created_at": "2024-03-01T12:00:00Z",
                "profile_picture": null
            })))
            .mount(&self.whop)
            .await;
    }

    pub async fn mock_access(&self, user_id: &str, resource: &str, level: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/users/{}/access/{}", user_id, resource)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "has_access": level != "no_access",
                "access_level": level
            })))
            .mount(&self.whop)
            .await;
    }

    pub async fn mock_roster(&self, company: &str, usernames: &[&str], expected_calls: u64) {
        let data: Vec<JsonValue> = usernames
            .iter()
            .enumerate()
            .map(|(i, username)| {
                json!({
                    "id": format!("ausr_{}", i),
                    "role": "admin",
                    "user": {"id": format!("user_{}", username), "name": null, "username": username, "email": null}
                })
            })
            .collect();

        Mock::given(method("GET"))
            .and(path("/authorized_users"))
            .and(query_param("company_id", company))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": data,
                "page_info": {"end_cursor": null, "start_cursor": null, "has_next_page": false, "has_previous_page": false}
            })))
            .expect(expected_calls)
            .mount(&self.whop)
            .await;
    }
}

pub async fn body_json(response: Response<Body>) -> JsonValue {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
