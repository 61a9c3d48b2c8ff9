use async_trait::async_trait;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::Config;
use crate::dto::roster_dto::RosterQuery;
use crate::error::{Error, Result};
use crate::models::whop::{AccessCheck, AuthorizedUsersPage, ResourceId, WhopUser};

/// The three Whop REST calls the app depends on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WhopApi: Send + Sync {
    /// `GET /users/{id}`; `Ok(None)` when Whop answers 404.
    async fn get_user(&self, user_id: &str) -> Result<Option<WhopUser>>;

    /// `GET /users/{id}/access/{resource_id}`
    async fn check_access(&self, user_id: &str, resource: &ResourceId) -> Result<AccessCheck>;

    /// `GET /authorized_users?company_id=...`
    async fn list_authorized_users(
        &self,
        company: &ResourceId,
        query: &RosterQuery,
    ) -> Result<AuthorizedUsersPage>;
}

#[derive(Clone)]
pub struct WhopService {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl WhopService {
    pub fn new(api_key: impl Into<String>, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("Invalid WHOP_API_BASE_URL: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "Invalid WHOP_API_BASE_URL: {}",
                base_url
            )));
        }

        Ok(Self {
            client: Client::new(),
            base_url,
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.whop_api_key.clone(), &config.whop_api_base_url)
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn get(&self, url: Url) -> RequestBuilder {
        self.client
            .get(url)
            .bearer_auth(&self.api_key)
            .header(ACCEPT, "application/json")
            .header(CACHE_CONTROL, "no-store")
    }

    async fn read_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, body = %body, "Whop API {} failed", what);
            return Err(Error::Upstream {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl WhopApi for WhopService {
    async fn get_user(&self, user_id: &str) -> Result<Option<WhopUser>> {
        if user_id.trim().is_empty() {
            return Ok(None);
        }

        let url = self.endpoint(&["users", user_id]);
        tracing::debug!(%user_id, "fetching Whop user");
        let response = self.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::info!(%user_id, "Whop user not found");
            return Ok(None);
        }
        Self::read_json(response, "user lookup").await.map(Some)
    }

    async fn check_access(&self, user_id: &str, resource: &ResourceId) -> Result<AccessCheck> {
        let url = self.endpoint(&["users", user_id, "access", resource.as_str()]);
        let response = self.get(url).send().await?;
        Self::read_json(response, "access check").await
    }

    async fn list_authorized_users(
        &self,
        company: &ResourceId,
        query: &RosterQuery,
    ) -> Result<AuthorizedUsersPage> {
        let mut url = self.endpoint(&["authorized_users"]);
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("company_id", company.as_str());
            if let Some(user_id) = &query.user_id {
                pairs.append_pair("user_id", user_id);
            }
            if let Some(role) = query.role {
                pairs.append_pair("role", role.as_str());
            }
            if let Some(first) = query.first {
                pairs.append_pair("first", &first.to_string());
            }
            if let Some(last) = query.last {
                pairs.append_pair("last", &last.to_string());
            }
            if let Some(after) = &query.after {
                pairs.append_pair("after", after);
            }
            if let Some(before) = &query.before {
                pairs.append_pair("before", before);
            }
        }

        let response = self.get(url).send().await?;
        Self::read_json(response, "authorized users listing").await
    }
}
