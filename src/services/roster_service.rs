use std::sync::Arc;

use serde::Serialize;
use validator::Validate;

use crate::config::MAX_ROSTER_PAGE_SIZE;
use crate::dto::roster_dto::RosterQuery;
use crate::error::{Error, Result};
use crate::models::whop::{AuthorizedUser, AuthorizedUserRole, AuthorizedUsersPage, ResourceId};
use crate::services::whop_service::WhopApi;

/// Result of [`RosterService::fetch_all`].
///
/// `fetch_all` asks for one large page and does not follow cursors, so `truncated`
/// reports whether Whop indicated more entries beyond it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RosterSnapshot {
    pub users: Vec<AuthorizedUser>,
    pub truncated: bool,
}

#[derive(Clone)]
pub struct RosterService {
    whop: Arc<dyn WhopApi>,
    page_size: u32,
}

impl RosterService {
    pub fn new(whop: Arc<dyn WhopApi>, page_size: u32) -> Self {
        let clamped = page_size.clamp(1, MAX_ROSTER_PAGE_SIZE);
        if clamped != page_size {
            tracing::warn!(requested = page_size, used = clamped, "roster page size clamped");
        }
        Self {
            whop,
            page_size: clamped,
        }
    }

    pub async fn fetch_page(
        &self,
        company: &ResourceId,
        query: &RosterQuery,
    ) -> Result<AuthorizedUsersPage> {
        if !company.is_company() {
            return Err(Error::BadRequest(format!(
                "{} is not a company id",
                company
            )));
        }
        if query.role == Some(AuthorizedUserRole::Unknown) {
            return Err(Error::BadRequest("unsupported role filter".to_string()));
        }
        query.validate()?;
        self.whop.list_authorized_users(company, query).await
    }

    pub async fn fetch_all(
        &self,
        company: &ResourceId,
        role: Option<AuthorizedUserRole>,
    ) -> Result<RosterSnapshot> {
        let query = RosterQuery {
            role,
            first: Some(self.page_size),
            ..Default::default()
        };
        let page = self.fetch_page(company, &query).await?;
        if page.page_info.has_next_page {
            tracing::warn!(
                company_id = %company,
                page_size = self.page_size,
                "authorized users roster truncated at one page"
            );
        }

        Ok(RosterSnapshot {
            users: page.data,
            truncated: page.page_info.has_next_page,
        })
    }
}
