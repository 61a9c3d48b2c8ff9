use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::whop::{AuthorizedUser, AuthorizedUserRole, PageInfo};

/// Filters and cursor window for `GET /authorized_users`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct RosterQuery {
    pub user_id: Option<String>,
    pub role: Option<AuthorizedUserRole>,
    #[validate(range(min = 1, max = 100))]
    pub first: Option<u32>,
    #[validate(range(min = 1, max = 100))]
    pub last: Option<u32>,
    pub after: Option<String>,
    pub before: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RosterPageResponse {
    pub company_id: String,
    pub authorized_users: Vec<AuthorizedUser>,
    pub page_info: PageInfo,
}
