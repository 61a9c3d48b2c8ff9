//! Types returned by the Whop REST API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfilePicture {
    pub url: String,
}

/// `GET /users/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhopUser {
    pub id: String,
    pub username: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub profile_picture: Option<ProfilePicture>,
}

impl WhopUser {
    pub fn profile_picture_url(&self) -> Option<&str> {
        self.profile_picture
            .as_ref()
            .map(|p| p.url.as_str())
            .filter(|url| !url.is_empty())
    }

    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.username)
    }
}

/// Access tier, ordered by privilege.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    #[default]
    NoAccess,
    Customer,
    Admin,
}

impl AccessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::NoAccess => "no_access",
            AccessLevel::Customer => "customer",
            AccessLevel::Admin => "admin",
        }
    }
}

impl std::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `GET /users/{id}/access/{resource_id}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessCheck {
    pub has_access: bool,
    pub access_level: AccessLevel,
}

impl AccessCheck {
    pub fn denied() -> Self {
        Self {
            has_access: false,
            access_level: AccessLevel::NoAccess,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.access_level == AccessLevel::Admin
    }

    pub fn is_customer(&self) -> bool {
        self.access_level == AccessLevel::Customer
    }
}

impl Default for AccessCheck {
    fn default() -> Self {
        Self::denied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Company,
    Product,
    Experience,
}

impl ResourceKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            ResourceKind::Company => "biz_",
            ResourceKind::Product => "prod_",
            ResourceKind::Experience => "exp_",
        }
    }

    const ALL: [ResourceKind; 3] = [
        ResourceKind::Company,
        ResourceKind::Product,
        ResourceKind::Experience,
    ];
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid resource id '{0}': expected a biz_, prod_ or exp_ identifier")]
pub struct InvalidResourceId(pub String);

/// A Whop resource identifier such as `biz_123`, `prod_456` or `exp_789`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId {
    raw: String,
    kind: ResourceKind,
}

impl ResourceId {
    pub fn parse(raw: &str) -> Result<Self, InvalidResourceId> {
        let raw = raw.trim();
        ResourceKind::ALL
            .iter()
            .find(|kind| {
                raw.strip_prefix(kind.prefix())
                    .is_some_and(|rest| !rest.is_empty())
            })
            .map(|kind| Self {
                raw: raw.to_string(),
                kind: *kind,
            })
            .ok_or_else(|| InvalidResourceId(raw.to_string()))
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_company(&self) -> bool {
        self.kind() == ResourceKind::Company
    }
}

impl std::str::FromStr for ResourceId {
    type Err = InvalidResourceId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ResourceId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizedUserRole {
    Owner,
    Admin,
    SalesManager,
    Moderator,
    AppManager,
    Support,
    Manager,
    /// A role Whop added after this list was written.
    #[serde(other)]
    Unknown,
}

impl AuthorizedUserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorizedUserRole::Owner => "owner",
            AuthorizedUserRole::Admin => "admin",
            AuthorizedUserRole::SalesManager => "sales_manager",
            AuthorizedUserRole::Moderator => "moderator",
            AuthorizedUserRole::AppManager => "app_manager",
            AuthorizedUserRole::Support => "support",
            AuthorizedUserRole::Manager => "manager",
            AuthorizedUserRole::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorizedUserIdentity {
    pub id: String,
    pub name: Option<String>,
    pub username: String,
    pub email: Option<String>,
}

/// One roster entry of `GET /authorized_users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorizedUser {
    pub id: String,
    pub role: AuthorizedUserRole,
    pub user: AuthorizedUserIdentity,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageInfo {
    pub end_cursor: Option<String>,
    pub start_cursor: Option<String>,
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default)]
    pub has_previous_page: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorizedUsersPage {
    #[serde(default)]
    pub data: Vec<AuthorizedUser>,
    #[serde(default)]
    pub page_info: PageInfo,
}
