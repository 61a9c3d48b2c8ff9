use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::user::MirroredUser;
use crate::models::whop::{AccessLevel, AuthorizedUser, WhopUser};
use crate::utils::avatar::{initials, AvatarGenerator};

/// The signed-in user as both views display them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileCard {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub avatar_url: String,
    pub initials: String,
    pub joined_at: DateTime<Utc>,
}

impl ProfileCard {
    pub fn from_user(user: &WhopUser, avatars: &AvatarGenerator) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            display_name: user.display_name().to_string(),
            bio: user.bio.clone(),
            avatar_url: avatars.for_user(user.profile_picture_url(), &user.username),
            initials: initials(user.name.as_deref(), &user.username),
            joined_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub company_id: String,
    pub user: Option<ProfileCard>,
    pub access_level: AccessLevel,
    pub mirrored_user: Option<MirroredUser>,
    pub users: Vec<MirroredUser>,
    pub user_count: i64,
    pub authorized_users: Vec<AuthorizedUser>,
    pub authorized_users_truncated: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExperienceView {
    pub experience_id: String,
    pub user: Option<ProfileCard>,
    pub access_level: AccessLevel,
    pub mirrored_user: Option<MirroredUser>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserCountResponse {
    pub count: i64,
}
