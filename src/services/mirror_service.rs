use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::database::user_repository::UserRepository;
use crate::error::Result;
use crate::models::user::{MirroredUser, UpsertUser};
use crate::models::whop::WhopUser;
use crate::utils::avatar::AvatarGenerator;

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Keeps the local `users` table in step with Whop profiles.
#[derive(Clone)]
pub struct UserMirror {
    repo: Arc<dyn UserRepository>,
    avatars: AvatarGenerator,
    clock: Clock,
}

impl UserMirror {
    pub fn new(repo: Arc<dyn UserRepository>, avatars: AvatarGenerator) -> Self {
        Self {
            repo,
            avatars,
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Row that `upsert` writes for `profile` at time `seen_at`.
    pub fn record_for(&self, profile: &WhopUser, seen_at: DateTime<Utc>) -> UpsertUser {
        UpsertUser {
            id: profile.id.clone(),
            username: profile.username.clone(),
            name: profile.name.clone(),
            bio: profile.bio.clone(),
            profile_picture_url: self
                .avatars
                .for_user(profile.profile_picture_url(), &profile.username),
            seen_at,
        }
    }

    /// Last write wins on `id`; `last_login_at` moves to now on every call.
    pub async fn upsert(&self, profile: &WhopUser) -> Result<MirroredUser> {
        let record = self.record_for(profile, (self.clock)());
        let stored = self.repo.upsert(&record).await?;
        tracing::debug!(user_id = %stored.id, "mirrored Whop user");
        Ok(stored)
    }

    pub async fn list(&self) -> Result<Vec<MirroredUser>> {
        self.repo.list().await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<MirroredUser>> {
        self.repo.find_by_id(id).await
    }

    pub async fn count(&self) -> Result<i64> {
        self.repo.count().await
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let deleted = self.repo.delete(id).await?;
        if deleted {
            tracing::info!(user_id = %id, "deleted mirrored user");
        }
        Ok(deleted)
    }
}
