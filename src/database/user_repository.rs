use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::Result;
use crate::models::user::{MirroredUser, UpsertUser};

/// Storage for mirrored users, keyed by Whop user id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert or overwrite the row with `user.id`; returns the stored row.
    async fn upsert(&self, user: &UpsertUser) -> Result<MirroredUser>;

    /// All rows, newest `created_at` first.
    async fn list(&self) -> Result<Vec<MirroredUser>>;

    async fn find_by_id(&self, id: &str) -> Result<Option<MirroredUser>>;

    async fn count(&self) -> Result<i64>;

    /// Whether a row was removed.
    async fn delete(&self, id: &str) -> Result<bool>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn upsert(&self, user: &UpsertUser) -> Result<MirroredUser> {
        let row = sqlx::query_as::<_, MirroredUser>(
            r#"
            INSERT INTO users (id, username, name, bio, profile_picture_url, last_login_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            ON CONFLICT (id) DO UPDATE SET
                username = EXCLUDED.username,
                name = EXCLUDED.name,
                bio = EXCLUDED.bio,
                profile_picture_url = EXCLUDED.profile_picture_url,
                last_login_at = EXCLUDED.last_login_at,
                updated_at = EXCLUDED.updated_at
            RETURNING id, username, name, bio, profile_picture_url, created_at, updated_at, last_login_at
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.name)
        .bind(&user.bio)
        .bind(&user.profile_picture_url)
        .bind(user.seen_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list(&self) -> Result<Vec<MirroredUser>> {
        let rows = sqlx::query_as::<_, MirroredUser>(
            r#"
            SELECT id, username, name, bio, profile_picture_url, created_at, updated_at, last_login_at
            FROM users
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<MirroredUser>> {
        let row = sqlx::query_as::<_, MirroredUser>(
            r#"
            SELECT id, username, name, bio, profile_picture_url, created_at, updated_at, last_login_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
