use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::database::{follow, notification, user};

use super::{NewUser, SocialStore, StoreError, UserStats, WriteOp};

/// [`SocialStore`] backed by Postgres via sqlx.
#[derive(Clone)]
pub struct PgStore {
    db: sqlx::PgPool,
}

impl PgStore {
    pub fn new(db: sqlx::PgPool) -> Self {
        Self { db }
    }
}

fn map_store_err(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some("23505") => return StoreError::UniqueViolation,
            Some("23503") => return StoreError::ForeignKeyViolation,
            _ => {}
        }
    }

    tracing::error!(error = %err, "store query failed");
    StoreError::Unavailable(err.to_string())
}

#[derive(sqlx::FromRow)]
struct StatsRow {
    id: Uuid,
    followers: i64,
    following: i64,
    posts: i64,
}

#[async_trait]
impl SocialStore for PgStore {
    async fn user_by_id(&self, id: Uuid) -> Result<Option<user::Model>, StoreError> {
        sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(map_store_err)
    }

    async fn users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<user::Model>, StoreError> {
        sqlx::query_as("SELECT * FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.db)
            .await
            .map_err(map_store_err)
    }

    async fn users_by_usernames(
        &self,
        usernames: &[String],
    ) -> Result<Vec<user::Model>, StoreError> {
        sqlx::query_as("SELECT * FROM users WHERE username = ANY($1)")
            .bind(usernames)
            .fetch_all(&self.db)
            .await
            .map_err(map_store_err)
    }

    async fn user_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<user::Model>, StoreError> {
        sqlx::query_as("SELECT * FROM users WHERE external_id = $1")
            .bind(external_id)
            .fetch_optional(&self.db)
            .await
            .map_err(map_store_err)
    }

    async fn create_user(&self, new_user: NewUser) -> Result<user::Model, StoreError> {
        sqlx::query_as(
            "INSERT INTO users (id, external_id, username, display_name, email, avatar_url) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(new_user.external_id)
        .bind(new_user.username)
        .bind(new_user.display_name)
        .bind(new_user.email)
        .bind(new_user.avatar_url)
        .fetch_one(&self.db)
        .await
        .map_err(map_store_err)
    }

    async fn follow_between(
        &self,
        follower_id: Uuid,
        following_id: Uuid,
    ) -> Result<Option<follow::Model>, StoreError> {
        sqlx::query_as("SELECT * FROM follows WHERE follower_id = $1 AND following_id = $2")
            .bind(follower_id)
            .bind(following_id)
            .fetch_optional(&self.db)
            .await
            .map_err(map_store_err)
    }

    async fn apply(&self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
        let mut tx = self.db.begin().await.map_err(map_store_err)?;

        for op in ops {
            match op {
                WriteOp::CreateFollow {
                    follower_id,
                    following_id,
                } => {
                    sqlx::query("INSERT INTO follows (follower_id, following_id) VALUES ($1, $2)")
                        .bind(follower_id)
                        .bind(following_id)
                        .execute(&mut *tx)
                        .await
                        .map_err(map_store_err)?;
                }
                WriteOp::DeleteFollow {
                    follower_id,
                    following_id,
                } => {
                    sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND following_id = $2")
                        .bind(follower_id)
                        .bind(following_id)
                        .execute(&mut *tx)
                        .await
                        .map_err(map_store_err)?;
                }
                WriteOp::CreateNotification {
                    kind,
                    user_id,
                    creator_id,
                } => {
                    sqlx::query(
                        "INSERT INTO notifications (id, kind, user_id, creator_id) \
                         VALUES ($1, $2, $3, $4)",
                    )
                    .bind(Uuid::new_v4())
                    .bind(kind)
                    .bind(user_id)
                    .bind(creator_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(map_store_err)?;
                }
            }
        }

        tx.commit().await.map_err(map_store_err)
    }

    async fn followers_of(&self, user_id: Uuid) -> Result<Vec<user::Model>, StoreError> {
        sqlx::query_as(
            "SELECT u.* FROM users u \
             INNER JOIN follows f ON f.follower_id = u.id \
             WHERE f.following_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .map_err(map_store_err)
    }

    async fn following_of(&self, user_id: Uuid) -> Result<Vec<user::Model>, StoreError> {
        sqlx::query_as(
            "SELECT u.* FROM users u \
             INNER JOIN follows f ON f.following_id = u.id \
             WHERE f.follower_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .map_err(map_store_err)
    }

    async fn user_stats(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, UserStats>, StoreError> {
        let rows: Vec<StatsRow> = sqlx::query_as(
            "SELECT u.id, \
             (SELECT COUNT(*) FROM follows WHERE following_id = u.id) AS followers, \
             (SELECT COUNT(*) FROM follows WHERE follower_id = u.id) AS following, \
             (SELECT COUNT(*) FROM posts WHERE author_id = u.id) AS posts \
             FROM users u WHERE u.id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.db)
        .await
        .map_err(map_store_err)?;

        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    row.id,
                    UserStats {
                        followers: row.followers,
                        following: row.following,
                        posts: row.posts,
                    },
                )
            })
            .collect())
    }

    async fn top_influencers(&self, limit: i64) -> Result<Vec<user::Model>, StoreError> {
        sqlx::query_as(
            "SELECT u.* FROM users u \
             LEFT JOIN follows f ON f.following_id = u.id \
             GROUP BY u.id \
             ORDER BY COUNT(f.follower_id) DESC \
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await
        .map_err(map_store_err)
    }

    async fn suggested_users(
        &self,
        viewer_id: Uuid,
        limit: i64,
    ) -> Result<Vec<user::Model>, StoreError> {
        sqlx::query_as(
            "SELECT * FROM users \
             WHERE id <> $1 \
             AND id NOT IN (SELECT following_id FROM follows WHERE follower_id = $1) \
             ORDER BY random() \
             LIMIT $2",
        )
        .bind(viewer_id)
        .bind(limit)
        .fetch_all(&self.db)
        .await
        .map_err(map_store_err)
    }

    async fn notifications_for(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<notification::Model>, StoreError> {
        sqlx::query_as("SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC")
            .bind(user_id)
            .fetch_all(&self.db)
            .await
            .map_err(map_store_err)
    }

    async fn unread_notification_count(&self, user_id: Uuid) -> Result<i64, StoreError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND read = FALSE")
            .bind(user_id)
            .fetch_one(&self.db)
            .await
            .map_err(map_store_err)
    }
}
