use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::database::{follow, notification, user};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors surfaced by a [`SocialStore`].
///
/// Constraint violations get their own variants because the service layer
/// branches on them; everything else is collapsed into `Unavailable` so no
/// backend-specific error detail leaks past the store boundary.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A write collided with a uniqueness constraint. For follow edges this
    /// is the final arbiter of the check-then-act race.
    #[error("unique constraint violated")]
    UniqueViolation,
    /// A write referenced a row that does not exist.
    #[error("foreign key constraint violated")]
    ForeignKeyViolation,
    /// The store failed to execute the operation (connectivity, timeout,
    /// anything else).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// A single write intent, applied only as part of an atomic batch.
#[derive(Debug, Clone)]
pub enum WriteOp {
    CreateFollow {
        follower_id: Uuid,
        following_id: Uuid,
    },
    /// Deleting an edge that does not exist is not an error.
    DeleteFollow {
        follower_id: Uuid,
        following_id: Uuid,
    },
    CreateNotification {
        kind: notification::Kind,
        user_id: Uuid,
        creator_id: Uuid,
    },
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub external_id: String,
    pub username: String,
    pub display_name: String,
    pub email: String,
    pub avatar_url: Option<String>,
}

/// Aggregate counts attached to a user profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserStats {
    pub followers: i64,
    pub following: i64,
    pub posts: i64,
}

/// The relational store behind the social graph.
///
/// `apply` is the only mutation path for follow edges and notifications and
/// commits its batch all-or-nothing, so the pairing invariant (an edge and
/// its notification are created together or not at all) holds for every
/// implementation.
#[async_trait]
pub trait SocialStore: Send + Sync + 'static {
    async fn user_by_id(&self, id: Uuid) -> Result<Option<user::Model>, StoreError>;

    async fn users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<user::Model>, StoreError>;

    async fn users_by_usernames(&self, usernames: &[String])
        -> Result<Vec<user::Model>, StoreError>;

    async fn user_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<user::Model>, StoreError>;

    /// Inserts a new user. Fails with `UniqueViolation` if the external id
    /// or username is already taken.
    async fn create_user(&self, user: NewUser) -> Result<user::Model, StoreError>;

    /// Unique-key lookup of the edge for an ordered pair.
    async fn follow_between(
        &self,
        follower_id: Uuid,
        following_id: Uuid,
    ) -> Result<Option<follow::Model>, StoreError>;

    /// Applies a batch of write intents atomically.
    async fn apply(&self, ops: Vec<WriteOp>) -> Result<(), StoreError>;

    /// Users that follow `user_id`.
    async fn followers_of(&self, user_id: Uuid) -> Result<Vec<user::Model>, StoreError>;

    /// Users that `user_id` follows.
    async fn following_of(&self, user_id: Uuid) -> Result<Vec<user::Model>, StoreError>;

    async fn user_stats(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, UserStats>, StoreError>;

    /// Up to `limit` users ordered by descending follower count. Ties are
    /// broken by store-default order.
    async fn top_influencers(&self, limit: i64) -> Result<Vec<user::Model>, StoreError>;

    /// Up to `limit` users the viewer does not follow yet, excluding the
    /// viewer. No distribution guarantee.
    async fn suggested_users(
        &self,
        viewer_id: Uuid,
        limit: i64,
    ) -> Result<Vec<user::Model>, StoreError>;

    /// The recipient's notification feed, newest first.
    async fn notifications_for(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<notification::Model>, StoreError>;

    async fn unread_notification_count(&self, user_id: Uuid) -> Result<i64, StoreError>;
}
