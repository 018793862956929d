use std::sync::Arc;

use uuid::Uuid;

use crate::database::{notification, user};
use crate::identity::IdentityClaims;
use crate::store::{NewUser, SocialStore, StoreError};

const SUGGESTED_USERS: i64 = 3;
const DEFAULT_TOP_INFLUENCERS: i64 = 10;

/// Profile lookups and account materialization.
pub struct UserService {
    store: Arc<dyn SocialStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn SocialStore>) -> Self {
        Self { store }
    }

    /// Materializes a local account for the verified identity, or returns
    /// the existing one. Idempotent on the identity subject.
    pub async fn sync_user(&self, claims: &IdentityClaims) -> Result<user::Model, StoreError> {
        if let Some(user) = self.store.user_by_external_id(&claims.subject).await? {
            return Ok(user);
        }

        let new_user = NewUser {
            external_id: claims.subject.clone(),
            username: claims.preferred_username().to_string(),
            display_name: claims
                .name
                .clone()
                .unwrap_or_else(|| claims.preferred_username().to_string()),
            email: claims.email.clone(),
            avatar_url: claims.avatar_url.clone(),
        };

        match self.store.create_user(new_user).await {
            Ok(user) => Ok(user),
            // Two first requests from the same account can race the insert.
            // The winner's row is the account, so refetch it.
            Err(StoreError::UniqueViolation) => self
                .store
                .user_by_external_id(&claims.subject)
                .await?
                .ok_or(StoreError::UniqueViolation),
            Err(err) => Err(err),
        }
    }

    pub async fn followers(&self, user_id: Uuid) -> Result<Vec<user::Model>, StoreError> {
        self.store.followers_of(user_id).await
    }

    pub async fn following(&self, user_id: Uuid) -> Result<Vec<user::Model>, StoreError> {
        self.store.following_of(user_id).await
    }

    /// Users ranked by follower count. A non-positive limit falls back to
    /// the default.
    pub async fn top_influencers(&self, limit: Option<i64>) -> Result<Vec<user::Model>, StoreError> {
        let limit = match limit {
            Some(limit) if limit > 0 => limit,
            _ => DEFAULT_TOP_INFLUENCERS,
        };

        self.store.top_influencers(limit).await
    }

    /// A small set of accounts the viewer does not follow yet.
    pub async fn suggested_users(&self, viewer_id: Uuid) -> Result<Vec<user::Model>, StoreError> {
        self.store.suggested_users(viewer_id, SUGGESTED_USERS).await
    }

    pub async fn notifications(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<notification::Model>, StoreError> {
        self.store.notifications_for(user_id).await
    }

    pub async fn unread_count(&self, user_id: Uuid) -> Result<i64, StoreError> {
        self.store.unread_notification_count(user_id).await
    }
}
