use std::collections::HashMap;
use std::sync::Arc;

use async_graphql::async_trait::async_trait;
use async_graphql::dataloader::{DataLoader, Loader};
use uuid::Uuid;

use crate::database::user;
use crate::store::{SocialStore, StoreError, UserStats};

pub struct UserByIdLoader {
    store: Arc<dyn SocialStore>,
}

impl UserByIdLoader {
    pub fn new(store: Arc<dyn SocialStore>) -> DataLoader<Self> {
        DataLoader::new(Self { store }, tokio::spawn)
    }
}

#[async_trait]
impl Loader<Uuid> for UserByIdLoader {
    type Value = user::Model;
    type Error = Arc<StoreError>;

    async fn load(&self, keys: &[Uuid]) -> Result<HashMap<Uuid, Self::Value>, Self::Error> {
        let users = self.store.users_by_ids(keys).await.map_err(Arc::new)?;

        Ok(users.into_iter().map(|u| (u.id, u)).collect())
    }
}

pub struct UserByUsernameLoader {
    store: Arc<dyn SocialStore>,
}

impl UserByUsernameLoader {
    pub fn new(store: Arc<dyn SocialStore>) -> DataLoader<Self> {
        DataLoader::new(Self { store }, tokio::spawn)
    }
}

#[async_trait]
impl Loader<String> for UserByUsernameLoader {
    type Value = user::Model;
    type Error = Arc<StoreError>;

    async fn load(&self, keys: &[String]) -> Result<HashMap<String, Self::Value>, Self::Error> {
        let users = self
            .store
            .users_by_usernames(keys)
            .await
            .map_err(Arc::new)?;

        Ok(users.into_iter().map(|u| (u.username.clone(), u)).collect())
    }
}

/// Batches the follower/following/post counts behind the profile count
/// fields so a page of users costs one stats query.
pub struct UserStatsLoader {
    store: Arc<dyn SocialStore>,
}

impl UserStatsLoader {
    pub fn new(store: Arc<dyn SocialStore>) -> DataLoader<Self> {
        DataLoader::new(Self { store }, tokio::spawn)
    }
}

#[async_trait]
impl Loader<Uuid> for UserStatsLoader {
    type Value = UserStats;
    type Error = Arc<StoreError>;

    async fn load(&self, keys: &[Uuid]) -> Result<HashMap<Uuid, Self::Value>, Self::Error> {
        self.store.user_stats(keys).await.map_err(Arc::new)
    }
}
