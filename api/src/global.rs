use std::sync::Arc;

use async_graphql::dataloader::DataLoader;
use common::context::Context;

use crate::config::AppConfig;
use crate::dataloader::{UserByIdLoader, UserByUsernameLoader, UserStatsLoader};
use crate::service::{FollowService, UserService};
use crate::store::SocialStore;

pub struct GlobalState {
    pub config: AppConfig,
    pub ctx: Context,
    pub store: Arc<dyn SocialStore>,
    pub follow_service: FollowService,
    pub user_service: UserService,
    pub user_by_id_loader: DataLoader<UserByIdLoader>,
    pub user_by_username_loader: DataLoader<UserByUsernameLoader>,
    pub user_stats_loader: DataLoader<UserStatsLoader>,
}

impl GlobalState {
    pub fn new(config: AppConfig, store: Arc<dyn SocialStore>, ctx: Context) -> Self {
        Self {
            config,
            ctx,
            follow_service: FollowService::new(store.clone()),
            user_service: UserService::new(store.clone()),
            user_by_id_loader: UserByIdLoader::new(store.clone()),
            user_by_username_loader: UserByUsernameLoader::new(store.clone()),
            user_stats_loader: UserStatsLoader::new(store.clone()),
            store,
        }
    }
}
