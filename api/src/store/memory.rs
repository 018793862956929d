use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::database::{follow, notification, user};

use super::{NewUser, SocialStore, StoreError, UserStats, WriteOp};

#[derive(Default)]
struct Inner {
    // Vec keeps insertion order, which doubles as the store-default order.
    users: Vec<user::Model>,
    follows: HashMap<(Uuid, Uuid), DateTime<Utc>>,
    notifications: Vec<notification::Model>,
    post_counts: HashMap<Uuid, i64>,
}

impl Inner {
    fn user_exists(&self, id: Uuid) -> bool {
        self.users.iter().any(|u| u.id == id)
    }
}

/// In-process [`SocialStore`] with the same semantics as [`super::PgStore`]:
/// per-pair uniqueness, referential integrity and all-or-nothing batches.
///
/// Drives the test suite; also handy for running the API without a database.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test helper: posts are written by another service, so the memory
    /// store only tracks the count the stats queries need.
    pub fn set_post_count(&self, user_id: Uuid, count: i64) {
        let mut inner = self.inner.lock().expect("memory store poisoned");
        inner.post_counts.insert(user_id, count);
    }
}

#[async_trait]
impl SocialStore for MemoryStore {
    async fn user_by_id(&self, id: Uuid) -> Result<Option<user::Model>, StoreError> {
        let inner = self.inner.lock().expect("memory store poisoned");
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<user::Model>, StoreError> {
        let inner = self.inner.lock().expect("memory store poisoned");
        Ok(inner
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn users_by_usernames(
        &self,
        usernames: &[String],
    ) -> Result<Vec<user::Model>, StoreError> {
        let inner = self.inner.lock().expect("memory store poisoned");
        Ok(inner
            .users
            .iter()
            .filter(|u| usernames.contains(&u.username))
            .cloned()
            .collect())
    }

    async fn user_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<user::Model>, StoreError> {
        let inner = self.inner.lock().expect("memory store poisoned");
        Ok(inner
            .users
            .iter()
            .find(|u| u.external_id == external_id)
            .cloned())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<user::Model, StoreError> {
        let mut inner = self.inner.lock().expect("memory store poisoned");

        if inner
            .users
            .iter()
            .any(|u| u.external_id == new_user.external_id || u.username == new_user.username)
        {
            return Err(StoreError::UniqueViolation);
        }

        let user = user::Model {
            id: Uuid::new_v4(),
            external_id: new_user.external_id,
            username: new_user.username,
            display_name: new_user.display_name,
            email: new_user.email,
            avatar_url: new_user.avatar_url,
            bio: None,
            location: None,
            website: None,
            created_at: Utc::now(),
        };

        inner.users.push(user.clone());

        Ok(user)
    }

    async fn follow_between(
        &self,
        follower_id: Uuid,
        following_id: Uuid,
    ) -> Result<Option<follow::Model>, StoreError> {
        let inner = self.inner.lock().expect("memory store poisoned");
        Ok(inner
            .follows
            .get(&(follower_id, following_id))
            .map(|created_at| follow::Model {
                follower_id,
                following_id,
                created_at: *created_at,
            }))
    }

    async fn apply(&self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("memory store poisoned");

        // Validate the whole batch against a staged view first so a failing
        // batch applies none of its ops.
        let mut staged: HashSet<(Uuid, Uuid)> = inner.follows.keys().copied().collect();
        for op in &ops {
            match op {
                WriteOp::CreateFollow {
                    follower_id,
                    following_id,
                } => {
                    if !inner.user_exists(*follower_id) || !inner.user_exists(*following_id) {
                        return Err(StoreError::ForeignKeyViolation);
                    }
                    if !staged.insert((*follower_id, *following_id)) {
                        return Err(StoreError::UniqueViolation);
                    }
                }
                WriteOp::DeleteFollow {
                    follower_id,
                    following_id,
                } => {
                    staged.remove(&(*follower_id, *following_id));
                }
                WriteOp::CreateNotification {
                    user_id, creator_id, ..
                } => {
                    if !inner.user_exists(*user_id) || !inner.user_exists(*creator_id) {
                        return Err(StoreError::ForeignKeyViolation);
                    }
                }
            }
        }

        for op in ops {
            match op {
                WriteOp::CreateFollow {
                    follower_id,
                    following_id,
                } => {
                    inner.follows.insert((follower_id, following_id), Utc::now());
                }
                WriteOp::DeleteFollow {
                    follower_id,
                    following_id,
                } => {
                    inner.follows.remove(&(follower_id, following_id));
                }
                WriteOp::CreateNotification {
                    kind,
                    user_id,
                    creator_id,
                } => {
                    let notification = notification::Model {
                        id: Uuid::new_v4(),
                        kind,
                        user_id,
                        creator_id,
                        read: false,
                        created_at: Utc::now(),
                    };
                    inner.notifications.push(notification);
                }
            }
        }

        Ok(())
    }

    async fn followers_of(&self, user_id: Uuid) -> Result<Vec<user::Model>, StoreError> {
        let inner = self.inner.lock().expect("memory store poisoned");
        let follower_ids: HashSet<Uuid> = inner
            .follows
            .keys()
            .filter(|(_, following)| *following == user_id)
            .map(|(follower, _)| *follower)
            .collect();

        Ok(inner
            .users
            .iter()
            .filter(|u| follower_ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn following_of(&self, user_id: Uuid) -> Result<Vec<user::Model>, StoreError> {
        let inner = self.inner.lock().expect("memory store poisoned");
        let following_ids: HashSet<Uuid> = inner
            .follows
            .keys()
            .filter(|(follower, _)| *follower == user_id)
            .map(|(_, following)| *following)
            .collect();

        Ok(inner
            .users
            .iter()
            .filter(|u| following_ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn user_stats(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, UserStats>, StoreError> {
        let inner = self.inner.lock().expect("memory store poisoned");

        Ok(ids
            .iter()
            .map(|id| {
                let followers = inner
                    .follows
                    .keys()
                    .filter(|(_, following)| following == id)
                    .count() as i64;
                let following = inner
                    .follows
                    .keys()
                    .filter(|(follower, _)| follower == id)
                    .count() as i64;
                let posts = inner.post_counts.get(id).copied().unwrap_or_default();

                (
                    *id,
                    UserStats {
                        followers,
                        following,
                        posts,
                    },
                )
            })
            .collect())
    }

    async fn top_influencers(&self, limit: i64) -> Result<Vec<user::Model>, StoreError> {
        let inner = self.inner.lock().expect("memory store poisoned");

        let mut counted: Vec<(i64, user::Model)> = inner
            .users
            .iter()
            .map(|u| {
                let followers = inner
                    .follows
                    .keys()
                    .filter(|(_, following)| *following == u.id)
                    .count() as i64;
                (followers, u.clone())
            })
            .collect();

        // Stable sort keeps store-default order between equal counts.
        counted.sort_by(|a, b| b.0.cmp(&a.0));

        Ok(counted
            .into_iter()
            .take(limit.max(0) as usize)
            .map(|(_, u)| u)
            .collect())
    }

    async fn suggested_users(
        &self,
        viewer_id: Uuid,
        limit: i64,
    ) -> Result<Vec<user::Model>, StoreError> {
        let inner = self.inner.lock().expect("memory store poisoned");

        Ok(inner
            .users
            .iter()
            .filter(|u| u.id != viewer_id && !inner.follows.contains_key(&(viewer_id, u.id)))
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn notifications_for(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<notification::Model>, StoreError> {
        let inner = self.inner.lock().expect("memory store poisoned");
        let mut notifications: Vec<notification::Model> = inner
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();

        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(notifications)
    }

    async fn unread_notification_count(&self, user_id: Uuid) -> Result<i64, StoreError> {
        let inner = self.inner.lock().expect("memory store poisoned");
        Ok(inner
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && !n.read)
            .count() as i64)
    }
}
