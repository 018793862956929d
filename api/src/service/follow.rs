use std::sync::Arc;

use uuid::Uuid;

use crate::database::notification;
use crate::store::{SocialStore, StoreError, WriteOp};

/// What a toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The edge now exists and the target was notified.
    Followed,
    /// The edge was removed.
    Unfollowed,
}

#[derive(Debug, thiserror::Error)]
pub enum FollowError {
    /// Rejected before the store is touched.
    #[error("a user cannot follow themselves")]
    SelfFollow,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Owns the follow/unfollow contract.
pub struct FollowService {
    store: Arc<dyn SocialStore>,
}

impl FollowService {
    pub fn new(store: Arc<dyn SocialStore>) -> Self {
        Self { store }
    }

    /// Flips the follow relationship from `actor` towards `target`.
    ///
    /// If no edge exists, one is created together with a follow notification
    /// for the target in a single atomic batch. If the edge exists, it is
    /// deleted; the original notification is left alone.
    ///
    /// Two concurrent toggles over the same missing edge can both decide to
    /// create it. The store's uniqueness constraint arbitrates: the loser's
    /// batch is rolled back and reported as `Followed`, since the state it
    /// wanted is the state that holds.
    pub async fn toggle(&self, actor: Uuid, target: Uuid) -> Result<ToggleOutcome, FollowError> {
        if actor == target {
            return Err(FollowError::SelfFollow);
        }

        let existing = self.store.follow_between(actor, target).await?;

        if existing.is_some() {
            self.store
                .apply(vec![WriteOp::DeleteFollow {
                    follower_id: actor,
                    following_id: target,
                }])
                .await?;

            return Ok(ToggleOutcome::Unfollowed);
        }

        let result = self
            .store
            .apply(vec![
                WriteOp::CreateFollow {
                    follower_id: actor,
                    following_id: target,
                },
                WriteOp::CreateNotification {
                    kind: notification::Kind::Follow,
                    user_id: target,
                    creator_id: actor,
                },
            ])
            .await;

        match result {
            Ok(()) => Ok(ToggleOutcome::Followed),
            // Lost the race to a concurrent follow. The edge exists, which
            // is what this call asked for.
            Err(StoreError::UniqueViolation) => Ok(ToggleOutcome::Followed),
            Err(err) => {
                tracing::error!(error = %err, %actor, %target, "failed to toggle follow");
                Err(err.into())
            }
        }
    }
}
