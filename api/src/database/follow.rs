use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A directed edge in the social graph.
///
/// The ordered pair is the whole identity of the relationship: there is no
/// surrogate key, and the store enforces at most one row per pair.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Model {
    /// The user doing the following.
    pub follower_id: Uuid,
    /// The user being followed.
    pub following_id: Uuid,
    /// The time the edge was created.
    pub created_at: DateTime<Utc>,
}
