use chrono::{DateTime, Utc};
use uuid::Uuid;

/// The kind of event a notification describes.
///
/// Only `Follow` is produced by this service; the other kinds exist so the
/// closed set matches the notifications table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, async_graphql::Enum)]
#[sqlx(type_name = "notification_kind", rename_all = "UPPERCASE")]
pub enum Kind {
    Follow,
    Like,
    Comment,
}

/// A single user-facing event.
///
/// Notifications are an immutable event log: unfollowing never retracts the
/// notification the follow produced. Only the read flag ever changes.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Model {
    pub id: Uuid,
    pub kind: Kind,
    /// The recipient of the notification.
    pub user_id: Uuid,
    /// The user whose action caused the notification.
    pub creator_id: Uuid,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
