use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Model {
    /// The unique identifier for the user.
    pub id: Uuid,
    /// The subject the identity provider knows this user by.
    pub external_id: String,
    /// The username of the user.
    pub username: String,
    /// The display name of the user.
    pub display_name: String,
    /// The email of the user.
    pub email: String,
    /// The avatar of the user, if they have one.
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    /// The time the user was created.
    pub created_at: DateTime<Utc>,
}
