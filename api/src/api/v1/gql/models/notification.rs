use async_graphql::{ComplexObject, Context, SimpleObject};
use uuid::Uuid;

use crate::api::v1::gql::error::{Result, ResultExt};
use crate::api::v1::gql::ext::ContextExt;
use crate::database::notification;

use super::date::DateRFC3339;
use super::user::User;

#[derive(SimpleObject)]
#[graphql(complex)]
pub struct Notification {
    id: Uuid,
    kind: notification::Kind,
    read: bool,
    created_at: DateRFC3339,
    #[graphql(skip)]
    creator_id_: Uuid,
}

#[ComplexObject]
impl Notification {
    /// The user whose action produced this notification. Null if that
    /// account no longer exists.
    async fn creator(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        let global = ctx.get_global();

        let user = global
            .user_by_id_loader
            .load_one(self.creator_id_)
            .await
            .map_err_gql("failed to fetch user")?;

        Ok(user.map(User::from))
    }
}

impl From<notification::Model> for Notification {
    fn from(value: notification::Model) -> Self {
        Self {
            id: value.id,
            kind: value.kind,
            read: value.read,
            created_at: value.created_at.into(),
            creator_id_: value.creator_id,
        }
    }
}
