use async_graphql::{ComplexObject, Context, SimpleObject};
use uuid::Uuid;

use crate::api::v1::gql::error::{GqlError, Result, ResultExt};
use crate::api::v1::gql::ext::ContextExt;
use crate::database::user;

use super::date::DateRFC3339;

#[derive(SimpleObject)]
#[graphql(complex)]
pub struct User {
    id: Uuid,
    username: String,
    display_name: String,
    avatar_url: Option<String>,
    bio: Option<String>,
    location: Option<String>,
    website: Option<String>,
    created_at: DateRFC3339,
    #[graphql(skip)]
    email_: String,
}

#[ComplexObject]
impl User {
    /// Only visible to the account owner.
    async fn email(&self, ctx: &Context<'_>) -> Result<&str> {
        let request_context = ctx.get_req_context();

        if let Some(user) = request_context.user() {
            if user.id == self.id {
                return Ok(&self.email_);
            }
        }

        Err(GqlError::Unauthorized
            .with_message("you are not allowed to see this field")
            .with_field(vec!["email"]))
    }

    async fn follower_count(&self, ctx: &Context<'_>) -> Result<i64> {
        let global = ctx.get_global();

        let stats = global
            .user_stats_loader
            .load_one(self.id)
            .await
            .map_err_gql("failed to fetch user stats")?
            .unwrap_or_default();

        Ok(stats.followers)
    }

    async fn following_count(&self, ctx: &Context<'_>) -> Result<i64> {
        let global = ctx.get_global();

        let stats = global
            .user_stats_loader
            .load_one(self.id)
            .await
            .map_err_gql("failed to fetch user stats")?
            .unwrap_or_default();

        Ok(stats.following)
    }

    async fn post_count(&self, ctx: &Context<'_>) -> Result<i64> {
        let global = ctx.get_global();

        let stats = global
            .user_stats_loader
            .load_one(self.id)
            .await
            .map_err_gql("failed to fetch user stats")?
            .unwrap_or_default();

        Ok(stats.posts)
    }

    /// Whether the authenticated viewer follows this user. Null when
    /// anonymous.
    async fn is_followed_by_viewer(&self, ctx: &Context<'_>) -> Result<Option<bool>> {
        let global = ctx.get_global();
        let request_context = ctx.get_req_context();

        let Some(viewer) = request_context.user() else {
            return Ok(None);
        };

        if viewer.id == self.id {
            return Ok(Some(false));
        }

        let edge = global
            .store
            .follow_between(viewer.id, self.id)
            .await
            .map_err_gql("failed to fetch follow")?;

        Ok(Some(edge.is_some()))
    }
}

impl From<user::Model> for User {
    fn from(value: user::Model) -> Self {
        Self {
            id: value.id,
            username: value.username,
            display_name: value.display_name,
            avatar_url: value.avatar_url,
            bio: value.bio,
            location: value.location,
            website: value.website,
            created_at: value.created_at.into(),
            email_: value.email,
        }
    }
}
