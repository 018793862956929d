use std::sync::Arc;

use async_graphql::{
    extensions, ComplexObject, Context, EmptySubscription, Schema, SimpleObject,
};
use hyper::{Body, Response};
use routerify::Router;
use uuid::Uuid;

use crate::api::error::RouteError;
use crate::global::GlobalState;

use self::error::{Result, ResultExt};
use self::ext::ContextExt;

pub mod account;
pub mod error;
pub mod ext;
pub mod follow;
pub mod handlers;
pub mod models;
pub mod request_context;

#[derive(Default, SimpleObject)]
#[graphql(complex)]
/// The root query type which contains root level fields.
pub struct Query {
    noop: bool,
}

#[derive(Default, SimpleObject)]
/// The root mutation type which contains root level fields.
pub struct Mutation {
    follow: follow::FollowMutation,
    account: account::AccountMutation,
}

#[ComplexObject]
impl Query {
    /// The authenticated viewer's account, if one has been synced.
    async fn me(&self, ctx: &Context<'_>) -> Result<Option<models::user::User>> {
        let request_context = ctx.get_req_context();

        Ok(request_context.user().map(models::user::User::from))
    }

    async fn user_by_id(
        &self,
        ctx: &Context<'_>,
        #[graphql(desc = "The id of the user.")] id: Uuid,
    ) -> Result<Option<models::user::User>> {
        let global = ctx.get_global();

        let user = global
            .user_by_id_loader
            .load_one(id)
            .await
            .map_err_gql("failed to fetch user")?;

        Ok(user.map(models::user::User::from))
    }

    async fn user_by_username(
        &self,
        ctx: &Context<'_>,
        #[graphql(desc = "The username of the user.")] username: String,
    ) -> Result<Option<models::user::User>> {
        let global = ctx.get_global();

        let user = global
            .user_by_username_loader
            .load_one(username)
            .await
            .map_err_gql("failed to fetch user")?;

        Ok(user.map(models::user::User::from))
    }

    async fn followers(
        &self,
        ctx: &Context<'_>,
        #[graphql(desc = "The id of the user whose followers to list.")] user_id: Uuid,
    ) -> Result<Vec<models::user::User>> {
        let global = ctx.get_global();

        let users = global
            .user_service
            .followers(user_id)
            .await
            .map_err_gql("failed to fetch followers")?;

        Ok(users.into_iter().map(models::user::User::from).collect())
    }

    async fn following(
        &self,
        ctx: &Context<'_>,
        #[graphql(desc = "The id of the user whose followed accounts to list.")] user_id: Uuid,
    ) -> Result<Vec<models::user::User>> {
        let global = ctx.get_global();

        let users = global
            .user_service
            .following(user_id)
            .await
            .map_err_gql("failed to fetch following")?;

        Ok(users.into_iter().map(models::user::User::from).collect())
    }

    /// Users ranked by follower count, most followed first.
    async fn top_influencers(
        &self,
        ctx: &Context<'_>,
        #[graphql(desc = "How many users to return. Defaults to 10.")] limit: Option<i64>,
    ) -> Result<Vec<models::user::User>> {
        let global = ctx.get_global();

        let users = global
            .user_service
            .top_influencers(limit)
            .await
            .map_err_gql("failed to fetch top influencers")?;

        Ok(users.into_iter().map(models::user::User::from).collect())
    }

    /// A few accounts the viewer does not follow yet.
    async fn suggested_users(&self, ctx: &Context<'_>) -> Result<Vec<models::user::User>> {
        let global = ctx.get_global();
        let request_context = ctx.get_req_context();

        let viewer = request_context.require_user()?;

        let users = global
            .user_service
            .suggested_users(viewer.id)
            .await
            .map_err_gql("failed to fetch suggested users")?;

        Ok(users.into_iter().map(models::user::User::from).collect())
    }

    /// The viewer's notification feed, newest first.
    async fn notifications(
        &self,
        ctx: &Context<'_>,
    ) -> Result<Vec<models::notification::Notification>> {
        let global = ctx.get_global();
        let request_context = ctx.get_req_context();

        let viewer = request_context.require_user()?;

        let notifications = global
            .user_service
            .notifications(viewer.id)
            .await
            .map_err_gql("failed to fetch notifications")?;

        Ok(notifications
            .into_iter()
            .map(models::notification::Notification::from)
            .collect())
    }

    async fn unread_notification_count(&self, ctx: &Context<'_>) -> Result<i64> {
        let global = ctx.get_global();
        let request_context = ctx.get_req_context();

        let viewer = request_context.require_user()?;

        global
            .user_service
            .unread_count(viewer.id)
            .await
            .map_err_gql("failed to fetch unread notification count")
    }
}

pub type MySchema = Schema<Query, Mutation, EmptySubscription>;

pub const PLAYGROUND_HTML: &str = include_str!("playground.html");

pub fn schema() -> MySchema {
    Schema::build(Query::default(), Mutation::default(), EmptySubscription)
        .extension(extensions::Analyzer)
        .limit_complexity(100) // We don't want to allow too complex queries to be executed
        .finish()
}

pub fn routes(_global: &Arc<GlobalState>) -> Router<Body, RouteError> {
    Router::builder()
        .data(schema())
        .any_method("/", handlers::graphql_handler)
        .get("/playground", move |_| async move {
            Ok(Response::builder()
                .status(200)
                .header("content-type", "text/html")
                .body(Body::from(PLAYGROUND_HTML))
                .expect("failed to build response"))
        })
        .build()
        .expect("failed to build router")
}
