use async_graphql::{Context, Object};

use super::error::{Result, ResultExt};
use super::ext::ContextExt;
use super::models::user::User;

#[derive(Default, Clone)]
pub struct AccountMutation;

#[Object]
/// The mutation object for account management
impl AccountMutation {
    /// Materializes a local account for the authenticated identity, or
    /// returns the existing one. Safe to call on every login.
    async fn sync_account(&self, ctx: &Context<'_>) -> Result<User> {
        let global = ctx.get_global();
        let request_context = ctx.get_req_context();

        let claims = request_context.require_claims()?;

        let user = global
            .user_service
            .sync_user(&claims)
            .await
            .map_err_gql("failed to sync account")?;

        // Later resolvers in this request see the fresh account.
        request_context.set_user(user.clone());

        Ok(User::from(user))
    }
}
