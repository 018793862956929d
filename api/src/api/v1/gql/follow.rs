use async_graphql::{Context, Object, SimpleObject};
use uuid::Uuid;

use crate::service::{FollowError, ToggleOutcome};

use super::error::{GqlError, Result};
use super::ext::ContextExt;

/// The outcome of a follow toggle.
///
/// Store failures are reported in-band rather than as a GraphQL error so the
/// client can always read a `success` flag off the payload.
#[derive(SimpleObject)]
pub struct FollowResult {
    pub success: bool,
    /// Whether the viewer follows the target after the toggle. Null when the
    /// toggle failed.
    pub following: Option<bool>,
    pub error: Option<String>,
}

#[derive(Default, Clone)]
pub struct FollowMutation;

#[Object]
/// The mutation object for the social graph
impl FollowMutation {
    /// Follows the target if not currently followed, otherwise unfollows.
    /// Following a user notifies them.
    async fn toggle_follow(
        &self,
        ctx: &Context<'_>,
        #[graphql(desc = "The id of the user to follow or unfollow.")] target_id: Uuid,
    ) -> Result<FollowResult> {
        let global = ctx.get_global();
        let request_context = ctx.get_req_context();

        let viewer = request_context.require_user()?;

        match global.follow_service.toggle(viewer.id, target_id).await {
            Ok(outcome) => Ok(FollowResult {
                success: true,
                following: Some(outcome == ToggleOutcome::Followed),
                error: None,
            }),
            Err(FollowError::SelfFollow) => Err(GqlError::InvalidInput
                .with_message("You cannot follow yourself")
                .with_field(vec!["targetId"])),
            // The service already logged the failure with its context.
            Err(FollowError::Store(_)) => Ok(FollowResult {
                success: false,
                following: None,
                error: Some("Error toggling follow".to_string()),
            }),
        }
    }
}
