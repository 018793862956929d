use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::database::user;
use crate::identity::IdentityClaims;

use super::error::{GqlError, Result};

/// Per-request authentication state.
///
/// The claims are set once by the auth middleware; the user slot can be
/// filled later in the same request when the account sync mutation
/// materializes the local row.
#[derive(Default)]
pub struct RequestContext {
    claims: ArcSwap<Option<IdentityClaims>>,
    user: ArcSwap<Option<user::Model>>,
}

impl RequestContext {
    pub fn new(claims: IdentityClaims, user: Option<user::Model>) -> Self {
        Self {
            claims: ArcSwap::from_pointee(Some(claims)),
            user: ArcSwap::from_pointee(user),
        }
    }

    pub fn set_user(&self, user: user::Model) {
        self.user.store(Arc::new(Some(user)));
    }

    pub fn claims(&self) -> Option<IdentityClaims> {
        self.claims.load().as_ref().clone()
    }

    pub fn user(&self) -> Option<user::Model> {
        self.user.load().as_ref().clone()
    }

    pub fn require_claims(&self) -> Result<IdentityClaims> {
        self.claims()
            .ok_or_else(|| GqlError::Unauthorized.with_message("You must be logged in"))
    }

    pub fn require_user(&self) -> Result<user::Model> {
        self.user()
            .ok_or_else(|| GqlError::Unauthorized.with_message("You must be logged in"))
    }
}
