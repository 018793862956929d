use std::sync::{Arc, Weak};

use hyper::http::header;
use hyper::{Body, StatusCode};
use routerify::{prelude::RequestExt, Middleware};

use crate::api::error::{ResultExt, RouteError};
use crate::api::v1::gql::request_context::RequestContext;
use crate::global::GlobalState;
use crate::identity::IdentityClaims;

/// Resolves the caller's identity before any route runs.
///
/// Requests without an Authorization header pass through anonymously. A
/// header that is present but does not verify is rejected here, so routes
/// never see a half-authenticated request.
pub fn auth_middleware(_global: &Arc<GlobalState>) -> Middleware<Body, RouteError> {
    Middleware::pre(|req| async move {
        let Some(token) = req.headers().get(header::AUTHORIZATION) else {
            return Ok(req);
        };

        let global = req
            .data::<Weak<GlobalState>>()
            .expect("global state not found")
            .upgrade()
            .ok_or((
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to upgrade global state",
            ))?;

        let token = token
            .to_str()
            .map_err(|e| (StatusCode::UNAUTHORIZED, "invalid authentication token", e))?;

        // Tokens start with "Bearer " so we need to remove that
        if !token.starts_with("Bearer ") {
            return Err(RouteError::from((
                StatusCode::UNAUTHORIZED,
                "invalid authentication token",
            )));
        }

        let claims = IdentityClaims::verify(
            &global.config.jwt_secret,
            &global.config.jwt_issuer,
            token.trim_start_matches("Bearer "),
        )
        .ok_or((StatusCode::UNAUTHORIZED, "invalid authentication token"))?;

        // The local account may not exist yet; resolvers that need one
        // either require it or materialize it from the claims.
        let user = global
            .store
            .user_by_external_id(&claims.subject)
            .await
            .extend_route("failed to fetch user")?;

        req.set_context(Arc::new(RequestContext::new(claims, user)));

        Ok(req)
    })
}
