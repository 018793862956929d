use std::sync::{Arc, Weak};

use hyper::{Body, Request, Response, StatusCode};
use routerify::prelude::RequestExt;
use serde_json::json;

use crate::api::error::{Result, ResultExt, RouteError};
use crate::global::GlobalState;

use super::ext::RequestExt as GqlRequestExt;
use super::request_context::RequestContext;
use super::MySchema;

pub async fn graphql_handler(mut req: Request<Body>) -> Result<Response<Body>> {
    if req.method() == hyper::Method::OPTIONS {
        return Ok(hyper::Response::builder()
            .status(StatusCode::OK)
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
            .header(
                "Access-Control-Allow-Headers",
                "Content-Type, Authorization",
            )
            .header("Access-Control-Max-Age", "86400")
            .body(Body::empty())
            .expect("failed to build response"));
    }

    let schema = req
        .data::<MySchema>()
        .expect("failed to get schema")
        .clone();

    let global = req
        .data::<Weak<GlobalState>>()
        .and_then(|w| w.upgrade())
        .ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to get global state",
        ))?;

    // Anonymous requests never pass the auth middleware, so the context may
    // be absent.
    let context = req
        .context::<Arc<RequestContext>>()
        .unwrap_or_default();

    // A post request carries the GraphQL request in the body; a get request
    // carries it in the query string.
    let request = match *req.method() {
        hyper::Method::POST => {
            let content_type = req
                .headers()
                .get("content-type")
                .and_then(|val| val.to_str().ok())
                .map(|s| s.to_string());

            let body = hyper::body::to_bytes(req.body_mut())
                .await
                .map_err(|e| (StatusCode::BAD_REQUEST, "Invalid request body", e))?;

            async_graphql::http::receive_body(
                content_type.as_deref(),
                body.as_ref(),
                Default::default(),
            )
            .await
            .extend_route((StatusCode::BAD_REQUEST, "Invalid request body"))?
        }
        hyper::Method::GET => {
            let query = req.uri().query().unwrap_or("");

            async_graphql::http::parse_query_string(query)
                .extend_route((StatusCode::BAD_REQUEST, "Invalid query string"))?
        }
        _ => {
            return Err(RouteError::from((
                StatusCode::METHOD_NOT_ALLOWED,
                "Invalid request method",
            )))
        }
    }
    .provide_global(global)
    .provide_context(context);

    let response = schema.execute(request).await;

    let mut resp = Response::builder()
        .status(StatusCode::OK)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
        .header(
            "Access-Control-Allow-Headers",
            "Content-Type, Authorization",
        )
        .header("Access-Control-Max-Age", "86400")
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({
                "data": response.data,
                "errors": if response.errors.is_empty() {
                    None
                } else {
                    Some(response.errors)
                },
                "extensions": response.extensions,
            })
            .to_string(),
        ))
        .expect("failed to build response");

    (&response.http_headers)
        .into_iter()
        .for_each(|(key, value)| {
            resp.headers_mut().insert(key, value.clone());
        });

    Ok(resp)
}
