use std::sync::Arc;

use serde_json::json;

use crate::api::v1::gql::ext::RequestExt;
use crate::api::v1::gql::request_context::RequestContext;
use crate::api::v1::gql::schema;
use crate::config::AppConfig;
use crate::database::user;
use crate::global::GlobalState;
use crate::identity::IdentityClaims;
use crate::store::{MemoryStore, NewUser, SocialStore};
use crate::tests::global::mock_global_state;

async fn seed_user(store: &MemoryStore, username: &str) -> user::Model {
    store
        .create_user(NewUser {
            external_id: format!("ext_{username}"),
            username: username.to_string(),
            display_name: username.to_string(),
            email: format!("{username}@example.com"),
            avatar_url: None,
        })
        .await
        .expect("failed to seed user")
}

fn claims_for(user: &user::Model) -> IdentityClaims {
    IdentityClaims {
        subject: user.external_id.clone(),
        username: Some(user.username.clone()),
        name: Some(user.display_name.clone()),
        email: user.email.clone(),
        avatar_url: user.avatar_url.clone(),
    }
}

fn context_for(user: &user::Model) -> Arc<RequestContext> {
    Arc::new(RequestContext::new(claims_for(user), Some(user.clone())))
}

async fn execute(
    global: &Arc<GlobalState>,
    context: Arc<RequestContext>,
    query: &str,
) -> async_graphql::Response {
    let request = async_graphql::Request::new(query)
        .provide_global(global.clone())
        .provide_context(context);

    schema().execute(request).await
}

#[tokio::test]
async fn test_query_noop() {
    let (global, _, _handler) = mock_global_state(AppConfig::default()).await;

    let res = execute(&global, Arc::default(), "query { noop }").await;
    assert_eq!(res.errors.len(), 0);
    assert_eq!(res.data.into_json().unwrap(), json!({ "noop": false }));
}

#[tokio::test]
async fn test_toggle_follow_requires_auth() {
    let (global, store, _handler) = mock_global_state(AppConfig::default()).await;
    let target = seed_user(&store, "target").await;

    let query = format!(
        r#"mutation {{ follow {{ toggleFollow(targetId: "{}") {{ success }} }} }}"#,
        target.id
    );

    let res = execute(&global, Arc::default(), &query).await;
    assert_eq!(res.errors.len(), 1);
    assert!(res.errors[0].message.contains("Unauthorized"));
}

#[tokio::test]
async fn test_toggle_follow_rejects_self() {
    let (global, store, _handler) = mock_global_state(AppConfig::default()).await;
    let alice = seed_user(&store, "alice").await;

    let query = format!(
        r#"mutation {{ follow {{ toggleFollow(targetId: "{}") {{ success }} }} }}"#,
        alice.id
    );

    let res = execute(&global, context_for(&alice), &query).await;
    assert_eq!(res.errors.len(), 1);
    assert!(res.errors[0].message.contains("InvalidInput"));
    assert!(res.errors[0].message.contains("cannot follow yourself"));

    assert!(store
        .follow_between(alice.id, alice.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_toggle_follow_roundtrip() {
    let (global, store, _handler) = mock_global_state(AppConfig::default()).await;
    let alice = seed_user(&store, "alice").await;
    let bob = seed_user(&store, "bob").await;

    let query = format!(
        r#"mutation {{ follow {{ toggleFollow(targetId: "{}") {{ success following error }} }} }}"#,
        bob.id
    );

    let res = execute(&global, context_for(&alice), &query).await;
    assert_eq!(res.errors.len(), 0, "{:?}", res.errors);
    assert_eq!(
        res.data.into_json().unwrap(),
        json!({ "follow": { "toggleFollow": { "success": true, "following": true, "error": null } } })
    );

    assert_eq!(store.notifications_for(bob.id).await.unwrap().len(), 1);

    let res = execute(&global, context_for(&alice), &query).await;
    assert_eq!(res.errors.len(), 0);
    assert_eq!(
        res.data.into_json().unwrap(),
        json!({ "follow": { "toggleFollow": { "success": true, "following": false, "error": null } } })
    );

    assert!(store.follow_between(alice.id, bob.id).await.unwrap().is_none());
    // The unfollow leaves the original notification in place.
    assert_eq!(store.notifications_for(bob.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_sync_account_creates_then_reuses() {
    let (global, store, _handler) = mock_global_state(AppConfig::default()).await;

    let claims = IdentityClaims {
        subject: "auth0|77".to_string(),
        username: Some("carol".to_string()),
        name: Some("Carol".to_string()),
        email: "carol@example.com".to_string(),
        avatar_url: None,
    };

    let context = Arc::new(RequestContext::new(claims.clone(), None));
    let query = "mutation { account { syncAccount { id username displayName } } }";

    let res = execute(&global, context, query).await;
    assert_eq!(res.errors.len(), 0, "{:?}", res.errors);

    let created = store
        .user_by_external_id("auth0|77")
        .await
        .unwrap()
        .expect("account was not materialized");
    assert_eq!(created.username, "carol");

    // Running it again returns the same account.
    let context = Arc::new(RequestContext::new(claims, Some(created.clone())));
    let res = execute(&global, context, query).await;
    assert_eq!(res.errors.len(), 0);
    assert_eq!(
        res.data.into_json().unwrap()["account"]["syncAccount"]["id"],
        json!(created.id.to_string())
    );
}

#[tokio::test]
async fn test_top_influencers_with_counts() {
    let (global, store, _handler) = mock_global_state(AppConfig::default()).await;

    let star = seed_user(&store, "star").await;
    seed_user(&store, "other").await;

    let fans = [
        seed_user(&store, "fan1").await,
        seed_user(&store, "fan2").await,
    ];

    for fan in &fans {
        let query = format!(
            r#"mutation {{ follow {{ toggleFollow(targetId: "{}") {{ success }} }} }}"#,
            star.id
        );
        let res = execute(&global, context_for(fan), &query).await;
        assert_eq!(res.errors.len(), 0);
    }

    let res = execute(
        &global,
        Arc::default(),
        "query { topInfluencers(limit: 2) { username followerCount } }",
    )
    .await;
    assert_eq!(res.errors.len(), 0, "{:?}", res.errors);

    let data = res.data.into_json().unwrap();
    let influencers = data["topInfluencers"].as_array().unwrap();
    assert_eq!(influencers.len(), 2);
    assert_eq!(influencers[0]["username"], json!("star"));
    assert_eq!(influencers[0]["followerCount"], json!(2));
}

#[tokio::test]
async fn test_user_lookup_and_viewer_edge() {
    let (global, store, _handler) = mock_global_state(AppConfig::default()).await;

    let alice = seed_user(&store, "alice").await;
    let bob = seed_user(&store, "bob").await;

    let query = format!(
        r#"mutation {{ follow {{ toggleFollow(targetId: "{}") {{ success }} }} }}"#,
        bob.id
    );
    execute(&global, context_for(&alice), &query).await;

    let query = r#"query { userByUsername(username: "bob") { id isFollowedByViewer } }"#;

    // As the follower.
    let res = execute(&global, context_for(&alice), query).await;
    assert_eq!(res.errors.len(), 0);
    let data = res.data.into_json().unwrap();
    assert_eq!(data["userByUsername"]["id"], json!(bob.id.to_string()));
    assert_eq!(data["userByUsername"]["isFollowedByViewer"], json!(true));

    // Anonymous viewers get null.
    let res = execute(&global, Arc::default(), query).await;
    assert_eq!(res.errors.len(), 0);
    let data = res.data.into_json().unwrap();
    assert_eq!(data["userByUsername"]["isFollowedByViewer"], json!(null));
}

#[tokio::test]
async fn test_email_visible_to_owner_only() {
    let (global, store, _handler) = mock_global_state(AppConfig::default()).await;

    let alice = seed_user(&store, "alice").await;
    let bob = seed_user(&store, "bob").await;

    let query = r#"query { userByUsername(username: "alice") { email } }"#;

    let res = execute(&global, context_for(&alice), query).await;
    assert_eq!(res.errors.len(), 0);
    assert_eq!(
        res.data.into_json().unwrap()["userByUsername"]["email"],
        json!("alice@example.com")
    );

    let res = execute(&global, context_for(&bob), query).await;
    assert_eq!(res.errors.len(), 1);
    assert!(res.errors[0].message.contains("Unauthorized"));
}

#[tokio::test]
async fn test_notifications_feed() {
    let (global, store, _handler) = mock_global_state(AppConfig::default()).await;

    let alice = seed_user(&store, "alice").await;
    let bob = seed_user(&store, "bob").await;

    let query = format!(
        r#"mutation {{ follow {{ toggleFollow(targetId: "{}") {{ success }} }} }}"#,
        bob.id
    );
    execute(&global, context_for(&alice), &query).await;

    let res = execute(
        &global,
        context_for(&bob),
        "query { unreadNotificationCount notifications { kind read creator { username } } }",
    )
    .await;
    assert_eq!(res.errors.len(), 0, "{:?}", res.errors);

    let data = res.data.into_json().unwrap();
    assert_eq!(data["unreadNotificationCount"], json!(1));
    assert_eq!(
        data["notifications"],
        json!([{ "kind": "FOLLOW", "read": false, "creator": { "username": "alice" } }])
    );

    // The actor has no notifications.
    let res = execute(
        &global,
        context_for(&alice),
        "query { unreadNotificationCount }",
    )
    .await;
    assert_eq!(res.errors.len(), 0);
    assert_eq!(
        res.data.into_json().unwrap()["unreadNotificationCount"],
        json!(0)
    );
}

#[tokio::test]
async fn test_suggested_users_requires_auth() {
    let (global, store, _handler) = mock_global_state(AppConfig::default()).await;
    seed_user(&store, "somebody").await;

    let res = execute(
        &global,
        Arc::default(),
        "query { suggestedUsers { username } }",
    )
    .await;
    assert_eq!(res.errors.len(), 1);
    assert!(res.errors[0].message.contains("Unauthorized"));
}
