use std::time::Duration;

use serde_json::json;

use crate::api;
use crate::api::v1::gql::PLAYGROUND_HTML;
use crate::config::AppConfig;
use crate::identity::IdentityClaims;
use crate::store::SocialStore;
use crate::tests::global::mock_global_state;

fn test_config() -> (AppConfig, String) {
    let port = portpicker::pick_unused_port().expect("failed to pick a port");
    let config = AppConfig {
        bind_address: format!("127.0.0.1:{port}"),
        ..Default::default()
    };
    let base = format!("http://127.0.0.1:{port}/v1");
    (config, base)
}

#[tokio::test]
async fn test_health_via_http() {
    let (config, base) = test_config();
    let (global, _, handler) = mock_global_state(config).await;

    let h = tokio::spawn(api::run(global));

    tokio::time::sleep(Duration::from_millis(300)).await;

    let res = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "OK");

    tokio::time::timeout(Duration::from_secs(1), handler.cancel())
        .await
        .unwrap();
    tokio::time::timeout(Duration::from_secs(1), h)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_gql_noop_via_http() {
    let (config, base) = test_config();
    let (global, _, handler) = mock_global_state(config).await;

    let h = tokio::spawn(api::run(global));

    tokio::time::sleep(Duration::from_millis(300)).await;

    let client = reqwest::Client::new();
    let res = client
        .post(format!("{base}/gql"))
        .json(&json!({ "query": "query { noop }" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body.get("data"), Some(&json!({ "noop": false })));

    let res = client
        .get(format!("{base}/gql"))
        .query(&[("query", "query { noop }")])
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body.get("data"), Some(&json!({ "noop": false })));

    drop(client);

    tokio::time::timeout(Duration::from_secs(1), handler.cancel())
        .await
        .unwrap();
    tokio::time::timeout(Duration::from_secs(1), h)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_auth_middleware_rejects_bad_token() {
    let (config, base) = test_config();
    let (global, _, handler) = mock_global_state(config).await;

    let h = tokio::spawn(api::run(global));

    tokio::time::sleep(Duration::from_millis(300)).await;

    let client = reqwest::Client::new();
    let res = client
        .post(format!("{base}/gql"))
        .header("Authorization", "Bearer not-a-token")
        .json(&json!({ "query": "query { noop }" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 401);

    drop(client);

    tokio::time::timeout(Duration::from_secs(1), handler.cancel())
        .await
        .unwrap();
    tokio::time::timeout(Duration::from_secs(1), h)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_sync_and_toggle_follow_via_http() {
    let (config, base) = test_config();
    let jwt_secret = config.jwt_secret.clone();
    let jwt_issuer = config.jwt_issuer.clone();
    let (global, store, handler) = mock_global_state(config).await;

    let target = store
        .create_user(crate::store::NewUser {
            external_id: "ext_target".to_string(),
            username: "target".to_string(),
            display_name: "target".to_string(),
            email: "target@example.com".to_string(),
            avatar_url: None,
        })
        .await
        .unwrap();

    let h = tokio::spawn(api::run(global));

    tokio::time::sleep(Duration::from_millis(300)).await;

    let claims = IdentityClaims {
        subject: "auth0|http".to_string(),
        username: Some("httpuser".to_string()),
        name: None,
        email: "httpuser@example.com".to_string(),
        avatar_url: None,
    };
    let token = claims
        .sign(&jwt_secret, &jwt_issuer)
        .expect("failed to sign token");

    let client = reqwest::Client::new();

    // First contact materializes the account.
    let res = client
        .post(format!("{base}/gql"))
        .bearer_auth(&token)
        .json(&json!({
            "query": "mutation { account { syncAccount { username } } }"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(
        body["data"]["account"]["syncAccount"]["username"],
        json!("httpuser")
    );

    // Then the toggle runs against the materialized account.
    let res = client
        .post(format!("{base}/gql"))
        .bearer_auth(&token)
        .json(&json!({
            "query": format!(
                r#"mutation {{ follow {{ toggleFollow(targetId: "{}") {{ success following }} }} }}"#,
                target.id
            )
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(
        body["data"]["follow"]["toggleFollow"],
        json!({ "success": true, "following": true })
    );

    assert_eq!(store.notifications_for(target.id).await.unwrap().len(), 1);

    drop(client);

    tokio::time::timeout(Duration::from_secs(1), handler.cancel())
        .await
        .unwrap();
    tokio::time::timeout(Duration::from_secs(1), h)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_playground() {
    let (config, base) = test_config();
    let (global, _, handler) = mock_global_state(config).await;

    let h = tokio::spawn(api::run(global));

    tokio::time::sleep(Duration::from_millis(300)).await;

    let res = reqwest::get(format!("{base}/gql/playground")).await.unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(
        res.headers().get("content-type").unwrap().to_str().unwrap(),
        "text/html"
    );
    assert_eq!(res.text().await.unwrap(), PLAYGROUND_HTML);

    tokio::time::timeout(Duration::from_secs(1), handler.cancel())
        .await
        .unwrap();
    tokio::time::timeout(Duration::from_secs(1), h)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
}
