//! End-to-end authorization flow tests
//!
//! Runs the console router against a stub platform server. Both listen on
//! port 0; the reqwest client keeps a cookie jar (so sessions persist across
//! requests) and follows no redirects (so Location headers are observable).

use std::collections::HashMap;
use std::sync::Arc;

use axum::{Form, Json, Router, routing::post};
use ne_console::config::Config;
use ne_console::web::{AppState, create_router};
use reqwest::{StatusCode, header::LOCATION, redirect::Policy};
use serde_json::json;
use tokio::net::TcpListener;

const AUTH_BASE: &str = "https://auth.example.test";
const STUB_ACCESS_TOKEN: &str = "stub-access";

/// Stub platform: token exchange plus the two read endpoints.
///
/// `uid=deny` makes the exchange fail; `user_fails` makes the user endpoint
/// return an error envelope.
fn stub_router(user_fails: bool) -> Router {
    Router::new()
        .route(
            "/api_neauth",
            post(|Form(form): Form<HashMap<String, String>>| async move {
                if form.get("uid").map(String::as_str) == Some("deny")
                    || !form.contains_key("state")
                    || !form.contains_key("client_secret")
                {
                    return Json(json!({
                        "result": "error",
                        "code": "002007",
                        "message": "uid or state is invalid"
                    }));
                }
                Json(json!({
                    "result": "success",
                    "access_token": STUB_ACCESS_TOKEN,
                    "refresh_token": "stub-refresh"
                }))
            }),
        )
        .route(
            "/api_app/company",
            post(|Form(form): Form<HashMap<String, String>>| async move {
                if form.get("access_token").map(String::as_str) != Some(STUB_ACCESS_TOKEN) {
                    return Json(json!({
                        "result": "error",
                        "code": "001001",
                        "message": "access token is invalid"
                    }));
                }
                Json(json!({
                    "result": "success",
                    "count": 1,
                    "data": [{"company_id": "10001", "company_name": "Acme Trading"}]
                }))
            }),
        )
        .route(
            "/api_v1_login_user/info",
            post(move |Form(form): Form<HashMap<String, String>>| async move {
                if user_fails
                    || form.get("access_token").map(String::as_str) != Some(STUB_ACCESS_TOKEN)
                {
                    return Json(json!({
                        "result": "error",
                        "code": "001001",
                        "message": "access token is invalid"
                    }));
                }
                Json(json!({
                    "result": "success",
                    "count": 1,
                    "data": [{"pic_id": "7", "pic_name": "Taro Yamada"}]
                }))
            }),
        )
}

async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Spawn the console wired to a stub platform; returns the console base URL
async fn spawn_console(user_fails: bool) -> String {
    let api_base = spawn(stub_router(user_fails)).await;

    let mut config = Config::default();
    config.oauth.client_id = "test-client".to_string();
    config.oauth.client_secret = "test-secret".to_string();
    config.api.auth_base_url = AUTH_BASE.to_string();
    config.api.api_base_url = api_base;
    // Tests run over plain HTTP
    config.session.secure_cookie = false;

    let state = Arc::new(AppState::new(Arc::new(config)));
    spawn(create_router(state)).await
}

fn test_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(Policy::none())
        .cookie_store(true)
        .build()
        .unwrap()
}

fn location(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(LOCATION)
        .expect("redirect should carry a Location header")
        .to_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn protected_route_redirects_to_sign_in_with_previous_uri() {
    let base = spawn_console(false).await;
    let client = test_client();

    let response = client
        .get(format!("{base}/private/company"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    let target = location(&response);
    assert!(target.starts_with(&format!("{AUTH_BASE}/users/sign_in/")));
    assert!(target.contains("client_id=test-client"));
    assert!(target.contains("previous_uri=%2Fprivate%2Fcompany"));
}

#[tokio::test]
async fn successful_callback_authenticates_the_session() {
    let base = spawn_console(false).await;
    let client = test_client();

    let response = client
        .get(format!("{base}/callback?uid=ok-uid&state=ok-state"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/");

    // The gate now lets the request through to the handler
    let response = client
        .get(format!("{base}/private/company"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Acme Trading"));
}

#[tokio::test]
async fn callback_redirects_to_previous_uri_when_relative() {
    let base = spawn_console(false).await;
    let client = test_client();

    let response = client
        .get(format!(
            "{base}/callback?uid=ok-uid&state=ok-state&previous_uri=%2Fprivate%2Fuser"
        ))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/private/user");

    let response = client
        .get(format!("{base}/private/user"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Taro Yamada"));
}

#[tokio::test]
async fn callback_ignores_absolute_previous_uri() {
    let base = spawn_console(false).await;
    let client = test_client();

    let response = client
        .get(format!(
            "{base}/callback?uid=ok-uid&state=ok-state&previous_uri=https%3A%2F%2Fevil.example"
        ))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn failed_exchange_redirects_home_and_session_stays_tokenless() {
    let base = spawn_console(false).await;
    let client = test_client();

    let response = client
        .get(format!("{base}/callback?uid=deny&state=ok-state"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/");

    // Still unauthenticated: the gate redirects to sign-in again
    let response = client
        .get(format!("{base}/private/user"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert!(location(&response).starts_with(AUTH_BASE));
}

#[tokio::test]
async fn callback_without_uid_redirects_home() {
    let base = spawn_console(false).await;
    let client = test_client();

    let response = client
        .get(format!("{base}/callback?state=ok-state"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn failed_api_call_renders_empty_body() {
    let base = spawn_console(true).await;
    let client = test_client();

    client
        .get(format!("{base}/callback?uid=ok-uid&state=ok-state"))
        .send()
        .await
        .unwrap();

    let response = client
        .get(format!("{base}/private/user"))
        .send()
        .await
        .unwrap();

    // No error page: the user sees nothing, the operator sees a log line
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().is_empty());
}

#[tokio::test]
async fn landing_page_is_public() {
    let base = spawn_console(false).await;
    let client = test_client();

    let response = client.get(format!("{base}/")).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Next Engine Console"));
}
