mod common;

use anyhow::Result;
use reqwest::{header, StatusCode};
use serde_json::{json, Value};

use common::{ROOT_EMAIL, PASSWORD};

#[tokio::test]
async fn registration_needs_approval_before_login() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server.register("Trader@Example.com", "Trader").await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["approved"], false);

    let res = server
        .post("/api/auth/login", None, json!({ "email": "trader@example.com", "password": PASSWORD }))
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "INVALID_CREDENTIALS");
    Ok(())
}

#[tokio::test]
async fn super_admin_is_approved_on_registration() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server.register(ROOT_EMAIL, "Root").await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["approved"], true);

    let res = server
        .post("/api/auth/login", None, json!({ "email": ROOT_EMAIL, "password": PASSWORD }))
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = res
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_default();
    assert!(cookie.starts_with("session="));
    assert!(cookie.contains("HttpOnly"));

    let body: Value = res.json().await?;
    assert_eq!(body["data"]["user"]["role"], "super-admin");
    assert!(body["data"]["expires_in"].as_u64().unwrap() > 0);
    Ok(())
}

#[tokio::test]
async fn duplicate_and_incomplete_registrations_are_rejected() -> Result<()> {
    let server = common::spawn_server().await?;
    server.register("a@example.com", "A").await?;

    let res = server.register("A@EXAMPLE.COM", "Again").await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "CONFLICT");

    let res = server.post("/api/register", None, json!({ "email": "b@example.com" })).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let res = server
        .client
        .post(server.url("/api/register"))
        .header(header::CONTENT_TYPE, "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn session_endpoint_reflects_token_or_cookie() -> Result<()> {
    let server = common::spawn_server().await?;
    let token = server.root_token().await?;

    let res = server.get("/api/auth/session", Some(&token)).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["email"], ROOT_EMAIL);

    let res = server
        .client
        .get(server.url("/api/auth/session"))
        .header(header::COOKIE, format!("session={}", token))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = server.get("/api/auth/session", None).await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server.get("/api/auth/session", Some("garbage")).await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn logout_clears_the_cookie() -> Result<()> {
    let server = common::spawn_server().await?;
    let res = server.post("/api/auth/logout", None, json!({})).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = res.headers().get(header::SET_COOKIE).unwrap().to_str()?;
    assert!(cookie.contains("Max-Age=0"));
    Ok(())
}
