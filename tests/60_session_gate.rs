mod common;

use anyhow::Result;
use reqwest::{header, StatusCode};
use serde_json::Value;

fn location(res: &reqwest::Response) -> Option<String> {
    res.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[tokio::test]
async fn protected_pages_redirect_anonymous_visitors() -> Result<()> {
    let server = common::spawn_server().await?;
    for path in ["/dashboard", "/data", "/upload-csv", "/consignors/acme", "/ADMIN/"] {
        let res = server.get(path, None).await?;
        assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT, "{}", path);
        assert_eq!(location(&res).as_deref(), Some("/login"), "{}", path);
    }
    Ok(())
}

#[tokio::test]
async fn cookie_session_opens_pages() -> Result<()> {
    let server = common::spawn_server().await?;
    let root = server.root_token().await?;

    let res = server
        .client
        .get(server.url("/admin/users"))
        .header(header::COOKIE, format!("theme=dark; session={}", root))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["user"]["role"], "super-admin");
    Ok(())
}

#[tokio::test]
async fn non_admins_are_sent_to_dashboard() -> Result<()> {
    let server = common::spawn_server().await?;
    let root = server.root_token().await?;
    let user = server.approved_user(&root, "user@example.com").await?;

    let res = server.get("/admin", Some(&user)).await?;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res).as_deref(), Some("/dashboard"));

    let res = server.get("/login", Some(&user)).await?;
    assert_eq!(location(&res).as_deref(), Some("/dashboard"));

    // Segment boundary: not an admin page
    let res = server.get("/administrator", Some(&user)).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn public_pages_are_open() -> Result<()> {
    let server = common::spawn_server().await?;
    for path in ["/", "/login", "/register"] {
        let res = server.get(path, None).await?;
        assert_eq!(res.status(), StatusCode::OK, "{}", path);
    }
    Ok(())
}
