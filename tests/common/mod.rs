#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{redirect::Policy, Client, Response, StatusCode};
use serde_json::{json, Value};

use tradebook::config::AppConfig;
use tradebook::database::Stores;
use tradebook::{app, AppState};

pub const ROOT_EMAIL: &str = "root@example.com";
pub const PASSWORD: &str = "correct horse";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: Client,
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.database.url = None;
    config.security.bcrypt_cost = 4;
    config.security.super_admin_email = Some(ROOT_EMAIL.to_string());
    config.security.secure_cookies = false;
    config
}

/// Serve the real router on a free port, backed by fresh in-memory stores.
/// The server lives as long as the calling test's runtime.
pub async fn spawn_server() -> Result<TestServer> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}", port);

    let state = AppState::new(Arc::new(test_config()), Stores::in_memory());
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app(state)).await;
    });

    // Redirects are asserted on, not followed
    let client = Client::builder().redirect(Policy::none()).build()?;
    let server = TestServer { port, base_url, client };
    server.wait_ready(Duration::from_secs(5)).await?;
    Ok(server)
}

impl TestServer {
    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<Response> {
        let mut req = self.client.get(self.url(path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        Ok(req.send().await?)
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> Result<Response> {
        let mut req = self.client.post(self.url(path)).json(&body);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        Ok(req.send().await?)
    }

    pub async fn register(&self, email: &str, name: &str) -> Result<Response> {
        self.post("/api/register", None, json!({ "email": email, "password": PASSWORD, "name": name }))
            .await
    }

    /// Log in and return the bearer token.
    pub async fn login(&self, email: &str) -> Result<String> {
        let resp = self
            .post("/api/auth/login", None, json!({ "email": email, "password": PASSWORD }))
            .await?;
        anyhow::ensure!(resp.status() == StatusCode::OK, "login failed: {}", resp.status());
        let body: Value = resp.json().await?;
        body["data"]["token"]
            .as_str()
            .map(str::to_string)
            .context("login response has no token")
    }

    /// Register the configured super-admin and log in.
    pub async fn root_token(&self) -> Result<String> {
        self.register(ROOT_EMAIL, "Root").await?;
        self.login(ROOT_EMAIL).await
    }

    pub async fn account_id(&self, admin_token: &str, email: &str) -> Result<String> {
        let body: Value = self.get("/api/admin/users", Some(admin_token)).await?.json().await?;
        body["data"]["users"]
            .as_array()
            .and_then(|users| users.iter().find(|u| u["email"] == email))
            .and_then(|u| u["id"].as_str())
            .map(str::to_string)
            .with_context(|| format!("no account for {}", email))
    }

    /// Register `email`, approve it as `admin_token`, and log it in.
    pub async fn approved_user(&self, admin_token: &str, email: &str) -> Result<String> {
        self.register(email, "Trader").await?;
        let id = self.account_id(admin_token, email).await?;
        let resp = self
            .post("/api/admin/approve", Some(admin_token), json!({ "userId": id, "action": "approve" }))
            .await?;
        anyhow::ensure!(resp.status() == StatusCode::OK, "approve failed: {}", resp.status());
        self.login(email).await
    }
}
