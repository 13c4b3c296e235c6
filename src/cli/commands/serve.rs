use anyhow::{bail, Context};
use std::sync::Arc;
use tracing::info;

use crate::app::app;
use crate::config::{AppConfig, Environment};
use crate::database::connect_stores;
use crate::state::AppState;

const DEFAULT_PORT: u16 = 3000;

/// `--port`, then `TRADEBOOK_PORT`, then `PORT`.
fn resolve_port(flag: Option<u16>) -> u16 {
    flag.or_else(|| {
        std::env::var("TRADEBOOK_PORT")
            .ok()
            .or_else(|| std::env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
    })
    .unwrap_or(DEFAULT_PORT)
}

pub async fn handle(config: AppConfig, port: Option<u16>) -> anyhow::Result<()> {
    if config.security.session_secret.is_empty() {
        if config.environment == Environment::Production {
            bail!("SESSION_SECRET must be set in production");
        }
        tracing::warn!("SESSION_SECRET is empty; logins will fail until it is set");
    }
    if config.security.super_admin_email.is_none() {
        tracing::warn!("SUPER_ADMIN_EMAIL not set; no account can be approved");
    }

    let config = Arc::new(config);
    let stores = connect_stores(&config).await.context("failed to connect stores")?;
    let manager = stores.manager.clone();
    let router = app(AppState::new(config.clone(), stores));

    let bind_addr = format!("0.0.0.0:{}", resolve_port(port));
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Tradebook listening on http://{} ({:?})", bind_addr, config.environment);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(manager) = manager {
        manager.close().await;
    }
    info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_beats_environment() {
        assert_eq!(resolve_port(Some(8080)), 8080);
    }
}
