mod config;
mod error;
mod media;
mod platform;
mod resolver;
mod webhook;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::platform::telegram::TelegramClient;
use crate::resolver::HttpResolver;
use crate::webhook::{webhook_router, WebhookState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,terabox_relay=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Optional config path; env vars fill in or override
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = Config::load(config_path.as_deref()).context("Failed to load configuration")?;

    info!("Configuration loaded successfully");
    info!("  Telegram API: {}", config.telegram.api_url);
    info!("  Resolver: {}", config.resolver.base_url);
    info!("  Trigger: {}", config.resolver.trigger);
    if config.telegram.bot_token.is_empty() {
        warn!("TELEGRAM_BOT_TOKEN is not set; Telegram calls will be rejected");
    }

    let client = reqwest::Client::new();
    let state = WebhookState {
        platform: Arc::new(TelegramClient::new(client.clone(), &config.telegram)),
        resolver: Arc::new(HttpResolver::new(client, config.resolver.base_url.clone())),
        trigger: config.resolver.trigger.clone(),
    };

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!("Webhook listening on http://{}/webhook", addr);

    axum::serve(listener, webhook_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down...");
        })
        .await
        .context("Server error")?;

    Ok(())
}
