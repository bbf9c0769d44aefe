//! Inbound webhook: receives chat updates and relays resolved files back.
//!
//! The HTTP caller only learns whether the payload was well-formed. Everything
//! that happens after that, including failures, is reported to the user as a
//! chat message.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::Result;
use crate::media::MediaKind;
use crate::platform::{ChatId, ChatPlatform, IncomingMessage, Update};
use crate::resolver::FileResolver;

const PROCESSING_TEXT: &str = "Processing your request, please wait...";
const INVALID_LINK_TEXT: &str = "Please send a valid TeraBox link.";
const SUCCESS_TEXT: &str = "File uploaded successfully!";

#[derive(Clone)]
pub struct WebhookState {
    pub platform: Arc<dyn ChatPlatform>,
    pub resolver: Arc<dyn FileResolver>,
    /// Substring that selects the resolve path
    pub trigger: String,
}

#[derive(Debug, Serialize)]
pub struct WebhookStatus {
    pub status: &'static str,
}

impl WebhookStatus {
    fn ok() -> Json<Self> {
        Json(Self { status: "OK" })
    }

    fn invalid() -> Json<Self> {
        Json(Self {
            status: "Invalid data",
        })
    }
}

pub fn webhook_router(state: WebhookState) -> Router {
    Router::new()
        .route("/webhook", post(handle_webhook))
        .with_state(state)
}

async fn handle_webhook(
    State(state): State<WebhookState>,
    body: Bytes,
) -> (StatusCode, Json<WebhookStatus>) {
    let incoming = serde_json::from_slice::<Update>(&body)
        .ok()
        .and_then(IncomingMessage::from_update);

    let Some(incoming) = incoming else {
        warn!(
            "Invalid webhook body: {}",
            String::from_utf8_lossy(&body)
        );
        return (StatusCode::BAD_REQUEST, WebhookStatus::invalid());
    };

    info!("Message from chat {}: {}", incoming.chat_id, incoming.text);

    process_message(&state, &incoming).await;

    (StatusCode::OK, WebhookStatus::ok())
}

/// Run the guidance or resolve path for one message. Never fails: every
/// outcome ends up as a chat message.
pub async fn process_message(state: &WebhookState, msg: &IncomingMessage) {
    if !msg.text.contains(&state.trigger) {
        notify(state, &msg.chat_id, INVALID_LINK_TEXT).await;
        return;
    }

    notify(state, &msg.chat_id, PROCESSING_TEXT).await;

    match relay_file(state, msg).await {
        Ok(kind) => {
            info!("Relayed {} to chat {}", kind, msg.chat_id);
            notify(state, &msg.chat_id, SUCCESS_TEXT).await;
        }
        Err(e) => {
            error!("Failed to relay file for chat {}: {}", msg.chat_id, e);
            notify(state, &msg.chat_id, &e.user_message()).await;
        }
    }
}

async fn relay_file(state: &WebhookState, msg: &IncomingMessage) -> Result<MediaKind> {
    let file = state.resolver.fetch(&msg.text).await?;
    let kind = MediaKind::classify(&file.content_type);

    info!(
        "Fetched {} bytes ({}), uploading as {}",
        file.data.len(),
        file.content_type,
        kind
    );

    match kind {
        MediaKind::Photo => state.platform.upload_photo(&msg.chat_id, file.data).await?,
        MediaKind::Video => state.platform.upload_video(&msg.chat_id, file.data).await?,
        MediaKind::Document => {
            state
                .platform
                .upload_document(&msg.chat_id, file.data, &file.content_type)
                .await?
        }
    }

    Ok(kind)
}

/// Best-effort status message
async fn notify(state: &WebhookState, chat_id: &ChatId, text: &str) {
    if let Err(e) = state.platform.send_text(chat_id, text).await {
        warn!("Failed to send status message to chat {}: {}", chat_id, e);
    }
}
