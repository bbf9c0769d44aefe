pub mod telegram;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Chat identifier as delivered by the platform: numeric for Telegram chats,
/// a string for `@channel` style targets.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ChatId {
    Id(i64),
    Name(String),
}

impl ChatId {
    pub fn is_empty(&self) -> bool {
        match self {
            ChatId::Id(id) => *id == 0,
            ChatId::Name(name) => name.is_empty(),
        }
    }
}

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatId::Id(id) => write!(f, "{}", id),
            ChatId::Name(name) => write!(f, "{}", name),
        }
    }
}

/// Inbound webhook payload. Every level is optional so that partial bodies
/// still parse and can be rejected with a proper status.
#[derive(Debug, Default, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub message: Option<UpdateMessage>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateMessage {
    #[serde(default)]
    pub chat: Option<UpdateChat>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateChat {
    #[serde(default)]
    pub id: Option<ChatId>,
}

/// A message that carries everything needed to answer it
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingMessage {
    pub chat_id: ChatId,
    pub text: String,
}

impl IncomingMessage {
    /// `None` when the chat id or the text is missing or empty.
    pub fn from_update(update: Update) -> Option<Self> {
        let message = update.message?;
        let chat_id = message.chat?.id.filter(|id| !id.is_empty())?;
        let text = message.text.filter(|t| !t.is_empty())?;
        Some(Self { chat_id, text })
    }
}

/// Outbound messaging primitives used by the webhook.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    async fn send_text(&self, chat_id: &ChatId, text: &str) -> Result<()>;

    async fn upload_photo(&self, chat_id: &ChatId, data: Vec<u8>) -> Result<()>;

    async fn upload_video(&self, chat_id: &ChatId, data: Vec<u8>) -> Result<()>;

    async fn upload_document(
        &self,
        chat_id: &ChatId,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<()>;
}
