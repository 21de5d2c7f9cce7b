//! Progress reporting seam between the pipeline and the chat.
//!
//! The pipeline talks to a `Notify` trait object instead of the bot type so
//! it can run (and be tested) without a Telegram connection.

use async_trait::async_trait;
use teloxide::prelude::*;
use tracing::warn;

#[async_trait]
pub trait Notify: Send + Sync {
    async fn send(&self, text: &str);
}

/// Sends progress messages into the chat the batch came from.
pub struct TelegramNotifier {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramNotifier {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }
}

#[async_trait]
impl Notify for TelegramNotifier {
    async fn send(&self, text: &str) {
        // A lost progress message must not fail the pipeline.
        if let Err(e) = self.bot.send_message(self.chat_id, text).await {
            warn!("failed to send progress message: {e}");
        }
    }
}
