// The `telegram` module implements the `Notifier` trait over the Telegram
// bot API.

use crate::notifier::{Notifier, NotifyError};
use async_trait::async_trait;
use teloxide::{
    Bot,
    payloads::SendMessageSetters,
    prelude::Requester,
    types::{ChatId, ParseMode},
};
use tracing::debug;

/// A [`Notifier`] that posts to one Telegram chat.
///
/// Messages are sent with HTML parse mode; the caller is responsible for
/// HTML-escaping dynamic text.
#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramNotifier {
    pub fn new(token: &str, chat_id: i64) -> Self {
        Self {
            bot: Bot::new(token),
            chat_id: ChatId(chat_id),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, text: String) -> Result<(), NotifyError> {
        self.bot
            .send_message(self.chat_id, text)
            .parse_mode(ParseMode::Html)
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        debug!(chat_id = self.chat_id.0, "notification delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifier_builds_from_token_and_chat_id() {
        let notifier = TelegramNotifier::new("123456:test-token", -100123);
        assert_eq!(notifier.chat_id, ChatId(-100123));
    }
}
