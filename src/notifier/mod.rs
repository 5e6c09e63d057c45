// The `notifier` module delivers rendered summaries to a chat destination.

pub mod telegram;

use async_trait::async_trait;
use thiserror::Error;

pub use telegram::TelegramNotifier;

/// The `NotifyError` enum defines the possible errors raised by a notifier.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The outbound send failed at the transport level.
    #[error("failed to send the notification: {0}")]
    Transport(String),
}

/// The `Notifier` trait defines the contract for any chat destination the
/// pipeline can deliver to.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends one formatted text message. Fire and forget: the delivery
    /// response is not inspected beyond transport success.
    async fn notify(&self, text: String) -> Result<(), NotifyError>;
}
