// The `mailbox` module provides the mail-provider client: authentication,
// candidate listing, message retrieval, and label mutation.

pub mod auth;
pub mod gmail;
pub mod message;

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

pub use auth::{AuthError, AuthFlow, GmailHub, gmail_session};
pub use gmail::GmailMailbox;
pub use message::{MailMessage, extract_plain_text_body};

/// The `MailboxError` enum defines the possible errors raised by a mailbox.
#[derive(Error, Debug)]
pub enum MailboxError {
    /// A provider API call failed.
    #[error("gmail {op} call failed: {detail}")]
    Api { op: &'static str, detail: String },
}

/// The criterion used to choose which messages a run processes.
#[derive(Clone, Debug, PartialEq)]
pub enum Selector {
    /// The provider-native unread flag.
    Unread,
    /// Messages carrying the given label id.
    LabelId(String),
}

/// The `Mailbox` trait defines the contract for any mail provider the
/// pipeline can poll.
#[async_trait]
pub trait Mailbox: Send + Sync {
    /// Lists the ids of candidate messages matching the selector. An empty
    /// sequence is a normal result, never an error.
    async fn list_candidates(&self, selector: &Selector) -> Result<Vec<String>, MailboxError>;

    /// Fetches a message's headers and plain-text body by id.
    async fn fetch_message(&self, id: &str) -> Result<MailMessage, MailboxError>;

    /// Adds and removes label ids on a message in one provider call.
    async fn swap_labels(
        &self,
        id: &str,
        add: Vec<String>,
        remove: Vec<String>,
    ) -> Result<(), MailboxError>;

    /// Resolves label names to label ids from the account's label catalog.
    /// Names with no matching label are simply absent from the result.
    async fn resolve_label_ids(
        &self,
        names: &[String],
    ) -> Result<HashMap<String, String>, MailboxError>;
}
