// The `gmail` module implements the `Mailbox` trait on top of the Gmail API.

use crate::mailbox::auth::{AuthError, AuthFlow, GmailHub, gmail_session};
use crate::mailbox::message::MailMessage;
use crate::mailbox::{Mailbox, MailboxError, Selector};
use async_trait::async_trait;
use google_gmail1::api::{ModifyMessageRequest, Scope};
use std::collections::HashMap;
use tracing::debug;

/// The provider-native query for the unread selector.
const UNREAD_QUERY: &str = "is:unread";
/// Page size used when polling unread messages.
const UNREAD_PAGE_SIZE: u32 = 3;

/// A [`Mailbox`] backed by the Gmail API.
#[derive(Clone)]
pub struct GmailMailbox {
    hub: GmailHub,
}

impl GmailMailbox {
    /// Authenticates and returns a connected mailbox.
    pub async fn connect(flow: &AuthFlow, scopes: &[Scope]) -> Result<Self, AuthError> {
        let hub = gmail_session(flow, scopes).await?;
        Ok(Self { hub })
    }
}

#[async_trait]
impl Mailbox for GmailMailbox {
    async fn list_candidates(&self, selector: &Selector) -> Result<Vec<String>, MailboxError> {
        let call = self.hub.users().messages_list("me");
        let call = match selector {
            Selector::Unread => call.q(UNREAD_QUERY).max_results(UNREAD_PAGE_SIZE),
            Selector::LabelId(id) => call.add_label_ids(id),
        };

        let (_, listing) = call.doit().await.map_err(|e| MailboxError::Api {
            op: "messages.list",
            detail: e.to_string(),
        })?;

        // An empty mailbox page is a normal outcome, not an error.
        let ids: Vec<String> = listing
            .messages
            .unwrap_or_default()
            .into_iter()
            .filter_map(|message| message.id)
            .collect();
        debug!(candidates = ids.len(), "listed candidate messages");
        Ok(ids)
    }

    async fn fetch_message(&self, id: &str) -> Result<MailMessage, MailboxError> {
        let (_, message) = self
            .hub
            .users()
            .messages_get("me", id)
            .format("full")
            .doit()
            .await
            .map_err(|e| MailboxError::Api {
                op: "messages.get",
                detail: e.to_string(),
            })?;

        Ok(MailMessage::from_gmail(message))
    }

    async fn swap_labels(
        &self,
        id: &str,
        add: Vec<String>,
        remove: Vec<String>,
    ) -> Result<(), MailboxError> {
        // Both sides of the transition go out in a single modify call, so the
        // provider applies them together rather than leaving a window between
        // a remove and an add.
        let request = ModifyMessageRequest {
            add_label_ids: (!add.is_empty()).then_some(add),
            remove_label_ids: (!remove.is_empty()).then_some(remove),
        };

        self.hub
            .users()
            .messages_modify(request, "me", id)
            .doit()
            .await
            .map_err(|e| MailboxError::Api {
                op: "messages.modify",
                detail: e.to_string(),
            })?;
        Ok(())
    }

    async fn resolve_label_ids(
        &self,
        names: &[String],
    ) -> Result<HashMap<String, String>, MailboxError> {
        let (_, catalog) = self
            .hub
            .users()
            .labels_list("me")
            .doit()
            .await
            .map_err(|e| MailboxError::Api {
                op: "labels.list",
                detail: e.to_string(),
            })?;

        let mut resolved = HashMap::new();
        for label in catalog.labels.unwrap_or_default() {
            if let (Some(name), Some(id)) = (label.name, label.id) {
                if names.contains(&name) {
                    resolved.insert(name, id);
                }
            }
        }
        Ok(resolved)
    }
}
