// The `pipeline` module orchestrates one run: discover candidates, then for
// each message fetch, summarize, render, notify, and (in label-workflow mode)
// swap the pending label for the done label.

use crate::mailbox::{Mailbox, MailboxError, MailMessage, Selector};
use crate::notifier::Notifier;
use crate::summarizer::{SummarizeInput, Summarizer, SummaryMode, SummaryResult};
use std::fmt;
use teloxide::utils::html::escape;
use thiserror::Error;
use tracing::{info, warn};

/// The bullet substituted when a list-valued digest field is empty.
const EMPTY_LIST_BULLET: &str = "\u{2014}";

/// How a run selects and marks its messages.
#[derive(Clone, Debug)]
pub enum Workflow {
    /// Select by the provider-native unread flag; no state transition.
    PollUnread,
    /// Select by the `pending` label and move processed messages to `done`.
    Labels { pending: String, done: String },
}

impl Workflow {
    /// The summary mode paired with this workflow: polling deployments take
    /// free-text summaries, label-workflow deployments take structured ones.
    pub fn summary_mode(&self) -> SummaryMode {
        match self {
            Workflow::PollUnread => SummaryMode::FreeText,
            Workflow::Labels { .. } => SummaryMode::Structured,
        }
    }
}

/// The per-message step at which a failure was recorded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Stage {
    Fetch,
    Notify,
    LabelSwap,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Fetch => write!(f, "fetch"),
            Stage::Notify => write!(f, "notify"),
            Stage::LabelSwap => write!(f, "label-swap"),
        }
    }
}

/// One isolated per-message failure. The run continues past it.
#[derive(Debug)]
pub struct RunFailure {
    pub message_id: String,
    pub stage: Stage,
    pub detail: String,
}

impl RunFailure {
    fn new(message_id: &str, stage: Stage, error: impl fmt::Display) -> Self {
        Self {
            message_id: message_id.to_string(),
            stage,
            detail: error.to_string(),
        }
    }
}

/// The outcome of one run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Candidate messages discovered by the selector.
    pub discovered: usize,
    /// Messages fully processed through notification (and label swap).
    pub notified: usize,
    /// Per-message failures collected along the way.
    pub failures: Vec<RunFailure>,
}

/// The `PipelineError` enum defines the run-fatal errors. Everything else is
/// isolated per message into the [`RunReport`].
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A run-level mailbox call (label resolution, candidate listing) failed.
    #[error(transparent)]
    Mailbox(#[from] MailboxError),

    /// A required workflow label does not exist in the mailbox; the run
    /// aborts before anything is fetched or sent.
    #[error("required label {0:?} does not exist in this mailbox")]
    MissingLabel(String),
}

struct LabelTransition {
    pending_id: String,
    done_id: String,
}

/// The run controller. One instance drives exactly one pass over the
/// mailbox, strictly sequentially, then reports.
pub struct Pipeline {
    mailbox: Box<dyn Mailbox>,
    summarizer: Box<dyn Summarizer>,
    notifier: Box<dyn Notifier>,
    workflow: Workflow,
}

impl Pipeline {
    pub fn new(
        mailbox: Box<dyn Mailbox>,
        summarizer: Box<dyn Summarizer>,
        notifier: Box<dyn Notifier>,
        workflow: Workflow,
    ) -> Self {
        Self {
            mailbox,
            summarizer,
            notifier,
            workflow,
        }
    }

    /// Executes one run and returns its report.
    pub async fn run(&self) -> Result<RunReport, PipelineError> {
        let transition = self.resolve_transition().await?;
        let selector = match &transition {
            None => Selector::Unread,
            Some(t) => Selector::LabelId(t.pending_id.clone()),
        };

        let ids = self.mailbox.list_candidates(&selector).await?;
        let mut report = RunReport {
            discovered: ids.len(),
            ..Default::default()
        };

        if ids.is_empty() {
            info!("no candidate messages, nothing to do");
            return Ok(report);
        }

        for id in &ids {
            match self.process_message(id, transition.as_ref()).await {
                Ok(()) => report.notified += 1,
                Err(failure) => {
                    warn!(
                        message_id = %failure.message_id,
                        stage = %failure.stage,
                        detail = %failure.detail,
                        "message processing failed, continuing with the next message"
                    );
                    report.failures.push(failure);
                }
            }
        }

        Ok(report)
    }

    /// Resolves the workflow labels once per run. Both labels must exist so
    /// the transition can complete; a missing one aborts cleanly with no
    /// side effects.
    async fn resolve_transition(&self) -> Result<Option<LabelTransition>, PipelineError> {
        let (pending, done) = match &self.workflow {
            Workflow::PollUnread => return Ok(None),
            Workflow::Labels { pending, done } => (pending.clone(), done.clone()),
        };

        let resolved = self
            .mailbox
            .resolve_label_ids(&[pending.clone(), done.clone()])
            .await?;
        let pending_id = resolved
            .get(&pending)
            .cloned()
            .ok_or(PipelineError::MissingLabel(pending))?;
        let done_id = resolved
            .get(&done)
            .cloned()
            .ok_or(PipelineError::MissingLabel(done))?;

        Ok(Some(LabelTransition {
            pending_id,
            done_id,
        }))
    }

    async fn process_message(
        &self,
        id: &str,
        transition: Option<&LabelTransition>,
    ) -> Result<(), RunFailure> {
        let message = self
            .mailbox
            .fetch_message(id)
            .await
            .map_err(|e| RunFailure::new(id, Stage::Fetch, e))?;

        let input = SummarizeInput::new(&message.subject, &message.sender, &message.body);
        // Summarization is infallible; failures arrive as a degraded result.
        let summary = self.summarizer.summarize(&input).await;

        let text = render_notification(&message, &summary);
        self.notifier
            .notify(text)
            .await
            .map_err(|e| RunFailure::new(id, Stage::Notify, e))?;

        if let Some(t) = transition {
            self.mailbox
                .swap_labels(id, vec![t.done_id.clone()], vec![t.pending_id.clone()])
                .await
                .map_err(|e| RunFailure::new(id, Stage::LabelSwap, e))?;
        }

        info!(message_id = %id, subject = %message.subject, "summary delivered");
        Ok(())
    }
}

/// Renders one summary into the Telegram HTML template. All dynamic text is
/// escaped to match the HTML parse mode the notifier sends with.
pub fn render_notification(message: &MailMessage, summary: &SummaryResult) -> String {
    let mut out = String::new();
    out.push_str("\u{1F4E7} <b>New mail received</b>\n");
    out.push_str(&format!("<b>Subject:</b> {}\n", escape(&message.subject)));
    out.push_str(&format!("<b>From:</b> {}\n\n", escape(&message.sender)));

    match summary {
        SummaryResult::Text(text) => {
            out.push_str("<b>Summary:</b>\n");
            out.push_str(&escape(text));
        }
        SummaryResult::Structured(digest) => {
            out.push_str("<b>Summary:</b>\n");
            out.push_str(&escape(&digest.short_summary));
            out.push('\n');
            out.push_str(&format!("\n<b>Priority:</b> {}\n", digest.priority));
            out.push_str(&format!("<b>Sentiment:</b> {}\n", digest.sentiment));
            out.push_str("\n<b>Tasks:</b>\n");
            push_bullets(&mut out, &digest.tasks);
            out.push_str("\n<b>Risks:</b>\n");
            push_bullets(&mut out, &digest.risks);
        }
    }

    out
}

fn push_bullets(out: &mut String, items: &[String]) {
    if items.is_empty() {
        out.push_str(&format!("\u{2022} {}\n", EMPTY_LIST_BULLET));
        return;
    }
    for item in items {
        out.push_str(&format!("\u{2022} {}\n", escape(item)));
    }
}
