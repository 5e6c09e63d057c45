//! # mailbrief: poll a mailbox, summarize new mail with Gemini, notify over Telegram.

/// The `config` module reads the process configuration from the environment.
pub mod config;
/// The `http` module provides the shared HTTPS client plumbing.
pub mod http;
/// The `mailbox` module provides the mail-provider client.
pub mod mailbox;
/// The `notifier` module delivers rendered summaries to a chat destination.
pub mod notifier;
/// The `pipeline` module orchestrates the per-message flow.
pub mod pipeline;
/// The `summarizer` module turns message content into a summary result.
pub mod summarizer;

pub use config::{Config, ConfigError};
pub use mailbox::{AuthFlow, GmailMailbox, MailMessage, Mailbox, MailboxError, Selector};
pub use notifier::{Notifier, NotifyError, TelegramNotifier};
pub use pipeline::{Pipeline, PipelineError, RunReport, Workflow};
pub use summarizer::{GeminiClient, SummarizeInput, Summarizer, SummaryMode, SummaryResult};
