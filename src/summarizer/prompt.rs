// The `prompt` module renders the per-message prompt with handlebars.

use crate::summarizer::{SummarizeInput, SummaryMode};
use handlebars::{Handlebars, no_escape};
use serde_json::json;
use thiserror::Error;

/// The free-text prompt. Input is the raw body only.
const FREE_TEXT_TEMPLATE: &str =
    "Summarize this mail and highlight tasks and risks:\n\n{{body}}";

/// The structured prompt. The model must answer with only a JSON object
/// matching the digest schema, echoing subject and sender.
const STRUCTURED_TEMPLATE: &str = "\
You are given a mail message.

Subject: {{subject}}
From: {{sender}}

{{body}}

Respond with ONLY a JSON object, no prose and no code fences, with exactly these fields:
  \"short_summary\": a one-paragraph summary (string),
  \"tasks\": concrete tasks found in the mail (array of strings, may be empty),
  \"priority\": one of \"high\", \"medium\", \"low\",
  \"risks\": risks or alerts found in the mail (array of strings, may be empty),
  \"sentiment\": one of \"positive\", \"neutral\", \"negative\",
  \"subject\": the subject above, echoed verbatim (string),
  \"sender\": the sender above, echoed verbatim (string)";

const TEMPLATE_NAME: &str = "summarize";

/// The `PromptError` enum defines the possible errors raised by the engine.
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("template error")]
    TemplateError(#[from] handlebars::TemplateError),
    #[error("render error")]
    RenderError(#[from] handlebars::RenderError),
}

/// A handlebars engine preloaded with the prompt template for one summary
/// mode. Prompts are plain text, so HTML escaping is disabled.
pub struct PromptEngine {
    handlebars: Handlebars<'static>,
    mode: SummaryMode,
}

impl PromptEngine {
    pub fn new(mode: SummaryMode) -> Result<Self, PromptError> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(no_escape);
        let template = match mode {
            SummaryMode::FreeText => FREE_TEXT_TEMPLATE,
            SummaryMode::Structured => STRUCTURED_TEMPLATE,
        };
        handlebars.register_template_string(TEMPLATE_NAME, template)?;
        Ok(Self { handlebars, mode })
    }

    /// The mode this engine renders prompts for.
    pub fn mode(&self) -> SummaryMode {
        self.mode
    }

    /// Renders the prompt for one message.
    pub fn render(&self, input: &SummarizeInput) -> Result<String, PromptError> {
        let data = json!({
            "subject": input.subject,
            "sender": input.sender,
            "body": input.body,
        });
        Ok(self.handlebars.render(TEMPLATE_NAME, &data)?)
    }
}
