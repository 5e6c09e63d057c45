// The `summarizer` module sends message content to a generative-language
// endpoint and converts the response into a `SummaryResult`.

pub mod digest;
pub mod gemini;
pub mod prompt;

use async_trait::async_trait;

pub use digest::{DEGRADED_PLACEHOLDER, Digest, Priority, Sentiment, SummaryResult};
pub use gemini::GeminiClient;

/// The maximum number of body characters forwarded to the model.
pub const MAX_BODY_CHARS: usize = 10_000;

/// How richly the summary is structured.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SummaryMode {
    /// An unstructured free-text summary.
    FreeText,
    /// A fixed-schema JSON digest.
    Structured,
}

/// The per-message input to a summarization call.
#[derive(Clone, Debug, PartialEq)]
pub struct SummarizeInput {
    pub subject: String,
    pub sender: String,
    /// The plain-text body, truncated to [`MAX_BODY_CHARS`] characters.
    pub body: String,
}

impl SummarizeInput {
    /// Builds an input record, truncating the body on a character boundary.
    pub fn new(subject: &str, sender: &str, body: &str) -> Self {
        Self {
            subject: subject.to_string(),
            sender: sender.to_string(),
            body: truncate_chars(body, MAX_BODY_CHARS),
        }
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => text[..index].to_string(),
        None => text.to_string(),
    }
}

/// The `Summarizer` trait defines the contract for any summarization backend
/// the pipeline can use.
///
/// Summarization is infallible by contract: implementations convert every
/// failure (transport, missing candidate, unparseable content) into a
/// degraded but valid [`SummaryResult`] and log it for operator visibility.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, input: &SummarizeInput) -> SummaryResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_bodies_pass_through_untouched() {
        let input = SummarizeInput::new("s", "a@b.com", "Please pay by Friday");
        assert_eq!(input.body, "Please pay by Friday");
    }

    #[test]
    fn long_bodies_are_truncated_on_a_char_boundary() {
        let body = "é".repeat(MAX_BODY_CHARS + 50);
        let input = SummarizeInput::new("s", "a@b.com", &body);
        assert_eq!(input.body.chars().count(), MAX_BODY_CHARS);
        assert_eq!(input.body, "é".repeat(MAX_BODY_CHARS));
    }

    #[test]
    fn body_at_the_limit_is_not_truncated() {
        let body = "x".repeat(MAX_BODY_CHARS);
        let input = SummarizeInput::new("s", "a@b.com", &body);
        assert_eq!(input.body.len(), MAX_BODY_CHARS);
    }
}
