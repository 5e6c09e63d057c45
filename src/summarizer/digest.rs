// The `digest` module defines the summary result model and the parsing of
// structured model output.

use crate::summarizer::SummarizeInput;
use serde::Deserialize;
use std::fmt;

/// The placeholder carried by a degraded result when the model produced no
/// usable response.
pub const DEGRADED_PLACEHOLDER: &str = "No valid response from the model";

/// The priority a structured summary assigns to a message.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

/// The overall sentiment a structured summary assigns to a message.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "positive"),
            Sentiment::Neutral => write!(f, "neutral"),
            Sentiment::Negative => write!(f, "negative"),
        }
    }
}

/// The fixed-schema record produced in structured mode.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Digest {
    pub short_summary: String,
    #[serde(default)]
    pub tasks: Vec<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub risks: Vec<String>,
    #[serde(default)]
    pub sentiment: Sentiment,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub sender: String,
}

/// The output of a summarization call, consumed once by the notifier.
#[derive(Clone, Debug, PartialEq)]
pub enum SummaryResult {
    /// An unstructured summary string.
    Text(String),
    /// A structured digest.
    Structured(Digest),
}

impl SummaryResult {
    /// Builds the degraded result substituted when summarization fails.
    pub fn degraded(mode: super::SummaryMode, input: &SummarizeInput) -> Self {
        match mode {
            super::SummaryMode::FreeText => SummaryResult::Text(DEGRADED_PLACEHOLDER.to_string()),
            super::SummaryMode::Structured => SummaryResult::Structured(Digest {
                short_summary: DEGRADED_PLACEHOLDER.to_string(),
                tasks: Vec::new(),
                priority: Priority::default(),
                risks: Vec::new(),
                sentiment: Sentiment::default(),
                subject: input.subject.clone(),
                sender: input.sender.clone(),
            }),
        }
    }
}

/// Strips surrounding markdown code-fence markers the model may have added
/// around its JSON output.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(after_open) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // The opening fence line may carry an info string such as `json`.
    let Some(newline) = after_open.find('\n') else {
        return trimmed;
    };
    let inner = after_open[newline + 1..].trim_end();
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Parses structured model output into a [`Digest`], stripping code fences
/// first. Returns `None` when the content is not the expected JSON.
pub fn parse_digest(text: &str) -> Option<Digest> {
    serde_json::from_str(strip_code_fences(text)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = r#"{
        "short_summary": "Invoice must be paid by Friday",
        "tasks": ["Pay the invoice"],
        "priority": "high",
        "risks": ["Late fee after Friday"],
        "sentiment": "neutral",
        "subject": "Invoice due",
        "sender": "a@b.com"
    }"#;

    #[test]
    fn fenced_json_parses_with_fences_stripped() {
        let fenced = format!("```json\n{}\n```", WELL_FORMED);
        let digest = parse_digest(&fenced).unwrap();
        assert_eq!(digest.short_summary, "Invoice must be paid by Friday");
        assert_eq!(digest.tasks, vec!["Pay the invoice".to_string()]);
        assert_eq!(digest.priority, Priority::High);
        assert_eq!(digest.subject, "Invoice due");
        assert_eq!(digest.sender, "a@b.com");
    }

    #[test]
    fn bare_fences_without_info_string_are_stripped() {
        let fenced = format!("```\n{}\n```", WELL_FORMED);
        assert!(parse_digest(&fenced).is_some());
    }

    #[test]
    fn unfenced_json_parses_directly() {
        assert!(parse_digest(WELL_FORMED).is_some());
    }

    #[test]
    fn missing_optional_fields_fall_back_to_defaults() {
        let digest = parse_digest(r#"{"short_summary": "just a note"}"#).unwrap();
        assert!(digest.tasks.is_empty());
        assert!(digest.risks.is_empty());
        assert_eq!(digest.priority, Priority::Medium);
        assert_eq!(digest.sentiment, Sentiment::Neutral);
    }

    #[test]
    fn prose_output_does_not_parse() {
        assert!(parse_digest("Sorry, I cannot summarize this.").is_none());
    }

    #[test]
    fn degraded_structured_result_echoes_subject_and_sender() {
        let input = SummarizeInput::new("Invoice due", "a@b.com", "body");
        let result = SummaryResult::degraded(crate::summarizer::SummaryMode::Structured, &input);
        match result {
            SummaryResult::Structured(digest) => {
                assert_eq!(digest.short_summary, DEGRADED_PLACEHOLDER);
                assert_eq!(digest.subject, "Invoice due");
                assert_eq!(digest.sender, "a@b.com");
                assert!(digest.tasks.is_empty());
            }
            SummaryResult::Text(_) => panic!("expected a structured result"),
        }
    }

    #[test]
    fn degraded_free_text_result_carries_the_placeholder() {
        let input = SummarizeInput::new("s", "a@b.com", "body");
        let result = SummaryResult::degraded(crate::summarizer::SummaryMode::FreeText, &input);
        assert_eq!(result, SummaryResult::Text(DEGRADED_PLACEHOLDER.to_string()));
    }
}
