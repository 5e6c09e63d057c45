// The `gemini` module implements the `Summarizer` trait against the Gemini
// generateContent endpoint.

use crate::http::{HyperClient, build_https_client};
use crate::summarizer::digest::parse_digest;
use crate::summarizer::prompt::{PromptEngine, PromptError};
use crate::summarizer::{SummarizeInput, Summarizer, SummaryMode, SummaryResult};
use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::{Method, Request, StatusCode, header};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tokio_util::bytes::Bytes;
use tracing::{debug, warn};

/// The model queried for summaries.
pub const GEMINI_MODEL: &str = "gemini-1.5-flash";

const ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1";
/// Low sampling temperature to favor deterministic output.
const TEMPERATURE: f64 = 0.2;
/// Output-token ceiling for cost control.
const MAX_OUTPUT_TOKENS: u32 = 600;

/// The `GeminiError` enum defines the possible failures of one generate call.
/// None of them escape [`Summarizer::summarize`]; they are logged and
/// downgraded to a placeholder result.
#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("failed to encode the request body: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to build the request: {0}")]
    Request(#[from] hyper::http::Error),
    #[error("transport failure: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),
    #[error("failed to read the response body: {0}")]
    Body(#[from] hyper::Error),
    #[error("endpoint returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("failed to decode the response envelope: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("response envelope carries no candidate text")]
    NoCandidate,
    #[error("failed to render the prompt: {0}")]
    Prompt(#[from] PromptError),
}

/// An error surfaced while constructing a [`GeminiClient`].
#[derive(Error, Debug)]
pub enum GeminiBuildError {
    #[error("failed to load native TLS roots: {0}")]
    TlsRoots(std::io::Error),
    #[error(transparent)]
    Prompt(#[from] PromptError),
}

// The subset of the response envelope this client reads.
#[derive(Debug, Deserialize)]
pub(crate) struct GenerateContentResponse {
    pub(crate) candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Candidate {
    pub(crate) content: Option<Content>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Content {
    pub(crate) parts: Option<Vec<Part>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Part {
    pub(crate) text: Option<String>,
}

/// Extracts the first candidate's text from a response envelope.
pub(crate) fn first_candidate_text(envelope: GenerateContentResponse) -> Option<String> {
    envelope
        .candidates?
        .into_iter()
        .next()?
        .content?
        .parts?
        .into_iter()
        .next()?
        .text
}

/// A [`Summarizer`] backed by the Gemini generateContent endpoint.
///
/// One POST per message, no retry. All failures degrade to a placeholder
/// result instead of propagating.
pub struct GeminiClient {
    http: HyperClient,
    api_key: String,
    model: String,
    prompts: PromptEngine,
}

impl GeminiClient {
    pub fn new(api_key: &str, mode: SummaryMode) -> Result<Self, GeminiBuildError> {
        Ok(Self {
            http: build_https_client().map_err(GeminiBuildError::TlsRoots)?,
            api_key: api_key.to_string(),
            model: GEMINI_MODEL.to_string(),
            prompts: PromptEngine::new(mode)?,
        })
    }

    async fn generate(&self, input: &SummarizeInput) -> Result<String, GeminiError> {
        let prompt = self.prompts.render(input)?;
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": TEMPERATURE,
                "maxOutputTokens": MAX_OUTPUT_TOKENS,
            },
        });

        let uri = format!(
            "{}/models/{}:generateContent?key={}",
            ENDPOINT, self.model, self.api_key
        );
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(
                serde_json::to_vec(&body).map_err(GeminiError::Encode)?,
            )))?;

        let response = self.http.request(request).await?;
        let status = response.status();
        let raw = response.into_body().collect().await?.to_bytes();

        if !status.is_success() {
            return Err(GeminiError::Status {
                status,
                body: String::from_utf8_lossy(&raw).into_owned(),
            });
        }

        let envelope: GenerateContentResponse =
            serde_json::from_slice(&raw).map_err(GeminiError::Decode)?;
        match first_candidate_text(envelope) {
            Some(text) => Ok(text),
            None => {
                warn!(raw = %String::from_utf8_lossy(&raw), "raw model envelope");
                Err(GeminiError::NoCandidate)
            }
        }
    }
}

#[async_trait]
impl Summarizer for GeminiClient {
    async fn summarize(&self, input: &SummarizeInput) -> SummaryResult {
        let text = match self.generate(input).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, subject = %input.subject, "summarization failed, degrading");
                return SummaryResult::degraded(self.prompts.mode(), input);
            }
        };

        match self.prompts.mode() {
            SummaryMode::FreeText => SummaryResult::Text(text),
            SummaryMode::Structured => match parse_digest(&text) {
                Some(digest) => SummaryResult::Structured(digest),
                None => {
                    warn!(raw = %text, "model output was not the expected JSON digest, degrading");
                    debug!(subject = %input.subject, "degraded message");
                    SummaryResult::degraded(SummaryMode::Structured, input)
                }
            },
        }
    }
}
