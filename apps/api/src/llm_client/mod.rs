/// LLM Client — the single point of entry for all upstream generation calls.
///
/// ARCHITECTURAL RULE: No other module may call the generation API directly.
/// All upstream interactions MUST go through a `TextGenerator`.
///
/// The client binds a response schema to every call and returns the raw text.
/// It never parses or validates the JSON it gets back, and it never retries:
/// escalation to another tier is the orchestrator's job.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::models::tier::ModelTier;

pub mod prompts;
#[cfg(test)]
pub mod testing;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const RESPONSE_MIME_TYPE: &str = "application/json";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Response decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("No API key configured")]
    NotConfigured,
}

// ────────────────────────────────────────────────────────────────────────────
// Call description
// ────────────────────────────────────────────────────────────────────────────

/// One part of the user turn.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    Text(String),
    /// Base64 document sent inline with its mime type.
    InlineData { mime_type: String, data: String },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f32,
}

/// Everything a tier needs to produce one response. Tier-independent, so the same
/// call is replayed unchanged against the robust tier on escalation.
#[derive(Debug, Clone)]
pub struct GenerationCall {
    pub instruction: String,
    pub content: Vec<ContentPart>,
    pub response_schema: Value,
    pub options: GenerationOptions,
}

/// Upstream text generator. Carried in `AppState` as `Arc<dyn TextGenerator>`.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// False when no credential is available; the pipeline then fails without calling out.
    fn is_configured(&self) -> bool {
        true
    }

    /// Returns the raw text payload. Empty text is a valid return here; callers decide.
    async fn generate(&self, tier: &ModelTier, call: &GenerationCall) -> Result<String, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    system_instruction: GeminiContent<'a>,
    contents: Vec<GeminiContent<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Text {
        text: &'a str,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'a str,
    response_schema: &'a Value,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
    #[serde(default)]
    pub thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl GenerateContentResponse {
    /// Concatenated answer text of the first candidate, reasoning parts excluded.
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter(|p| !p.thought)
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini client
// ────────────────────────────────────────────────────────────────────────────

/// `generateContent` client shared by both tiers.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiClient {
    /// `timeout` is a transport-level guard only; attempt deadlines live in the orchestrator.
    pub fn new(
        api_key: Option<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

fn build_request<'a>(tier: &ModelTier, call: &'a GenerationCall) -> GeminiRequest<'a> {
    let parts = call
        .content
        .iter()
        .map(|part| match part {
            ContentPart::Text(text) => RequestPart::Text { text },
            ContentPart::InlineData { mime_type, data } => RequestPart::Inline {
                inline_data: InlineData { mime_type, data },
            },
        })
        .collect();

    GeminiRequest {
        system_instruction: GeminiContent {
            role: None,
            parts: vec![RequestPart::Text {
                text: &call.instruction,
            }],
        },
        contents: vec![GeminiContent {
            role: Some("user"),
            parts,
        }],
        generation_config: GenerationConfig {
            response_mime_type: RESPONSE_MIME_TYPE,
            response_schema: &call.response_schema,
            temperature: call.options.temperature,
            thinking_config: tier
                .supports_fast_mode
                .then_some(ThinkingConfig { thinking_budget: 0 }),
        },
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, tier: &ModelTier, call: &GenerationCall) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::NotConfigured)?;
        let request_body = build_request(tier, call);

        let response = self
            .client
            .post(self.endpoint(&tier.model))
            .header("x-goog-api-key", api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)?;

        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                model = %tier.model,
                "generateContent succeeded: prompt_tokens={}, output_tokens={}, finish_reason={:?}",
                usage.prompt_token_count,
                usage.candidates_token_count,
                parsed.candidates.first().and_then(|c| c.finish_reason.as_deref())
            );
        }

        Ok(parsed.text())
    }
}
