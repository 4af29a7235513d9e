//! Axum route handlers for the Generation API.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::generation::generator::Pipeline;
use crate::models::outcome::AnalysisOutcome;
use crate::models::request::{AnalysisMode, GenerationRequest, Language, Payload};
use crate::notify::NotifyEvent;
use crate::state::AppState;

const TEXT_EXTENSIONS: &[&str] = &[".txt", ".md", ".json"];

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct InlineFile {
    pub mime_type: String,
    /// Base64 without a `data:` prefix.
    pub data: String,
}

/// Exactly one of `text` / `file` must be set.
#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    pub text: Option<String>,
    pub file: Option<InlineFile>,
    pub job_description: Option<String>,
    #[serde(default)]
    pub mode: AnalysisMode,
    #[serde(default)]
    pub language: Language,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub resume_text: String,
    #[serde(default)]
    pub mode: AnalysisMode,
    pub job_description: Option<String>,
    #[serde(default)]
    pub language: Language,
}

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub resume_text: String,
    pub job_description: String,
    #[serde(default)]
    pub language: Language,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes/parse
///
/// Extraction pass for the editable form, from pasted text or an inline base64 document.
pub async fn handle_parse(
    State(state): State<AppState>,
    Json(body): Json<ParseRequest>,
) -> Result<Response, AppError> {
    let payload = match (body.text, body.file) {
        (Some(text), None) => text_payload(text)?,
        (None, Some(file)) => inline_payload(file.mime_type, file.data)?,
        (Some(_), Some(_)) => {
            return Err(AppError::Validation(
                "Provide either text or file, not both".to_string(),
            ))
        }
        (None, None) => {
            return Err(AppError::Validation(
                "Either text or file is required".to_string(),
            ))
        }
    };

    let mut request = GenerationRequest::new(payload, body.mode, body.language);
    if let Some(jd) = body.job_description {
        request = request.with_job_description(jd);
    }

    Ok(run_parse(&state, request).await)
}

/// POST /api/v1/resumes/parse/upload
///
/// Multipart variant of `parse`. Fields: `file` (required), `job_description`, `mode`, `language`.
/// PDFs and images are sent inline; text files are read as UTF-8.
pub async fn handle_parse_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut upload: Option<(String, Option<String>, Bytes)> = None;
    let mut job_description = None;
    let mut mode = AnalysisMode::default();
    let mut language = Language::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let file_name = field.file_name().map(str::to_string);
                let data = field.bytes().await?;
                upload = Some((mime_type, file_name, data));
            }
            "job_description" => job_description = Some(field.text().await?),
            "mode" => mode = parse_enum_field("mode", &field.text().await?)?,
            "language" => language = parse_enum_field("language", &field.text().await?)?,
            _ => {}
        }
    }

    let (mime_type, file_name, data) =
        upload.ok_or_else(|| AppError::Validation("file field is required".to_string()))?;
    info!(
        "Resume upload received: {} ({} bytes)",
        file_name.as_deref().unwrap_or("unnamed"),
        data.len()
    );

    let payload = upload_payload(&mime_type, file_name.as_deref(), data)?;
    let mut request = GenerationRequest::new(payload, mode, language);
    if let Some(jd) = job_description {
        request = request.with_job_description(jd);
    }

    Ok(run_parse(&state, request).await)
}

/// POST /api/v1/resumes/analyze
///
/// Final report (Executive Briefing or Strategic Refinement).
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeRequest>,
) -> Result<Response, AppError> {
    let mut request = GenerationRequest::new(text_payload(body.resume_text)?, body.mode, body.language);
    if let Some(jd) = body.job_description {
        request = request.with_job_description(jd);
    }

    let outcome = state.pipeline.analyze_resume(&request).await;
    Ok(respond(&state.pipeline, outcome))
}

/// POST /api/v1/resumes/match
///
/// Re-scores job fit only. Requires a non-empty job description.
pub async fn handle_match(
    State(state): State<AppState>,
    Json(body): Json<MatchRequest>,
) -> Result<Response, AppError> {
    if body.resume_text.trim().is_empty() {
        return Err(AppError::Validation("resume_text cannot be empty".to_string()));
    }
    if body.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }

    let outcome = state
        .pipeline
        .run_match_analysis_only(&body.resume_text, &body.job_description, body.language)
        .await;
    Ok(respond(&state.pipeline, outcome))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn run_parse(state: &AppState, request: GenerationRequest) -> Response {
    let outcome = state.pipeline.parse_raw_resume_data(&request).await;
    if let Some(event) = NotifyEvent::parse_completed(&outcome) {
        state.notifier.notify(event);
    }
    respond(&state.pipeline, outcome)
}

/// 200 on success, 503 when the generator has no credential, 502 for any other terminal failure.
fn respond<T: Serialize>(pipeline: &Pipeline, outcome: AnalysisOutcome<T>) -> Response {
    let status = if outcome.is_success() {
        StatusCode::OK
    } else if !pipeline.is_configured() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::BAD_GATEWAY
    };
    (status, Json(outcome)).into_response()
}

fn text_payload(text: String) -> Result<Payload, AppError> {
    let payload = Payload::Text(text);
    if payload.is_empty() {
        return Err(AppError::Validation("resume text cannot be empty".to_string()));
    }
    Ok(payload)
}

fn is_inline_mime(mime_type: &str) -> bool {
    mime_type == "application/pdf" || mime_type.starts_with("image/")
}

fn inline_payload(mime_type: String, data: String) -> Result<Payload, AppError> {
    if !is_inline_mime(&mime_type) {
        return Err(AppError::Validation(format!(
            "Unsupported file type '{mime_type}'. Supported: PDF, images"
        )));
    }
    let data = data.trim().to_string();
    let valid_base64 = STANDARD.decode(&data).is_ok();
    let payload = Payload::Binary { mime_type, data };
    if payload.is_empty() || !valid_base64 {
        return Err(AppError::Validation(
            "file.data must be non-empty base64".to_string(),
        ));
    }
    Ok(payload)
}

fn upload_payload(mime_type: &str, file_name: Option<&str>, data: Bytes) -> Result<Payload, AppError> {
    if is_inline_mime(mime_type) {
        let payload = Payload::Binary {
            mime_type: mime_type.to_string(),
            data: STANDARD.encode(&data),
        };
        if payload.is_empty() {
            return Err(AppError::Validation("Uploaded file is empty".to_string()));
        }
        return Ok(payload);
    }

    let is_text = mime_type == "text/plain"
        || file_name.is_some_and(|name| {
            let name = name.to_ascii_lowercase();
            TEXT_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
        });
    if !is_text {
        return Err(AppError::Validation(format!(
            "Unsupported file type '{mime_type}'. Supported: PDF, images, TXT, MD, JSON"
        )));
    }

    let text = String::from_utf8(data.to_vec())
        .map_err(|_| AppError::Validation("Text file is not valid UTF-8".to_string()))?;
    text_payload(text)
}

fn parse_enum_field<T: DeserializeOwned>(name: &str, raw: &str) -> Result<T, AppError> {
    serde_json::from_value(Value::String(raw.trim().to_string()))
        .map_err(|_| AppError::Validation(format!("Invalid {name}: '{raw}'")))
}
