//! Generation entry points — one per output shape.
//!
//! Flow: build prompt → orchestrate (fast → robust) → map → AnalysisOutcome.
//!
//! Callers never see raw upstream errors. Every terminal failure is logged in full
//! with the request id and surfaced as a short localized message instead.

use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info_span, Instrument};
use uuid::Uuid;

use crate::generation::mapper::{map_to_extraction, map_to_match, map_to_report, LOCAL_IDS};
use crate::generation::orchestrator::{Deadlines, Orchestrator, PipelineError};
use crate::generation::prompts::{
    build_extraction_content, build_extraction_instruction, build_instruction,
    build_match_content, build_match_instruction, build_user_content,
};
use crate::llm_client::{GenerationCall, GenerationOptions, TextGenerator};
use crate::models::outcome::{AnalysisOutcome, ProcessingStats};
use crate::models::request::{GenerationRequest, Language};
use crate::models::resume::{MatchResult, ParsedFormData, ReportData};
use crate::models::tier::TierLadder;
use crate::schema::{extraction_shape, match_shape, report_shape, Shape};

/// Extraction copies facts; any creativity shows up as invented data.
pub const EXTRACTION_TEMPERATURE: f32 = 0.0;
pub const REPORT_TEMPERATURE: f32 = 0.2;
pub const MATCH_TEMPERATURE: f32 = 0.1;

const GENERIC_FAILURE_KO: &str = "분석에 실패했습니다. 입력을 간소화하거나 다시 시도해주세요.";
const GENERIC_FAILURE_EN: &str =
    "Complex Analysis Failed. Please try simplifying the input or try again.";
const NOT_CONFIGURED_KO: &str = "분석 서비스가 설정되지 않았습니다. 관리자에게 문의해주세요.";
const NOT_CONFIGURED_EN: &str =
    "The analysis service is not configured. Please contact the administrator.";

/// The user-facing message for a terminal failure. Never carries upstream detail.
pub fn failure_message(error: &PipelineError, language: Language) -> &'static str {
    match (error, language) {
        (PipelineError::Configuration, Language::Korean) => NOT_CONFIGURED_KO,
        (PipelineError::Configuration, Language::English) => NOT_CONFIGURED_EN,
        _ => generic_failure(language),
    }
}

fn generic_failure(language: Language) -> &'static str {
    match language {
        Language::Korean => GENERIC_FAILURE_KO,
        Language::English => GENERIC_FAILURE_EN,
    }
}

/// Stateless between calls; cheap to clone into each handler.
#[derive(Clone)]
pub struct Pipeline {
    generator: Arc<dyn TextGenerator>,
    ladder: TierLadder,
    deadlines: Deadlines,
}

impl Pipeline {
    pub fn new(generator: Arc<dyn TextGenerator>, ladder: TierLadder, deadlines: Deadlines) -> Self {
        Self {
            generator,
            ladder,
            deadlines,
        }
    }

    /// False when no credential is available; every call then fails without an attempt.
    pub fn is_configured(&self) -> bool {
        self.generator.is_configured()
    }

    /// Extraction/refinement pass that populates the editable form.
    /// Accepts raw text or an inline binary document.
    pub async fn parse_raw_resume_data(
        &self,
        request: &GenerationRequest,
    ) -> AnalysisOutcome<ParsedFormData> {
        let call = GenerationCall {
            instruction: build_extraction_instruction(request),
            content: build_extraction_content(request),
            response_schema: extraction_shape().response_schema(),
            options: GenerationOptions {
                temperature: EXTRACTION_TEMPERATURE,
            },
        };
        let jd = request.job_description();
        self.run(call, extraction_shape(), request.language, "parse", |value| {
            map_to_extraction(value, jd, &LOCAL_IDS)
        })
        .await
    }

    /// Final report: Executive Briefing or Strategic Refinement, per `request.mode`.
    pub async fn analyze_resume(&self, request: &GenerationRequest) -> AnalysisOutcome<ReportData> {
        let call = GenerationCall {
            instruction: build_instruction(request.mode, request.language),
            content: build_user_content(request),
            response_schema: report_shape(request.language).response_schema(),
            options: GenerationOptions {
                temperature: REPORT_TEMPERATURE,
            },
        };
        let jd = request.job_description();
        let language = request.language;
        self.run(call, report_shape(language), language, "analyze", |value| {
            map_to_report(value, jd, language)
        })
        .await
    }

    /// Re-scores job fit only, without regenerating the rest of the report.
    pub async fn run_match_analysis_only(
        &self,
        resume_text: &str,
        job_description: &str,
        language: Language,
    ) -> AnalysisOutcome<MatchResult> {
        let call = GenerationCall {
            instruction: build_match_instruction(language),
            content: build_match_content(resume_text, job_description),
            response_schema: match_shape().response_schema(),
            options: GenerationOptions {
                temperature: MATCH_TEMPERATURE,
            },
        };
        self.run(call, match_shape(), language, "match", map_to_match)
            .await
    }

    async fn run<T>(
        &self,
        call: GenerationCall,
        shape: Shape,
        language: Language,
        operation: &'static str,
        map: impl FnOnce(&Value) -> Result<T, serde_json::Error>,
    ) -> AnalysisOutcome<T> {
        let request_id = Uuid::new_v4();
        let span = info_span!("generation", %request_id, operation);

        async {
            let orchestration = Orchestrator::new(self.generator.as_ref(), &self.ladder, self.deadlines)
                .run(&call, &shape, request_id)
                .await;

            let served = match orchestration.result {
                Ok(served) => served,
                Err(err) => {
                    return AnalysisOutcome::failure(request_id, failure_message(&err, language))
                }
            };

            match map(&served.value) {
                Ok(data) => AnalysisOutcome::success(
                    request_id,
                    data,
                    ProcessingStats {
                        tier: served.tier.kind,
                        model_used: served.tier.model.clone(),
                        cost_tier: served.tier.cost_class,
                        latency_ms: served.latency.as_millis() as u64,
                        total_latency_ms: orchestration.total_latency.as_millis() as u64,
                    },
                ),
                Err(e) => {
                    error!(%request_id, "Mapping normalized output failed: {e}");
                    AnalysisOutcome::failure(request_id, generic_failure(language))
                }
            }
        }
        .instrument(span)
        .await
    }
}
