//! Prompt Builder — mode- and language-specific instruction bodies plus the user turn.
//!
//! Pure string construction; nothing here can fail. Cross-cutting fragments live in
//! `llm_client::prompts`.

use crate::llm_client::prompts::{
    clip, language_directive, language_label, output_language_line, JSON_ONLY_RULE,
    RETURN_JSON_ONLY,
};
use crate::llm_client::ContentPart;
use crate::models::request::{AnalysisMode, GenerationRequest, Language, Payload};

/// Clipping limits, in characters, applied before anything is transmitted.
pub const EXTRACTION_RESUME_MAX_CHARS: usize = 30_000;
pub const EXTRACTION_JD_MAX_CHARS: usize = 5_000;
pub const REPORT_JD_MAX_CHARS: usize = 10_000;
pub const MATCH_RESUME_MAX_CHARS: usize = 20_000;
pub const MATCH_JD_MAX_CHARS: usize = 10_000;

// ────────────────────────────────────────────────────────────────────────────
// Report instructions
// ────────────────────────────────────────────────────────────────────────────

/// Executive Briefing instruction. Replace: {language_directive}, {language}, {leadership_format}
pub const BRIEFING_TEMPLATE: &str = r#"You are a Senior Partner at a Top-tier Executive Search Firm.
Your task is to analyze a candidate's resume and generate a "Confidential Executive Briefing".

{language_directive}
Use professional, high-level business {language} suitable for C-Level executives.

### 1. LEADERSHIP PROFILING
- Analyze the candidate's career trajectory to determine their **Leadership DNA**.
- Format: {leadership_format}

### 2. EXECUTIVE SUMMARY (CRITICAL)
- Write a 3-5 sentence narrative summary in {language}.
- **CONSTRAINT:** Focus STRICTLY on the **last 10 years** of their career.
- Highlight P&L responsibility, team size, strategic pivots, and major exits/mergers.

### 3. CONFIDENTIALITY & MASKING (BLIND MODE)
To support blind hiring, generate **Anonymized Versions** of key identifiers:
- **maskedCompany:** Replace specific company names with [Industry] + [Scale/Position] descriptions.
  - Ex: "Samsung Electronics" -> "Global Top-tier Consumer Electronics Company"
- **maskedInstitution:** Replace university names with [Region] + [Tier] descriptions.
  - Ex: "Seoul National Univ" -> "Top-tier University in Seoul"
- **maskedSummary:** Rewrite the Executive Summary to remove ALL specific company names, school names, and personal identifiers, replacing them with generic context.

### 4. JOB MATCH INTELLIGENCE (If JD Provided)
- **Match Score:** Calculate a strict compatibility score (0-100).
- **Analysis Summary:** Provide a 1-sentence verdict on the fit.
- **Matching Strengths:** List 3 key areas where the candidate matches the JD.
- **Gap Analysis:** Identify *real* missing skills or risks.
- If no JD is provided, leave jobMatch out entirely.

### 5. CORE COMPETENCIES (Keyword Mapping)
- Extract 5-7 hashtags that represent their "Unique Selling Points"."#;

/// Strategic Refinement instruction. Replace: {language_directive}, {language}
pub const REFINEMENT_TEMPLATE: &str = r#"You are a specialized Executive Resume Consultant.
Your goal is to "Strategically Refine" the user's resume for a C-Level or VP role.

{language_directive}
Refine the content into high-quality Business {language}.

### 1. REFINED SUMMARY
- Rewrite the Professional Summary to be punchy, quantified, and forward-looking.
- Focus on "Value Proposition" rather than just history.

### 2. EXPERIENCE REFINEMENT (STAR Method)
- For each role, rewrite the description using the STAR method (Situation, Task, Action, Result).
- **Quantify Everything:** If a number is missing, infer a likely metric placeholder (e.g., "[Increased revenue by X%]") or emphasize the *scale* of the achievement.
- Use strong action verbs.
- Remove passive voice.

### 3. FINAL OUTPUT
- Produce a clean, polished version suitable for immediate submission.
- Do NOT include critique notes in this final output (critiques were already handled in the builder phase)."#;

// ────────────────────────────────────────────────────────────────────────────
// Extraction instructions
// ────────────────────────────────────────────────────────────────────────────

/// Base extraction instruction. Replace: {json_rule}, {language_directive}
pub const EXTRACTION_TEMPLATE: &str = r#"You are a specialized resume parser and executive recruiter.
Extract structured data from the following RESUME or DOCUMENT.

RULES:
1. {json_rule}
2. **DETECT LANGUAGE:** Identify if the resume is 'Korean' or 'English' and set detectedLanguage.
3. **PROFESSIONAL ASSETS:** Extract Certifications, Thesis, Books, Patents.

{language_directive}"#;

pub const EXTRACTION_REFINEMENT_BLOCK: &str = r#"[MODE: STRATEGIC REFINEMENT]
Do NOT just extract. **AUDIT AND REFINE** the content immediately.
1. **strategicOverview:** Provide a global critique of the original resume (What's bad? What needs fixing?).
2. **experience.description:** This field must contain the **REWRITTEN / IMPROVED** version of the experience, using STAR method and quantification. Do not return the original text.
3. **experience.critique:** Provide specific notes on what you changed and why (e.g. "Added metrics", "Changed passive voice").
4. **basicInfo.summary:** Rewrite the summary to be an Executive Value Proposition."#;

pub const EXTRACTION_BRIEFING_BLOCK: &str = "\
For 'description' in experience, preserve the original formatting (bullet points) as a single string. \
Do not produce strategicOverview or critique.";

/// Replace: {job_description}
pub const EXTRACTION_JD_BLOCK: &str = r#"[JOB DESCRIPTION CONTEXT]
Compare against this JD for Job Match section:
{job_description}"#;

// ────────────────────────────────────────────────────────────────────────────
// Match-only instruction
// ────────────────────────────────────────────────────────────────────────────

/// Replace: {language_label}, {language}
pub const MATCH_TEMPLATE: &str = r#"ACT AS: Senior Executive Recruiter.
TASK: Rapid Job Fit Analysis.

INSTRUCTION:
Compare the resume against the JD requirements.
**OUTPUT LANGUAGE: {language_label}**

1. Match Score: 0-100 (Be strict, look for keywords).
2. Summary: One sentence executive verdict in {language}.
3. Strengths: Top 3 matching skills in {language}.
4. Gaps: Top 2 missing requirements in {language}."#;

// ────────────────────────────────────────────────────────────────────────────
// Builders
// ────────────────────────────────────────────────────────────────────────────

fn leadership_format(language: Language) -> &'static str {
    match language {
        Language::Korean => {
            "Korean Description (English Term). e.g., \"전략적 비전가 (Strategic Visionary)\"."
        }
        Language::English => "English Description. e.g., \"Strategic Visionary\".",
    }
}

/// System instruction for the final report.
pub fn build_instruction(mode: AnalysisMode, language: Language) -> String {
    let template = match mode {
        AnalysisMode::Briefing => BRIEFING_TEMPLATE,
        AnalysisMode::Refinement => REFINEMENT_TEMPLATE,
    };
    template
        .replace("{language_directive}", &language_directive(language))
        .replace("{leadership_format}", leadership_format(language))
        .replace("{language}", language.as_str())
}

/// System instruction for the extraction pass feeding the editable form.
pub fn build_extraction_instruction(request: &GenerationRequest) -> String {
    let mut instruction = EXTRACTION_TEMPLATE
        .replace("{json_rule}", JSON_ONLY_RULE)
        .replace("{language_directive}", &language_directive(request.language));

    instruction.push_str("\n\n");
    instruction.push_str(match request.mode {
        AnalysisMode::Refinement => EXTRACTION_REFINEMENT_BLOCK,
        AnalysisMode::Briefing => EXTRACTION_BRIEFING_BLOCK,
    });

    if let Some(jd) = request.job_description() {
        instruction.push_str("\n\n");
        instruction.push_str(
            &EXTRACTION_JD_BLOCK.replace("{job_description}", clip(jd, EXTRACTION_JD_MAX_CHARS)),
        );
    }
    instruction
}

/// System instruction for match-only re-scoring.
pub fn build_match_instruction(language: Language) -> String {
    MATCH_TEMPLATE
        .replace("{language_label}", language_label(language))
        .replace("{language}", language.as_str())
}

fn payload_parts(payload: &Payload, heading: &str, max_chars: usize) -> Vec<ContentPart> {
    match payload {
        Payload::Text(text) => vec![ContentPart::Text(format!(
            "{heading}\n{}",
            clip(text, max_chars)
        ))],
        Payload::Binary { mime_type, data } => vec![
            ContentPart::Text(heading.to_string()),
            ContentPart::InlineData {
                mime_type: mime_type.clone(),
                data: data.clone(),
            },
        ],
    }
}

/// User turn for the final report: resume, the JD if any, and the language line.
pub fn build_user_content(request: &GenerationRequest) -> Vec<ContentPart> {
    let mut parts = payload_parts(&request.payload, "CANDIDATE RESUME TEXT:", usize::MAX);
    let lang_line = output_language_line(request.language);

    let closing = match request.job_description() {
        Some(jd) => format!(
            "TARGET JOB DESCRIPTION (JD):\n{}\n\nINSTRUCTION: Perform a deep-dive match analysis against this JD. {lang_line}",
            clip(jd, REPORT_JD_MAX_CHARS)
        ),
        None => format!(
            "NO JD PROVIDED: Focus on general executive profiling. Omit jobMatch. {lang_line}"
        ),
    };
    parts.push(ContentPart::Text(closing));
    parts
}

/// User turn for the extraction pass.
pub fn build_extraction_content(request: &GenerationRequest) -> Vec<ContentPart> {
    let mut parts = payload_parts(
        &request.payload,
        "RESUME TEXT:",
        EXTRACTION_RESUME_MAX_CHARS,
    );
    parts.push(ContentPart::Text(RETURN_JSON_ONLY.to_string()));
    parts
}

/// User turn for match-only re-scoring.
pub fn build_match_content(resume_text: &str, job_description: &str) -> Vec<ContentPart> {
    vec![ContentPart::Text(format!(
        "RESUME:\n{}\n\nTARGET JD:\n{}\n\n{RETURN_JSON_ONLY}",
        clip(resume_text, MATCH_RESUME_MAX_CHARS),
        clip(job_description, MATCH_JD_MAX_CHARS)
    ))]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_request(mode: AnalysisMode, language: Language) -> GenerationRequest {
        GenerationRequest::new(
            Payload::Text("Kim Minsoo\nCEO, Acme 2015-2024".to_string()),
            mode,
            language,
        )
    }

    fn texts(parts: &[ContentPart]) -> String {
        parts
            .iter()
            .filter_map(|p| match p {
                ContentPart::Text(t) => Some(t.as_str()),
                ContentPart::InlineData { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_briefing_instruction_covers_all_sections() {
        let instruction = build_instruction(AnalysisMode::Briefing, Language::English);
        assert!(instruction.contains("Leadership DNA"));
        assert!(instruction.contains("last 10 years"));
        assert!(instruction.contains("maskedCompany"));
        assert!(instruction.contains("maskedInstitution"));
        assert!(instruction.contains("maskedSummary"));
        assert!(instruction.contains("JOB MATCH"));
        assert!(instruction.contains("5-7 hashtags"));
        assert!(instruction.contains("ALL OUTPUT MUST BE IN ENGLISH"));
        assert!(!instruction.contains('{'), "unfilled placeholder left in: {instruction}");
    }

    #[test]
    fn test_korean_briefing_uses_bilingual_archetype_format() {
        let instruction = build_instruction(AnalysisMode::Briefing, Language::Korean);
        assert!(instruction.contains("전략적 비전가 (Strategic Visionary)"));
        assert!(instruction.contains("KOREAN (한국어)"));
    }

    #[test]
    fn test_refinement_instruction_demands_star_and_no_critique() {
        let instruction = build_instruction(AnalysisMode::Refinement, Language::English);
        assert!(instruction.contains("STAR"));
        assert!(instruction.contains("metric placeholder"));
        assert!(instruction.contains("passive voice"));
        assert!(instruction.contains("Do NOT include critique"));
        assert!(!instruction.contains("maskedCompany"));
    }

    #[test]
    fn test_extraction_instruction_switches_on_mode() {
        let refine = build_extraction_instruction(&text_request(
            AnalysisMode::Refinement,
            Language::Korean,
        ));
        assert!(refine.contains("AUDIT AND REFINE"));
        assert!(refine.contains("commas between items"));

        let brief = build_extraction_instruction(&text_request(
            AnalysisMode::Briefing,
            Language::Korean,
        ));
        assert!(brief.contains("preserve the original formatting"));
        assert!(!brief.contains("AUDIT AND REFINE"));
        assert!(!brief.contains("JOB DESCRIPTION CONTEXT"));
    }

    #[test]
    fn test_extraction_instruction_clips_job_description() {
        let long_jd = "가".repeat(EXTRACTION_JD_MAX_CHARS + 500);
        let request = text_request(AnalysisMode::Briefing, Language::Korean)
            .with_job_description(long_jd);
        let instruction = build_extraction_instruction(&request);
        let jd_chars = instruction.chars().filter(|c| *c == '가').count();
        assert_eq!(jd_chars, EXTRACTION_JD_MAX_CHARS);
    }

    #[test]
    fn test_user_content_with_and_without_jd() {
        let request = text_request(AnalysisMode::Briefing, Language::English);
        let without = texts(&build_user_content(&request));
        assert!(without.contains("CANDIDATE RESUME TEXT:"));
        assert!(without.contains("NO JD PROVIDED"));
        assert!(without.ends_with("OUTPUT IN ENGLISH."));

        let with = texts(&build_user_content(
            &request.with_job_description("VP Engineering, fintech"),
        ));
        assert!(with.contains("TARGET JOB DESCRIPTION (JD):\nVP Engineering, fintech"));
        assert!(with.contains("deep-dive match analysis"));
    }

    #[test]
    fn test_binary_payload_is_sent_inline() {
        let request = GenerationRequest::new(
            Payload::Binary {
                mime_type: "application/pdf".to_string(),
                data: "JVBERi0xLjQ=".to_string(),
            },
            AnalysisMode::Briefing,
            Language::Korean,
        );
        let parts = build_extraction_content(&request);
        assert_eq!(parts.len(), 3);
        assert_eq!(
            parts[1],
            ContentPart::InlineData {
                mime_type: "application/pdf".to_string(),
                data: "JVBERi0xLjQ=".to_string(),
            }
        );
        assert_eq!(parts[2], ContentPart::Text("RETURN JSON ONLY.".to_string()));
    }

    #[test]
    fn test_extraction_content_clips_resume_text() {
        let request = GenerationRequest::new(
            Payload::Text("x".repeat(EXTRACTION_RESUME_MAX_CHARS * 2)),
            AnalysisMode::Briefing,
            Language::English,
        );
        let body = texts(&build_extraction_content(&request));
        assert_eq!(
            body.chars().filter(|c| *c == 'x').count(),
            EXTRACTION_RESUME_MAX_CHARS
        );
    }

    #[test]
    fn test_match_instruction_and_content() {
        let instruction = build_match_instruction(Language::Korean);
        assert!(instruction.contains("OUTPUT LANGUAGE: KOREAN (한국어)"));
        assert!(instruction.contains("Top 2 missing requirements in Korean"));

        let content = texts(&build_match_content("resume body", "jd body"));
        assert!(content.contains("RESUME:\nresume body"));
        assert!(content.contains("TARGET JD:\njd body"));
    }
}
