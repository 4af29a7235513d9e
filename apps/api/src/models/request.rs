use serde::{Deserialize, Serialize};

/// Which deliverable the pipeline is producing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisMode {
    /// Profiling + job-fit scoring.
    #[default]
    #[serde(rename = "EXECUTIVE_BRIEFING", alias = "briefing")]
    Briefing,
    /// Rewritten, quantified resume content.
    #[serde(rename = "RESUME_REFINEMENT", alias = "refinement")]
    Refinement,
}

/// Output language requested from the generator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[default]
    Korean,
    English,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Korean => "Korean",
            Language::English => "English",
        }
    }
}

/// The document handed to the pipeline. Exactly one representation is carried.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    /// Inline binary document, already base64-encoded.
    Binary { mime_type: String, data: String },
}

impl Payload {
    pub fn is_empty(&self) -> bool {
        match self {
            Payload::Text(text) => text.trim().is_empty(),
            Payload::Binary { data, .. } => data.is_empty(),
        }
    }
}

/// A single pipeline invocation. Owned by the caller and passed in whole on every call;
/// the pipeline keeps nothing between calls.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub payload: Payload,
    pub mode: AnalysisMode,
    pub language: Language,
    pub job_description: Option<String>,
}

impl GenerationRequest {
    pub fn new(payload: Payload, mode: AnalysisMode, language: Language) -> Self {
        Self {
            payload,
            mode,
            language,
            job_description: None,
        }
    }

    pub fn with_job_description(mut self, job_description: impl Into<String>) -> Self {
        self.job_description = Some(job_description.into());
        self
    }

    /// The job description if one was actually supplied. Blank text counts as absent.
    pub fn job_description(&self) -> Option<&str> {
        self.job_description
            .as_deref()
            .map(str::trim)
            .filter(|jd| !jd.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_serde_uses_screaming_names() {
        let mode: AnalysisMode = serde_json::from_str(r#""RESUME_REFINEMENT""#).unwrap();
        assert_eq!(mode, AnalysisMode::Refinement);
        assert_eq!(
            serde_json::to_string(&AnalysisMode::Briefing).unwrap(),
            r#""EXECUTIVE_BRIEFING""#
        );
    }

    #[test]
    fn test_mode_accepts_short_alias() {
        let mode: AnalysisMode = serde_json::from_str(r#""refinement""#).unwrap();
        assert_eq!(mode, AnalysisMode::Refinement);
    }

    #[test]
    fn test_defaults_match_original_behaviour() {
        assert_eq!(AnalysisMode::default(), AnalysisMode::Briefing);
        assert_eq!(Language::default(), Language::Korean);
    }

    #[test]
    fn test_blank_job_description_counts_as_absent() {
        let request = GenerationRequest::new(
            Payload::Text("resume".to_string()),
            AnalysisMode::Briefing,
            Language::English,
        )
        .with_job_description("   \n ");
        assert!(request.job_description().is_none());

        let request = request.with_job_description("  Head of Platform ");
        assert_eq!(request.job_description(), Some("Head of Platform"));
    }

    #[test]
    fn test_payload_emptiness() {
        assert!(Payload::Text("  ".to_string()).is_empty());
        assert!(!Payload::Binary {
            mime_type: "application/pdf".to_string(),
            data: "JVBERi0=".to_string()
        }
        .is_empty());
    }
}
