//! Strict resume data models produced by the result mapper.
//!
//! Field names follow the camelCase keys the generator emits. List items in
//! `ParsedFormData` carry a locally assigned `id`; it is never read from generated
//! content (`skip_deserializing`), only set by the mapper.

use serde::{Deserialize, Serialize};

use crate::models::request::Language;

// ────────────────────────────────────────────────────────────────────────────
// Extraction (editable form)
// ────────────────────────────────────────────────────────────────────────────

/// Result of the extraction pipeline, used to populate the editable builder form.
/// Created fresh per upload and replaced wholesale by the next one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParsedFormData {
    pub detected_language: Language,
    /// Global audit of the original resume (Refinement mode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategic_overview: Option<String>,
    pub basic_info: BasicInfo,
    pub competencies: Vec<String>,
    pub experience: Vec<FormExperience>,
    pub education: Vec<FormEducation>,
    pub certifications: Vec<Certification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_match: Option<JobMatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BasicInfo {
    pub name: String,
    pub title: String,
    pub email: String,
    pub phone: String,
    pub linkedin: String,
    pub location: String,
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormExperience {
    #[serde(skip_deserializing)]
    pub id: u64,
    pub company: String,
    pub role: String,
    pub duration: String,
    pub description: String,
    /// Per-role critique (Refinement mode only). Hidden in the printed report.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critique: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormEducation {
    #[serde(skip_deserializing)]
    pub id: u64,
    pub school: String,
    pub degree: String,
    pub year: String,
}

/// Certifications, board memberships, patents, publications, thesis titles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Certification {
    #[serde(skip_deserializing)]
    pub id: u64,
    pub name: String,
    pub issuer: String,
    pub year: String,
}

/// Job fit block. Shared by the extraction form and the match-only entry point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobMatch {
    /// 0 – 100
    pub score: u8,
    pub summary: String,
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
}

/// Output of the match-only re-scoring entry point.
pub type MatchResult = JobMatch;

// ────────────────────────────────────────────────────────────────────────────
// Final report
// ────────────────────────────────────────────────────────────────────────────

/// The rendered deliverable: Executive Briefing or Strategic Refinement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportData {
    pub candidate_name: String,
    pub email: String,
    pub phone: String,
    pub professional_summary: String,
    /// Blind-mode rendering of the summary with identifiers stripped.
    pub masked_summary: String,
    pub leadership_style: String,
    pub top_skills: Vec<String>,
    pub refined_summary: String,
    pub experience: Vec<ReportExperience>,
    pub education: Vec<ReportEducation>,
    pub certifications: Vec<ReportCertification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_match: Option<JobMatchAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_analysis: Option<RiskAnalysis>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportExperience {
    pub company: String,
    pub masked_company: String,
    pub role: String,
    pub duration: String,
    pub key_achievements: Vec<String>,
    pub refined_content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportEducation {
    pub institution: String,
    pub masked_institution: String,
    pub degree: String,
    pub year: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportCertification {
    pub name: String,
    pub issuer: String,
    pub year: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobMatchAnalysis {
    pub match_score: u8,
    pub match_summary: String,
    pub matching_strengths: Vec<String>,
    pub gap_analysis: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RiskAnalysis {
    pub detected_gaps: bool,
    pub flags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_ignored_on_deserialize() {
        let json = r#"{"id": 999, "company": "Acme", "role": "CTO"}"#;
        let exp: FormExperience = serde_json::from_str(json).unwrap();
        assert_eq!(exp.id, 0);
        assert_eq!(exp.company, "Acme");
        assert!(exp.duration.is_empty());
    }

    #[test]
    fn test_absent_job_match_is_not_serialized() {
        let data = ParsedFormData::default();
        let value = serde_json::to_value(&data).unwrap();
        assert!(value.get("jobMatch").is_none());
        assert!(value.get("basicInfo").is_some());
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let report = ReportData {
            candidate_name: "Kim".to_string(),
            top_skills: vec!["#Turnaround".to_string()],
            ..Default::default()
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["candidateName"], "Kim");
        assert_eq!(value["topSkills"][0], "#Turnaround");
        assert!(value.get("riskAnalysis").is_none());
    }
}
