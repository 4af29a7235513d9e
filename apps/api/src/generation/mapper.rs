//! Result Mapper — decoded generator output to strict resume models.
//!
//! Every input goes through its shape's normalization first, so absent fields
//! arrive as empty strings/lists and enum-like fields carry a known variant.
//! List items in the extraction form get fresh local ids here, never from the
//! generated content. The job-fit block is dropped whenever no job description
//! was supplied, even if the generator produced one anyway.

use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;

use crate::models::request::Language;
use crate::models::resume::{MatchResult, ParsedFormData, ReportData};
use crate::schema::{extraction_shape, match_shape, report_shape};

/// Process-wide source of list-item ids. Unique across calls for the life of the process.
pub struct LocalIdSequence {
    next: AtomicU64,
}

impl LocalIdSequence {
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    pub fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for LocalIdSequence {
    fn default() -> Self {
        Self::new()
    }
}

pub static LOCAL_IDS: LocalIdSequence = LocalIdSequence::new();

/// Maps an extraction response into the editable form data.
pub fn map_to_extraction(
    decoded: &Value,
    job_description: Option<&str>,
    ids: &LocalIdSequence,
) -> Result<ParsedFormData, serde_json::Error> {
    let normalized = extraction_shape().normalize(decoded);
    let mut data: ParsedFormData = serde_json::from_value(normalized)?;

    for exp in &mut data.experience {
        exp.id = ids.next_id();
    }
    for edu in &mut data.education {
        edu.id = ids.next_id();
    }
    for cert in &mut data.certifications {
        cert.id = ids.next_id();
    }

    if !has_job_description(job_description) {
        data.job_match = None;
    }

    Ok(data)
}

/// Maps a report response. `language` only selects the shape's descriptions; keys are identical.
pub fn map_to_report(
    decoded: &Value,
    job_description: Option<&str>,
    language: Language,
) -> Result<ReportData, serde_json::Error> {
    let normalized = report_shape(language).normalize(decoded);
    let mut report: ReportData = serde_json::from_value(normalized)?;

    if !has_job_description(job_description) {
        report.job_match = None;
    }

    Ok(report)
}

pub fn map_to_match(decoded: &Value) -> Result<MatchResult, serde_json::Error> {
    serde_json::from_value(match_shape().normalize(decoded))
}

fn has_job_description(job_description: Option<&str>) -> bool {
    job_description.is_some_and(|jd| !jd.trim().is_empty())
}
