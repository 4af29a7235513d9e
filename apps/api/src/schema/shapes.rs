//! The concrete output shapes.

use super::{field, Requirement, SchemaNode, Shape, ShapeKind};
use crate::models::request::Language;

pub const LANGUAGE_VARIANTS: &[&str] = &["Korean", "English"];

fn job_match_block() -> SchemaNode {
    SchemaNode::object(vec![
        field("score", SchemaNode::integer().within(0, 100)),
        field("summary", SchemaNode::string()),
        field("strengths", SchemaNode::string_array()),
        field("gaps", SchemaNode::string_array()),
    ])
}

fn certifications() -> SchemaNode {
    SchemaNode::array(SchemaNode::object(vec![
        field("name", SchemaNode::string()),
        field("issuer", SchemaNode::string()),
        field("year", SchemaNode::string()),
    ]))
}

/// Shape of the extraction/refinement pass that feeds the editable form.
/// No completeness gate: partial extraction is surfaced for manual completion.
pub fn extraction_shape() -> Shape {
    let root = SchemaNode::object(vec![
        field(
            "detectedLanguage",
            SchemaNode::string()
                .one_of(LANGUAGE_VARIANTS)
                .describe("Identify the primary language of the resume."),
        ),
        field(
            "strategicOverview",
            SchemaNode::string().describe(
                "A high-level audit of the resume. What is lacking? What needs improvement? \
                 (Only if mode is Refinement)",
            ),
        )
        .optional(),
        field(
            "basicInfo",
            SchemaNode::object(vec![
                field("name", SchemaNode::string()),
                field("title", SchemaNode::string()),
                field("email", SchemaNode::string()),
                field("phone", SchemaNode::string()),
                field("linkedin", SchemaNode::string()),
                field("location", SchemaNode::string()),
                field("summary", SchemaNode::string()),
            ]),
        ),
        field(
            "competencies",
            SchemaNode::string_array().describe("List of core competencies or skills."),
        ),
        field(
            "experience",
            SchemaNode::array(SchemaNode::object(vec![
                field("company", SchemaNode::string()),
                field("role", SchemaNode::string()),
                field("duration", SchemaNode::string()),
                field(
                    "description",
                    SchemaNode::string().describe(
                        "Full description text. If Refinement Mode, this MUST be the \
                         REWRITTEN/IMPROVED version.",
                    ),
                ),
                field(
                    "critique",
                    SchemaNode::string().describe(
                        "Specific feedback/critique for this role. Why was it changed? \
                         (Only if mode is Refinement)",
                    ),
                )
                .optional(),
            ])),
        ),
        field(
            "education",
            SchemaNode::array(SchemaNode::object(vec![
                field("school", SchemaNode::string()),
                field("degree", SchemaNode::string()),
                field("year", SchemaNode::string()),
            ])),
        ),
        field(
            "certifications",
            certifications().describe("Certifications, Thesis, Books, Patents, Awards."),
        ),
        field("jobMatch", job_match_block()).optional(),
    ]);

    Shape {
        kind: ShapeKind::Extraction,
        root,
        complete_when: Vec::new(),
    }
}

/// Shape of the final report. Descriptions carry the output language so the
/// generator sees the language directive at field level too.
pub fn report_shape(language: Language) -> Shape {
    let lang = language.as_str();
    let root = SchemaNode::object(vec![
        field("candidateName", SchemaNode::string()),
        field("email", SchemaNode::string()),
        field("phone", SchemaNode::string()),
        field(
            "professionalSummary",
            SchemaNode::string().describe(format!("Executive summary in {lang}.")),
        ),
        field(
            "maskedSummary",
            SchemaNode::string().describe(format!(
                "Anonymized summary for blind mode in {lang}. Remove specific company/school names."
            )),
        ),
        field(
            "leadershipStyle",
            SchemaNode::string().describe(format!(
                "High-level leadership archetype description in {lang}."
            )),
        ),
        field(
            "topSkills",
            SchemaNode::string_array().describe("5-7 Unique Selling Point hashtags."),
        ),
        field(
            "refinedSummary",
            SchemaNode::string().describe(format!(
                "Polished, value-prop driven summary in {lang}."
            )),
        ),
        field(
            "experience",
            SchemaNode::array(SchemaNode::object(vec![
                field("company", SchemaNode::string()),
                field(
                    "maskedCompany",
                    SchemaNode::string().describe(format!(
                        "Anonymized company name (Industry + Scale) in {lang}."
                    )),
                ),
                field("role", SchemaNode::string()),
                field("duration", SchemaNode::string()),
                field(
                    "keyAchievements",
                    SchemaNode::string_array().describe("Original bullet points."),
                ),
                field(
                    "refinedContent",
                    SchemaNode::string().describe(format!(
                        "A completely rewritten, quantified, and result-oriented paragraph in {lang}."
                    )),
                ),
            ])),
        ),
        field(
            "education",
            SchemaNode::array(SchemaNode::object(vec![
                field("institution", SchemaNode::string()),
                field(
                    "maskedInstitution",
                    SchemaNode::string().describe(format!(
                        "Anonymized institution name (Tier + Region) in {lang}."
                    )),
                ),
                field("degree", SchemaNode::string()),
                field("year", SchemaNode::string()),
            ])),
        ),
        field(
            "certifications",
            certifications().describe(
                "List of professional certifications, board memberships, patents, \
                 publications, or thesis titles.",
            ),
        ),
        field(
            "jobMatch",
            SchemaNode::object(vec![
                field("matchScore", SchemaNode::integer().within(0, 100)),
                field(
                    "matchSummary",
                    SchemaNode::string().describe(format!(
                        "A brief sentence summarizing the overall fit in {lang}."
                    )),
                ),
                field(
                    "matchingStrengths",
                    SchemaNode::string_array().describe(format!(
                        "List of 3 key strengths matching the JD in {lang}."
                    )),
                ),
                field(
                    "gapAnalysis",
                    SchemaNode::string_array().describe(format!(
                        "List of missing skills or experience gaps in {lang}."
                    )),
                ),
            ])
            .describe("Only populate if a JD is provided in the input."),
        )
        .optional(),
        field(
            "riskAnalysis",
            SchemaNode::object(vec![
                field("detectedGaps", SchemaNode::boolean()),
                field("flags", SchemaNode::string_array()),
            ]),
        )
        .optional(),
    ])
    .require(&["candidateName", "experience", "education"]);

    Shape {
        kind: ShapeKind::Report,
        root,
        complete_when: vec![
            Requirement::NonEmptyText("candidateName"),
            Requirement::NonEmptyList("experience"),
        ],
    }
}

/// Narrow shape for match-only re-scoring.
pub fn match_shape() -> Shape {
    Shape {
        kind: ShapeKind::Match,
        root: job_match_block(),
        complete_when: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_report_completeness_needs_name_and_experience() {
        let shape = report_shape(Language::English);
        let with_name_only = shape.normalize(&json!({"candidateName": "Choi", "experience": []}));
        assert_eq!(shape.missing(&with_name_only), vec!["experience"]);

        let full = shape.normalize(&json!({
            "candidateName": "Choi",
            "experience": [{"company": "Acme"}]
        }));
        assert!(shape.missing(&full).is_empty());
    }

    #[test]
    fn test_extraction_has_no_completeness_gate() {
        let shape = extraction_shape();
        assert!(shape.missing(&shape.normalize(&json!({}))).is_empty());
    }

    #[test]
    fn test_report_schema_declares_required_fields() {
        let schema = report_shape(Language::Korean).response_schema();
        assert_eq!(
            schema["required"],
            json!(["candidateName", "experience", "education"])
        );
        assert_eq!(
            schema["properties"]["professionalSummary"]["description"],
            "Executive summary in Korean."
        );
    }

    #[test]
    fn test_extraction_schema_language_enum() {
        let schema = extraction_shape().response_schema();
        assert_eq!(
            schema["properties"]["detectedLanguage"]["enum"],
            json!(["Korean", "English"])
        );
        assert_eq!(
            schema["properties"]["experience"]["items"]["properties"]["critique"]["type"],
            "STRING"
        );
    }

    #[test]
    fn test_extraction_defaults_nested_items() {
        let shape = extraction_shape();
        let value = shape.normalize(&json!({
            "experience": [{"company": "Acme"}],
            "jobMatch": {"score": "88%"}
        }));
        assert_eq!(value["experience"][0]["role"], "");
        assert!(value["experience"][0].get("critique").is_none());
        assert_eq!(value["jobMatch"]["score"], 88);
        assert_eq!(value["jobMatch"]["gaps"], json!([]));
        assert_eq!(value["basicInfo"]["linkedin"], "");
        assert_eq!(value["detectedLanguage"], "Korean");
    }

    #[test]
    fn test_match_shape_clamps_score() {
        let shape = match_shape();
        let value = shape.normalize(&json!({"score": 140, "summary": "Strong"}));
        assert_eq!(value["score"], 100);
        assert_eq!(value["strengths"], json!([]));
    }
}
