// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

use crate::models::request::Language;

/// Instruction fragment that enforces JSON-only output.
pub const JSON_ONLY_RULE: &str = "\
    Return strictly JSON matching the schema. \
    Ensure all arrays have commas between items. Do not use trailing commas. \
    Do NOT include any text outside the JSON object.";

/// Closing line appended to every user turn.
pub const RETURN_JSON_ONLY: &str = "RETURN JSON ONLY.";

/// Upper-case language label used inside directives, e.g. `KOREAN (한국어)`.
pub fn language_label(language: Language) -> &'static str {
    match language {
        Language::Korean => "KOREAN (한국어)",
        Language::English => "ENGLISH",
    }
}

/// The explicit output-language rule embedded in every instruction body.
/// Whether the generator obeys it cannot be verified locally.
pub fn language_directive(language: Language) -> String {
    format!(
        "### CRITICAL LANGUAGE RULE:\n**ALL OUTPUT MUST BE IN {}.**",
        language_label(language)
    )
}

/// Short form appended to user turns.
pub fn output_language_line(language: Language) -> &'static str {
    match language {
        Language::Korean => "OUTPUT IN KOREAN.",
        Language::English => "OUTPUT IN ENGLISH.",
    }
}

/// Truncates to at most `max_chars` characters without splitting a code point.
pub fn clip(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_respects_char_boundaries() {
        let korean = "경영전략본부장";
        assert_eq!(clip(korean, 2), "경영");
        assert_eq!(clip(korean, 100), korean);
        assert_eq!(clip("abc", 0), "");
    }

    #[test]
    fn test_language_directive_names_language() {
        assert!(language_directive(Language::Korean).contains("KOREAN (한국어)"));
        assert!(language_directive(Language::English).contains("ENGLISH"));
    }
}
