//! Response Repair & Decoder — pulls one JSON object out of raw generator text.
//!
//! 1. Slice from the first `{` to the last `}`; no such span is a hard failure.
//! 2. Strict parse.
//! 3. On failure, run every named repair exactly once, in order, then parse once more.
//! 4. If that fails too, report the ORIGINAL strict-parse error. No further heuristics.
//!
//! Each repair is idempotent and leaves valid JSON untouched, so repairing
//! already-valid input is a no-op.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("No JSON object found in response")]
    NoObject,

    #[error("JSON Parsing Failed: {0}")]
    Malformed(String),
}

/// A single bounded textual fix.
pub struct Repair {
    pub name: &'static str,
    pub apply: fn(&str) -> Cow<'_, str>,
}

/// Applied once each, in this order. Never looped.
pub const REPAIRS: &[Repair] = &[
    Repair {
        name: "insert_missing_commas",
        apply: insert_missing_commas,
    },
    Repair {
        name: "strip_trailing_commas",
        apply: strip_trailing_commas,
    },
];

/// A closing quote, optional spaces, a line break, optional spaces, an opening quote.
/// Raw line breaks cannot occur inside a valid JSON string, so this never fires inside one.
static ADJACENT_STRINGS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([ \t]*\r?\n\s*)""#).unwrap());

/// Inserts the comma missing between two quoted values on separate lines.
pub fn insert_missing_commas(text: &str) -> Cow<'_, str> {
    ADJACENT_STRINGS_RE.replace_all(text, "\",$1\"")
}

/// Removes commas that directly precede `}` or `]` (whitespace allowed in between).
/// String contents are skipped, so a literal `", ]"` inside a value survives.
pub fn strip_trailing_commas(text: &str) -> Cow<'_, str> {
    let bytes = text.as_bytes();
    let mut drop_at = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b',' => {
                let next = bytes[i + 1..]
                    .iter()
                    .find(|c| !c.is_ascii_whitespace())
                    .copied();
                if matches!(next, Some(b'}') | Some(b']')) {
                    drop_at.push(i);
                }
            }
            _ => {}
        }
    }

    if drop_at.is_empty() {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for idx in drop_at {
        out.push_str(&text[last..idx]);
        last = idx + 1;
    }
    out.push_str(&text[last..]);
    Cow::Owned(out)
}

/// Span from the first `{` to the last `}`, inclusive.
pub fn locate_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

/// Runs every repair once, in order. Returns the text and the names of repairs that changed it.
pub fn repair(text: &str) -> (String, Vec<&'static str>) {
    let mut current = text.to_string();
    let mut applied = Vec::new();
    for step in REPAIRS {
        let fixed = (step.apply)(&current).into_owned();
        if fixed != current {
            applied.push(step.name);
            current = fixed;
        }
    }
    (current, applied)
}

/// Decodes the JSON object embedded in a raw generator response.
pub fn decode(raw: &str) -> Result<Value, ParseError> {
    let span = locate_object(raw).ok_or(ParseError::NoObject)?;

    let strict_err = match serde_json::from_str::<Value>(span) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    let (repaired, applied) = repair(span);
    if applied.is_empty() {
        return Err(ParseError::Malformed(strict_err.to_string()));
    }

    warn!(
        "Strict JSON parse failed ({strict_err}); retrying after repairs: {}",
        applied.join(", ")
    );

    serde_json::from_str::<Value>(&repaired)
        .map_err(|_| ParseError::Malformed(strict_err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_ignores_surrounding_prose() {
        let raw = "Sure! Here is the analysis:\n```json\n{\"candidateName\": \"Lee\", \"score\": 7}\n```\nHope this helps.";
        assert_eq!(
            decode(raw).unwrap(),
            json!({"candidateName": "Lee", "score": 7})
        );
    }

    #[test]
    fn test_decode_valid_json_is_unchanged() {
        let valid = r#"{"a": ["x, ]", "y"], "b": {"c": "q\"\n, }"}, "d": 1.5}"#;
        assert_eq!(
            decode(valid).unwrap(),
            serde_json::from_str::<Value>(valid).unwrap()
        );
    }

    #[test]
    fn test_repairs_are_noops_on_valid_json() {
        let valid = "{\n  \"list\": [\n    \"one\",\n    \"two\"\n  ],\n  \"text\": \"a , } b\"\n}";
        for step in REPAIRS {
            assert!(
                matches!((step.apply)(valid), Cow::Borrowed(_)),
                "{} changed valid JSON",
                step.name
            );
        }
        let (repaired, applied) = repair(valid);
        assert_eq!(repaired, valid);
        assert!(applied.is_empty());
    }

    #[test]
    fn test_missing_comma_between_array_strings_is_repaired() {
        let broken = "{\"topSkills\": [\n  \"#Growth\"\n  \"#M&A\"\n]}";
        let corrected = "{\"topSkills\": [\n  \"#Growth\",\n  \"#M&A\"\n]}";
        assert_eq!(decode(broken).unwrap(), decode(corrected).unwrap());
        assert_eq!(
            decode(broken).unwrap(),
            json!({"topSkills": ["#Growth", "#M&A"]})
        );
    }

    #[test]
    fn test_missing_comma_between_members_is_repaired() {
        let broken = "{\"name\": \"Park\"\n\"role\": \"COO\"}";
        assert_eq!(
            decode(broken).unwrap(),
            json!({"name": "Park", "role": "COO"})
        );
    }

    #[test]
    fn test_trailing_commas_are_stripped() {
        let broken = "{\"flags\": [\"a\", \"b\",\n], \"n\": 1,}";
        assert_eq!(decode(broken).unwrap(), json!({"flags": ["a", "b"], "n": 1}));
    }

    #[test]
    fn test_trailing_comma_repair_spares_string_contents() {
        let broken = r#"{"note": "keep, ]", "list": [1, 2,],}"#;
        assert_eq!(
            decode(broken).unwrap(),
            json!({"note": "keep, ]", "list": [1, 2]})
        );
    }

    #[test]
    fn test_both_repairs_apply_in_one_pass() {
        let broken = "{\"gaps\": [\n\"Board experience\"\n\"Global P&L\",\n]}";
        assert_eq!(
            decode(broken).unwrap(),
            json!({"gaps": ["Board experience", "Global P&L"]})
        );
    }

    #[test]
    fn test_repairs_are_idempotent() {
        let broken = "{\"a\": [\n\"x\"\n\"y\",\n],}";
        for step in REPAIRS {
            let once = (step.apply)(broken).into_owned();
            let twice = (step.apply)(&once).into_owned();
            assert_eq!(once, twice, "{} is not idempotent", step.name);
        }
    }

    #[test]
    fn test_no_braces_is_parse_error() {
        assert_eq!(decode("I cannot help with that."), Err(ParseError::NoObject));
        assert_eq!(decode(""), Err(ParseError::NoObject));
        assert_eq!(decode("} backwards {"), Err(ParseError::NoObject));
    }

    #[test]
    fn test_unrepairable_json_reports_original_error() {
        let err = decode("{\"a\": tru}").unwrap_err();
        match err {
            ParseError::Malformed(msg) => assert!(msg.contains("line 1"), "got: {msg}"),
            other => panic!("expected Malformed, got {other:?}"),
        }

        // Repairs run but cannot fix the structure.
        let err = decode("{\"a\": [\"x\"\n\"y\", {]}").unwrap_err();
        assert!(matches!(err, ParseError::Malformed(_)));
    }

    #[test]
    fn test_locate_object_uses_outermost_braces() {
        assert_eq!(locate_object("xx{\"a\":{\"b\":1}}yy"), Some("{\"a\":{\"b\":1}}"));
        assert_eq!(locate_object("no object"), None);
    }
}
