//! Extraction of the JSON envelope from free-form model output.
//!
//! The model may wrap the requested object in conversational text or code
//! fences. The envelope is taken to span from the first `{` to the last `}`.

use serde_json::Value;
use vsa_models::AnalysisResult;

use crate::error::{SubmissionError, SubmissionResult};

/// Field of the envelope holding the analysis body.
pub const ANALYSIS_FIELD: &str = "analysis";

/// Slice of `raw` that should hold the envelope.
///
/// Starts at the first `{` (or 0 if there is none) and ends just past the
/// last `}` (or at 0 if there is none). When the end precedes the start the
/// bounds are swapped, so the result is always a determinate substring.
pub fn envelope_slice(raw: &str) -> &str {
    let start = raw.find('{').unwrap_or(0);
    let end = raw.rfind('}').map(|i| i + 1).unwrap_or(0);

    if start <= end {
        &raw[start..end]
    } else {
        &raw[end..start]
    }
}

/// Parse the envelope in `raw` as a JSON object.
pub fn parse_json_envelope(raw: &str) -> SubmissionResult<serde_json::Map<String, Value>> {
    let slice = envelope_slice(raw);

    match serde_json::from_str::<Value>(slice) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(SubmissionError::malformed(format!(
            "expected a JSON object, found {}",
            json_kind(&other)
        ))),
        Err(e) => Err(SubmissionError::malformed(format!(
            "response does not contain a valid JSON object: {}",
            e
        ))),
    }
}

/// Parse a raw model response into the analysis result.
pub fn parse_analysis(raw: &str) -> SubmissionResult<AnalysisResult> {
    let envelope = parse_json_envelope(raw)?;

    match envelope.get(ANALYSIS_FIELD) {
        Some(Value::String(text)) => Ok(AnalysisResult::new(text.clone())),
        Some(Value::Null) | None => Err(SubmissionError::malformed(format!(
            "response is missing the \"{}\" field",
            ANALYSIS_FIELD
        ))),
        Some(other) => Err(SubmissionError::malformed(format!(
            "\"{}\" field is {}, expected a string",
            ANALYSIS_FIELD,
            json_kind(other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_from_noisy_text() {
        let raw = r#"Sure! {"analysis":"STYLE:\n...","other":1} Thanks."#;
        assert_eq!(parse_analysis(raw).unwrap().text, "STYLE:\n...");
    }

    #[test]
    fn test_bare_object() {
        let raw = r#"{"analysis":"**STYLE:** documentary"}"#;
        assert_eq!(parse_analysis(raw).unwrap().text, "**STYLE:** documentary");
    }

    #[test]
    fn test_code_fence_and_nested_braces() {
        let raw = "```json\n{\"analysis\": \"uses {curly} asides\", \"meta\": {\"k\": 1}}\n```";
        assert_eq!(parse_analysis(raw).unwrap().text, "uses {curly} asides");
    }

    #[test]
    fn test_no_braces_is_malformed() {
        assert!(matches!(
            parse_analysis("I could not watch that video."),
            Err(SubmissionError::MalformedResponse(_))
        ));
        assert!(matches!(parse_analysis(""), Err(SubmissionError::MalformedResponse(_))));
    }

    #[test]
    fn test_missing_closing_brace_is_malformed() {
        assert_eq!(envelope_slice("prefix {\"analysis\": \"x\""), "prefix ");
        assert!(matches!(
            parse_analysis("prefix {\"analysis\": \"x\""),
            Err(SubmissionError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_missing_opening_brace_is_malformed() {
        assert_eq!(envelope_slice("\"analysis\": \"x\"} tail"), "\"analysis\": \"x\"}");
        assert!(matches!(
            parse_analysis("\"analysis\": \"x\"} tail"),
            Err(SubmissionError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let err = parse_analysis(r#"{"summary":"x"}"#).unwrap_err();
        assert!(err.to_string().contains("missing the \"analysis\" field"));

        assert!(matches!(
            parse_analysis(r#"{"analysis":null}"#),
            Err(SubmissionError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_non_string_field_is_malformed() {
        let err = parse_analysis(r#"{"analysis":{"style":"x"}}"#).unwrap_err();
        assert!(err.to_string().contains("an object"));
    }

    #[test]
    fn test_two_objects_span_is_invalid() {
        // First `{` to last `}` covers both objects, which is not one JSON value.
        assert!(parse_analysis(r#"{"analysis":"a"} and {"analysis":"b"}"#).is_err());
    }

    #[test]
    fn test_deterministic() {
        let raw = r#"noise {"analysis":"same"} noise"#;
        assert_eq!(parse_analysis(raw), parse_analysis(raw));
    }

    #[test]
    fn test_property_prefix_suffix_noise() {
        let prefixes = ["", "Here you go:\n", "```json\n", "Résumé → "];
        let suffixes = ["", "\n```", " Hope this helps!", " 🎬"];
        for prefix in prefixes {
            for suffix in suffixes {
                let raw = format!("{}{{\"analysis\":\"body\"}}{}", prefix, suffix);
                assert_eq!(parse_analysis(&raw).unwrap().text, "body", "{:?}", raw);
            }
        }
    }
}
