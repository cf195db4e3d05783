//! Structured extraction of JSON from free-form model output.
//!
//! Strategies run in strict priority order and stop at the first success:
//!
//! 1. the whole trimmed text
//! 2. the interior of a ```` ```json ```` fenced block
//! 3. the first balanced top-level array literal anywhere in the text
//!
//! No fallback value is ever invented here.

use serde_json::Value;
use thiserror::Error;

/// Failure to recover any JSON value from model output.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractionError {
    #[error("no valid JSON found in model response")]
    NoJsonFound,
}

/// Recovers a JSON value from raw model text.
pub fn extract_json(raw: &str) -> Result<Value, ExtractionError> {
    let text = raw.trim();

    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Ok(value);
    }

    if let Some(value) = fenced_json(text).and_then(|inner| serde_json::from_str(inner).ok()) {
        return Ok(value);
    }

    if let Some(value) = first_array(text) {
        return Ok(value);
    }

    Err(ExtractionError::NoJsonFound)
}

/// Interior of the first fenced block tagged `json`.
fn fenced_json(text: &str) -> Option<&str> {
    const OPEN: &str = "```json";
    const CLOSE: &str = "```";

    let start = text.find(OPEN)? + OPEN.len();
    let end = text[start..].find(CLOSE)?;
    Some(text[start..start + end].trim())
}

/// Tries each `[` in order and returns the first balanced array that parses.
fn first_array(text: &str) -> Option<Value> {
    text.match_indices('[').find_map(|(start, _)| {
        let candidate = balanced(text, start, '[', ']')?;
        serde_json::from_str::<Value>(candidate).ok()
    })
}

/// Slice from `start` to its matching close bracket, honouring JSON strings.
fn balanced(s: &str, start: usize, open: char, close: char) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in s[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            _ if in_string => {}
            c if c == open => depth += 1,
            c if c == close => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&s[start..start + offset + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    mod direct {
        use super::*;

        #[test]
        fn parses_plain_object() {
            assert_eq!(extract_json(r#"{"a":1}"#).unwrap(), json!({"a": 1}));
        }

        #[test]
        fn tolerates_surrounding_whitespace() {
            assert_eq!(extract_json("\n  [1, 2]\n ").unwrap(), json!([1, 2]));
        }
    }

    mod fenced {
        use super::*;

        #[test]
        fn extracts_from_json_fence_inline() {
            assert_eq!(
                extract_json("noise ```json [1,2,3] ``` trailing").unwrap(),
                json!([1, 2, 3])
            );
        }

        #[test]
        fn extracts_object_from_multiline_fence() {
            let raw = "Voici le rapport :\n```json\n{\"global_score\": 70}\n```\nFin.";
            assert_eq!(extract_json(raw).unwrap(), json!({"global_score": 70}));
        }

        #[test]
        fn broken_fence_falls_through_to_array_search() {
            let raw = "```json {oops ``` mais voici [\"a\"]";
            assert_eq!(extract_json(raw).unwrap(), json!(["a"]));
        }
    }

    mod array_search {
        use super::*;

        #[test]
        fn finds_array_in_prose() {
            let raw = r#"Bien sûr ! [{"id":"q1"}] J'espère que cela aide."#;
            assert_eq!(extract_json(raw).unwrap(), json!([{"id": "q1"}]));
        }

        #[test]
        fn ignores_brackets_inside_strings() {
            let raw = r#"Résultat: ["a]b", "c"] puis [9]"#;
            assert_eq!(extract_json(raw).unwrap(), json!(["a]b", "c"]));
        }

        #[test]
        fn skips_unparseable_candidates() {
            let raw = "voir [note] puis [1, 2]";
            assert_eq!(extract_json(raw).unwrap(), json!([1, 2]));
        }

        #[test]
        fn handles_multibyte_text_before_array() {
            let raw = "Évaluation complète — [\"é\"]";
            assert_eq!(extract_json(raw).unwrap(), json!(["é"]));
        }

        #[test]
        fn does_not_recover_bare_objects_from_prose() {
            assert_eq!(
                extract_json(r#"Le score est {"a": 1} voilà"#),
                Err(ExtractionError::NoJsonFound)
            );
        }
    }

    #[test]
    fn plain_prose_fails() {
        assert_eq!(extract_json("not json at all"), Err(ExtractionError::NoJsonFound));
    }

    #[test]
    fn empty_input_fails() {
        assert_eq!(extract_json("   "), Err(ExtractionError::NoJsonFound));
    }
}
