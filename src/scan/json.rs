//! Locating a JSON object inside free-form model output.
//!
//! The model is told to answer with a bare JSON object, but replies still come
//! back wrapped in markdown fences or with a sentence before or after. The
//! scanner strips an outer fence, finds the first `{`, and walks forward
//! keeping a brace depth until that object closes. Braces inside string
//! literals are ignored, so `"note": "{draft}"` does not move the depth.

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum JsonScanError {
    #[error("empty response")]
    Empty,

    #[error("no JSON object in response")]
    NoObject,

    #[error("unclosed JSON object")]
    Unbalanced,
}

/// Return the first complete top-level JSON object in `text`.
pub fn extract_object(text: &str) -> Result<&str, JsonScanError> {
    let content = strip_fence(text.trim());
    if content.is_empty() {
        return Err(JsonScanError::Empty);
    }

    let start = content.find('{').ok_or(JsonScanError::NoObject)?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in content[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + ch.len_utf8();
                    return Ok(&content[start..end]);
                }
            }
            _ => {}
        }
    }

    Err(JsonScanError::Unbalanced)
}

/// Remove a leading ```` ``` ```` / ```` ```json ```` line and a trailing fence.
fn strip_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest
        .strip_prefix("json")
        .or_else(|| rest.strip_prefix("JSON"))
        .unwrap_or(rest);
    let rest = rest.trim_start();
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_object() {
        assert_eq!(extract_object(r#"{"a": 1}"#), Ok(r#"{"a": 1}"#));
    }

    #[test]
    fn fenced_object() {
        let reply = "```json\n{\"patient\": {\"age\": \"42\"}}\n```";
        assert_eq!(extract_object(reply), Ok(r#"{"patient": {"age": "42"}}"#));

        let reply = "```\n{\"a\": 1}\n```";
        assert_eq!(extract_object(reply), Ok(r#"{"a": 1}"#));
    }

    #[test]
    fn surrounding_prose_is_ignored() {
        let reply = "Here is the extracted data:\n{\"patient\": {\"sex\": \"Female\"}, \"trend\": {}}\nLet me know if you need more.";
        assert_eq!(
            extract_object(reply),
            Ok(r#"{"patient": {"sex": "Female"}, "trend": {}}"#)
        );
    }

    #[test]
    fn fence_with_prose_after() {
        let reply = "Sure!\n```json\n{\"a\": {\"b\": 2}}\n```\nThanks";
        assert_eq!(extract_object(reply), Ok(r#"{"a": {"b": 2}}"#));
    }

    #[test]
    fn only_first_object_is_taken() {
        assert_eq!(extract_object(r#"{"a": 1} {"b": 2}"#), Ok(r#"{"a": 1}"#));
    }

    #[test]
    fn braces_inside_strings_do_not_count() {
        let reply = r#"{"symptoms": "rash } then {fever", "note": "say \"}\" twice"} trailing"#;
        assert_eq!(
            extract_object(reply),
            Ok(r#"{"symptoms": "rash } then {fever", "note": "say \"}\" twice"}"#)
        );
    }

    #[test]
    fn multibyte_text_around_object() {
        let reply = "Résumé → {\"sex\": \"Féminin\"} ✓";
        assert_eq!(extract_object(reply), Ok("{\"sex\": \"Féminin\"}"));
    }

    #[test]
    fn failures() {
        assert_eq!(extract_object(""), Err(JsonScanError::Empty));
        assert_eq!(extract_object("   \n"), Err(JsonScanError::Empty));
        assert_eq!(extract_object("```json\n```"), Err(JsonScanError::Empty));
        assert_eq!(
            extract_object("I could not read this document."),
            Err(JsonScanError::NoObject)
        );
        assert_eq!(
            extract_object(r#"{"patient": {"age": "42"}"#),
            Err(JsonScanError::Unbalanced)
        );
    }
}
