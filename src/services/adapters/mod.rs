//! Response shaping shared by the provider adapters
//!
//! Turns provider content blocks into plain text and repairs "JSON mode"
//! replies that arrive wrapped in prose.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Content block of a completion response
///
/// Any object carrying a string `text` field is treated as text, whatever its
/// `type` says. Everything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseBlock {
    Text { text: String },
    Opaque(Value),
}

/// Concatenate the text of all blocks, in order, with no separator
///
/// Non-text blocks are rendered as their raw JSON and end up in the output.
#[must_use]
pub fn extract_text(blocks: &[ResponseBlock]) -> String {
    blocks.iter().fold(String::new(), |mut out, block| {
        match block {
            ResponseBlock::Text { text } => out.push_str(text),
            ResponseBlock::Opaque(raw) => out.push_str(&raw.to_string()),
        }
        out
    })
}

fn is_json(text: &str) -> bool {
    serde_json::from_str::<Value>(text).is_ok()
}

/// Best-effort JSON repair
///
/// 1. The trimmed text is returned as-is if it already parses.
/// 2. Otherwise the span from the first `{` to the last `}` is returned if it parses.
/// 3. Otherwise the trimmed text is returned unchanged.
///
/// Never fails; callers needing strict JSON must validate the result.
#[must_use]
pub fn coerce_json(text: &str) -> String {
    let trimmed = text.trim();
    if is_json(trimmed) {
        return trimmed.to_string();
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if end > start {
            let candidate = &trimmed[start..=end];
            if is_json(candidate) {
                return candidate.to_string();
            }
        }
    }

    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn blocks(value: Value) -> Vec<ResponseBlock> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_block_classification() {
        let parsed = blocks(json!([
            {"type": "text", "text": "hello"},
            {"text": " world"},
            {"type": "tool_use", "id": "t1", "name": "lookup", "input": {}},
            {"type": "text", "text": 5}
        ]));

        assert_eq!(parsed[0], ResponseBlock::Text { text: "hello".into() });
        assert_eq!(parsed[1], ResponseBlock::Text { text: " world".into() });
        assert!(matches!(parsed[2], ResponseBlock::Opaque(_)));
        assert!(matches!(parsed[3], ResponseBlock::Opaque(_)));
    }

    #[test]
    fn test_extract_text_concatenates_in_order() {
        let parsed = blocks(json!([
            {"type": "text", "text": "{\"a\":"},
            {"type": "text", "text": "1}"}
        ]));
        assert_eq!(extract_text(&parsed), r#"{"a":1}"#);
    }

    #[test]
    fn test_extract_text_leaks_opaque_blocks() {
        let parsed = blocks(json!([
            {"type": "text", "text": "before "},
            {"type": "thinking", "thinking": "hmm"}
        ]));
        let text = extract_text(&parsed);
        assert!(text.starts_with("before {"));
        assert!(text.contains(r#""thinking":"hmm""#));
        assert!(text.ends_with('}'));
    }

    #[test]
    fn test_extract_text_empty() {
        assert_eq!(extract_text(&[]), "");
    }

    #[test]
    fn test_coerce_valid_json_untouched() {
        assert_eq!(coerce_json(r#"{"a":1}"#), r#"{"a":1}"#);
        // not re-serialized
        assert_eq!(coerce_json(r#"{ "a" :  1 }"#), r#"{ "a" :  1 }"#);
        assert_eq!(coerce_json("  [1, 2]\n"), "[1, 2]");
    }

    #[test]
    fn test_coerce_extracts_braced_span() {
        assert_eq!(coerce_json(r#"Sure! {"a":1} thanks"#), r#"{"a":1}"#);
        assert_eq!(
            coerce_json("```json\n{\"statements\": [\"x\"], \"statement_scores\": [1]}\n```"),
            r#"{"statements": ["x"], "statement_scores": [1]}"#
        );
    }

    #[test]
    fn test_coerce_leaves_non_json_alone() {
        assert_eq!(coerce_json("no json here"), "no json here");
        assert_eq!(coerce_json("} backwards {"), "} backwards {");
        assert_eq!(coerce_json(r#"{"a":1} and {"b":2}"#), r#"{"a":1} and {"b":2}"#);
        assert_eq!(coerce_json("{broken"), "{broken");
    }
}
