//! Recover JSON objects from model output

use crate::error::CoreError;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

/// Parse model output into a JSON object, tolerating surrounding prose.
///
/// Tries the trimmed text as-is first, then the span from the first `{` to
/// the last `}`. Anything else is `MalformedOutput`.
pub fn parse_json_loose(raw: &str) -> Result<Map<String, Value>, CoreError> {
    let trimmed = raw.trim();
    if let Some(object) = parse_object(trimmed) {
        return Ok(object);
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            if let Some(object) = parse_object(&trimmed[start..=end]) {
                debug!("Recovered JSON object from wrapped model output");
                return Ok(object);
            }
        }
    }

    Err(CoreError::malformed(raw))
}

/// Parse model output loosely, then deserialize it into `T`.
///
/// A recovered object that does not fit `T` is also `MalformedOutput`.
pub fn parse_loose_as<T: DeserializeOwned>(raw: &str) -> Result<T, CoreError> {
    let object = parse_json_loose(raw)?;
    serde_json::from_value(Value::Object(object)).map_err(|_| CoreError::malformed(raw))
}

fn parse_object(candidate: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(object)) => Some(object),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_strict_json() {
        let object = parse_json_loose(r#"{"a": 1, "b": [true]}"#).unwrap();
        assert_eq!(Value::Object(object), json!({"a": 1, "b": [true]}));
    }

    #[test]
    fn test_parse_json_wrapped_in_prose() {
        let object = parse_json_loose("Here is the result:\n{\"a\":1}\nThanks!").unwrap();
        assert_eq!(Value::Object(object), json!({"a": 1}));
    }

    #[test]
    fn test_parse_json_with_markdown_wrapper() {
        let response = "```json\n{\"clauses\": []}\n```";
        let object = parse_json_loose(response).unwrap();
        assert!(object["clauses"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_nested_braces_use_outermost_span() {
        let object = parse_json_loose("x {\"a\": {\"b\": 2}} y").unwrap();
        assert_eq!(object["a"]["b"], 2);
    }

    #[test]
    fn test_no_braces_is_malformed() {
        let err = parse_json_loose("no braces here").unwrap_err();
        match err {
            CoreError::MalformedOutput { preview } => assert_eq!(preview, "no braces here"),
            other => panic!("Expected MalformedOutput, got {:?}", other),
        }
    }

    #[test]
    fn test_reversed_braces_is_malformed() {
        assert!(matches!(
            parse_json_loose("} backwards {"),
            Err(CoreError::MalformedOutput { .. })
        ));
    }

    #[test]
    fn test_invalid_span_is_malformed() {
        assert!(matches!(
            parse_json_loose("{not json}"),
            Err(CoreError::MalformedOutput { .. })
        ));
    }

    #[test]
    fn test_top_level_array_is_not_an_object() {
        assert!(matches!(
            parse_json_loose("[1, 2, 3]"),
            Err(CoreError::MalformedOutput { .. })
        ));
    }

    #[test]
    fn test_parse_loose_as_typed() {
        #[derive(serde::Deserialize)]
        struct Reply {
            executive: String,
        }
        let reply: Reply = parse_loose_as("Sure! {\"executive\": \"ok\"}").unwrap();
        assert_eq!(reply.executive, "ok");

        let wrong: Result<Reply, _> = parse_loose_as("{\"executive\": 3}");
        assert!(wrong.is_err());
    }
}
