use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

/// Closing sequences appended, in order, to a payload that fails to parse.
/// `"]}"` appears twice on purpose; the order decides which repair wins.
pub const REPAIR_SUFFIXES: [&str; 4] = ["]}", "}", "]}", " ] }"];

/// Characters that may legitimately end the structured part of a payload.
const TERMINATORS: [char; 3] = ['}', ']', ','];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("no JSON object found in document")]
    NoJsonFound,
    #[error("JSON payload could not be parsed or repaired")]
    Unparseable,
}

/// Recover a JSON object from a possibly truncated payload.
///
/// The payload is cut after its last `}`, `]` or `,` to drop trailing noise,
/// parsed strictly, and if that fails re-parsed with each of
/// [`REPAIR_SUFFIXES`] appended until one succeeds.
pub fn extract_json_object(candidate: &str) -> Result<Map<String, Value>, ExtractError> {
    let start = candidate.find('{').ok_or(ExtractError::NoJsonFound)?;
    let trimmed = trim_trailing_noise(candidate[start..].trim());

    if let Some(object) = parse_object(trimmed) {
        return Ok(object);
    }

    REPAIR_SUFFIXES
        .iter()
        .enumerate()
        .find_map(|(attempt, suffix)| {
            let object = parse_object(&format!("{}{}", trimmed, suffix))?;
            debug!("Repaired JSON payload with suffix {:?} (attempt {})", suffix, attempt + 1);
            Some(object)
        })
        .ok_or(ExtractError::Unparseable)
}

/// Drop everything after the last terminator, then a single dangling comma.
fn trim_trailing_noise(payload: &str) -> &str {
    let cut = match payload.rfind(&TERMINATORS[..]) {
        Some(idx) => payload[..=idx].trim(),
        None => payload,
    };

    match cut.strip_suffix(',') {
        Some(rest) => rest.trim(),
        None => cut,
    }
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    serde_json::from_str::<Map<String, Value>>(text).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn as_value(map: Map<String, Value>) -> Value {
        Value::Object(map)
    }

    #[test]
    fn parses_valid_object() {
        let parsed = extract_json_object(r#"{"items": [{"a": 1}]}"#).unwrap();
        assert_eq!(as_value(parsed), json!({"items": [{"a": 1}]}));
    }

    #[test]
    fn drops_trailing_text() {
        let doc = "Listing export\n{\"items\": [{\"a\": 1}], \"total\": 1}\nPage 1 of 3 truncated here";
        let parsed = extract_json_object(doc).unwrap();
        assert_eq!(as_value(parsed), json!({"items": [{"a": 1}], "total": 1}));
    }

    #[test]
    fn valid_input_is_recovered_exactly() {
        let original = json!({"items": [{"title": "카페", "deposit": 1700}], "count": 1});
        let text = format!("{} and then some narrative", original);
        let parsed = extract_json_object(&text).unwrap();
        assert_eq!(as_value(parsed), original);
    }

    #[test]
    fn repairs_missing_array_and_object_close() {
        let parsed = extract_json_object(r#"{"items":[{"a":1},{"a":2}"#).unwrap();
        let items = parsed["items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1], json!({"a": 2}));
    }

    #[test]
    fn repairs_dangling_comma() {
        let parsed = extract_json_object("{\"items\":[{\"a\":1},{\"a\":2},\n  {\"a\":").unwrap();
        assert_eq!(parsed["items"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn repairs_missing_object_close() {
        let parsed = extract_json_object(r#"{"items":[{"a":1}], "next": {"page": 2}"#).unwrap();
        assert_eq!(as_value(parsed), json!({"items": [{"a": 1}], "next": {"page": 2}}));
    }

    #[test]
    fn no_brace_is_no_json() {
        assert_eq!(extract_json_object("just some text [1, 2]"), Err(ExtractError::NoJsonFound));
        assert_eq!(extract_json_object(""), Err(ExtractError::NoJsonFound));
    }

    #[test]
    fn hopeless_payload_is_unparseable() {
        assert_eq!(extract_json_object("{not json at all"), Err(ExtractError::Unparseable));
        assert_eq!(
            extract_json_object(r#"{"items":[{"a":[{"b":1}"#),
            Err(ExtractError::Unparseable)
        );
    }

    #[test]
    fn top_level_array_is_unparseable() {
        // Slicing from the first brace leaves `{...}]`, which no suffix repairs.
        assert_eq!(extract_json_object(r#"[{"a":1}]"#), Err(ExtractError::Unparseable));
    }

    #[test]
    fn extraction_is_deterministic() {
        let doc = r#"{"items":[{"a":1},{"b":[1,2]}"#;
        let first = serde_json::to_string(&extract_json_object(doc).unwrap()).unwrap();
        let second = serde_json::to_string(&extract_json_object(doc).unwrap()).unwrap();
        assert_eq!(first, second);
    }
}
