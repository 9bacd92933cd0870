use serde_json::Value;

/// Flattens a backend `detail` field into one printable line.
///
/// Plain strings pass through; validation error lists become their `msg`
/// entries joined with "; "; anything else is rendered as JSON.
pub fn detail_message(detail: &Value) -> Option<String> {
    let raw = match detail {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let messages: Vec<String> = items
                .iter()
                .map(|item| match item.get("msg") {
                    Some(Value::String(msg)) => msg.clone(),
                    _ => value_to_string(item),
                })
                .collect();
            messages.join("; ")
        }
        other => value_to_string(other),
    };
    let cleaned = sanitize(&raw);
    (!cleaned.trim().is_empty()).then_some(cleaned)
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn sanitize(s: &str) -> String {
    s.chars().filter(|c| !c.is_control()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_detail() {
        assert_eq!(
            detail_message(&json!("bad credential")).as_deref(),
            Some("bad credential")
        );
    }

    #[test]
    fn test_validation_error_list() {
        let detail = json!([
            {"loc": ["body", "email"], "msg": "field required", "type": "value_error.missing"},
            {"loc": ["body", "password"], "msg": "too short"}
        ]);
        assert_eq!(
            detail_message(&detail).as_deref(),
            Some("field required; too short")
        );
    }

    #[test]
    fn test_empty_and_null_details() {
        assert_eq!(detail_message(&Value::Null), None);
        assert_eq!(detail_message(&json!("")), None);
        assert_eq!(detail_message(&json!([])), None);
    }

    #[test]
    fn test_control_characters_are_stripped() {
        assert_eq!(
            detail_message(&json!("line\none\u{7}")).as_deref(),
            Some("lineone")
        );
        assert_eq!(detail_message(&json!(404)).as_deref(), Some("404"));
    }
}
