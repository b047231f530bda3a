use concierge_model::{ContentPart, ModelContent};
use serde_json::Value;

/// Renders the content of the final reply as plain text.
///
/// Text segments are joined with a space. When there is no text segment
/// at all, the raw segments are rendered as JSON so the user still gets
/// something.
pub(crate) fn extract_text(content: &ModelContent) -> String {
    match content {
        ModelContent::Empty => String::new(),
        ModelContent::Text(text) => text.trim().to_owned(),
        ModelContent::Parts(parts) => {
            let texts: Vec<&str> = parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Text(text) => Some(text.trim()),
                    ContentPart::Other(_) => None,
                })
                .filter(|text| !text.is_empty())
                .collect();
            if !texts.is_empty() {
                return texts.join(" ");
            }
            let raw: Vec<Value> = parts
                .iter()
                .map(|part| match part {
                    ContentPart::Text(text) => Value::String(text.clone()),
                    ContentPart::Other(value) => value.clone(),
                })
                .collect();
            if raw.is_empty() {
                String::new()
            } else {
                Value::Array(raw).to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_extract_text() {
        assert_eq!(extract_text(&ModelContent::Empty), "");
        assert_eq!(
            extract_text(&ModelContent::Text(" Welcome! ".to_owned())),
            "Welcome!"
        );
        assert_eq!(
            extract_text(&ModelContent::Parts(vec![
                ContentPart::Text("Here are".to_owned()),
                ContentPart::Other(json!({ "type": "thinking" })),
                ContentPart::Text("two hotels.".to_owned()),
            ])),
            "Here are two hotels."
        );
    }

    #[test]
    fn test_non_text_fallback() {
        let content = ModelContent::Parts(vec![ContentPart::Other(
            json!({ "type": "image", "url": "x" }),
        )]);
        assert_eq!(
            extract_text(&content),
            r#"[{"type":"image","url":"x"}]"#
        );
        assert_eq!(extract_text(&ModelContent::Parts(vec![])), "");
    }
}
