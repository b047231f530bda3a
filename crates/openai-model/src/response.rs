use concierge_model::{
    ContentPart, ErrorKind, ModelContent, ModelFinishReason, ModelReply,
    ToolCallRequest,
};
use serde_json::Value;

use crate::Error;
use crate::proto::{ChatCompletion, ToolCall};

/// Converts a decoded chat completion into a provider-neutral reply.
///
/// Only the first choice is considered, we never ask for more than one.
pub fn into_reply(completion: ChatCompletion) -> Result<ModelReply, Error> {
    let Some(choice) = completion.choices.into_iter().next() else {
        return Err(Error::new(
            "completion has no choices",
            ErrorKind::MalformedResponse,
        ));
    };

    let content = convert_content(choice.message.content);
    let tool_calls = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(convert_tool_call)
        .collect();
    let finish_reason = choice.finish_reason.as_deref().map(|reason| match reason {
        "tool_calls" => ModelFinishReason::ToolCalls,
        "length" => ModelFinishReason::Length,
        _ => ModelFinishReason::Stop,
    });

    Ok(ModelReply {
        content,
        tool_calls,
        finish_reason,
    })
}

fn convert_content(content: Option<Value>) -> ModelContent {
    match content {
        None | Some(Value::Null) => ModelContent::Empty,
        Some(Value::String(text)) => ModelContent::Text(text),
        Some(Value::Array(items)) => {
            ModelContent::Parts(items.into_iter().map(convert_part).collect())
        }
        Some(other) => ModelContent::Parts(vec![ContentPart::Other(other)]),
    }
}

fn convert_part(item: Value) -> ContentPart {
    let is_text = item.get("type").and_then(Value::as_str) == Some("text");
    match item.get("text").and_then(Value::as_str) {
        Some(text) if is_text => ContentPart::Text(text.to_owned()),
        _ => ContentPart::Other(item),
    }
}

fn convert_tool_call(tool_call: ToolCall) -> ToolCallRequest {
    let arguments = if tool_call.function.arguments.trim().is_empty() {
        Value::Object(Default::default())
    } else {
        serde_json::from_str(&tool_call.function.arguments).unwrap_or_else(
            |err| {
                warn!(
                    "undecodable arguments for tool `{}`: {err}",
                    tool_call.function.name
                );
                Value::Null
            },
        )
    };
    ToolCallRequest {
        id: tool_call.id,
        name: tool_call.function.name,
        arguments,
    }
}

#[cfg(test)]
mod tests {
    use concierge_model::ModelProviderError;
    use serde_json::json;

    use super::*;

    fn decode(body: Value) -> Result<ModelReply, Error> {
        into_reply(serde_json::from_value(body).unwrap())
    }

    #[test]
    fn test_plain_text() {
        let reply = decode(json!({
            "id": "chatcmpl-1",
            "choices": [{
                "message": { "role": "assistant", "content": "Welcome!" },
                "finish_reason": "stop"
            }]
        }))
        .unwrap();
        assert_eq!(reply.content, ModelContent::Text("Welcome!".to_owned()));
        assert_eq!(reply.finish_reason, Some(ModelFinishReason::Stop));
        assert!(reply.tool_calls.is_empty());
    }

    #[test]
    fn test_content_parts() {
        let reply = decode(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": [
                        { "type": "text", "text": "Here are" },
                        { "type": "image_url", "image_url": { "url": "x" } },
                        { "type": "text", "text": "some hotels." }
                    ]
                }
            }]
        }))
        .unwrap();
        let ModelContent::Parts(parts) = reply.content else {
            panic!("expected parts");
        };
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], ContentPart::Text("Here are".to_owned()));
        assert!(matches!(parts[1], ContentPart::Other(_)));
        assert_eq!(reply.finish_reason, None);
    }

    #[test]
    fn test_tool_calls() {
        let reply = decode(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [
                        {
                            "id": "call_1",
                            "type": "function",
                            "function": {
                                "name": "search_hotels",
                                "arguments": "{\"search\":\"Goa\"}"
                            }
                        },
                        {
                            "id": "call_2",
                            "type": "function",
                            "function": { "name": "current_date", "arguments": "" }
                        },
                        {
                            "id": "call_3",
                            "type": "function",
                            "function": { "name": "search_deals", "arguments": "{oops" }
                        }
                    ]
                },
                "finish_reason": "tool_calls"
            }]
        }))
        .unwrap();
        assert_eq!(reply.content, ModelContent::Empty);
        assert_eq!(reply.finish_reason, Some(ModelFinishReason::ToolCalls));
        assert_eq!(reply.tool_calls.len(), 3);
        assert_eq!(reply.tool_calls[0].arguments, json!({ "search": "Goa" }));
        assert_eq!(reply.tool_calls[1].arguments, json!({}));
        assert_eq!(reply.tool_calls[2].arguments, Value::Null);
    }

    #[test]
    fn test_no_choices() {
        let err = decode(json!({ "choices": [] })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }
}
