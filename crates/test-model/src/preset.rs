use concierge_model::{
    ContentPart, ErrorKind, ModelContent, ModelFinishReason, ModelReply,
    ToolCallRequest,
};
use serde::{Deserialize, Serialize};

/// A scripted step of the fake model.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PresetStep {
    /// Replies with the given content and tool calls.
    #[serde(rename = "reply")]
    Reply(PresetReply),
    /// Fails the request.
    #[serde(rename = "failure")]
    Failure(PresetFailure),
}

/// The preset reply for an assistant step.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresetReply {
    /// Content of the reply.
    pub content: ModelContent,
    /// Tool calls in the reply.
    #[serde(default)]
    pub tool_calls: Vec<ToolCallRequest>,
}

impl PresetReply {
    /// Creates a reply that only carries text.
    #[inline]
    pub fn text<S: Into<String>>(text: S) -> Self {
        Self {
            content: ModelContent::Text(text.into()),
            tool_calls: vec![],
        }
    }

    /// Creates a reply whose content is split into typed parts.
    #[inline]
    pub fn with_parts(parts: impl Into<Vec<ContentPart>>) -> Self {
        Self {
            content: ModelContent::Parts(parts.into()),
            tool_calls: vec![],
        }
    }

    /// Creates a reply that only asks for tool calls.
    #[inline]
    pub fn with_tool_calls(
        tool_calls: impl Into<Vec<ToolCallRequest>>,
    ) -> Self {
        Self {
            content: ModelContent::Empty,
            tool_calls: tool_calls.into(),
        }
    }

    pub(crate) fn to_reply(&self) -> ModelReply {
        let finish_reason = if self.tool_calls.is_empty() {
            ModelFinishReason::Stop
        } else {
            ModelFinishReason::ToolCalls
        };
        ModelReply {
            content: self.content.clone(),
            tool_calls: self.tool_calls.clone(),
            finish_reason: Some(finish_reason),
        }
    }
}

/// A preset failure.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresetFailure {
    /// The message of the failure.
    pub message: String,
    /// The error kind name, one of `rate_limit_exceeded`, `unavailable`,
    /// `malformed_response` or `other`.
    pub kind: String,
}

impl PresetFailure {
    /// Creates a failure of the given kind.
    #[inline]
    pub fn new<S: Into<String>>(message: S, kind: ErrorKind) -> Self {
        let kind = match kind {
            ErrorKind::RateLimitExceeded => "rate_limit_exceeded",
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::MalformedResponse => "malformed_response",
            ErrorKind::Other => "other",
        };
        Self {
            message: message.into(),
            kind: kind.to_owned(),
        }
    }

    pub(crate) fn error_kind(&self) -> ErrorKind {
        match self.kind.as_str() {
            "rate_limit_exceeded" => ErrorKind::RateLimitExceeded,
            "unavailable" => ErrorKind::Unavailable,
            "malformed_response" => ErrorKind::MalformedResponse,
            _ => ErrorKind::Other,
        }
    }
}
