use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A complete reply from the model provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModelReply {
    /// The content of the reply.
    pub content: ModelContent,
    /// Tool calls requested by the model.
    pub tool_calls: Vec<ToolCallRequest>,
    /// The reason the model finished generating, if reported.
    pub finish_reason: Option<ModelFinishReason>,
}

impl ModelReply {
    /// Creates a reply that only carries text.
    #[inline]
    pub fn text<S: Into<String>>(text: S) -> Self {
        Self {
            content: ModelContent::Text(text.into()),
            tool_calls: vec![],
            finish_reason: Some(ModelFinishReason::Stop),
        }
    }
}

/// The content of a reply.
///
/// Vendors disagree on the shape of the content: some send a plain
/// string, others a list of typed segments. Both are preserved here and
/// it's up to the caller to decide how to render them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelContent {
    /// No content at all, typically a tool-call-only reply.
    #[default]
    Empty,
    /// A plain text.
    Text(String),
    /// A list of typed segments.
    Parts(Vec<ContentPart>),
}

/// A typed segment of the reply content.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentPart {
    /// A text segment.
    Text(String),
    /// Any segment that is not text, kept as raw JSON.
    Other(Value),
}

/// The reason why a model reply has finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelFinishReason {
    /// The model needs to call a tool.
    ToolCalls,
    /// The model has finished generating text.
    Stop,
    /// The model hit the output token limit.
    Length,
}

/// Describes a tool call request from the model.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// The unique identifier for the tool call request.
    pub id: String,
    /// The name of the tool to call.
    pub name: String,
    /// The arguments to pass to the function.
    pub arguments: Value,
}
