mod builder;
mod reference;
mod reply;

use std::fmt::{self, Display};

use concierge_model::{
    ModelContent, ModelMessage, ModelProviderError, ModelRequest,
    ToolCallResult,
};
use serde_json::json;
use tracing::Instrument;

use crate::conversation::Turn;
use crate::dialogue::Dialogue;
use crate::memory::EntityMemory;
use crate::model_client::ModelClient;
use crate::tool::Executor as ToolExecutor;
pub use builder::{AgentBuilder, DEFAULT_MAX_TOOL_ROUNDS};
pub use reference::{annotate, strip_annotations};

/// The reply given to the user whenever the model cannot be reached.
pub const APOLOGY: &str = "Sorry, something went wrong while processing your request. Please try again later.";

/// The dialogue orchestrator.
///
/// An agent holds what is shared by every session: the model client, the
/// tools and the system prompt. Everything a conversation remembers lives
/// in a [`Dialogue`], which the caller passes in for every utterance.
pub struct Agent {
    model_client: ModelClient,
    tool_executor: ToolExecutor,
    system_prompt: Option<String>,
    history_capacity: usize,
    max_tool_rounds: usize,
}

enum Failure {
    Model(Box<dyn ModelProviderError>),
    TooManyToolRounds(usize),
}

impl Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Model(err) => write!(f, "model error: {err}"),
            Failure::TooManyToolRounds(rounds) => {
                write!(f, "still asking for tools after {rounds} rounds")
            }
        }
    }
}

impl Agent {
    /// Creates a dialogue suited to this agent.
    #[inline]
    pub fn new_dialogue(&self) -> Dialogue {
        Dialogue::with_history_capacity(self.history_capacity)
    }

    /// Handles one user utterance and returns the reply text.
    ///
    /// This never fails: when the model cannot produce a reply, the fixed
    /// [`APOLOGY`] is returned and recorded like any other reply.
    pub async fn handle(
        &self,
        dialogue: &mut Dialogue,
        utterance: &str,
    ) -> String {
        let span = info_span!("handle", len = utterance.len());
        self.handle_inner(dialogue, utterance).instrument(span).await
    }

    async fn handle_inner(
        &self,
        dialogue: &mut Dialogue,
        utterance: &str,
    ) -> String {
        if reference::is_exit_phrase(utterance) {
            debug!("exit phrase received, resetting the dialogue");
            dialogue.reset();
        }

        let input = self.prepare_input(&mut dialogue.memory, utterance);
        dialogue.buffer.append(Turn::Human(input));
        dialogue.buffer.truncate();

        let reply = match self.complete(dialogue).await {
            Ok(content) => strip_annotations(&reply::extract_text(&content)),
            Err(err) => {
                error!("failed to get a reply: {err}");
                APOLOGY.to_owned()
            }
        };

        dialogue.buffer.append(Turn::Assistant(reply.clone()));
        dialogue.buffer.truncate();
        reply
    }

    /// Annotates the utterance with the identifier it refers to, if any.
    fn prepare_input(
        &self,
        memory: &mut EntityMemory,
        utterance: &str,
    ) -> String {
        if !reference::needs_resolution(memory, utterance) {
            return utterance.to_owned();
        }
        match memory.resolve(utterance) {
            Some(id) => {
                debug!("utterance refers to {id}");
                annotate(utterance, &id)
            }
            None => utterance.to_owned(),
        }
    }

    /// Runs the model until it produces a reply without tool calls.
    async fn complete(
        &self,
        dialogue: &mut Dialogue,
    ) -> Result<ModelContent, Failure> {
        let Dialogue { memory, buffer } = dialogue;
        let tools = self.tool_executor.definitions();
        let mut scratch: Vec<ModelMessage> = vec![];

        for round in 0..=self.max_tool_rounds {
            let messages = self
                .system_prompt
                .iter()
                .map(|prompt| ModelMessage::System(prompt.clone()))
                .chain(buffer.to_messages())
                .chain(scratch.iter().cloned())
                .collect();
            let request = ModelRequest {
                messages,
                tools: tools.clone(),
            };

            let reply = self
                .model_client
                .send_request(request)
                .await
                .map_err(Failure::Model)?;
            if reply.tool_calls.is_empty() {
                return Ok(reply.content);
            }
            if round == self.max_tool_rounds {
                break;
            }

            trace!("round {round}: {} tool calls", reply.tool_calls.len());
            scratch.push(ModelMessage::Assistant {
                content: reply::extract_text(&reply.content),
                tool_calls: reply.tool_calls.clone(),
            });
            for call in &reply.tool_calls {
                let content = match self.tool_executor.run(call).await {
                    Ok(output) => {
                        memory.rebuild(&output.entities);
                        output.content
                    }
                    Err(err) => json!({ "error": err.reason() }).to_string(),
                };
                scratch.push(ModelMessage::Tool(ToolCallResult {
                    id: call.id.clone(),
                    content,
                }));
            }
        }

        Err(Failure::TooManyToolRounds(self.max_tool_rounds))
    }
}
