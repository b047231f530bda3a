use concierge_model::ModelProvider;

use super::Agent;
use crate::conversation::DEFAULT_HISTORY_CAPACITY;
use crate::model_client::ModelClient;
use crate::tool::{AnyTool, Executor as ToolExecutor, Tool, ToolObject};

/// How many tool rounds one utterance may take unless configured.
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 8;

/// [`Agent`] builder.
pub struct AgentBuilder {
    model_client: ModelClient,
    system_prompt: Option<String>,
    tools: Vec<Box<dyn ToolObject>>,
    history_capacity: usize,
    max_tool_rounds: usize,
}

impl AgentBuilder {
    /// Creates a new builder with the specified model provider.
    #[inline]
    pub fn with_model_provider<P: ModelProvider + 'static>(
        provider: P,
    ) -> Self {
        Self {
            model_client: ModelClient::new(provider),
            system_prompt: None,
            tools: vec![],
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    /// Sets the system prompt sent ahead of every conversation.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Sets how many turns each dialogue keeps.
    #[inline]
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Sets how many tool-call rounds a single utterance may take before
    /// the agent gives up.
    #[inline]
    pub fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    /// Registers a tool.
    #[inline]
    pub fn with_tool<T: Tool>(mut self, tool: T) -> Self {
        let tool = Box::new(AnyTool(tool));
        self.tools.push(tool);
        self
    }

    /// Builds the agent.
    #[inline]
    pub fn build(self) -> Agent {
        Agent {
            model_client: self.model_client,
            tool_executor: ToolExecutor::with_tools(self.tools),
            system_prompt: self.system_prompt,
            history_capacity: self.history_capacity,
            max_tool_rounds: self.max_tool_rounds,
        }
    }
}
