use std::collections::HashMap;

use concierge_model::{ModelTool, ToolCallRequest};
use tracing::Instrument;

use crate::tool::{Error, ToolObject, ToolResult};

/// An executor that handles tool call requests from the model.
pub struct Executor {
    tools: HashMap<String, Box<dyn ToolObject>>,
}

impl Executor {
    pub fn with_tools(tools: Vec<Box<dyn ToolObject>>) -> Self {
        let mut tool_map = HashMap::with_capacity(tools.len());
        for tool in tools {
            let name = tool.name();
            if tool_map.contains_key(name) {
                warn!("tool registered twice, keeping the last one: {name}");
            }
            tool_map.insert(name.to_owned(), tool);
        }
        let tools = tool_map;
        Self { tools }
    }

    /// Returns the declarations of all tools, sorted by name so that the
    /// requests sent to the model are stable.
    pub fn definitions(&self) -> Vec<ModelTool> {
        let mut definitions: Vec<_> = self
            .tools
            .values()
            .map(|tool| ModelTool {
                name: tool.name().to_owned(),
                description: tool.description().trim().to_owned(),
                parameters: tool.parameter_schema().clone(),
            })
            .collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// Runs one tool call request to completion.
    pub async fn run(&self, req: &ToolCallRequest) -> ToolResult {
        let Some(tool) = self.tools.get(&req.name) else {
            warn!("tool not found: {}", req.name);
            return Err(Error::not_found()
                .with_reason(format!("no tool named `{}`", req.name)));
        };
        trace!("running a tool ({}) with args: {:?}", req.id, req.arguments);
        let result = tool
            .execute(req.arguments.clone())
            .instrument(debug_span!("tool execute", name = %req.name))
            .await;
        if let Err(err) = &result {
            debug!("tool {} failed: {err}", req.name);
        }
        result
    }
}
