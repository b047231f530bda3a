//! Tool call supports.

mod error;
mod executor;

use std::pin::Pin;

use serde::de::DeserializeOwned;
use serde_json::Value;

pub use error::{Error, ErrorKind};
pub(crate) use executor::Executor;

use crate::memory::EntityRef;

/// The output of a successful tool call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// The content handed back to the model.
    pub content: String,
    /// Entities the tool found, in the order it presents them.
    ///
    /// A non-empty list replaces the entity memory of the dialogue, so
    /// only tools that run a fresh search should fill it.
    pub entities: Vec<EntityRef>,
}

impl ToolOutput {
    /// Creates an output carrying only content.
    #[inline]
    pub fn text<S: Into<String>>(content: S) -> Self {
        Self {
            content: content.into(),
            entities: vec![],
        }
    }

    /// Attaches the entities found by the tool.
    #[inline]
    pub fn with_entities(mut self, entities: Vec<EntityRef>) -> Self {
        self.entities = entities;
        self
    }
}

/// The result of a tool call.
pub type ToolResult = Result<ToolOutput, Error>;

/// A tool that can be called by the model.
///
/// Implementations of this trait should be stateless. Anything that
/// belongs to a conversation, like the entities a search found, is
/// reported through [`ToolOutput`] and kept by the dialogue instead.
///
/// The tool can still hold immutable context, such as an HTTP client or
/// endpoint URLs, set during initialization and cloned when executing.
pub trait Tool: Send + Sync + 'static {
    /// The type of input that the tool accepts.
    type Input: DeserializeOwned;

    /// Returns the name of the tool.
    fn name(&self) -> &str;

    /// Returns the description of the tool.
    fn description(&self) -> &str;

    /// Returns the parameter schema of the tool.
    fn parameter_schema(&self) -> &Value;

    /// Executes the tool with the given input.
    ///
    /// This method must return a future that is fully independent of `self`,
    /// and the future should be cancellation safe.
    fn execute(
        &self,
        input: Self::Input,
    ) -> impl Future<Output = ToolResult> + Send + 'static;
}

pub(crate) trait ToolObject: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameter_schema(&self) -> &Value;

    fn execute(
        &self,
        arguments: Value,
    ) -> Pin<Box<dyn Future<Output = ToolResult> + Send>>;
}

pub(crate) struct AnyTool<T: Tool>(pub T);

impl<T: Tool> ToolObject for AnyTool<T> {
    #[inline]
    fn name(&self) -> &str {
        self.0.name()
    }

    #[inline]
    fn description(&self) -> &str {
        self.0.description()
    }

    #[inline]
    fn parameter_schema(&self) -> &Value {
        self.0.parameter_schema()
    }

    #[inline]
    fn execute(
        &self,
        arguments: Value,
    ) -> Pin<Box<dyn Future<Output = ToolResult> + Send>> {
        let input: T::Input = match serde_json::from_value(arguments) {
            Ok(input) => input,
            Err(err) => {
                let reason = format!("{err}");
                return Box::pin(std::future::ready(ToolResult::Err(
                    Error::invalid_input().with_reason(reason),
                )));
            }
        };
        Box::pin(self.0.execute(input))
    }
}
