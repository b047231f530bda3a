//! Core logic of the concierge: entity memory, conversation buffer,
//! dialogue orchestration and tool execution.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

mod agent;
pub mod conversation;
mod dialogue;
pub mod memory;
mod model_client;
pub mod tool;

pub use agent::{
    APOLOGY, Agent, AgentBuilder, DEFAULT_MAX_TOOL_ROUNDS, annotate,
    strip_annotations,
};
pub use dialogue::Dialogue;
