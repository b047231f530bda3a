//! An abstraction layer for the language models the concierge talks to.
//!
//! This crate establishes a small protocol between the dialogue
//! orchestrator and hosted language models, so that the orchestrator can
//! switch between model vendors without touching its own logic.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to.

#![deny(missing_docs)]

mod error;
mod provider;
mod request;
mod response;

pub use error::*;
pub use provider::*;
pub use request::*;
pub use response::*;
