//! A hotel and deals concierge that assembles the catalog tools, the deals
//! tool and a model provider into chat sessions.
//!
//! The crate includes a CLI tool for chatting in the terminal. And you can
//! also use it as a library to serve sessions from your own host app.

#![deny(missing_docs)]

#[allow(unused_imports)]
#[macro_use]
extern crate tracing;

pub mod catalog;
pub mod config;
pub mod deals;
mod session;
pub mod tools;

pub use session::{
    ChatError, DISPLAY_LOG_CAPACITY, Exchange, Session, SessionBuilder,
    Sessions,
};

/// Re-exports of [`concierge_core`] crate.
pub mod core {
    pub use concierge_core::*;
}
