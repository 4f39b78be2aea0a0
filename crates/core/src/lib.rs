//! Core logic of the travel agent: the multi-step run loop, its step
//! memory, tool execution and the model client.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

mod agent;
mod conversation;
mod error;
pub mod memory;
mod model_client;
pub mod tool;

pub use agent::{AdditionalArgs, Agent, AgentBuilder, DEFAULT_MAX_STEPS};
pub use error::AgentError;
