//! The protocol spoken between the travel agent and language models.
//!
//! Types here describe what goes into a model request and what comes back,
//! without tying the agent to any particular vendor. A provider crate maps
//! these types to its own wire format, and the agent only ever sees the
//! events defined in [`ModelResponseEvent`].
//!
//! Nothing in this crate performs I/O.

#![deny(missing_docs)]

mod error;
mod provider;
mod request;
mod response;

pub use error::*;
pub use provider::*;
pub use request::*;
pub use response::*;
