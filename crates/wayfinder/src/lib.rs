//! A travel-planning chat assistant built on an agent that calls lookup
//! tools.
//!
//! The crate includes a CLI for chatting in the terminal. You can also use
//! it as a library and feed [`chat::ChatMessage`] fragments to your own chat
//! view.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

pub mod chat;
mod session;
pub mod tools;

pub use session::{Session, SessionBuilder};

/// Re-exports of [`wayfinder_core`] crate.
pub mod core {
    pub use wayfinder_core::*;
}
