//! Renders agent runs as chat transcripts.
//!
//! [`pull_messages_from_step`] turns one memory step into ordered chat
//! fragments, [`stream_to_chat`] drives the agent for one user turn and
//! streams the fragments of every step followed by the answer, and
//! [`Transcript`] collects fragments the way a chat view displays them.

mod extract;
mod message;
mod stream;
mod transcript;

pub use extract::{StepMessages, pull_messages_from_step};
pub use message::{ChatMessage, MessageMetadata, MessageStatus, Role};
pub use stream::{
    ChatAgent, GREETING, NO_FINAL_ANSWER, RUN_FAILED, RUN_FAILED_FINAL_ANSWER,
    StreamOptions, TranscriptStream, stream_to_chat,
};
pub use transcript::{Applied, Transcript};
