mod builder;
mod run;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};

use crate::conversation::Conversation;
use crate::error::AgentError;
use crate::memory::{AgentMemory, MemoryStep};
use crate::model_client::ModelClient;
use crate::tool::Manager as ToolManager;
pub use builder::{AgentBuilder, DEFAULT_MAX_STEPS};

/// Extra named values appended to a task prompt.
pub type AdditionalArgs = Map<String, Value>;

/// A tool-calling agent that keeps its memory across runs.
///
/// `Agent` is a handle: clones share the same memory, and runs on any clone
/// are serialised so that steps of different tasks never interleave.
#[derive(Clone)]
pub struct Agent {
    shared: Arc<Shared>,
}

struct Shared {
    model_client: ModelClient,
    tools: ToolManager,
    system_prompt: Option<String>,
    max_steps: u32,
    state: Mutex<AgentState>,
    run_lock: tokio::sync::Mutex<()>,
}

#[derive(Default)]
struct AgentState {
    memory: AgentMemory,
    conversation: Conversation,
    final_answer: Option<String>,
}

impl Agent {
    fn from_builder(builder: AgentBuilder) -> Self {
        let AgentBuilder {
            model_client,
            system_prompt,
            max_steps,
            tools,
        } = builder;

        let shared = Shared {
            model_client,
            tools,
            system_prompt,
            max_steps,
            state: Mutex::default(),
            run_lock: tokio::sync::Mutex::new(()),
        };
        Self {
            shared: Arc::new(shared),
        }
    }

    /// Runs a task until the model produces an answer.
    ///
    /// Returns the answer text, which is the `final_answer` tool argument or
    /// the text of a reply without tool calls. The returned future does not
    /// borrow the agent. If another run is in progress, this one waits for
    /// it to finish first.
    pub fn run<S: Into<String>>(
        &self,
        task: S,
        additional_args: Option<AdditionalArgs>,
    ) -> impl Future<Output = Result<String, AgentError>> + Send + 'static {
        let shared = Arc::clone(&self.shared);
        let task = task.into();
        async move {
            let _running = shared.run_lock.lock().await;
            shared.run_task(task, additional_args).await
        }
    }

    /// Returns a snapshot of the memory steps.
    pub fn steps(&self) -> Vec<MemoryStep> {
        self.shared.state().memory.steps().to_vec()
    }

    /// Returns a snapshot of the whole memory.
    pub fn memory(&self) -> AgentMemory {
        self.shared.state().memory.clone()
    }

    /// Clears the memory and the model conversation.
    ///
    /// A run in progress keeps writing its remaining steps.
    pub fn reset_memory(&self) {
        let mut state = self.shared.state();
        state.memory.clear();
        state.conversation.clear();
        state.final_answer = None;
        debug!("agent memory reset");
    }

    /// Returns the answer delivered through the `final_answer` tool in the
    /// latest run, if any.
    pub fn final_answer(&self) -> Option<String> {
        self.shared.state().final_answer.clone()
    }
}

impl Shared {
    #[inline]
    fn state(&self) -> MutexGuard<'_, AgentState> {
        // The state stays consistent between statements, so a panic while
        // holding the lock does not invalidate it.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
