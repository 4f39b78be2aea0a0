//! Step records kept by the agent while it works on tasks.
//!
//! Memory is append-only during a run. The UI layer reads it after the run
//! finishes to render what the agent did.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use wayfinder_model::ToolCallRequest;

/// One entry of the agent memory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MemoryStep {
    /// The system prompt the conversation started with.
    SystemPrompt(SystemPromptStep),
    /// A task given to the agent.
    Task(TaskStep),
    /// One reasoning/acting iteration.
    Action(ActionStep),
}

impl MemoryStep {
    /// Returns the action step, if this is one.
    #[inline]
    pub fn as_action(&self) -> Option<&ActionStep> {
        match self {
            MemoryStep::Action(step) => Some(step),
            _ => None,
        }
    }
}

/// The system prompt record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemPromptStep {
    /// The prompt text.
    pub system_prompt: String,
}

/// A task record, holding the prompt exactly as sent to the model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStep {
    /// The task text.
    pub task: String,
}

/// A tool invocation requested in an action step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Identifier assigned by the model provider.
    pub id: String,
    /// Name of the requested tool.
    pub name: String,
    /// Arguments, usually a JSON object. Plain strings are kept as
    /// [`Value::String`].
    pub arguments: Value,
}

impl From<ToolCallRequest> for ToolCall {
    #[inline]
    fn from(req: ToolCallRequest) -> Self {
        Self {
            id: req.id,
            name: req.name,
            arguments: req.arguments,
        }
    }
}

/// One iteration of the agent loop: a model call followed by the tool
/// calls it requested.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionStep {
    /// 1-based index of the step within its run.
    pub step_number: Option<u32>,
    /// Text the model produced alongside (or instead of) tool calls.
    pub model_output: Option<String>,
    /// Tool calls requested by the model, in request order.
    pub tool_calls: Vec<ToolCall>,
    /// Tool outputs, joined by blank lines.
    pub observations: Option<String>,
    /// Failure message if a tool or the model failed in this step.
    pub error: Option<String>,
    /// Wall-clock duration of the step in seconds.
    pub duration: Option<f64>,
    /// Prompt tokens billed for this step.
    pub input_token_count: u64,
    /// Completion tokens billed for this step.
    pub output_token_count: u64,
}

/// Ordered step records of an agent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentMemory {
    steps: Vec<MemoryStep>,
}

impl AgentMemory {
    #[inline]
    pub(crate) fn push(&mut self, step: MemoryStep) {
        self.steps.push(step);
    }

    /// Returns all steps in insertion order.
    #[inline]
    pub fn steps(&self) -> &[MemoryStep] {
        &self.steps
    }

    /// Returns the action steps in insertion order.
    pub fn action_steps(&self) -> impl Iterator<Item = &ActionStep> {
        self.steps.iter().filter_map(MemoryStep::as_action)
    }

    /// Sums the token counts of every action step.
    pub fn total_tokens(&self) -> (u64, u64) {
        self.action_steps().fold((0, 0), |(input, output), step| {
            (
                input + step.input_token_count,
                output + step.output_token_count,
            )
        })
    }

    #[inline]
    pub(crate) fn clear(&mut self) {
        self.steps.clear();
    }
}
