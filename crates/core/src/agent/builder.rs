use std::time::Duration;

use wayfinder_model::ModelProvider;

use super::Agent;
use crate::model_client::ModelClient;
use crate::tool::{FinalAnswerTool, Manager as ToolManager, Tool};

/// Default limit of action steps per run.
pub const DEFAULT_MAX_STEPS: u32 = 8;

/// [`Agent`] builder.
pub struct AgentBuilder {
    pub(crate) model_client: ModelClient,
    pub(crate) system_prompt: Option<String>,
    pub(crate) max_steps: u32,
    pub(crate) tools: ToolManager,
}

impl AgentBuilder {
    /// Creates a new builder with the specified model provider.
    #[inline]
    pub fn with_model_provider<P: ModelProvider + 'static>(
        provider: P,
    ) -> Self {
        Self {
            model_client: ModelClient::new(provider),
            system_prompt: None,
            max_steps: DEFAULT_MAX_STEPS,
            tools: ToolManager::default(),
        }
    }

    /// Sets the system prompt that starts every conversation.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Sets the maximum number of action steps per run. Values below 1 are
    /// raised to 1.
    #[inline]
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Sets how long rate-limited model requests are retried.
    #[inline]
    pub fn with_retry_timeout(mut self, retry_timeout: Duration) -> Self {
        self.model_client = self.model_client.with_retry_timeout(retry_timeout);
        self
    }

    /// Registers a tool.
    #[inline]
    pub fn with_tool<T: Tool>(mut self, tool: T) -> Self {
        self.tools.add_tool(tool);
        self
    }

    /// Builds the agent.
    pub fn build(mut self) -> Agent {
        if !self.tools.contains(crate::tool::FINAL_ANSWER_TOOL) {
            self.tools.add_tool(FinalAnswerTool::new());
        }
        Agent::from_builder(self)
    }
}
