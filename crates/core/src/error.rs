use thiserror::Error;
use wayfinder_model::ModelProviderError;

/// Errors that end an agent run.
///
/// Every error is terminal for the current task. The steps recorded before
/// the failure stay in memory.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The model provider failed, after retries where applicable.
    #[error("model request failed: {0}")]
    Model(Box<dyn ModelProviderError>),
    /// The model kept calling tools without ever producing an answer.
    #[error(
        "reached the limit of {max_steps} steps without calling `final_answer`"
    )]
    MaxStepsReached {
        /// The configured step limit.
        max_steps: u32,
    },
}
