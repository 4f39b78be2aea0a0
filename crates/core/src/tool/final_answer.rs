use std::future::ready;
use std::sync::LazyLock;

use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;

use super::{Tool, ToolResult};

/// Name of the tool that ends a run.
pub const FINAL_ANSWER_TOOL: &str = "final_answer";

static PARAMETER_SCHEMA: LazyLock<Value> =
    LazyLock::new(|| schema_for!(FinalAnswerInput).to_value());

/// Input of [`FinalAnswerTool`].
#[derive(Deserialize, JsonSchema)]
pub struct FinalAnswerInput {
    /// The final answer to the user's request.
    answer: Value,
}

/// Delivers the final answer and ends the run.
///
/// The agent registers this tool on its own. String answers are passed
/// through as-is, other JSON values are rendered as compact JSON.
#[derive(Clone, Copy, Debug, Default)]
pub struct FinalAnswerTool;

impl FinalAnswerTool {
    /// Creates the tool.
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Tool for FinalAnswerTool {
    type Input = FinalAnswerInput;

    fn name(&self) -> &str {
        FINAL_ANSWER_TOOL
    }

    fn description(&self) -> &str {
        "Provides a final answer to the given problem. Call it once the \
         answer is complete."
    }

    fn parameter_schema(&self) -> &Value {
        &PARAMETER_SCHEMA
    }

    fn execute(
        &self,
        input: Self::Input,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let answer = match input.answer {
            Value::String(answer) => answer,
            other => other.to_string(),
        };
        ready(Ok(answer))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_answer_rendering() {
        let tool = FinalAnswerTool::new();
        let input: FinalAnswerInput =
            serde_json::from_value(json!({ "answer": "Pack an umbrella." }))
                .unwrap();
        assert_eq!(tool.execute(input).await.unwrap(), "Pack an umbrella.");

        let input: FinalAnswerInput =
            serde_json::from_value(json!({ "answer": 42 })).unwrap();
        assert_eq!(tool.execute(input).await.unwrap(), "42");
    }

    #[test]
    fn test_schema() {
        let schema = FinalAnswerTool::new().parameter_schema().clone();
        assert!(schema["properties"].get("answer").is_some());
    }
}
