use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use wayfinder_core::memory::{ActionStep, MemoryStep};

use super::message::{ChatMessage, MessageMetadata, MessageStatus};

/// The tool whose arguments are source code rendered as a code block.
const CODE_TOOL: &str = "python_interpreter";

const SEPARATOR: &str = "-----";

static MODEL_OUTPUT_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        compile_regex(r"```\s*<end_code>"),
        compile_regex(r"<end_code>\s*```"),
        compile_regex(r"```\s*\n\s*<end_code>"),
    ]
});
static CODE_FENCE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| compile_regex(r"```.*?\n"));
static END_CODE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| compile_regex(r"\s*<end_code>\s*"));
static EXECUTION_LOGS_LABEL: LazyLock<Regex> =
    LazyLock::new(|| compile_regex(r"(?i)^execution logs:\s*"));

fn compile_regex(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(regex) => regex,
        // Covered by `test_patterns_compile`.
        Err(err) => panic!("invalid regex pattern `{pattern}`: {err}"),
    }
}

/// Returns the chat fragments that render `step`.
///
/// Only action steps produce fragments. The returned iterator is lazy and
/// borrows the step.
#[inline]
pub fn pull_messages_from_step(step: &MemoryStep) -> StepMessages<'_> {
    match step {
        MemoryStep::Action(step) => StepMessages::new(Cow::Borrowed(step)),
        _ => StepMessages::empty(),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Header,
    ModelOutput,
    ToolCall,
    ExecutionLogs,
    ToolError,
    ToolDone,
    StandaloneError,
    Footer,
    Separator,
    Finished,
}

/// Iterator over the chat fragments of one step.
///
/// Fragments come in a fixed order: a header, the model output, the first
/// tool call with its logs and error nested under it (or a standalone
/// error), a footer with token and timing figures, and a separator.
///
/// After the nested fragments, the tool call fragment is yielded once more
/// with the same id and [`MessageStatus::Done`]. Sinks that key fragments
/// by id replace the pending copy with it.
#[derive(Clone, Debug)]
pub struct StepMessages<'a> {
    step: Option<Cow<'a, ActionStep>>,
    stage: Stage,
}

impl<'a> StepMessages<'a> {
    fn new(step: Cow<'a, ActionStep>) -> Self {
        Self {
            step: Some(step),
            stage: Stage::Header,
        }
    }

    fn empty() -> Self {
        Self {
            step: None,
            stage: Stage::Finished,
        }
    }
}

impl StepMessages<'static> {
    /// Creates an iterator that owns the step.
    pub fn from_owned(step: MemoryStep) -> Self {
        match step {
            MemoryStep::Action(step) => Self::new(Cow::Owned(step)),
            _ => Self::empty(),
        }
    }
}

impl Iterator for StepMessages<'_> {
    type Item = ChatMessage;

    fn next(&mut self) -> Option<ChatMessage> {
        let step = self.step.as_deref()?;
        loop {
            let (next_stage, message) = match self.stage {
                Stage::Header => (
                    Stage::ModelOutput,
                    Some(ChatMessage::assistant(format!(
                        "**{}**",
                        step_label(step)
                    ))),
                ),
                Stage::ModelOutput => (
                    Stage::ToolCall,
                    step.model_output.as_deref().map(|output| {
                        ChatMessage::assistant(clean_model_output(output))
                    }),
                ),
                Stage::ToolCall => match tool_call_message(step) {
                    Some(message) => (Stage::ExecutionLogs, Some(message)),
                    None => (Stage::StandaloneError, None),
                },
                Stage::ExecutionLogs => (
                    Stage::ToolError,
                    execution_logs(step).map(|logs| {
                        ChatMessage::assistant(logs).with_metadata(
                            MessageMetadata::new("📝 Execution Logs")
                                .with_parent_id(tool_call_id(step))
                                .with_status(MessageStatus::Done),
                        )
                    }),
                ),
                Stage::ToolError => (
                    Stage::ToolDone,
                    step.error.as_deref().map(|error| {
                        ChatMessage::assistant(error).with_metadata(
                            MessageMetadata::new("💥 Error")
                                .with_parent_id(tool_call_id(step))
                                .with_status(MessageStatus::Done),
                        )
                    }),
                ),
                Stage::ToolDone => {
                    let message = tool_call_message(step).map(|mut message| {
                        if let Some(metadata) = &mut message.metadata {
                            metadata.status = Some(MessageStatus::Done);
                        }
                        message
                    });
                    (Stage::Footer, message)
                }
                Stage::StandaloneError => (
                    Stage::Footer,
                    step.error.as_deref().map(|error| {
                        ChatMessage::assistant(error)
                            .with_metadata(MessageMetadata::new("💥 Error"))
                    }),
                ),
                Stage::Footer => {
                    (Stage::Separator, Some(ChatMessage::assistant(footer(step))))
                }
                Stage::Separator => {
                    (Stage::Finished, Some(ChatMessage::assistant(SEPARATOR)))
                }
                Stage::Finished => return None,
            };
            self.stage = next_stage;
            if message.is_some() {
                return message;
            }
        }
    }
}

fn step_label(step: &ActionStep) -> String {
    match step.step_number {
        Some(number) => format!("Step {number}"),
        None => String::new(),
    }
}

fn clean_model_output(output: &str) -> String {
    let mut output = output.trim().to_owned();
    for pattern in MODEL_OUTPUT_PATTERNS.iter() {
        output = pattern.replace_all(&output, "```").into_owned();
    }
    output.trim().to_owned()
}

/// The id is derived from the number of tool calls in the step, so every
/// step with a single call uses `call_1`.
fn tool_call_id(step: &ActionStep) -> String {
    format!("call_{}", step.tool_calls.len())
}

fn tool_call_message(step: &ActionStep) -> Option<ChatMessage> {
    // Further tool calls in the same step are not rendered.
    let tool_call = step.tool_calls.first()?;

    let mut content = arguments_text(&tool_call.arguments);
    if tool_call.name == CODE_TOOL {
        content = format_code(&content);
    }

    let metadata =
        MessageMetadata::new(format!("🛠️ Used tool {}", tool_call.name))
            .with_id(tool_call_id(step))
            .with_status(MessageStatus::Pending);
    Some(ChatMessage::assistant(content).with_metadata(metadata))
}

fn arguments_text(arguments: &Value) -> String {
    match arguments {
        Value::Object(map) => match map.get("answer") {
            Some(Value::String(answer)) => answer.clone(),
            Some(answer) => answer.to_string(),
            None => arguments.to_string(),
        },
        Value::String(text) => text.trim().to_owned(),
        other => other.to_string().trim().to_owned(),
    }
}

fn format_code(code: &str) -> String {
    let code = CODE_FENCE_HEADER.replace_all(code, "");
    let code = END_CODE_MARKER.replace_all(&code, "");
    let code = code.trim();
    if code.starts_with("```python") {
        code.to_owned()
    } else {
        format!("```python\n{code}\n```")
    }
}

fn execution_logs(step: &ActionStep) -> Option<String> {
    let logs = step.observations.as_deref()?.trim();
    let logs = EXECUTION_LOGS_LABEL.replace(logs, "");
    (!logs.trim().is_empty()).then(|| logs.into_owned())
}

fn footer(step: &ActionStep) -> String {
    let mut footnote = format!(
        "{} | Input-tokens:{} | Output-tokens:{}",
        step_label(step),
        group_thousands(step.input_token_count),
        group_thousands(step.output_token_count),
    );
    if let Some(duration) = step.duration.filter(|d| *d != 0.0) {
        let rounded = (duration * 100.0).round() / 100.0;
        // `Debug` keeps the fractional part of whole numbers, e.g. `2.0`.
        footnote.push_str(&format!(" | Duration: {rounded:?}"));
    }
    format!(
        r#"<span style="color: #bbbbc2; font-size: 12px;">{footnote}</span> "#
    )
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
