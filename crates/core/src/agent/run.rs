use std::time::Instant;

use tracing::Instrument;
use wayfinder_model::{
    AssistantMessage, ModelMessage, ModelRequest, ToolCallResult,
};

use super::{AdditionalArgs, Shared};
use crate::error::AgentError;
use crate::memory::{ActionStep, MemoryStep, SystemPromptStep, TaskStep};
use crate::tool::FINAL_ANSWER_TOOL;

enum StepOutcome {
    Continue,
    Finished(String),
}

impl Shared {
    pub(super) async fn run_task(
        &self,
        task: String,
        additional_args: Option<AdditionalArgs>,
    ) -> Result<String, AgentError> {
        let prompt = compose_task_prompt(task, additional_args.as_ref());
        {
            let mut state = self.state();
            state.final_answer = None;
            if state.conversation.is_empty() {
                if let Some(system_prompt) = &self.system_prompt {
                    state.memory.push(MemoryStep::SystemPrompt(
                        SystemPromptStep {
                            system_prompt: system_prompt.clone(),
                        },
                    ));
                    state
                        .conversation
                        .push(ModelMessage::System(system_prompt.clone()));
                }
            }
            state
                .memory
                .push(MemoryStep::Task(TaskStep { task: prompt.clone() }));
            state.conversation.push(ModelMessage::User(prompt));
        }

        for step_number in 1..=self.max_steps {
            let outcome = self
                .run_step(step_number)
                .instrument(debug_span!("agent step", step_number))
                .await?;
            if let StepOutcome::Finished(answer) = outcome {
                info!("run finished after {step_number} steps");
                return Ok(answer);
            }
        }

        warn!("run stopped after {} steps", self.max_steps);
        Err(AgentError::MaxStepsReached {
            max_steps: self.max_steps,
        })
    }

    async fn run_step(
        &self,
        step_number: u32,
    ) -> Result<StepOutcome, AgentError> {
        let started_at = Instant::now();
        let mut step = ActionStep {
            step_number: Some(step_number),
            ..Default::default()
        };

        let req = ModelRequest {
            messages: self.state().conversation.messages().to_vec(),
            tools: self.tools.definitions(),
        };
        let resp = match self.model_client.send_request(req).await {
            Ok(resp) => resp,
            Err(err) => {
                step.error = Some(err.to_string());
                step.duration = Some(started_at.elapsed().as_secs_f64());
                self.state().memory.push(MemoryStep::Action(step));
                return Err(AgentError::Model(err));
            }
        };

        step.input_token_count = resp.usage.input_tokens;
        step.output_token_count = resp.usage.output_tokens;
        step.model_output =
            (!resp.transcript.is_empty()).then(|| resp.transcript.clone());
        step.tool_calls =
            resp.tool_calls.iter().cloned().map(Into::into).collect();
        self.state()
            .conversation
            .push(ModelMessage::Assistant(AssistantMessage {
                content: step.model_output.clone(),
                tool_calls: resp.tool_calls.clone(),
            }));

        if resp.tool_calls.is_empty() {
            step.duration = Some(started_at.elapsed().as_secs_f64());
            self.state().memory.push(MemoryStep::Action(step));
            return Ok(StepOutcome::Finished(resp.transcript));
        }

        let mut observations = vec![];
        let mut errors = vec![];
        let mut final_answer = None;
        for call in &resp.tool_calls {
            let content = match self.tools.execute(call).await {
                Ok(output) => {
                    if call.name == FINAL_ANSWER_TOOL {
                        final_answer = Some(output.clone());
                    }
                    observations.push(output.clone());
                    output
                }
                Err(err) => {
                    warn!("tool `{}` failed: {err}", call.name);
                    let message = format!(
                        "Error executing tool `{}`: {}",
                        call.name,
                        err.reason()
                    );
                    errors.push(message.clone());
                    message
                }
            };
            self.state()
                .conversation
                .push(ModelMessage::Tool(ToolCallResult {
                    id: call.id.clone(),
                    content,
                }));
        }

        step.observations =
            (!observations.is_empty()).then(|| observations.join("\n\n"));
        step.error = (!errors.is_empty()).then(|| errors.join("\n"));
        step.duration = Some(started_at.elapsed().as_secs_f64());

        let mut state = self.state();
        state.memory.push(MemoryStep::Action(step));
        match final_answer {
            Some(answer) => {
                state.final_answer = Some(answer.clone());
                Ok(StepOutcome::Finished(answer))
            }
            None => Ok(StepOutcome::Continue),
        }
    }
}

fn compose_task_prompt(
    task: String,
    additional_args: Option<&AdditionalArgs>,
) -> String {
    match additional_args {
        Some(args) if !args.is_empty() => {
            let args = serde_json::Value::Object(args.clone());
            format!(
                "{task}\nYou have been provided with these additional \
                 arguments, that you can access directly:\n{args:#}"
            )
        }
        _ => task,
    }
}
