use std::fmt::{Debug, Display};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::vec;

use futures_util::Stream;
use wayfinder_core::memory::MemoryStep;
use wayfinder_core::{AdditionalArgs, Agent, AgentError};

use super::extract::StepMessages;
use super::message::ChatMessage;

/// Reply to a greeting, sent without running the agent.
pub const GREETING: &str = "Hello! I'm your USA Travel Guide Assistant. How \
    can I help you plan your trip today? I can provide information about \
    destinations, accommodation, transportation, attractions, and more!";

/// Sent when a run produced neither a final answer nor any reply text.
pub const NO_FINAL_ANSWER: &str = "I processed your request, but couldn't \
    generate a final answer. Can you provide more details or ask your \
    question differently?";

/// Sent when a run failed because no final answer was delivered.
pub const RUN_FAILED_FINAL_ANSWER: &str = "I'm having trouble processing \
    your request. Let me try a simpler response: How can I help you plan \
    your USA trip today?";

/// Sent when a run failed for any other reason.
pub const RUN_FAILED: &str = "I encountered an error while processing your \
    request. Please try again with a more specific travel-related question.";

const GREETING_WORDS: [&str; 5] = ["hi", "hello", "hey", "greetings", "howdy"];

/// An agent that can be driven by [`stream_to_chat`].
pub trait ChatAgent {
    /// The error a failed run produces.
    type Error: Display + Debug;

    /// Runs a task and returns the reply text.
    ///
    /// The returned future must not borrow `self`.
    fn run(
        &self,
        task: &str,
        additional_args: Option<AdditionalArgs>,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'static;

    /// Clears the memory of previous runs.
    fn reset_memory(&self);

    /// Returns the memory steps in order.
    ///
    /// A run appends to the steps, so the steps of one run are the ones
    /// past the length observed before it.
    fn steps(&self) -> Vec<MemoryStep>;

    /// Returns the answer delivered through the `final_answer` tool, if any.
    fn final_answer(&self) -> Option<String>;
}

impl ChatAgent for Agent {
    type Error = AgentError;

    #[inline]
    fn run(
        &self,
        task: &str,
        additional_args: Option<AdditionalArgs>,
    ) -> impl Future<Output = Result<String, AgentError>> + Send + 'static {
        Agent::run(self, task, additional_args)
    }

    #[inline]
    fn reset_memory(&self) {
        Agent::reset_memory(self);
    }

    #[inline]
    fn steps(&self) -> Vec<MemoryStep> {
        Agent::steps(self)
    }

    #[inline]
    fn final_answer(&self) -> Option<String> {
        Agent::final_answer(self)
    }
}

/// Options of [`stream_to_chat`].
#[derive(Clone, Debug, Default)]
pub struct StreamOptions {
    /// Clear the agent memory before running the task.
    pub reset_agent_memory: bool,
    /// Extra named values appended to the task prompt.
    pub additional_args: Option<AdditionalArgs>,
}

/// Runs `task` on `agent` and streams the resulting chat fragments.
///
/// Greetings are answered directly. Otherwise the agent runs once, then the
/// fragments of every step that run added to memory are streamed, followed
/// by the answer. A failed run is logged and replaced by a single apology
/// fragment.
///
/// Nothing happens until the stream is polled.
pub fn stream_to_chat<A: ChatAgent>(
    agent: A,
    task: &str,
    options: StreamOptions,
) -> TranscriptStream<A> {
    TranscriptStream {
        agent,
        stage: Stage::Start {
            task: task.to_owned(),
            options,
        },
    }
}

type RunFuture<E> = Pin<Box<dyn Future<Output = Result<String, E>> + Send>>;

enum Stage<E> {
    Start {
        task: String,
        options: StreamOptions,
    },
    Running {
        run: RunFuture<E>,
        /// Memory length before the run; older steps are not replayed.
        first_step: usize,
    },
    StreamingSteps {
        steps: vec::IntoIter<MemoryStep>,
        current: Option<StepMessages<'static>>,
        response: String,
    },
    Finished,
}

/// The stream returned by [`stream_to_chat`].
pub struct TranscriptStream<A: ChatAgent> {
    agent: A,
    stage: Stage<A::Error>,
}

// The agent and the run future are never pinned in place.
impl<A: ChatAgent> Unpin for TranscriptStream<A> {}

impl<A: ChatAgent> TranscriptStream<A> {
    /// Returns `true` once the last fragment has been yielded.
    #[inline]
    pub fn is_finished(&self) -> bool {
        matches!(self.stage, Stage::Finished)
    }
}

impl<A: ChatAgent> Stream for TranscriptStream<A> {
    type Item = ChatMessage;

    fn poll_next(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<ChatMessage>> {
        let this = self.get_mut();
        loop {
            match &mut this.stage {
                Stage::Start { task, options } => {
                    if is_greeting(task) {
                        debug!("answering greeting without running the agent");
                        this.stage = Stage::Finished;
                        return Poll::Ready(Some(ChatMessage::assistant(
                            GREETING,
                        )));
                    }
                    if options.reset_agent_memory {
                        this.agent.reset_memory();
                    }
                    let first_step = this.agent.steps().len();
                    let run = this
                        .agent
                        .run(task, options.additional_args.take());
                    this.stage = Stage::Running {
                        run: Box::pin(run),
                        first_step,
                    };
                }
                Stage::Running { run, first_step } => {
                    let result = match run.as_mut().poll(cx) {
                        Poll::Ready(result) => result,
                        Poll::Pending => return Poll::Pending,
                    };
                    match result {
                        Ok(response) => {
                            let mut steps = this.agent.steps();
                            let steps =
                                steps.split_off((*first_step).min(steps.len()));
                            this.stage = Stage::StreamingSteps {
                                steps: steps.into_iter(),
                                current: None,
                                response,
                            };
                        }
                        Err(err) => {
                            error!("error in agent interaction: {err}");
                            debug!("error details: {err:?}");
                            this.stage = Stage::Finished;
                            return Poll::Ready(Some(failure_message(
                                &err.to_string(),
                            )));
                        }
                    }
                }
                Stage::StreamingSteps {
                    steps,
                    current,
                    response,
                } => {
                    if let Some(message) = current.as_mut().and_then(Iterator::next)
                    {
                        return Poll::Ready(Some(message));
                    }
                    if let Some(step) = steps.next() {
                        *current = Some(StepMessages::from_owned(step));
                        continue;
                    }
                    let response = std::mem::take(response);
                    this.stage = Stage::Finished;
                    return Poll::Ready(Some(final_message(
                        this.agent.final_answer(),
                        response,
                    )));
                }
                Stage::Finished => return Poll::Ready(None),
            }
        }
    }
}

fn is_greeting(task: &str) -> bool {
    let task = task.trim().to_lowercase();
    let task = task.strip_suffix('!').unwrap_or(&task);
    GREETING_WORDS.contains(&task)
}

fn final_message(final_answer: Option<String>, response: String) -> ChatMessage {
    match final_answer.filter(|answer| !answer.is_empty()) {
        Some(answer) => {
            ChatMessage::assistant(format!("**Final answer:**\n{answer}\n"))
        }
        None if !response.is_empty() => ChatMessage::assistant(response),
        None => ChatMessage::assistant(NO_FINAL_ANSWER),
    }
}

fn failure_message(error: &str) -> ChatMessage {
    if error.contains("final_answer") {
        ChatMessage::assistant(RUN_FAILED_FINAL_ANSWER)
    } else {
        ChatMessage::assistant(RUN_FAILED)
    }
}
