//! A local fake model for testing purpose.

mod preset;

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::future::ready;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, ready};
use std::time::Duration;

use tokio::time::{Sleep, sleep};
use wayfinder_model::{
    ErrorKind, ModelFinishReason, ModelProvider, ModelProviderError,
    ModelRequest, ModelResponse, ModelResponseEvent,
};

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    message: &'static str,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.kind)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

pub struct TestModelResponse {
    events: VecDeque<ModelResponseEvent>,
    delay: Duration,
    sleep: Option<Pin<Box<Sleep>>>,
}

impl TestModelResponse {
    fn from_preset(preset: PresetResponse, delay: Duration) -> Self {
        let has_tool_call = preset
            .events
            .iter()
            .any(|event| matches!(event, PresetEvent::ToolCall(_)));
        let mut events: VecDeque<_> = preset
            .events
            .into_iter()
            .map(|event| match event {
                PresetEvent::MessageDelta(msg) => {
                    ModelResponseEvent::MessageDelta(msg)
                }
                PresetEvent::ToolCall(req) => ModelResponseEvent::ToolCall(req),
                PresetEvent::Usage(usage) => ModelResponseEvent::Usage(usage),
            })
            .collect();
        events.push_back(ModelResponseEvent::Completed(if has_tool_call {
            ModelFinishReason::ToolCalls
        } else {
            ModelFinishReason::Stop
        }));
        Self {
            events,
            delay,
            sleep: None,
        }
    }
}

impl ModelResponse for TestModelResponse {
    type Error = crate::Error;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>> {
        // SAFETY: This type does not require to be pinned.
        let this = unsafe { self.get_unchecked_mut() };
        if let Some(sleep) = &mut this.sleep {
            ready!(sleep.as_mut().poll(cx));
            this.sleep = None;
            // Returns `None` after the last event, including repeated calls
            // after completion.
            return Poll::Ready(Ok(this.events.pop_front()));
        }
        this.sleep = Some(Box::pin(sleep(this.delay)));
        Pin::new(this).poll_next_event(cx)
    }
}

#[derive(Default)]
struct Script {
    responses: VecDeque<PresetResponse>,
    failed_attempts: u64,
    requests: Vec<ModelRequest>,
}

/// A local fake model for testing purpose.
///
/// Responses are added to a script up front and handed out in order, one
/// per request. Every request is recorded so tests can inspect what the
/// agent sent. When the script runs out, requests fail with
/// [`ErrorKind::Other`].
///
/// Clones share the same script.
///
/// # Note
///
/// This type is not optimized for production use, there are heavy memory
/// copies involved. You should only use it for testing.
#[derive(Clone, Default)]
pub struct TestModelProvider {
    script: Arc<Mutex<Script>>,
    delay: Option<Duration>,
}

impl TestModelProvider {
    #[inline]
    pub fn add_response(&mut self, preset: PresetResponse) {
        self.script
            .lock()
            .expect("script lock poisoned")
            .responses
            .push_back(preset);
    }

    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    /// Returns every request received so far, including failed attempts.
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.script
            .lock()
            .expect("script lock poisoned")
            .requests
            .clone()
    }

    fn next_response(&self, req: &ModelRequest) -> Result<PresetResponse, Error> {
        let mut script = self.script.lock().expect("script lock poisoned");
        script.requests.push(req.clone());

        let Some(front) = script.responses.front() else {
            return Err(Error {
                message: "no enough responses",
                kind: ErrorKind::Other,
            });
        };
        match front.failures {
            Some(0) => {
                return Err(Error {
                    message: "preset failure",
                    kind: ErrorKind::RateLimitExceeded,
                });
            }
            Some(failures) if script.failed_attempts < failures => {
                script.failed_attempts += 1;
                return Err(Error {
                    message: "preset failure",
                    kind: ErrorKind::RateLimitExceeded,
                });
            }
            _ => {}
        }

        script.failed_attempts = 0;
        Ok(script
            .responses
            .pop_front()
            .expect("front response checked above"))
    }
}

impl ModelProvider for TestModelProvider {
    type Error = crate::Error;
    type Response = TestModelResponse;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        let delay = self.delay.unwrap_or(Duration::from_millis(1));
        let result = self
            .next_response(req)
            .map(|preset| TestModelResponse::from_preset(preset, delay));
        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use std::future::poll_fn;
    use std::pin::pin;

    use serde_json::json;
    use wayfinder_model::{
        ModelMessage, ModelTool, TokenUsage, ToolCallRequest,
    };

    use super::*;

    async fn collect_response(
        resp: TestModelResponse,
    ) -> (String, Option<ToolCallRequest>, Option<TokenUsage>) {
        let mut resp = pin!(resp);
        let mut msg = String::new();
        let mut tool_call = None;
        let mut usage = None;
        loop {
            let event = poll_fn(|cx| resp.as_mut().poll_next_event(cx))
                .await
                .unwrap()
                .unwrap();
            match event {
                ModelResponseEvent::Completed(_) => break,
                ModelResponseEvent::MessageDelta(delta) => {
                    msg.push_str(&delta);
                }
                ModelResponseEvent::ToolCall(req) => tool_call = Some(req),
                ModelResponseEvent::Usage(u) => usage = Some(u),
            }
        }
        (msg, tool_call, usage)
    }

    fn request(text: &str) -> ModelRequest {
        ModelRequest {
            messages: vec![ModelMessage::User(text.to_owned())],
            tools: vec![ModelTool {
                name: "get_safety_information".to_owned(),
                description: "Safety tips for a city".to_owned(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "city": { "type": "string" }
                    }
                }),
            }],
        }
    }

    #[tokio::test]
    async fn test_send_request() {
        let mut provider = TestModelProvider::default();
        provider.add_response(PresetResponse::with_events([
            PresetEvent::MessageDelta("Sure, ".to_owned()),
            PresetEvent::MessageDelta("let me check.".to_owned()),
            PresetEvent::tool_call(
                "tool:1",
                "get_safety_information",
                json!({ "city": "Miami, FL" }),
            ),
            PresetEvent::Usage(TokenUsage {
                input_tokens: 10,
                output_tokens: 5,
            }),
        ]));
        provider.add_response(PresetResponse::text("Miami is mostly safe."));

        let resp = provider.send_request(&request("Is Miami safe?")).await;
        let (msg, tool_call, usage) = collect_response(resp.unwrap()).await;
        assert_eq!(msg, "Sure, let me check.");
        let tool_call = tool_call.unwrap();
        assert_eq!(tool_call.name, "get_safety_information");
        assert_eq!(tool_call.arguments, json!({ "city": "Miami, FL" }));
        assert_eq!(usage.unwrap().output_tokens, 5);

        let resp = provider.send_request(&request("Thanks")).await;
        let (msg, tool_call, _) = collect_response(resp.unwrap()).await;
        assert_eq!(msg, "Miami is mostly safe.");
        assert!(tool_call.is_none());

        assert_eq!(provider.requests().len(), 2);
        let err = provider.send_request(&request("More?")).await;
        assert_eq!(err.err().unwrap().kind(), ErrorKind::Other);
    }

    #[tokio::test]
    async fn test_preset_failures() {
        let mut provider = TestModelProvider::default();
        provider.add_response(PresetResponse::text("ok").with_failures(2));

        for _ in 0..2 {
            let err = provider.send_request(&request("hi")).await;
            assert_eq!(
                err.err().unwrap().kind(),
                ErrorKind::RateLimitExceeded
            );
        }
        let resp = provider.send_request(&request("hi")).await;
        let (msg, _, _) = collect_response(resp.unwrap()).await;
        assert_eq!(msg, "ok");
    }
}
