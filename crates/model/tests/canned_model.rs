use std::collections::VecDeque;
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::future::{poll_fn, ready};
use std::pin::Pin;
use std::task::{self, Poll, ready};
use std::time::Duration;

use serde_json::json;
use tokio::time::{Sleep, sleep};
use wayfinder_model::{
    ErrorKind, ModelFinishReason, ModelMessage, ModelProvider,
    ModelProviderError, ModelRequest, ModelResponse, ModelResponseEvent,
    TokenUsage, ToolCallRequest,
};

#[derive(Debug)]
struct CannedError(ErrorKind);

impl Display for CannedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Error for CannedError {}

impl ModelProviderError for CannedError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

/// Answers every question about a city by asking for its weather.
#[derive(Debug)]
struct CannedResponse {
    events: VecDeque<ModelResponseEvent>,
    sleep: Option<Pin<Box<Sleep>>>,
}

impl CannedResponse {
    fn new(city: &str) -> Self {
        let events = VecDeque::from([
            ModelResponseEvent::MessageDelta("Checking the ".to_owned()),
            ModelResponseEvent::MessageDelta("forecast.".to_owned()),
            ModelResponseEvent::ToolCall(ToolCallRequest {
                id: "call:1".to_owned(),
                name: "get_weather_forecast".to_owned(),
                arguments: json!({ "location": city }),
            }),
            ModelResponseEvent::Usage(TokenUsage {
                input_tokens: 1_200,
                output_tokens: 34,
            }),
            ModelResponseEvent::Completed(ModelFinishReason::ToolCalls),
        ]);
        Self {
            events,
            sleep: None,
        }
    }
}

impl ModelResponse for CannedResponse {
    type Error = CannedError;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>> {
        // SAFETY: This type does not require to be pinned.
        let this = unsafe { self.get_unchecked_mut() };
        if let Some(sleep) = &mut this.sleep {
            ready!(sleep.as_mut().poll(cx));
            this.sleep = None;
            return Poll::Ready(Ok(this.events.pop_front()));
        }
        this.sleep = Some(Box::pin(sleep(Duration::from_millis(1))));
        Pin::new(this).poll_next_event(cx)
    }
}

struct CannedProvider;

impl ModelProvider for CannedProvider {
    type Error = CannedError;
    type Response = CannedResponse;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        let city = req.messages.iter().rev().find_map(|msg| match msg {
            ModelMessage::User(text) => Some(text.clone()),
            _ => None,
        });
        let result = match city {
            Some(city) => Ok(CannedResponse::new(&city)),
            None => Err(CannedError(ErrorKind::Other)),
        };
        ready(result)
    }
}

mod tests {
    use super::*;

    #[tokio::test]
    async fn test_collect_events() {
        let provider = CannedProvider;
        let req = ModelRequest {
            messages: vec![
                ModelMessage::System("You plan trips.".to_owned()),
                ModelMessage::User("Austin".to_owned()),
            ],
            tools: vec![],
        };
        let mut resp = provider.send_request(&req).await.unwrap();

        let mut text = String::new();
        let mut tool_calls = vec![];
        let mut usage = None;
        let mut finish_reason = None;
        while let Some(event) =
            poll_fn(|cx| Pin::new(&mut resp).poll_next_event(cx))
                .await
                .unwrap()
        {
            match event {
                ModelResponseEvent::MessageDelta(delta) => {
                    text.push_str(&delta)
                }
                ModelResponseEvent::ToolCall(req) => tool_calls.push(req),
                ModelResponseEvent::Usage(u) => usage = Some(u),
                ModelResponseEvent::Completed(reason) => {
                    finish_reason = Some(reason)
                }
            }
        }

        assert_eq!(text, "Checking the forecast.");
        assert_eq!(tool_calls.len(), 1);
        assert_eq!(tool_calls[0].arguments, json!({ "location": "Austin" }));
        assert_eq!(usage.unwrap().input_tokens, 1_200);
        assert_eq!(finish_reason, Some(ModelFinishReason::ToolCalls));
    }

    #[tokio::test]
    async fn test_error() {
        let provider = CannedProvider;
        let req = ModelRequest {
            messages: vec![],
            tools: vec![],
        };
        let err = provider.send_request(&req).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
        assert!(!err.kind().is_transient());
    }
}
