use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use wayfinder_model::{ErrorKind, ModelResponse, ModelResponseEvent};

use crate::Error;
use crate::proto::{self, ChatCompletion};

/// A fully received chat completion, replayed as response events.
///
/// Events are ordered the same way for every completion: the message text
/// first, then tool calls, then token usage, and finally the finish reason.
#[derive(Debug)]
pub struct OpenAIResponse {
    events: VecDeque<ModelResponseEvent>,
}

impl OpenAIResponse {
    pub fn from_completion(mut completion: ChatCompletion) -> Result<Self, Error> {
        trace!("got completion: {}", completion.id);
        if completion.choices.is_empty() {
            return Err(Error::new("completion has no choices", ErrorKind::Other));
        }
        let choice = completion.choices.swap_remove(0);

        let mut events = VecDeque::new();
        if let Some(content) = choice.message.content {
            if !content.is_empty() {
                events.push_back(ModelResponseEvent::MessageDelta(content));
            }
        }
        let tool_calls = choice.message.tool_calls.unwrap_or_default();
        for (index, call) in tool_calls.into_iter().enumerate() {
            events.push_back(ModelResponseEvent::ToolCall(
                proto::create_tool_call_request(index, call),
            ));
        }
        if let Some(usage) = completion.usage {
            events.push_back(ModelResponseEvent::Usage(usage.into()));
        }
        events.push_back(ModelResponseEvent::Completed(
            proto::parse_finish_reason(choice.finish_reason.as_deref()),
        ));

        Ok(Self { events })
    }
}

impl ModelResponse for OpenAIResponse {
    type Error = crate::Error;

    fn poll_next_event(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>> {
        Poll::Ready(Ok(self.get_mut().events.pop_front()))
    }
}

#[cfg(test)]
mod tests {
    use std::future::poll_fn;
    use std::pin::pin;

    use serde_json::json;
    use wayfinder_model::{ModelFinishReason, TokenUsage};

    use super::*;

    #[tokio::test]
    async fn test_completion_events() {
        let completion: ChatCompletion = serde_json::from_str(include_str!(
            "../fixtures/chat_completion.json"
        ))
        .unwrap();
        let mut resp = pin!(OpenAIResponse::from_completion(completion).unwrap());

        let mut events = vec![];
        while let Some(event) =
            poll_fn(|cx| resp.as_mut().poll_next_event(cx)).await.unwrap()
        {
            events.push(event);
        }

        assert_eq!(events.len(), 5);
        assert_eq!(
            events[0],
            ModelResponseEvent::MessageDelta(
                "Let me check the forecast and the hotels.".to_owned()
            )
        );
        let ModelResponseEvent::ToolCall(weather) = &events[1] else {
            panic!("expected a tool call, got {:?}", events[1]);
        };
        assert_eq!(weather.name, "get_weather_forecast");
        assert_eq!(weather.arguments, json!({ "location": "Austin, TX" }));
        let ModelResponseEvent::ToolCall(hotels) = &events[2] else {
            panic!("expected a tool call, got {:?}", events[2]);
        };
        assert_eq!(hotels.id, "call_1");
        assert_eq!(
            events[3],
            ModelResponseEvent::Usage(TokenUsage {
                input_tokens: 1532,
                output_tokens: 61,
            })
        );
        assert_eq!(
            events[4],
            ModelResponseEvent::Completed(ModelFinishReason::ToolCalls)
        );
    }

    #[test]
    fn test_empty_choices() {
        let completion: ChatCompletion = serde_json::from_value(json!({
            "id": "cmpl-empty",
            "choices": [],
            "usage": null
        }))
        .unwrap();
        let err = OpenAIResponse::from_completion(completion).unwrap_err();
        assert_eq!(err.message(), "completion has no choices");
    }
}
