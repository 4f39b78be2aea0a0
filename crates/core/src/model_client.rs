use std::future::poll_fn;
use std::pin::{Pin, pin};
use std::sync::Arc;
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;
use tracing::Instrument;
use wayfinder_model::{
    ModelFinishReason, ModelProvider, ModelProviderError, ModelRequest,
    ModelResponse, ModelResponseEvent, TokenUsage, ToolCallRequest,
};

/// How long transient failures are retried by default.
pub const DEFAULT_RETRY_TIMEOUT: Duration = Duration::from_secs(30);

const INITIAL_RETRY_INTERVAL: Duration = Duration::from_millis(200);

type SendRequestResult =
    Result<ModelClientResponse, Box<dyn ModelProviderError>>;
type BoxedSendRequestFuture =
    Pin<Box<dyn Future<Output = SendRequestResult> + Send>>;
type HandlerFn =
    Arc<dyn Fn(ModelRequest) -> BoxedSendRequestFuture + Send + Sync>;

/// A wrapper around a model provider that provides a type-erased interface
/// for the other modules and retries transient failures.
#[derive(Clone)]
pub struct ModelClient {
    handler_fn: HandlerFn,
    retry_timeout: Duration,
}

impl ModelClient {
    #[inline]
    pub fn new<P: ModelProvider + 'static>(provider: P) -> Self {
        // Erase `P` so that `ModelClient` doesn't need a generic parameter.
        let handler_fn: HandlerFn = Arc::new(move |req| {
            let fut = provider.send_request(&req);
            Box::pin(
                async move {
                    trace!("got a request: {req:?}");
                    handle_response::<P>(fut.await).await
                }
                .instrument(trace_span!("model client req")),
            )
        });
        Self {
            handler_fn,
            retry_timeout: DEFAULT_RETRY_TIMEOUT,
        }
    }

    /// Sets the total time spent retrying rate-limited requests.
    #[inline]
    pub fn with_retry_timeout(mut self, retry_timeout: Duration) -> Self {
        self.retry_timeout = retry_timeout;
        self
    }

    /// Sends a request and returns the complete response.
    ///
    /// Failures of a transient kind are retried with exponential backoff
    /// until the retry timeout elapses. The last error is returned then.
    pub async fn send_request(&self, req: ModelRequest) -> SendRequestResult {
        let backoff = ExponentialBackoffBuilder::new()
            .with_initial_interval(INITIAL_RETRY_INTERVAL)
            .with_max_elapsed_time(Some(self.retry_timeout))
            .build();

        backoff::future::retry(backoff, || {
            let fut = (self.handler_fn)(req.clone());
            async move {
                fut.await.map_err(|err| {
                    if err.kind().is_transient() {
                        warn!("model request failed, retrying: {err}");
                        backoff::Error::transient(err)
                    } else {
                        backoff::Error::permanent(err)
                    }
                })
            }
        })
        .await
    }
}

/// A completely received response from the model client.
#[derive(Clone, Debug, Default)]
pub struct ModelClientResponse {
    /// Concatenated message deltas.
    pub transcript: String,
    /// Tool calls requested by the model.
    pub tool_calls: Vec<ToolCallRequest>,
    /// Token accounting, zero if the provider reported none.
    pub usage: TokenUsage,
    /// The reason the model finished generating.
    pub finish_reason: Option<ModelFinishReason>,
}

async fn handle_response<P: ModelProvider + 'static>(
    resp_or_err: Result<P::Response, P::Error>,
) -> SendRequestResult {
    let resp = match resp_or_err {
        Ok(resp) => resp,
        Err(err) => {
            error!("got an error: {err:?}");
            return Err(Box::new(err));
        }
    };

    let mut output = ModelClientResponse::default();

    let mut pinned_resp = pin!(resp);
    loop {
        let event_or_err =
            poll_fn(|cx| pinned_resp.as_mut().poll_next_event(cx)).await;
        let event = match event_or_err {
            Ok(Some(event)) => event,
            Ok(None) => break,
            Err(err) => {
                error!("got an error: {err:?}");
                return Err(Box::new(err));
            }
        };
        trace!("got an event: {event:?}");

        match event {
            ModelResponseEvent::MessageDelta(msg) => {
                output.transcript.push_str(&msg);
            }
            ModelResponseEvent::ToolCall(req) => output.tool_calls.push(req),
            ModelResponseEvent::Usage(usage) => {
                output.usage.input_tokens += usage.input_tokens;
                output.usage.output_tokens += usage.output_tokens;
            }
            ModelResponseEvent::Completed(reason) => {
                output.finish_reason = Some(reason);
            }
        }
    }

    trace!("finished a request");
    Ok(output)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wayfinder_model::{ErrorKind, ModelMessage};
    use wayfinder_test_model::{
        PresetEvent, PresetResponse, TestModelProvider,
    };

    use super::*;

    fn request() -> ModelRequest {
        ModelRequest {
            messages: vec![ModelMessage::User("Hi".to_owned())],
            tools: vec![],
        }
    }

    #[tokio::test]
    async fn test_send_request() {
        let mut model_provider = TestModelProvider::default();
        model_provider.add_response(PresetResponse::with_events([
            PresetEvent::MessageDelta("Checking ".to_owned()),
            PresetEvent::MessageDelta("the weather.".to_owned()),
            PresetEvent::tool_call(
                "call_0",
                "get_weather_forecast",
                json!({ "city": "Austin" }),
            ),
            PresetEvent::Usage(TokenUsage {
                input_tokens: 310,
                output_tokens: 25,
            }),
        ]));

        let model_client = ModelClient::new(model_provider);
        let resp = model_client.send_request(request()).await.unwrap();
        assert_eq!(resp.transcript, "Checking the weather.");
        assert_eq!(resp.tool_calls.len(), 1);
        assert_eq!(resp.usage.input_tokens, 310);
        assert_eq!(resp.usage.output_tokens, 25);
        assert_eq!(resp.finish_reason, Some(ModelFinishReason::ToolCalls));
    }

    #[tokio::test]
    async fn test_retry_rate_limited() {
        let mut model_provider = TestModelProvider::default();
        model_provider
            .add_response(PresetResponse::text("Hello!").with_failures(2));

        let model_client = ModelClient::new(model_provider.clone());
        let resp = model_client.send_request(request()).await.unwrap();
        assert_eq!(resp.transcript, "Hello!");
        assert_eq!(model_provider.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up() {
        let mut model_provider = TestModelProvider::default();
        model_provider
            .add_response(PresetResponse::text("Hello!").with_failures(0));

        let model_client = ModelClient::new(model_provider)
            .with_retry_timeout(Duration::from_millis(300));
        let err = model_client.send_request(request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RateLimitExceeded);
    }

    #[tokio::test]
    async fn test_permanent_error() {
        let model_provider = TestModelProvider::default();
        let model_client = ModelClient::new(model_provider.clone());
        let err = model_client.send_request(request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
        assert_eq!(model_provider.requests().len(), 1);
    }
}
