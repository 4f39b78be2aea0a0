use futures_util::StreamExt;
use serde_json::json;
use wayfinder::SessionBuilder;
use wayfinder::chat::{Applied, MessageStatus, Transcript};
use wayfinder_test_model::{PresetEvent, PresetResponse, TestModelProvider};

fn scripted_model() -> TestModelProvider {
    let mut model = TestModelProvider::default();
    model.add_response(PresetResponse::with_events([PresetEvent::tool_call(
        "call_w",
        "get_weather_forecast",
        json!({ "location": "Miami, FL" }),
    )]));
    model.add_response(PresetResponse::with_events([PresetEvent::tool_call(
        "call_s",
        "get_safety_information",
        json!({ "city": "Miami" }),
    )]));
    model.add_response(PresetResponse::with_events([PresetEvent::tool_call(
        "call_f",
        "final_answer",
        json!({ "answer": "Miami is warm and mostly safe." }),
    )]));
    model
}

#[tokio::test]
async fn test_tool_calls_settle_in_place() {
    let session = SessionBuilder::with_model_provider(scripted_model()).build();

    let mut transcript = Transcript::new();
    let mut updated = Vec::new();
    let mut stream = session.send_message("Is Miami nice this week?");
    while let Some(message) = stream.next().await {
        if let Applied::Updated { index } = transcript.apply(message) {
            updated.push(index);
        }
    }

    // One pending tool call per step, each replaced by its done copy.
    assert_eq!(updated.len(), 3);
    for index in updated {
        let message = transcript.get(index).unwrap();
        assert_eq!(message.id(), Some("call_1"));
        assert_eq!(message.status(), Some(MessageStatus::Done));
    }
    assert!(transcript.messages().all(|message| {
        message.status() != Some(MessageStatus::Pending)
    }));

    // Logs nest under the tool call of their own step.
    let logs: Vec<_> = (0..transcript.len())
        .filter(|&index| {
            transcript.get(index).and_then(|message| message.title())
                == Some("📝 Execution Logs")
        })
        .collect();
    assert!(logs.len() >= 2);
    let weather_call = transcript.parent_of(logs[0]).unwrap();
    let safety_call = transcript.parent_of(logs[1]).unwrap();
    assert!(weather_call < logs[0] && logs[0] < safety_call);
    assert_eq!(
        transcript.get(weather_call).unwrap().title(),
        Some("🛠️ Used tool get_weather_forecast")
    );
    assert!(
        transcript.get(logs[1]).unwrap().content.contains(
            "Safety Information for Miami"
        )
    );
    assert_eq!(transcript.children_of(safety_call).count(), 1);

    assert_eq!(
        transcript.messages().last().map(|message| message.content.as_str()),
        Some("**Final answer:**\nMiami is warm and mostly safe.\n")
    );
}

#[tokio::test]
async fn test_each_turn_streams_its_own_steps() {
    let mut model = TestModelProvider::default();
    model.add_response(PresetResponse::text("First answer."));
    model.add_response(PresetResponse::text("Second answer."));
    let session = SessionBuilder::with_model_provider(model.clone()).build();

    let first: Vec<_> = session.send_message("Where to go?").collect().await;
    let second: Vec<_> = session.send_message("And after?").collect().await;

    let contents = |messages: &[wayfinder::chat::ChatMessage]| {
        messages
            .iter()
            .map(|message| message.content.clone())
            .collect::<Vec<_>>()
    };
    let (first, second) = (contents(&first), contents(&second));
    assert_eq!(first.len(), second.len());
    assert_eq!(second[1], "Second answer.");
    assert!(!second.iter().any(|content| content == "First answer."));

    // Both turns stay in memory and in the model conversation.
    assert_eq!(session.agent().memory().action_steps().count(), 2);
    let requests = model.requests();
    assert!(requests[1].messages.len() > requests[0].messages.len());

    session.reset();
    assert!(session.agent().steps().is_empty());
}
