use wayfinder_core::{Agent, AgentBuilder};
use wayfinder_model::ModelProvider;

use crate::chat::{StreamOptions, TranscriptStream, stream_to_chat};
use crate::tools::*;

/// A session builder.
///
/// See [`Session`].
pub struct SessionBuilder {
    agent_builder: AgentBuilder,
}

impl SessionBuilder {
    /// Creates a session builder with a specified model provider.
    pub fn with_model_provider<M: ModelProvider + 'static>(
        provider: M,
    ) -> Self {
        let agent_builder = AgentBuilder::with_model_provider(provider);
        Self { agent_builder }
    }

    /// Sets the system prompt for the agent.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.agent_builder = self.agent_builder.with_system_prompt(prompt);
        self
    }

    /// Sets the maximum number of steps per message.
    #[inline]
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.agent_builder = self.agent_builder.with_max_steps(max_steps);
        self
    }

    /// Builds a new session with every travel tool registered.
    pub fn build(self) -> Session {
        let agent = self
            .agent_builder
            .with_tool(WeatherForecastTool::new())
            .with_tool(EstimateTravelBudgetTool::new())
            .with_tool(FindHotelsTool::new())
            .with_tool(FindRestaurantsTool::new())
            .with_tool(FindFoodChainsTool::new())
            .with_tool(FindAttractionsTool::new())
            .with_tool(PlanTransportationTool::new())
            .with_tool(LocalTransportationTool::new())
            .with_tool(SafetyInformationTool::new())
            .with_tool(CurrentTimeTool::new())
            .build();

        Session { agent }
    }
}

/// A chat session, like a window that displays messages and has an input
/// box.
///
/// The session holds a fully configured agent and keeps its memory across
/// messages until [`Session::reset`] is called.
pub struct Session {
    agent: Agent,
}

impl Session {
    /// Sends a message and returns the stream of chat fragments it
    /// produces.
    #[inline]
    pub fn send_message(&self, message: &str) -> TranscriptStream<Agent> {
        stream_to_chat(self.agent.clone(), message, StreamOptions::default())
    }

    /// Forgets the previous messages.
    #[inline]
    pub fn reset(&self) {
        self.agent.reset_memory();
    }

    /// Returns the underlying agent.
    #[inline]
    pub fn agent(&self) -> &Agent {
        &self.agent
    }
}

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;
    use serde_json::json;
    use wayfinder_test_model::{PresetEvent, PresetResponse, TestModelProvider};

    use super::*;
    use crate::chat::{GREETING, MessageStatus};

    #[tokio::test]
    async fn test_registers_travel_tools() {
        let mut model = TestModelProvider::default();
        model.add_response(PresetResponse::with_events(vec![
            PresetEvent::tool_call(
                "call_0",
                "get_weather_forecast",
                json!({"location": "Chicago, IL"}),
            ),
        ]));
        model.add_response(PresetResponse::with_events(vec![
            PresetEvent::tool_call(
                "call_1",
                "final_answer",
                json!({"answer": "Pack a jacket."}),
            ),
        ]));
        let session = SessionBuilder::with_model_provider(model.clone())
            .with_system_prompt("You are a travel guide.")
            .build();

        let messages: Vec<_> =
            session.send_message("Weather in Chicago?").collect().await;

        let weather = messages.iter().find(|message| {
            message.title() == Some("📝 Execution Logs")
                && message
                    .content
                    .contains("Weather information for Chicago, IL")
        });
        assert!(weather.is_some(), "{messages:#?}");
        assert_eq!(
            messages.last().map(|message| message.content.as_str()),
            Some("**Final answer:**\nPack a jacket.\n")
        );

        // Every pending tool call is later patched to done.
        for pending in messages
            .iter()
            .filter(|message| message.status() == Some(MessageStatus::Pending))
        {
            assert!(messages.iter().any(|done| done.is_status_patch_of(pending)));
        }

        let tools = &model.requests()[0].tools;
        let mut names: Vec<_> =
            tools.iter().map(|tool| tool.name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(
            names,
            [
                "estimate_travel_budget",
                "final_answer",
                "find_attractions",
                "find_hotels",
                "find_nearby_food_chains",
                "find_restaurants",
                "get_current_time_in_timezone",
                "get_local_transportation",
                "get_safety_information",
                "get_weather_forecast",
                "plan_transportation",
            ]
        );
    }

    #[tokio::test]
    async fn test_reset() {
        let mut model = TestModelProvider::default();
        model.add_response(PresetResponse::text("Sure."));
        let session = SessionBuilder::with_model_provider(model)
            .with_max_steps(2)
            .build();

        let messages: Vec<_> =
            session.send_message("Plan a trip").collect().await;
        assert!(!messages.is_empty());
        assert!(!session.agent().steps().is_empty());

        session.reset();
        assert!(session.agent().steps().is_empty());

        let messages: Vec<_> = session.send_message("hello!").collect().await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, GREETING);
    }
}
