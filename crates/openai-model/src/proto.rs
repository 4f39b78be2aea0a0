use serde::{Deserialize, Serialize};
use serde_json::Value;
use wayfinder_model::{
    AssistantMessage, ModelFinishReason, ModelMessage, ModelRequest, ModelTool,
    TokenUsage, ToolCallRequest,
};

use crate::OpenAIConfig;

// -------------------------------
// Types shared in both directions
// -------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded arguments, as the API transmits them.
    pub arguments: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    pub function: FunctionCall,
}

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ChatCompletion {
    pub id: String,
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
    pub finish_reason: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
    pub tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
struct FunctionTool {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
struct Tool {
    r#type: &'static str,
    function: FunctionTool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        content: Option<String>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    Tool {
        tool_call_id: String,
        content: String,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

// -----------
// Conversions
// -----------

#[inline]
pub fn create_request(
    req: &ModelRequest,
    config: &OpenAIConfig,
) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: config.model.clone(),
        messages: req.messages.iter().map(create_message).collect(),
        tools: req.tools.iter().map(create_tool).collect(),
        max_tokens: config.max_tokens,
        temperature: config.temperature,
        stream: false,
    }
}

fn create_message(msg: &ModelMessage) -> Message {
    match msg {
        ModelMessage::System(content) => Message::System {
            content: content.clone(),
        },
        ModelMessage::User(content) => Message::User {
            content: content.clone(),
        },
        ModelMessage::Assistant(AssistantMessage {
            content,
            tool_calls,
        }) => Message::Assistant {
            content: content.clone(),
            tool_calls: tool_calls
                .iter()
                .map(|req| ToolCall {
                    id: Some(req.id.clone()),
                    r#type: Some("function".to_owned()),
                    function: FunctionCall {
                        name: req.name.clone(),
                        arguments: encode_arguments(&req.arguments),
                    },
                })
                .collect(),
        },
        ModelMessage::Tool(result) => Message::Tool {
            tool_call_id: result.id.clone(),
            content: result.content.clone(),
        },
    }
}

#[inline]
fn create_tool(tool: &ModelTool) -> Tool {
    Tool {
        r#type: "function",
        function: FunctionTool {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: tool.parameters.clone(),
        },
    }
}

/// Arguments that failed to parse are kept as raw strings, and are sent
/// back verbatim.
fn encode_arguments(arguments: &Value) -> String {
    match arguments {
        Value::String(raw) => raw.clone(),
        other => other.to_string(),
    }
}

fn decode_arguments(arguments: &str) -> Value {
    if arguments.trim().is_empty() {
        return Value::Object(Default::default());
    }
    serde_json::from_str(arguments)
        .unwrap_or_else(|_| Value::String(arguments.to_owned()))
}

pub fn parse_finish_reason(reason: Option<&str>) -> ModelFinishReason {
    match reason {
        Some("tool_calls") | Some("function_call") => {
            ModelFinishReason::ToolCalls
        }
        Some("length") => ModelFinishReason::Length,
        _ => ModelFinishReason::Stop,
    }
}

pub fn create_tool_call_request(index: usize, call: ToolCall) -> ToolCallRequest {
    ToolCallRequest {
        id: call.id.unwrap_or_else(|| format!("call_{index}")),
        arguments: decode_arguments(&call.function.arguments),
        name: call.function.name,
    }
}

impl From<Usage> for TokenUsage {
    #[inline]
    fn from(usage: Usage) -> Self {
        TokenUsage {
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wayfinder_model::ToolCallResult;

    use super::*;
    use crate::OpenAIConfigBuilder;

    #[test]
    fn test_create_request() {
        let request = ModelRequest {
            messages: vec![
                ModelMessage::System("You are a travel guide.".to_owned()),
                ModelMessage::User("Weather in Austin?".to_owned()),
                ModelMessage::Assistant(AssistantMessage {
                    content: None,
                    tool_calls: vec![ToolCallRequest {
                        id: "call_1".to_owned(),
                        name: "get_weather_forecast".to_owned(),
                        arguments: json!({ "location": "Austin, TX" }),
                    }],
                }),
                ModelMessage::Tool(ToolCallResult {
                    id: "call_1".to_owned(),
                    content: "Sunny".to_owned(),
                }),
            ],
            tools: vec![ModelTool {
                name: "get_weather_forecast".to_owned(),
                description: "Fetches the weather.".to_owned(),
                parameters: json!({ "type": "object" }),
            }],
        };
        let config = OpenAIConfigBuilder::with_api_key("xxx")
            .with_model("custom")
            .with_temperature(0.0)
            .build();

        let value = serde_json::to_value(create_request(&request, &config))
            .unwrap();
        assert_eq!(
            value,
            json!({
                "model": "custom",
                "messages": [
                    { "role": "system", "content": "You are a travel guide." },
                    { "role": "user", "content": "Weather in Austin?" },
                    {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [{
                            "id": "call_1",
                            "type": "function",
                            "function": {
                                "name": "get_weather_forecast",
                                "arguments": "{\"location\":\"Austin, TX\"}"
                            }
                        }]
                    },
                    { "role": "tool", "tool_call_id": "call_1", "content": "Sunny" }
                ],
                "tools": [{
                    "type": "function",
                    "function": {
                        "name": "get_weather_forecast",
                        "description": "Fetches the weather.",
                        "parameters": { "type": "object" }
                    }
                }],
                "max_tokens": 1024,
                "temperature": 0.0,
                "stream": false
            })
        );
    }

    #[test]
    fn test_decode_arguments() {
        assert_eq!(decode_arguments(""), json!({}));
        assert_eq!(decode_arguments("{\"a\": 1}"), json!({ "a": 1 }));
        assert_eq!(decode_arguments("print(1)"), json!("print(1)"));
        assert_eq!(encode_arguments(&json!("print(1)")), "print(1)");
    }
}
