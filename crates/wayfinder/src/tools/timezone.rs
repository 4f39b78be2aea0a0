use std::future::ready;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;
use wayfinder_core::tool::{Error as ToolError, Tool, ToolResult};

#[derive(Deserialize, JsonSchema)]
pub struct CurrentTimeParameters {
    #[schemars(
        description = "An IANA time zone, e.g. 'America/New_York' or 'America/Chicago'."
    )]
    timezone: String,
}

/// A tool for the current local time in a time zone.
pub struct CurrentTimeTool {
    parameter_schema: Value,
}

impl CurrentTimeTool {
    /// Creates a new current time tool.
    #[inline]
    pub fn new() -> Self {
        Self {
            parameter_schema: schema_for!(CurrentTimeParameters).to_value(),
        }
    }
}

impl Default for CurrentTimeTool {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for CurrentTimeTool {
    type Input = CurrentTimeParameters;

    fn name(&self) -> &str {
        "get_current_time_in_timezone"
    }

    fn description(&self) -> &str {
        "Gets the current local time in a specified US time zone."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn execute(
        &self,
        input: CurrentTimeParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        ready(local_time(input.timezone.trim(), Utc::now()))
    }
}

fn local_time(timezone: &str, now: DateTime<Utc>) -> ToolResult {
    let tz: Tz = timezone.parse().map_err(|_| {
        ToolError::invalid_input().with_reason(format!(
            "unknown time zone `{timezone}`, expected an IANA name such as \
             `America/New_York`"
        ))
    })?;
    let local = now.with_timezone(&tz).format("%Y-%m-%d %H:%M:%S");
    Ok(format!("The current local time in {timezone} is: {local}"))
}
