use std::future::ready;

use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;
use wayfinder_core::tool::{Tool, ToolResult};

use super::data::travel_data;
use super::normalize_city;

#[derive(Deserialize, JsonSchema)]
pub struct SafetyInformationParameters {
    #[schemars(description = "US city, e.g. 'Miami, FL'.")]
    city: String,
}

/// A tool for safety ratings, alerts and emergency contacts of a US city.
pub struct SafetyInformationTool {
    parameter_schema: Value,
}

impl SafetyInformationTool {
    /// Creates a new safety information tool.
    #[inline]
    pub fn new() -> Self {
        Self {
            parameter_schema: schema_for!(SafetyInformationParameters)
                .to_value(),
        }
    }
}

impl Default for SafetyInformationTool {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for SafetyInformationTool {
    type Input = SafetyInformationParameters;

    fn name(&self) -> &str {
        "get_safety_information"
    }

    fn description(&self) -> &str {
        "Provides safety information and travel advisories for US \
         destinations."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn execute(
        &self,
        input: SafetyInformationParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        ready(Ok(safety_information(&input.city)))
    }
}

fn safety_information(city: &str) -> String {
    let Some(info) = travel_data().safety.get(&normalize_city(city)) else {
        return format!(
            "Safety information not available for {city}. In a real \
             implementation, this would connect to safety and crime data APIs."
        );
    };

    let mut response = format!(
        "⚠️ Safety Information for {city} ⚠️\n\n\
         Overall safety rating: {}\n\n",
        info.safety_rating
    );
    push_section(&mut response, "Current alerts", &info.current_alerts);
    push_section(&mut response, "Generally safe areas", &info.safe_areas);
    push_section(&mut response, "Areas to use caution", &info.caution_areas);

    response.push_str("Emergency numbers:\n");
    for entry in &info.emergency_numbers {
        response.push_str(&format!(
            "• {}: {}\n",
            title_case(&entry.service),
            entry.number
        ));
    }
    response.push('\n');

    response.push_str("Safety tips:\n");
    for tip in &info.tips {
        response.push_str(&format!("• {tip}\n"));
    }
    response
}

fn push_section(response: &mut String, title: &str, items: &[String]) {
    response.push_str(title);
    response.push_str(":\n");
    for item in items {
        response.push_str(&format!("• {item}\n"));
    }
    response.push('\n');
}

/// Uppercases the first letter of every alphabetic run.
fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if at_word_start {
            result.extend(ch.to_uppercase());
        } else {
            result.extend(ch.to_lowercase());
        }
        at_word_start = !ch.is_alphabetic();
    }
    result
}
