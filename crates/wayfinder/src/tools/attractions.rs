use std::future::ready;

use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;
use wayfinder_core::tool::{Tool, ToolResult};

use super::data::travel_data;
use super::normalize_city;

#[derive(Deserialize, JsonSchema)]
pub struct FindAttractionsParameters {
    #[schemars(description = "US city, e.g. 'Orlando, FL'.")]
    location: String,
    #[schemars(
        description = "Type of travelers: 'single', 'couple', 'family_with_kids' or 'seniors'."
    )]
    traveler_profile: String,
    #[schemars(
        description = "Comma-separated interests, e.g. 'adventure,history,nature'."
    )]
    #[serde(default)]
    interests: String,
}

/// A tool for attraction suggestions matched to the traveler profile.
pub struct FindAttractionsTool {
    parameter_schema: Value,
}

impl FindAttractionsTool {
    /// Creates a new attraction search tool.
    #[inline]
    pub fn new() -> Self {
        Self {
            parameter_schema: schema_for!(FindAttractionsParameters)
                .to_value(),
        }
    }
}

impl Default for FindAttractionsTool {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for FindAttractionsTool {
    type Input = FindAttractionsParameters;

    fn name(&self) -> &str {
        "find_attractions"
    }

    fn description(&self) -> &str {
        "Finds tourist attractions based on traveler profile and interests."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn execute(
        &self,
        input: FindAttractionsParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        ready(Ok(find_attractions(&input)))
    }
}

fn find_attractions(input: &FindAttractionsParameters) -> String {
    let data = travel_data();
    let location = &input.location;
    let Some(city) = data.attractions.get(&normalize_city(location)) else {
        return format!(
            "Attraction information not available for {location}. In a real \
             implementation, this would connect to a tourism API."
        );
    };

    let profile = input.traveler_profile.trim().to_lowercase();
    let mut categories: Vec<&str> = data
        .profiles
        .get(&profile)
        .map(|categories| categories.iter().map(String::as_str).collect())
        .unwrap_or_default();
    for interest in input.interests.split(',') {
        let interest = interest.trim().to_lowercase();
        if let Some((category, _)) = city.get_key_value(&interest) {
            if !categories.contains(&category.as_str()) {
                categories.push(category.as_str());
            }
        }
    }
    if !categories.contains(&"popular") {
        categories.push("popular");
    }

    let mut response = format!(
        "Recommended attractions in {location} for {}:\n\n",
        input.traveler_profile.replace('_', " ")
    );
    for category in categories {
        let Some(attractions) = city.get(category) else {
            continue;
        };
        response.push_str(&format!(
            "--- {} Attractions ---\n",
            capitalize(category)
        ));
        for attraction in attractions {
            response.push_str(&format!("• {attraction}\n"));
        }
        response.push('\n');
    }
    response
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
