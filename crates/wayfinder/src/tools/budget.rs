use std::future::ready;

use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;
use wayfinder_core::tool::{Error as ToolError, Tool, ToolResult};

use super::data::{CityBudget, PriceLevels, travel_data};
use super::normalize_city;

fn default_accommodation_type() -> String {
    "budget".to_owned()
}

#[derive(Deserialize, JsonSchema)]
pub struct EstimateTravelBudgetParameters {
    #[schemars(description = "US city, e.g. 'New York' or 'Austin'.")]
    destination: String,
    #[schemars(description = "Number of travelers.")]
    num_people: u32,
    #[schemars(description = "Length of stay in days.")]
    num_days: u32,
    #[schemars(
        description = "Type of accommodation: 'budget', 'mid-range' or 'luxury'."
    )]
    #[serde(default = "default_accommodation_type")]
    accommodation_type: String,
}

/// A tool for itemized trip cost estimates.
pub struct EstimateTravelBudgetTool {
    parameter_schema: Value,
}

impl EstimateTravelBudgetTool {
    /// Creates a new budget estimation tool.
    #[inline]
    pub fn new() -> Self {
        Self {
            parameter_schema: schema_for!(EstimateTravelBudgetParameters)
                .to_value(),
        }
    }
}

impl Default for EstimateTravelBudgetTool {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for EstimateTravelBudgetTool {
    type Input = EstimateTravelBudgetParameters;

    fn name(&self) -> &str {
        "estimate_travel_budget"
    }

    fn description(&self) -> &str {
        "Estimates a comprehensive travel budget for a US destination, \
         covering accommodation, food, local transportation and attractions."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn execute(
        &self,
        input: EstimateTravelBudgetParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let key = normalize_city(&input.destination);
        let result = match travel_data().budgets.get(&key) {
            Some(budget) => estimate(budget, &input),
            None => generic_estimate(&input),
        };
        ready(result)
    }
}

fn estimate(
    budget: &CityBudget,
    input: &EstimateTravelBudgetParameters,
) -> ToolResult {
    let level = input.accommodation_type.as_str();
    let (Some(room_rate), Some(food_rate)) =
        (budget.accommodation.get(level), budget.food.get(level))
    else {
        return Err(ToolError::invalid_input().with_reason(format!(
            "unknown accommodation type `{level}`, expected one of: {}",
            PriceLevels::LEVELS.join(", ")
        )));
    };

    let people = u64::from(input.num_people);
    let days = u64::from(input.num_days);
    // Two people share a room.
    let rooms = people.div_ceil(2);

    let costs = (|| {
        let accommodation = product(&[room_rate, rooms, days])?;
        let food = product(&[food_rate, people, days])?;
        let transport = product(&[budget.local_transport, people, days])?;
        let attractions = product(&[budget.attractions, people, days])?;
        let total = sum(&[accommodation, food, transport, attractions])?;
        Some((accommodation, food, transport, attractions, total))
    })();
    let Some((accommodation, food, transport, attractions, total)) = costs
    else {
        return Err(too_large(input));
    };

    let destination = &input.destination;
    Ok(format!(
        "Estimated Budget for {people} people in {destination} for {days} \
         days ({level} level):\n\n\
         🏨 Accommodation: ${accommodation} (${room_rate} per room × {rooms} \
         room(s) × {days} nights)\n\n\
         🍽️ Food: ${food} (${food_rate} per person per day × {people} people \
         × {days} days)\n\n\
         🚌 Local Transportation: ${transport} (${} per person per day × \
         {people} people × {days} days)\n\n\
         🎟️ Attractions: ${attractions} (${} per person per day × {people} \
         people × {days} days)\n\n\
         💰 Total Estimated Cost: ${total}\n\n\
         Note: This is a base estimate. Actual costs may vary based on \
         season, specific accommodations, dining preferences, and activities \
         chosen.",
        budget.local_transport, budget.attractions,
    ))
}

fn generic_estimate(input: &EstimateTravelBudgetParameters) -> ToolResult {
    let people = u64::from(input.num_people);
    let days = u64::from(input.num_days);
    // Per-day figures stay far below `u64::MAX`; only the day count can
    // overflow them.
    let per_day = |room: u64, food: u64| {
        let daily = room + (food + 15 + 20) * people;
        daily.checked_mul(days)
    };
    let (Some(low_total), Some(high_total)) =
        (per_day(100, 35), per_day(300, 75))
    else {
        return Err(too_large(input));
    };

    Ok(format!(
        "Specific budget data not available for {}. As a general estimate \
         for a US city:\n\n\
         For {people} people for {days} days with {} accommodations:\n\
         - Accommodation: ${} - ${} (varies widely by city)\n\
         - Food: ${} - ${}\n\
         - Local transportation: ${}\n\
         - Attractions: ${}\n\n\
         Estimated total: ${low_total} - ${high_total}",
        input.destination,
        input.accommodation_type,
        100 * days,
        300 * days,
        35 * people * days,
        75 * people * days,
        15 * people * days,
        20 * people * days,
    ))
}

fn product(factors: &[u64]) -> Option<u64> {
    factors
        .iter()
        .try_fold(1u64, |acc, &factor| acc.checked_mul(factor))
}

fn sum(terms: &[u64]) -> Option<u64> {
    terms.iter().try_fold(0u64, |acc, &term| acc.checked_add(term))
}

fn too_large(input: &EstimateTravelBudgetParameters) -> ToolError {
    ToolError::invalid_input().with_reason(format!(
        "cannot estimate a trip for {} people over {} days",
        input.num_people, input.num_days
    ))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wayfinder_core::tool::ErrorKind;

    use super::*;

    fn parameters(value: Value) -> EstimateTravelBudgetParameters {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_known_city() {
        let tool = EstimateTravelBudgetTool::new();
        let output = tool
            .execute(parameters(json!({
                "destination": "Austin, TX",
                "num_people": 3,
                "num_days": 2,
            })))
            .await
            .unwrap();

        // 2 rooms at $100, 3 people at $30 + $12 + $20 a day.
        assert!(output.starts_with(
            "Estimated Budget for 3 people in Austin, TX for 2 days \
             (budget level):"
        ));
        assert!(output.contains(
            "🏨 Accommodation: $400 ($100 per room × 2 room(s) × 2 nights)"
        ));
        assert!(output.contains("🍽️ Food: $180 "));
        assert!(output.contains("🚌 Local Transportation: $72 "));
        assert!(output.contains("🎟️ Attractions: $120 "));
        assert!(output.contains("💰 Total Estimated Cost: $772\n"));
    }

    #[tokio::test]
    async fn test_unknown_level() {
        let tool = EstimateTravelBudgetTool::new();
        let err = tool
            .execute(parameters(json!({
                "destination": "Chicago",
                "num_people": 2,
                "num_days": 3,
                "accommodation_type": "hostel",
            })))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.reason().contains("mid-range"));
    }

    #[tokio::test]
    async fn test_generic_estimate() {
        let tool = EstimateTravelBudgetTool::new();
        let output = tool
            .execute(parameters(json!({
                "destination": "Boise, ID",
                "num_people": 2,
                "num_days": 3,
                "accommodation_type": "luxury",
            })))
            .await
            .unwrap();
        assert!(output.starts_with(
            "Specific budget data not available for Boise, ID."
        ));
        assert!(output.contains("- Accommodation: $300 - $900"));
        assert!(output.ends_with("Estimated total: $720 - $1560"));
    }

    #[tokio::test]
    async fn test_oversized_trip() {
        let tool = EstimateTravelBudgetTool::new();
        for destination in ["New York", "Boise, ID"] {
            let err = tool
                .execute(parameters(json!({
                    "destination": destination,
                    "num_people": u32::MAX,
                    "num_days": u32::MAX,
                    "accommodation_type": "luxury",
                })))
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput);
            assert!(err.reason().contains("4294967295 people"));
        }

        // Large but representable trips are still estimated.
        let output = tool
            .execute(parameters(json!({
                "destination": "New York",
                "num_people": 1000,
                "num_days": 365,
            })))
            .await
            .unwrap();
        assert!(output.contains("💰 Total Estimated Cost: $"));
    }
}
