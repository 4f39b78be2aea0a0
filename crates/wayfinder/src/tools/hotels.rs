use std::future::ready;

use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;
use wayfinder_core::tool::{Tool, ToolResult};

use super::data::{Hotel, travel_data};
use super::normalize_city;

#[derive(Deserialize, JsonSchema)]
pub struct FindHotelsParameters {
    #[schemars(description = "US city, e.g. 'Chicago, IL'.")]
    location: String,
    #[schemars(description = "Check-in date (YYYY-MM-DD).")]
    check_in: String,
    #[schemars(description = "Check-out date (YYYY-MM-DD).")]
    check_out: String,
    #[schemars(description = "Number of guests.")]
    num_people: u32,
    #[schemars(description = "'budget', 'mid-range' or 'luxury'.")]
    budget_level: String,
    #[schemars(
        description = "Comma-separated preferences, e.g. 'breakfast,pet-friendly,pool'."
    )]
    #[serde(default)]
    preferences: String,
}

/// A tool for hotel recommendations filtered by budget and amenities.
pub struct FindHotelsTool {
    parameter_schema: Value,
}

impl FindHotelsTool {
    /// Creates a new hotel search tool.
    #[inline]
    pub fn new() -> Self {
        Self {
            parameter_schema: schema_for!(FindHotelsParameters).to_value(),
        }
    }
}

impl Default for FindHotelsTool {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for FindHotelsTool {
    type Input = FindHotelsParameters;

    fn name(&self) -> &str {
        "find_hotels"
    }

    fn description(&self) -> &str {
        "Finds hotel accommodations based on traveler preferences."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn execute(
        &self,
        input: FindHotelsParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        ready(Ok(find_hotels(&input)))
    }
}

fn find_hotels(input: &FindHotelsParameters) -> String {
    let location = &input.location;
    let Some(hotels) = travel_data().hotels.get(&normalize_city(location))
    else {
        return format!(
            "Hotel information not available for {location}. In a real \
             implementation, this would connect to a hotel API."
        );
    };

    let preferences: Vec<_> = input
        .preferences
        .split(',')
        .map(|pref| pref.trim().to_lowercase())
        .filter(|pref| !pref.is_empty())
        .collect();
    let wants = |pref: &str| preferences.iter().any(|p| p == pref);

    let level = input.budget_level.trim().to_lowercase();
    let matching: Vec<_> = hotels
        .iter()
        .filter(|hotel| hotel.level == level)
        .filter(|hotel| !wants("breakfast") || hotel.breakfast)
        .filter(|hotel| !wants("pet-friendly") || hotel.pet_friendly)
        .filter(|hotel| {
            !wants("pool") || hotel.features.iter().any(|f| f == "pool")
        })
        .collect();

    if matching.is_empty() {
        return format!(
            "No hotels found in {location} matching your criteria. Try \
             adjusting your preferences or budget level."
        );
    }

    let mut response = format!(
        "Hotels in {location} ({}):\nStay: {} to {}, {} guest(s)\n\n",
        input.budget_level, input.check_in, input.check_out, input.num_people
    );
    for hotel in matching {
        push_hotel(&mut response, hotel);
    }
    response
}

fn push_hotel(response: &mut String, hotel: &Hotel) {
    response.push_str(&format!(
        "🏨 {} - ${} per night\n\
         ⭐ Rating: {}/5\n\
         📍 Address: {}\n\
         ✨ Features: {}\n\
         🛏️ Room Types: {}\n\
         🕒 Check-in: {}, Check-out: {}\n",
        hotel.name,
        hotel.price,
        hotel.rating,
        hotel.address,
        hotel.features.join(", "),
        hotel.room_types.join(", "),
        hotel.check_in,
        hotel.check_out,
    ));
    if hotel.breakfast {
        response.push_str("🍳 Breakfast included\n");
    }
    if hotel.pet_friendly {
        response.push_str(&format!("🐾 Pet-friendly (Fee: ${})\n", hotel.pet_fee));
    }
    response.push_str(&format!(
        "💰 Deposit: {}\n❌ Cancellation: {}\n\n",
        hotel.deposit, hotel.cancellation
    ));
}
