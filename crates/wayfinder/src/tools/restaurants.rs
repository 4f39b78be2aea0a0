use std::future::ready;

use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;
use wayfinder_core::tool::{Tool, ToolResult};

use super::data::{Restaurant, travel_data};
use super::normalize_city;

#[derive(Deserialize, JsonSchema)]
pub struct FindRestaurantsParameters {
    #[schemars(description = "US city or neighborhood, e.g. 'Miami, FL'.")]
    location: String,
    #[schemars(
        description = "Comma-separated cuisines, e.g. 'Italian' or 'Chinese,Indian'."
    )]
    #[serde(default)]
    cuisine_type: String,
    #[schemars(
        description = "Comma-separated dietary needs, e.g. 'vegetarian,halal,gluten-free'."
    )]
    #[serde(default)]
    dietary_preferences: String,
    #[schemars(description = "Price level: '$', '$$', '$$$' or '$$$$'.")]
    #[serde(default)]
    price_range: String,
    #[schemars(description = "Optional address to search around.")]
    #[serde(default)]
    near_address: String,
}

/// A tool for restaurant recommendations filtered by cuisine, diet and
/// price.
pub struct FindRestaurantsTool {
    parameter_schema: Value,
}

impl FindRestaurantsTool {
    /// Creates a new restaurant search tool.
    #[inline]
    pub fn new() -> Self {
        Self {
            parameter_schema: schema_for!(FindRestaurantsParameters)
                .to_value(),
        }
    }
}

impl Default for FindRestaurantsTool {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for FindRestaurantsTool {
    type Input = FindRestaurantsParameters;

    fn name(&self) -> &str {
        "find_restaurants"
    }

    fn description(&self) -> &str {
        "Finds restaurants based on location and dining preferences."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn execute(
        &self,
        input: FindRestaurantsParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        ready(Ok(find_restaurants(&input)))
    }
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|item| item.trim().to_lowercase())
        .filter(|item| !item.is_empty())
        .collect()
}

fn find_restaurants(input: &FindRestaurantsParameters) -> String {
    let location = &input.location;
    let Some(restaurants) =
        travel_data().restaurants.get(&normalize_city(location))
    else {
        return format!(
            "Restaurant information not available for {location}. In a real \
             implementation, this would connect to a restaurant API."
        );
    };

    let cuisines = split_list(&input.cuisine_type);
    let diets = split_list(&input.dietary_preferences);
    let price_range = input.price_range.trim();
    let matching: Vec<_> = restaurants
        .iter()
        .filter(|r| {
            cuisines.is_empty() || cuisines.contains(&r.cuisine.to_lowercase())
        })
        .filter(|r| {
            diets.is_empty()
                || r.dietary_options
                    .iter()
                    .any(|option| diets.contains(&option.to_lowercase()))
        })
        .filter(|r| price_range.is_empty() || r.price_range == price_range)
        .collect();

    if matching.is_empty() {
        return format!(
            "No restaurants found in {location} matching your criteria. Try \
             adjusting your preferences."
        );
    }

    let near_address = input.near_address.trim();
    let mut response = if near_address.is_empty() {
        format!("Restaurants in {location}:\n\n")
    } else {
        format!("Restaurants in {location} (near {near_address}):\n\n")
    };
    for restaurant in matching {
        push_restaurant(&mut response, restaurant);
    }
    response
}

fn push_restaurant(response: &mut String, restaurant: &Restaurant) {
    response.push_str(&format!(
        "🍽️ {} - {}\n\
         ⭐ Rating: {}/5\n\
         🍳 Cuisine: {}\n\
         🏆 Signature Dish: {}\n\
         📍 Address: {}\n\
         🕒 Hours: {}\n",
        restaurant.name,
        restaurant.price_range,
        restaurant.rating,
        restaurant.cuisine,
        restaurant.signature_dish,
        restaurant.address,
        restaurant.hours,
    ));
    if !restaurant.dietary_options.is_empty() {
        response.push_str(&format!(
            "🥗 Dietary options: {}\n",
            restaurant.dietary_options.join(", ")
        ));
    }
    response.push('\n');
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn search(value: Value) -> String {
        find_restaurants(&serde_json::from_value(value).unwrap())
    }

    fn names(output: &str) -> Vec<&str> {
        output
            .lines()
            .filter_map(|line| line.strip_prefix("🍽️ "))
            .collect()
    }

    #[test]
    fn test_all_restaurants() {
        let output = search(json!({ "location": "Austin, TX" }));
        assert!(output.starts_with(
            "Restaurants in Austin, TX:\n\n\
             🍽️ Texas BBQ House - $$\n\
             ⭐ Rating: 4.5/5\n\
             🍳 Cuisine: American\n\
             🏆 Signature Dish: Beef Brisket\n\
             📍 Address: 123 BBQ Lane, Austin, TX\n\
             🕒 Hours: 11:00 AM - 10:00 PM\n\n\
             🍽️ Taco Heaven - $\n"
        ));
        assert!(output.contains(
            "🥗 Dietary options: vegetarian, vegan, gluten-free\n\n"
        ));
        assert_eq!(names(&output).len(), 5);
    }

    #[test]
    fn test_filters() {
        let output = search(json!({
            "location": "New York",
            "cuisine_type": "indian, Vegan",
        }));
        assert_eq!(
            names(&output),
            ["Taj Mahal - $$", "Green Garden - $$"]
        );

        let output = search(json!({
            "location": "Chicago",
            "dietary_preferences": "Halal",
        }));
        assert_eq!(names(&output), ["Taste of India - $$"]);

        let output = search(json!({
            "location": "Chicago",
            "price_range": "$$$$",
            "near_address": "Navy Pier",
        }));
        assert!(output.starts_with("Restaurants in Chicago (near Navy Pier):"));
        assert_eq!(names(&output), ["Windy City Steakhouse - $$$$"]);
    }

    #[test]
    fn test_no_match() {
        let output = search(json!({
            "location": "Austin",
            "cuisine_type": "French",
        }));
        assert_eq!(
            output,
            "No restaurants found in Austin matching your criteria. Try \
             adjusting your preferences."
        );
        assert!(
            search(json!({ "location": "Denver" }))
                .starts_with("Restaurant information not available for Denver.")
        );
    }
}
