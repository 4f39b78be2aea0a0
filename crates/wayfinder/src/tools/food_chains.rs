use std::future::ready;

use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;
use wayfinder_core::tool::{Tool, ToolResult};

use super::data::travel_data;
use super::normalize_city;

#[derive(Deserialize, JsonSchema)]
pub struct FindFoodChainsParameters {
    #[schemars(description = "US city or neighborhood, e.g. 'Las Vegas, NV'.")]
    location: String,
    #[schemars(
        description = "Specific chain to search for, e.g. 'McDonald's' or 'Starbucks'."
    )]
    #[serde(default)]
    chain_name: String,
    #[schemars(description = "Address or hotel name to search around.")]
    #[serde(default)]
    near_address: String,
}

/// A tool for locating fast food and coffee chains in a city.
pub struct FindFoodChainsTool {
    parameter_schema: Value,
}

impl FindFoodChainsTool {
    /// Creates a new food chain search tool.
    #[inline]
    pub fn new() -> Self {
        Self {
            parameter_schema: schema_for!(FindFoodChainsParameters).to_value(),
        }
    }
}

impl Default for FindFoodChainsTool {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for FindFoodChainsTool {
    type Input = FindFoodChainsParameters;

    fn name(&self) -> &str {
        "find_nearby_food_chains"
    }

    fn description(&self) -> &str {
        "Finds nearby food chains and fast food restaurants."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn execute(
        &self,
        input: FindFoodChainsParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        ready(Ok(find_food_chains(&input)))
    }
}

fn find_food_chains(input: &FindFoodChainsParameters) -> String {
    let location = &input.location;
    let Some(chains) = travel_data().food_chains.get(&normalize_city(location))
    else {
        return format!(
            "Food chain information not available for {location}. In a real \
             implementation, this would connect to a location API."
        );
    };

    let chain_name = input.chain_name.trim();
    let selected: Vec<_> = chains
        .iter()
        .filter(|chain| {
            chain_name.is_empty() || chain.name.eq_ignore_ascii_case(chain_name)
        })
        .collect();
    if selected.is_empty() {
        return format!("{chain_name} locations not found in {location}.");
    }

    let near_address = input.near_address.trim();
    let mut response = if near_address.is_empty() {
        format!("Food chains in {location}:\n\n")
    } else {
        format!("Food chains in {location} (near {near_address}):\n\n")
    };
    for chain in selected {
        response.push_str(&format!("🍔 {}\n", chain.name));
        for address in &chain.locations {
            response.push_str(&format!("  📍 {address}\n"));
        }
        response.push('\n');
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search(location: &str, chain_name: &str) -> String {
        find_food_chains(&FindFoodChainsParameters {
            location: location.to_owned(),
            chain_name: chain_name.to_owned(),
            near_address: String::new(),
        })
    }

    #[test]
    fn test_all_chains() {
        let output = search("Chicago, IL", "");
        assert!(output.starts_with(
            "Food chains in Chicago, IL:\n\n\
             🍔 McDonald's\n  \
             📍 123 Michigan Ave, Chicago, IL\n  \
             📍 456 State St, Chicago, IL\n\n\
             🍔 Starbucks\n"
        ));
        assert!(
            output.ends_with("🍔 Portillo's\n  📍 888 Clark St, Chicago, IL\n\n")
        );
    }

    #[test]
    fn test_single_chain() {
        assert_eq!(
            search("Austin", " whataburger "),
            "Food chains in Austin:\n\n\
             🍔 Whataburger\n  \
             📍 888 Lamar Blvd, Austin, TX\n  \
             📍 999 Congress Ave, Austin, TX\n\n"
        );
        assert_eq!(
            search("Austin", "Portillo's"),
            "Portillo's locations not found in Austin."
        );
    }

    #[test]
    fn test_unknown_city() {
        assert!(search("Miami", "").starts_with(
            "Food chain information not available for Miami."
        ));
    }
}
