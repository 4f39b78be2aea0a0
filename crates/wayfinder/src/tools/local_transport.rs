use std::future::ready;

use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;
use wayfinder_core::tool::{Tool, ToolResult};

use super::data::{LocalTransport, RouteDirections, travel_data};
use super::normalize_city;

static TRANSPORT_TYPES: [&str; 5] =
    ["subway", "bus", "rideshare", "taxi", "rental"];

#[derive(Deserialize, JsonSchema)]
pub struct LocalTransportationParameters {
    #[schemars(description = "US city, e.g. 'Boston, MA'.")]
    city: String,
    #[schemars(description = "Optional starting point or address.")]
    #[serde(default)]
    from_location: String,
    #[schemars(description = "Optional destination point or address.")]
    #[serde(default)]
    to_location: String,
    #[schemars(
        description = "'subway', 'bus', 'rideshare', 'taxi' or 'rental'. Empty for all."
    )]
    #[serde(default)]
    transport_type: String,
}

/// A tool for getting around within a city: transit, rideshare, taxis,
/// rentals and known point-to-point routes.
pub struct LocalTransportationTool {
    parameter_schema: Value,
}

impl LocalTransportationTool {
    /// Creates a new local transportation tool.
    #[inline]
    pub fn new() -> Self {
        Self {
            parameter_schema: schema_for!(LocalTransportationParameters)
                .to_value(),
        }
    }
}

impl Default for LocalTransportationTool {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for LocalTransportationTool {
    type Input = LocalTransportationParameters;

    fn name(&self) -> &str {
        "get_local_transportation"
    }

    fn description(&self) -> &str {
        "Provides information about local transportation options within a US \
         city."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn execute(
        &self,
        input: LocalTransportationParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        ready(Ok(local_transportation(&input)))
    }
}

fn local_transportation(input: &LocalTransportationParameters) -> String {
    let city = &input.city;
    let Some(info) = travel_data().local_transport.get(&normalize_city(city))
    else {
        return format!(
            "Local transportation information not available for {city}. In a \
             real implementation, this would connect to local transit APIs."
        );
    };

    let (from, to) = (input.from_location.trim(), input.to_location.trim());
    let mut transport_type = input.transport_type.trim().to_lowercase();
    let mut response = if !from.is_empty() && !to.is_empty() {
        let key = format!("{}-{}", from.to_lowercase(), to.to_lowercase());
        if let Some(directions) = info.routes.get(&key) {
            return route_directions(directions, from, to, city);
        }
        // Without a known route every option is relevant.
        transport_type.clear();
        format!(
            "Specific route information from {from} to {to} not available. \
             Here are the general transportation options in {city}:\n\n"
        )
    } else {
        format!("Local transportation options in {city}:\n\n")
    };

    let types: &[&str] = match transport_type.as_str() {
        "" => &TRANSPORT_TYPES,
        kind => match TRANSPORT_TYPES.iter().position(|t| *t == kind) {
            Some(index) => &TRANSPORT_TYPES[index..=index],
            None => {
                return "Invalid transport type. Please choose from 'subway', \
                        'bus', 'rideshare', 'taxi', or 'rental'."
                    .to_owned();
            }
        },
    };
    for &kind in types {
        push_section(&mut response, info, kind);
    }
    response
}

fn route_directions(
    directions: &RouteDirections,
    from: &str,
    to: &str,
    city: &str,
) -> String {
    let mut response = format!("How to get from {from} to {to} in {city}:\n\n");
    let steps = [
        ("🚇 By Subway", &directions.subway),
        ("🚌 By Bus", &directions.bus),
        ("🚶 Walking", &directions.walking),
    ];
    for (label, instruction) in steps {
        if let Some(instruction) = instruction {
            response.push_str(&format!("{label}: {instruction}\n\n"));
        }
    }
    response
}

fn push_section(response: &mut String, info: &LocalTransport, kind: &str) {
    let section = match kind {
        "subway" | "bus" => {
            let (heading, transit) = if kind == "subway" {
                ("🚇 Subway/Metro", &info.subway)
            } else {
                ("🚌 Bus", &info.bus)
            };
            format!(
                "{heading}: {}\n  \
                 • Fare: {}\n  \
                 • Pass options: {}\n  \
                 • Hours: {}\n  \
                 • Coverage: {}\n  \
                 • Recommended app: {}\n  \
                 • Tip: {}\n\n",
                transit.name,
                transit.fare,
                transit.pass_options.join(", "),
                transit.hours,
                transit.coverage,
                transit.app,
                transit.tips,
            )
        }
        "rideshare" => {
            let rideshare = &info.rideshare;
            format!(
                "🚗 Rideshare Services:\n  \
                 • Available options: {}\n  \
                 • Estimated cost: {}\n  \
                 • Availability: {}\n  \
                 • Tip: {}\n\n",
                rideshare.options.join(", "),
                rideshare.estimated_cost,
                rideshare.availability,
                rideshare.tips,
            )
        }
        "taxi" => {
            let taxi = &info.taxi;
            format!(
                "🚕 Taxi: {}\n  \
                 • Fare structure: {}\n  \
                 • Availability: {}\n  \
                 • Tip: {}\n\n",
                taxi.name, taxi.fare_structure, taxi.availability, taxi.tips,
            )
        }
        _ => {
            let rental = &info.rental;
            format!(
                "🚲 Rental Options:\n  \
                 • Car rental: {}\n  \
                 • Bike sharing: {}\n  \
                 • Scooter sharing: {}\n  \
                 • Tip: {}\n\n",
                rental.car.join(", "),
                rental.bike.join(", "),
                rental.scooter.join(", "),
                rental.tips,
            )
        }
    };
    response.push_str(&section);
}
