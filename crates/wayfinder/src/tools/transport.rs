use std::future::ready;

use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;
use wayfinder_core::tool::{Tool, ToolResult};

use super::data::{Route, TransportOption, travel_data};
use super::normalize_city;

static MODES: [&str; 4] = ["air", "train", "bus", "car"];

#[derive(Deserialize, JsonSchema)]
pub struct PlanTransportationParameters {
    #[schemars(description = "Departure city, e.g. 'Los Angeles, CA'.")]
    from_city: String,
    #[schemars(description = "Arrival city, e.g. 'Las Vegas, NV'.")]
    to_city: String,
    #[schemars(description = "'air', 'train', 'bus', 'car' or 'all'.")]
    #[serde(default = "default_mode")]
    transport_mode: String,
}

fn default_mode() -> String {
    "all".to_owned()
}

/// A tool for intercity transportation options between two US cities.
pub struct PlanTransportationTool {
    parameter_schema: Value,
}

impl PlanTransportationTool {
    /// Creates a new transportation planning tool.
    #[inline]
    pub fn new() -> Self {
        Self {
            parameter_schema: schema_for!(PlanTransportationParameters)
                .to_value(),
        }
    }
}

impl Default for PlanTransportationTool {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for PlanTransportationTool {
    type Input = PlanTransportationParameters;

    fn name(&self) -> &str {
        "plan_transportation"
    }

    fn description(&self) -> &str {
        "Provides transportation options between two US cities."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn execute(
        &self,
        input: PlanTransportationParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        ready(Ok(plan(&input)))
    }
}

/// Routes are stored in one direction only; the reverse lookup serves both.
fn find_route(from: &str, to: &str) -> Option<&'static Route> {
    let routes = &travel_data().routes;
    let (from, to) = (normalize_city(from), normalize_city(to));
    routes
        .get(&format!("{from}-{to}"))
        .or_else(|| routes.get(&format!("{to}-{from}")))
}

fn plan(input: &PlanTransportationParameters) -> String {
    let (from_city, to_city) = (&input.from_city, &input.to_city);
    let Some(route) = find_route(from_city, to_city) else {
        return format!(
            "Transportation information not available for route between \
             {from_city} and {to_city}. In a real implementation, this would \
             connect to transportation APIs."
        );
    };

    let mode = input.transport_mode.trim().to_lowercase();
    let modes: &[&str] = match mode.as_str() {
        "all" => &MODES,
        mode => match MODES.iter().position(|m| *m == mode) {
            Some(index) => &MODES[index..=index],
            None => {
                return "Invalid transport mode. Please choose from 'air', \
                        'train', 'bus', 'car', or 'all'."
                    .to_owned();
            }
        },
    };

    let mut response =
        format!("Transportation options from {from_city} to {to_city}:\n\n");
    for &mode in modes {
        let (heading, options) = match mode {
            "air" => ("✈️ By Air", &route.air),
            "train" => ("🚄 By Train", &route.train),
            "bus" => ("🚌 By Bus", &route.bus),
            _ => {
                let car = &route.car;
                response.push_str(&format!(
                    "🚗 By Car:\n  \
                     • Distance: {}\n  \
                     • Driving time: {}\n  \
                     • Estimated fuel cost: {}\n  \
                     • Suggested route: {}\n\n",
                    car.distance, car.duration, car.estimated_fuel, car.route
                ));
                continue;
            }
        };

        if options.is_empty() {
            response.push_str(&format!(
                "No direct {mode} service available for this route.\n\n"
            ));
            continue;
        }

        response.push_str(&format!("{heading}:\n"));
        for option in options {
            push_option(&mut response, mode, option);
        }
        response.push('\n');
    }
    response
}

fn push_option(response: &mut String, mode: &str, option: &TransportOption) {
    let connection = if mode == "air" {
        let label = if option.direct { "Direct" } else { "Connecting" };
        label.to_owned()
    } else {
        match option.transfers {
            0 => "Direct".to_owned(),
            1 => "1 transfer".to_owned(),
            n => format!("{n} transfers"),
        }
    };
    response.push_str(&format!(
        "  • {} - {} ({connection})\n    Price range: {}\n",
        option.carrier, option.duration, option.price_range
    ));
}
