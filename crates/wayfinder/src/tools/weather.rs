use std::future::ready;

use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;
use wayfinder_core::tool::{Tool, ToolResult};

use super::data::{WeatherData, travel_data};
use super::normalize_city;

#[derive(Deserialize, JsonSchema)]
pub struct WeatherForecastParameters {
    #[schemars(
        description = "A US city or place, e.g. 'New York, NY' or 'Austin, TX'."
    )]
    location: String,
}

/// A tool for current weather, a 3-day forecast and weather alerts.
pub struct WeatherForecastTool {
    parameter_schema: Value,
}

impl WeatherForecastTool {
    /// Creates a new weather forecast tool.
    #[inline]
    pub fn new() -> Self {
        Self {
            parameter_schema: schema_for!(WeatherForecastParameters)
                .to_value(),
        }
    }
}

impl Default for WeatherForecastTool {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for WeatherForecastTool {
    type Input = WeatherForecastParameters;

    fn name(&self) -> &str {
        "get_weather_forecast"
    }

    fn description(&self) -> &str {
        "Fetches current weather, forecast, and any weather alerts for a US \
         location."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn execute(
        &self,
        input: WeatherForecastParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        ready(Ok(forecast(&travel_data().weather, &input.location)))
    }
}

fn forecast(weather: &WeatherData, location: &str) -> String {
    let key = normalize_city(location);
    let mut response = format!("Weather information for {location}:\n\n");

    if let Some(alert) = weather.alerts.get(&key) {
        response.push_str(&format!("ALERT: {alert}\n\n"));
    }

    let Some(city) = weather.cities.get(&key) else {
        response.push_str(
            "Detailed weather data not available. In a real implementation, \
             this would connect to a weather API.",
        );
        return response;
    };

    let current = &city.current;
    response.push_str(&format!(
        "Current: {}°F, {}, {}% humidity\n\nForecast:\n",
        current.temp, current.condition, current.humidity
    ));
    for day in &city.forecast {
        response.push_str(&format!(
            "- {}: {}°F, {}\n",
            day.day, day.temp, day.condition
        ));
    }
    response
}
