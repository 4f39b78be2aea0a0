//! Travel lookup tools the assistant can call.
//!
//! Every tool except the clock answers from the data set embedded in the
//! crate and renders its result as plain text for the model.

mod attractions;
mod budget;
mod data;
mod food_chains;
mod hotels;
mod local_transport;
mod restaurants;
mod safety;
mod timezone;
mod transport;
mod weather;

pub use attractions::FindAttractionsTool;
pub use budget::EstimateTravelBudgetTool;
pub use food_chains::FindFoodChainsTool;
pub use hotels::FindHotelsTool;
pub use local_transport::LocalTransportationTool;
pub use restaurants::FindRestaurantsTool;
pub use safety::SafetyInformationTool;
pub use timezone::CurrentTimeTool;
pub use transport::PlanTransportationTool;
pub use weather::WeatherForecastTool;

/// Normalizes a user-supplied place name into a lookup key.
///
/// `"Austin, TX"` and `" AUSTIN "` both become `"austin"`.
pub fn normalize_city(name: &str) -> String {
    name.split(',').next().unwrap_or_default().trim().to_lowercase()
}
