use std::collections::HashMap;
use std::sync::LazyLock;

use serde::Deserialize;

static TRAVEL_DATA: LazyLock<TravelData> = LazyLock::new(|| {
    match serde_json::from_str(include_str!("../../data/travel.json")) {
        Ok(data) => data,
        // Covered by `test_load`.
        Err(err) => panic!("invalid embedded travel data: {err}"),
    }
});

/// Returns the embedded data set.
#[inline]
pub fn travel_data() -> &'static TravelData {
    &TRAVEL_DATA
}

#[derive(Debug, Deserialize)]
pub struct TravelData {
    pub weather: WeatherData,
    pub budgets: HashMap<String, CityBudget>,
    pub hotels: HashMap<String, Vec<Hotel>>,
    pub restaurants: HashMap<String, Vec<Restaurant>>,
    /// Chains in display order.
    pub food_chains: HashMap<String, Vec<FoodChain>>,
    pub attractions: HashMap<String, HashMap<String, Vec<String>>>,
    pub profiles: HashMap<String, Vec<String>>,
    pub routes: HashMap<String, Route>,
    pub local_transport: HashMap<String, LocalTransport>,
    pub safety: HashMap<String, SafetyInfo>,
}

#[derive(Debug, Deserialize)]
pub struct WeatherData {
    pub alerts: HashMap<String, String>,
    pub cities: HashMap<String, CityWeather>,
}

#[derive(Debug, Deserialize)]
pub struct CityWeather {
    pub current: CurrentWeather,
    pub forecast: Vec<DailyForecast>,
}

#[derive(Debug, Deserialize)]
pub struct CurrentWeather {
    pub temp: i32,
    pub condition: String,
    pub humidity: u32,
}

#[derive(Debug, Deserialize)]
pub struct DailyForecast {
    pub day: String,
    pub temp: i32,
    pub condition: String,
}

#[derive(Debug, Deserialize)]
pub struct CityBudget {
    /// Per room per night.
    pub accommodation: PriceLevels,
    /// Per person per day.
    pub food: PriceLevels,
    /// Per person per day.
    pub local_transport: u64,
    /// Per person per day.
    pub attractions: u64,
}

#[derive(Debug, Deserialize)]
pub struct PriceLevels {
    pub budget: u64,
    #[serde(rename = "mid-range")]
    pub mid_range: u64,
    pub luxury: u64,
}

impl PriceLevels {
    pub const LEVELS: [&str; 3] = ["budget", "mid-range", "luxury"];

    pub fn get(&self, level: &str) -> Option<u64> {
        match level {
            "budget" => Some(self.budget),
            "mid-range" => Some(self.mid_range),
            "luxury" => Some(self.luxury),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Hotel {
    pub name: String,
    pub level: String,
    pub price: u64,
    pub rating: f64,
    pub features: Vec<String>,
    pub breakfast: bool,
    pub pet_friendly: bool,
    #[serde(default)]
    pub pet_fee: u64,
    pub check_in: String,
    pub check_out: String,
    pub deposit: String,
    pub cancellation: String,
    pub address: String,
    pub room_types: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct Restaurant {
    pub name: String,
    pub cuisine: String,
    /// `$` to `$$$$`.
    pub price_range: String,
    pub rating: f64,
    pub dietary_options: Vec<String>,
    pub signature_dish: String,
    pub address: String,
    pub hours: String,
}

#[derive(Debug, Deserialize)]
pub struct FoodChain {
    pub name: String,
    pub locations: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct Route {
    pub air: Vec<TransportOption>,
    pub train: Vec<TransportOption>,
    pub bus: Vec<TransportOption>,
    pub car: CarRoute,
}

#[derive(Debug, Deserialize)]
pub struct TransportOption {
    /// Airline or operator.
    pub carrier: String,
    pub duration: String,
    pub price_range: String,
    /// Only set for flights.
    #[serde(default)]
    pub direct: bool,
    #[serde(default)]
    pub transfers: u32,
}

#[derive(Debug, Deserialize)]
pub struct CarRoute {
    pub distance: String,
    pub duration: String,
    pub estimated_fuel: String,
    pub route: String,
}

#[derive(Debug, Deserialize)]
pub struct LocalTransport {
    pub subway: Transit,
    pub bus: Transit,
    pub rideshare: Rideshare,
    pub taxi: Taxi,
    pub rental: Rental,
    /// Keyed by `"<from>-<to>"`, lowercased.
    #[serde(default)]
    pub routes: HashMap<String, RouteDirections>,
}

#[derive(Debug, Deserialize)]
pub struct Transit {
    pub name: String,
    pub fare: String,
    pub pass_options: Vec<String>,
    pub hours: String,
    pub coverage: String,
    pub app: String,
    pub tips: String,
}

#[derive(Debug, Deserialize)]
pub struct Rideshare {
    pub options: Vec<String>,
    pub estimated_cost: String,
    pub availability: String,
    pub tips: String,
}

#[derive(Debug, Deserialize)]
pub struct Taxi {
    pub name: String,
    pub fare_structure: String,
    pub availability: String,
    pub tips: String,
}

#[derive(Debug, Deserialize)]
pub struct Rental {
    pub car: Vec<String>,
    pub bike: Vec<String>,
    pub scooter: Vec<String>,
    pub tips: String,
}

#[derive(Debug, Deserialize)]
pub struct RouteDirections {
    pub subway: Option<String>,
    pub bus: Option<String>,
    pub walking: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SafetyInfo {
    pub safety_rating: String,
    pub current_alerts: Vec<String>,
    pub safe_areas: Vec<String>,
    pub caution_areas: Vec<String>,
    pub emergency_numbers: Vec<EmergencyNumber>,
    pub tips: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct EmergencyNumber {
    pub service: String,
    pub number: String,
}
