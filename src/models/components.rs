//! Typed results of the five component generators
//!
//! Every component knows its own fallback so that a failed generator still
//! hands the coordinator a well-formed value.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::itinerary::{
    Accommodation, Activity, Cost, DayWeather, Dining, JourneyPath, Links, TemperatureRange,
    TravelOption,
};
use super::lenient;
use super::location::{Coordinates, GeoLocation, maps_search_url};
use super::request::TripRequest;

/// Amenities assumed for any hotel when nothing better is known
pub const GENERIC_AMENITIES: [&str; 3] = ["Wi-Fi", "Air conditioning", "24-hour front desk"];

/// A generator result with a static replacement for failures
pub trait Component: DeserializeOwned + Send + Sized {
    /// Name used in logs
    const NAME: &'static str;

    /// Well-formed value used when generation fails
    fn fallback(request: &TripRequest) -> Self;
}

/// Use the generated value or the component's fallback, logging the failure
pub fn with_fallback<T: Component>(result: crate::Result<T>, request: &TripRequest) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(component = T::NAME, error = %err, "Using fallback data");
            T::fallback(request)
        }
    }
}

// Meta / geo

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AltitudeInfo {
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub highest_point: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub lowest_point: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub advisory: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeyCoordinate {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub lat: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub lng: f64,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub altitude: Option<f64>,
}

impl KeyCoordinate {
    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        Some(Coordinates::new(self.lat, self.lng)).filter(Coordinates::is_known)
    }
}

/// Journey geometry and the resolved endpoints of the trip
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MetaInfo {
    #[serde(default)]
    pub journey_path: JourneyPath,
    #[serde(default)]
    pub altitude_info: AltitudeInfo,
    #[serde(default)]
    pub key_coordinates: Vec<KeyCoordinate>,
    #[serde(default)]
    pub origin: Option<Coordinates>,
    #[serde(default)]
    pub destination: Option<Coordinates>,
}

impl MetaInfo {
    /// Key coordinate whose name mentions `place`, case-insensitively
    #[must_use]
    pub fn key_coordinate_for(&self, place: &str) -> Option<Coordinates> {
        let place = place.trim().to_lowercase();
        if place.is_empty() {
            return None;
        }
        self.key_coordinates
            .iter()
            .filter(|k| {
                let name = k.name.to_lowercase();
                name.contains(&place) || (!name.is_empty() && place.contains(&name))
            })
            .find_map(KeyCoordinate::coordinates)
    }
}

impl Component for MetaInfo {
    const NAME: &'static str = "meta information";

    fn fallback(_request: &TripRequest) -> Self {
        Self::default()
    }
}

// Transport

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MainTransport {
    #[serde(default, deserialize_with = "lenient::string")]
    pub mode: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub from: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub to: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub departure_time: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub arrival_time: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_minutes")]
    pub duration: Option<u32>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub operator: Option<String>,
    #[serde(default)]
    pub cost: Cost,
    #[serde(flatten)]
    pub links: Links,
    #[serde(default, deserialize_with = "lenient::string")]
    pub details: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocalTransport {
    #[serde(default, deserialize_with = "lenient::string")]
    pub mode: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub area: String,
    #[serde(default)]
    pub cost: Cost,
    #[serde(default, deserialize_with = "lenient::string")]
    pub details: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transfer {
    #[serde(default, deserialize_with = "lenient::string")]
    pub from: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub to: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub mode: String,
    #[serde(default, deserialize_with = "lenient::opt_minutes")]
    pub duration: Option<u32>,
    #[serde(default)]
    pub cost: Cost,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouteTransport {
    #[serde(default, deserialize_with = "lenient::string")]
    pub from: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub to: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub recommended_mode: String,
    #[serde(default, deserialize_with = "lenient::opt_minutes")]
    pub duration: Option<u32>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub details: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TransportOptions {
    #[serde(default)]
    pub main_transport: Vec<MainTransport>,
    #[serde(default)]
    pub local_transport: Vec<LocalTransport>,
    #[serde(default)]
    pub transfers: Vec<Transfer>,
    #[serde(default)]
    pub route_transport: Vec<RouteTransport>,
}

impl TransportOptions {
    /// Mode of the first main transport entry, lowercased
    #[must_use]
    pub fn primary_mode(&self) -> Option<String> {
        self.main_transport
            .iter()
            .map(|t| t.mode.trim().to_lowercase())
            .find(|m| !m.is_empty())
    }

    /// Main then local transport as recommendation entries
    #[must_use]
    pub fn flatten(&self) -> Vec<TravelOption> {
        let main = self.main_transport.iter().map(|t| TravelOption {
            mode: t.mode.clone(),
            details: if t.details.trim().is_empty() {
                format!("{} from {} to {}", t.mode, t.from, t.to)
            } else {
                t.details.clone()
            },
            duration: t.duration,
            cost: t.cost.clone(),
            links: t.links.clone(),
            operator: t.operator.clone(),
        });
        let local = self.local_transport.iter().map(|t| TravelOption {
            mode: t.mode.clone(),
            details: if t.area.trim().is_empty() {
                t.details.clone()
            } else {
                format!("{} ({})", t.details, t.area)
            },
            duration: None,
            cost: t.cost.clone(),
            links: Links::default(),
            operator: None,
        });
        main.chain(local).collect()
    }
}

impl Component for TransportOptions {
    const NAME: &'static str = "transport options";

    fn fallback(_request: &TripRequest) -> Self {
        Self::default()
    }
}

/// Entry used when no transport data survived generation
#[must_use]
pub fn fallback_travel_option(request: &TripRequest) -> TravelOption {
    TravelOption {
        mode: "car".to_string(),
        details: format!("Transportation in {}", request.destination()),
        duration: Some(60),
        cost: Cost::new(request.currency(), "Varies based on distance"),
        links: Links::default(),
        operator: Some("Local operators".to_string()),
    }
}

// Activities

/// Activities grouped by the six catalog categories
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ActivityCatalog {
    #[serde(default)]
    pub must_see: Vec<Activity>,
    #[serde(default)]
    pub cultural: Vec<Activity>,
    #[serde(default)]
    pub outdoor: Vec<Activity>,
    #[serde(default)]
    pub local_experiences: Vec<Activity>,
    #[serde(default)]
    pub hidden_gems: Vec<Activity>,
    #[serde(default)]
    pub family_friendly: Vec<Activity>,
}

impl ActivityCatalog {
    /// All activities in category order
    pub fn iter(&self) -> impl Iterator<Item = &Activity> {
        self.must_see
            .iter()
            .chain(&self.cultural)
            .chain(&self.outdoor)
            .chain(&self.local_experiences)
            .chain(&self.hidden_gems)
            .chain(&self.family_friendly)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Activity> {
        self.must_see
            .iter_mut()
            .chain(&mut self.cultural)
            .chain(&mut self.outdoor)
            .chain(&mut self.local_experiences)
            .chain(&mut self.hidden_gems)
            .chain(&mut self.family_friendly)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

impl Component for ActivityCatalog {
    const NAME: &'static str = "activities";

    fn fallback(_request: &TripRequest) -> Self {
        Self::default()
    }
}

// Accommodations and dining

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AccommodationsAndDining {
    #[serde(default)]
    pub accommodations: Vec<Accommodation>,
    #[serde(default)]
    pub dining: Vec<Dining>,
}

impl Component for AccommodationsAndDining {
    const NAME: &'static str = "accommodations and dining";

    /// One generic hotel and one generic restaurant entry at the destination
    fn fallback(request: &TripRequest) -> Self {
        let destination = request.destination();
        let place = |label: &str| {
            let mut location = GeoLocation::named(destination);
            location.google_maps_link = Some(maps_search_url(&format!("{label} {destination}")));
            location
        };
        Self {
            accommodations: vec![Accommodation {
                name: format!("Hotels in {destination}"),
                accommodation_type: "hotel".to_string(),
                location: place("hotels"),
                price_range: "Varies".to_string(),
                rating: None,
                images: Vec::new(),
                amenities: GENERIC_AMENITIES.iter().map(ToString::to_string).collect(),
                links: Links::to(maps_search_url(&format!("hotels in {destination}"))),
                description: Some(format!("Browse available stays in {destination}")),
            }],
            dining: vec![Dining {
                name: format!("Local restaurants in {destination}"),
                cuisine: "Local".to_string(),
                price_range: "Varies".to_string(),
                dietary_options: request.preferences.dietary_preferences.clone(),
                signature_dishes: Vec::new(),
                location: place("restaurants"),
                images: Vec::new(),
                links: Links::to(maps_search_url(&format!("restaurants in {destination}"))),
                description: Some(format!("Local cuisine around {destination}")),
            }],
        }
    }
}

// Weather

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Precipitation {
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub probability: f64,
    #[serde(default, deserialize_with = "lenient::string")]
    pub amount: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Wind {
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub speed: f64,
    #[serde(default = "default_wind_unit", deserialize_with = "lenient::string")]
    pub unit: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub direction: String,
}

fn default_wind_unit() -> String {
    "km/h".to_string()
}

/// Forecast for one calendar day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyWeather {
    pub date: NaiveDate,
    #[serde(default)]
    pub temperature: TemperatureRange,
    #[serde(default, deserialize_with = "lenient::string")]
    pub conditions: String,
    #[serde(default = "Precipitation::unknown")]
    pub precipitation: Precipitation,
    #[serde(default = "Wind::unknown")]
    pub wind: Wind,
    #[serde(default, deserialize_with = "lenient::string")]
    pub advisory: String,
}

impl Precipitation {
    fn unknown() -> Self {
        Self {
            probability: 0.0,
            amount: "Unknown".to_string(),
        }
    }
}

impl Wind {
    fn unknown() -> Self {
        Self {
            speed: 0.0,
            unit: default_wind_unit(),
            direction: "Unknown".to_string(),
        }
    }
}

impl DailyWeather {
    /// Placeholder day used when no forecast is available
    #[must_use]
    pub fn unavailable(date: NaiveDate) -> Self {
        Self {
            date,
            temperature: TemperatureRange::default(),
            conditions: "No data available".to_string(),
            precipitation: Precipitation::unknown(),
            wind: Wind::unknown(),
            advisory: "Weather data unavailable".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WeatherReport {
    #[serde(default)]
    pub forecast: Vec<DailyWeather>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub general_advisory: String,
}

impl WeatherReport {
    /// Snapshot for `date`, or the default snapshot when the day is not covered
    #[must_use]
    pub fn for_date(&self, date: NaiveDate) -> DayWeather {
        self.forecast
            .iter()
            .find(|day| day.date == date)
            .map(|day| {
                let advisory = [&day.advisory, &self.general_advisory]
                    .into_iter()
                    .find(|a| !a.trim().is_empty())
                    .cloned()
                    .unwrap_or_else(|| DayWeather::default().advisory);
                DayWeather {
                    temperature: day.temperature,
                    conditions: day.conditions.clone(),
                    advisory,
                }
            })
            .unwrap_or_default()
    }
}

impl Component for WeatherReport {
    const NAME: &'static str = "weather forecast";

    /// Placeholder forecast covering every day of the trip
    fn fallback(request: &TripRequest) -> Self {
        Self {
            forecast: request
                .date_range()
                .into_iter()
                .map(DailyWeather::unavailable)
                .collect(),
            general_advisory: "Weather information could not be retrieved.".to_string(),
        }
    }
}

/// Short generated name for the trip
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TripName {
    #[serde(alias = "name", deserialize_with = "lenient::string")]
    pub trip_name: String,
}

impl Component for TripName {
    const NAME: &'static str = "trip name";

    /// "3-Day Cultural Trip to Jaipur"
    fn fallback(request: &TripRequest) -> Self {
        let style = request
            .trip_style
            .first()
            .map(|s| capitalize(s.trim()))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "Leisure".to_string());
        Self {
            trip_name: format!(
                "{}-Day {style} Trip to {}",
                request.duration_days(),
                request.destination()
            ),
        }
    }
}

impl Component for super::itinerary::EssentialInfo {
    const NAME: &'static str = "essential info";

    fn fallback(_request: &TripRequest) -> Self {
        Self::standard()
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::request::fixtures::jaipur_request;

    #[test]
    fn test_weather_fallback_covers_every_day() {
        let request = jaipur_request();
        let report = WeatherReport::fallback(&request);
        assert_eq!(report.forecast.len(), 3);
        let day = report.for_date(request.dates.start_date);
        assert_eq!(day.conditions, "No data available");
        assert_eq!(day.temperature.min, 15.0);
        assert_eq!(report.forecast[0].wind.unit, "km/h");
    }

    #[test]
    fn test_uncovered_date_gets_default_snapshot() {
        let report = WeatherReport::default();
        let day = report.for_date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(day, DayWeather::default());
    }

    #[test]
    fn test_blank_advisories_use_default_text() {
        let request = jaipur_request();
        let mut report = WeatherReport::fallback(&request);
        report.forecast[0].advisory = "  ".to_string();
        report.general_advisory = String::new();
        let day = report.for_date(request.dates.start_date);
        assert_eq!(day.advisory, "No weather advisory available");

        report.general_advisory = "Dry season".to_string();
        assert_eq!(report.for_date(request.dates.start_date).advisory, "Dry season");
    }

    #[test]
    fn test_accommodation_fallback_has_entries() {
        let request = jaipur_request();
        let fallback = AccommodationsAndDining::fallback(&request);
        assert_eq!(fallback.accommodations.len(), 1);
        assert_eq!(fallback.dining.len(), 1);
        assert_eq!(fallback.accommodations[0].amenities.len(), 3);
        assert!(fallback.dining[0].links.url().is_some());
    }

    #[test]
    fn test_trip_name_fallback() {
        let request = jaipur_request();
        assert_eq!(
            TripName::fallback(&request).trip_name,
            "3-Day Cultural Trip to Jaipur"
        );
    }

    #[test]
    fn test_transport_flatten_and_primary_mode() {
        let transport: TransportOptions = serde_json::from_value(serde_json::json!({
            "main_transport": [{"mode": "Train", "from": "Delhi", "to": "Jaipur", "duration": "4 hours"}],
            "local_transport": [{"mode": "auto-rickshaw", "area": "Old City", "details": "Short hops"}]
        }))
        .unwrap();
        assert_eq!(transport.primary_mode().as_deref(), Some("train"));
        let flat = transport.flatten();
        assert_eq!(flat.len(), 2);
        assert_eq!(flat[0].duration, Some(240));
        assert_eq!(flat[0].details, "Train from Delhi to Jaipur");
    }

    #[test]
    fn test_key_coordinate_lookup() {
        let meta: MetaInfo = serde_json::from_value(serde_json::json!({
            "key_coordinates": [
                {"name": "New Delhi", "lat": 28.61, "lng": 77.20},
                {"name": "Jaipur City", "lat": "26.91", "lng": 75.78}
            ]
        }))
        .unwrap();
        assert_eq!(meta.key_coordinate_for("delhi").map(|c| c.lat), Some(28.61));
        assert_eq!(meta.key_coordinate_for("Jaipur").map(|c| c.lng), Some(75.78));
        assert!(meta.key_coordinate_for("Udaipur").is_none());
    }
}
