//! The itinerary document returned to callers and its building blocks

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::lenient;
use super::location::GeoLocation;

/// Complete response for one trip request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItineraryDocument {
    pub metadata: Metadata,
    pub itinerary: Vec<DayItinerary>,
    pub recommendations: Recommendations,
    pub essential_info: EssentialInfo,
    pub journey_path: JourneyPath,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Metadata {
    pub trip_name: String,
    pub origin: String,
    pub destination: String,
    pub trip_type: Vec<String>,
    pub duration_days: u32,
    pub total_budget: TotalBudget,
    pub preferences: TripPreferences,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TotalBudget {
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<String>,
    /// Older payloads carry the total under `range`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<BudgetBreakdown>,
}

/// Budget split across the four spending categories, in whole currency units
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct BudgetBreakdown {
    pub accommodation: u64,
    pub transportation: u64,
    pub activities: u64,
    pub food: u64,
}

/// Percentages of the total assigned to each category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetShares {
    pub accommodation: u64,
    pub transportation: u64,
    pub activities: u64,
    pub food: u64,
}

impl BudgetShares {
    pub const STANDARD: Self = Self::new(30, 20, 20, 30);
    pub const FOOD: Self = Self::new(20, 10, 10, 60);
    pub const ADVENTURE: Self = Self::new(20, 30, 40, 10);
    pub const LUXURY: Self = Self::new(50, 20, 10, 20);

    const fn new(accommodation: u64, transportation: u64, activities: u64, food: u64) -> Self {
        Self {
            accommodation,
            transportation,
            activities,
            food,
        }
    }

    /// Shares for the first matching style tag; food beats adventure beats luxury
    #[must_use]
    pub fn for_styles(styles: &[String]) -> Self {
        let has = |tag: &str| styles.iter().any(|s| s.trim().eq_ignore_ascii_case(tag));
        if has("food") {
            Self::FOOD
        } else if has("adventure") {
            Self::ADVENTURE
        } else if has("luxury") {
            Self::LUXURY
        } else {
            Self::STANDARD
        }
    }
}

impl BudgetBreakdown {
    /// Split `total` by `shares`, truncating each category
    #[must_use]
    pub fn split(total: u64, shares: BudgetShares) -> Self {
        let part = |pct: u64| total.saturating_mul(pct) / 100;
        Self {
            accommodation: part(shares.accommodation),
            transportation: part(shares.transportation),
            activities: part(shares.activities),
            food: part(shares.food),
        }
    }

    #[must_use]
    pub fn sum(&self) -> u64 {
        self.accommodation + self.transportation + self.activities + self.food
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TripPreferences {
    pub dietary_restrictions: Vec<String>,
    pub accessibility_needs: bool,
    pub pace: String,
    #[serde(default)]
    pub context: Option<String>,
}

/// One calendar day of the trip
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DayItinerary {
    pub day_number: u32,
    pub date: NaiveDate,
    pub weather: DayWeather,
    pub time_blocks: Vec<TimeBlock>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TemperatureRange {
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub min: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub max: f64,
}

impl Default for TemperatureRange {
    fn default() -> Self {
        Self {
            min: 15.0,
            max: 25.0,
        }
    }
}

/// Weather snapshot attached to a day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DayWeather {
    #[serde(default)]
    pub temperature: TemperatureRange,
    #[serde(default, deserialize_with = "lenient::string")]
    pub conditions: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub advisory: String,
}

impl Default for DayWeather {
    fn default() -> Self {
        Self {
            temperature: TemperatureRange::default(),
            conditions: "No weather data available".to_string(),
            advisory: "No weather advisory available".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    Fixed,
    #[default]
    #[serde(other)]
    Flexible,
}

/// A scheduled slot within a day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeBlock {
    #[serde(rename = "type", default)]
    pub block_type: BlockType,
    #[serde(with = "clock")]
    pub start_time: NaiveTime,
    #[serde(with = "clock")]
    pub end_time: NaiveTime,
    #[serde(default, deserialize_with = "lenient::minutes")]
    pub duration_minutes: u32,
    #[serde(default)]
    pub activity: Option<Activity>,
    #[serde(default)]
    pub travel: Option<TravelOption>,
    #[serde(default)]
    pub warnings: Vec<Warning>,
}

impl TimeBlock {
    /// Block spanning `start..end`; the duration is derived from the clock times
    #[must_use]
    pub fn new(block_type: BlockType, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            block_type,
            start_time,
            end_time,
            duration_minutes: minutes_between(start_time, end_time),
            activity: None,
            travel: None,
            warnings: Vec::new(),
        }
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.activity.as_ref().map(|a| a.title.as_str())
    }
}

/// Whole minutes from `start` to `end`, zero when `end` is not after `start`
#[must_use]
pub fn minutes_between(start: NaiveTime, end: NaiveTime) -> u32 {
    u32::try_from((end - start).num_minutes()).unwrap_or(0)
}

/// `HH:MM` clock times, also accepting `HH:MM:SS` and `hh:MM AM`
pub mod clock {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        parse(&text).ok_or_else(|| D::Error::custom(format!("invalid clock time: {text}")))
    }

    #[must_use]
    pub fn parse(text: &str) -> Option<NaiveTime> {
        let text = text.trim();
        ["%H:%M", "%H:%M:%S", "%I:%M %p", "%I:%M%p"]
            .iter()
            .find_map(|format| NaiveTime::parse_from_str(text, format).ok())
    }
}

/// Outbound links as providers emit them; canonicalized into `link`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Links {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation_link: Option<String>,
}

impl Links {
    #[must_use]
    pub fn to(url: impl Into<String>) -> Self {
        Self {
            link: Some(url.into()),
            ..Self::default()
        }
    }

    /// The canonical link if one is set and non-empty
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.link.as_deref().filter(|l| !l.trim().is_empty())
    }

    /// Whether any of the three fields holds a usable URL
    #[must_use]
    pub fn is_empty(&self) -> bool {
        [&self.link, &self.booking_link, &self.reservation_link]
            .iter()
            .all(|l| l.as_deref().is_none_or(|l| l.trim().is_empty()))
    }

    /// Fold legacy link fields into `link`; a non-empty `link` always wins
    pub fn canonicalize(&mut self) {
        let legacy = [self.booking_link.take(), self.reservation_link.take()]
            .into_iter()
            .flatten()
            .find(|l| !l.trim().is_empty());
        if self.url().is_none() {
            self.link = legacy;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Cost {
    #[serde(default, deserialize_with = "lenient::string")]
    pub currency: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub range: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub per_unit: Option<String>,
}

impl Cost {
    #[must_use]
    pub fn new(currency: impl Into<String>, range: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
            range: range.into(),
            per_unit: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Warning {
    #[serde(rename = "type", default, deserialize_with = "lenient::string")]
    pub warning_type: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub message: String,
    #[serde(default = "default_warning_priority", deserialize_with = "lenient::priority")]
    pub priority: u8,
}

fn default_warning_priority() -> u8 {
    2
}

impl Warning {
    #[must_use]
    pub fn new(warning_type: impl Into<String>, message: impl Into<String>, priority: u8) -> Self {
        Self {
            warning_type: warning_type.into(),
            message: message.into(),
            priority: priority.clamp(1, 3),
        }
    }
}

/// Something to do: a sight, a meal, an experience
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Activity {
    #[serde(default, alias = "name", deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(rename = "type", default, deserialize_with = "lenient::string")]
    pub activity_type: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(default)]
    pub location: GeoLocation,
    #[serde(default, deserialize_with = "lenient::opt_minutes")]
    pub duration: Option<u32>,
    #[serde(default)]
    pub cost: Cost,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub images: Vec<String>,
    #[serde(flatten)]
    pub links: Links,
    #[serde(default = "default_activity_priority", deserialize_with = "lenient::priority")]
    pub priority: u8,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub highlights: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

fn default_activity_priority() -> u8 {
    3
}

impl Activity {
    /// Bare record used when no richer data is available
    #[must_use]
    pub fn generic(title: impl Into<String>, activity_type: &str, place: &str, currency: &str) -> Self {
        let title = title.into();
        Self {
            description: format!("{title} in {place}"),
            title,
            activity_type: activity_type.to_string(),
            location: GeoLocation::named(place),
            duration: None,
            cost: Cost::new(currency, "Varies"),
            images: Vec::new(),
            links: Links::default(),
            priority: default_activity_priority(),
            highlights: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// A way of getting somewhere
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TravelOption {
    #[serde(default, deserialize_with = "lenient::string")]
    pub mode: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub details: String,
    #[serde(default, deserialize_with = "lenient::opt_minutes")]
    pub duration: Option<u32>,
    #[serde(default)]
    pub cost: Cost,
    #[serde(flatten)]
    pub links: Links,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub operator: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Accommodation {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "lenient::string")]
    pub accommodation_type: String,
    #[serde(default)]
    pub location: GeoLocation,
    #[serde(default, deserialize_with = "lenient::string")]
    pub price_range: String,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub amenities: Vec<String>,
    #[serde(flatten)]
    pub links: Links,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dining {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub cuisine: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub price_range: String,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub dietary_options: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub signature_dishes: Vec<String>,
    #[serde(default)]
    pub location: GeoLocation,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub images: Vec<String>,
    #[serde(flatten)]
    pub links: Links,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Recommendations {
    pub accommodations: Vec<Accommodation>,
    pub dining: Vec<Dining>,
    pub transportation: Vec<TravelOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmergencyContact {
    #[serde(rename = "type", default, deserialize_with = "lenient::string")]
    pub contact_type: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EssentialInfo {
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub documents: Vec<String>,
    #[serde(default)]
    pub emergency_contacts: Vec<EmergencyContact>,
}

impl EssentialInfo {
    /// Static set used when nothing better is available
    #[must_use]
    pub fn standard() -> Self {
        let contact = |kind: &str, number: &str| EmergencyContact {
            contact_type: kind.to_string(),
            number: number.to_string(),
        };
        Self {
            documents: vec![
                "Photo ID".to_string(),
                "Hotel booking confirmation".to_string(),
                "Travel insurance".to_string(),
            ],
            emergency_contacts: vec![
                contact("Police", "100"),
                contact("Ambulance", "102"),
                contact("Tourist Helpline", "1363"),
            ],
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty() && self.emergency_contacts.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ElevationPoint {
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub distance: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub elevation: f64,
}

/// Overview polyline, total distance and elevation profile of the journey
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct JourneyPath {
    #[serde(default)]
    pub overview: Vec<super::location::Coordinates>,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub distance_km: f64,
    #[serde(default)]
    pub elevation_profile: Vec<ElevationPoint>,
}
