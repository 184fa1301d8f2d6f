//! Trip request model and input validation

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Result, TravelAiError};

const DEFAULT_CURRENCY: &str = "USD";

/// Everything the caller tells us about the trip
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRequest {
    pub location: LocationInfo,
    pub dates: DateInfo,
    pub travelers: TravelersInfo,
    #[serde(default)]
    pub budget: Option<BudgetInfo>,
    #[serde(default)]
    pub trip_style: Vec<String>,
    #[serde(default)]
    pub preferences: PreferencesInfo,
    #[serde(default)]
    pub additional_context: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationInfo {
    pub destination: String,
    pub base_city: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateInfo {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub is_flexible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelersInfo {
    pub count: u32,
    #[serde(default = "default_adults")]
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
    #[serde(default)]
    pub infants: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetInfo {
    pub ceiling: u64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesInfo {
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub travel_style: Vec<String>,
    #[serde(default)]
    pub dietary_preferences: Vec<String>,
    #[serde(default = "default_pace")]
    pub pace: String,
    #[serde(default)]
    pub accessibility: Option<AccessibilityInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityInfo {
    #[serde(default)]
    pub mobility_needs: bool,
    #[serde(default)]
    pub hearing_needs: bool,
    #[serde(default)]
    pub vision_needs: bool,
    #[serde(default)]
    pub dietary_restrictions: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_adults() -> u32 {
    1
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_pace() -> String {
    "moderate".to_string()
}

impl Default for PreferencesInfo {
    fn default() -> Self {
        Self {
            interests: Vec::new(),
            travel_style: Vec::new(),
            dietary_preferences: Vec::new(),
            pace: default_pace(),
            accessibility: None,
        }
    }
}

impl AccessibilityInfo {
    /// True when any accessibility flag is set
    #[must_use]
    pub fn any(&self) -> bool {
        self.mobility_needs || self.hearing_needs || self.vision_needs || self.dietary_restrictions
    }
}

impl TripRequest {
    /// Reject malformed input before any generation work starts
    pub fn validate(&self) -> Result<()> {
        if self.location.destination.trim().is_empty() {
            return Err(TravelAiError::validation("Destination cannot be empty"));
        }
        if self.location.base_city.trim().is_empty() {
            return Err(TravelAiError::validation("Origin city cannot be empty"));
        }
        if self.dates.end_date < self.dates.start_date {
            return Err(TravelAiError::validation(format!(
                "End date {} is before start date {}",
                self.dates.end_date, self.dates.start_date
            )));
        }
        if self.travelers.count == 0 {
            return Err(TravelAiError::validation("At least one traveler is required"));
        }
        if let Some(budget) = &self.budget {
            if budget.ceiling == 0 {
                return Err(TravelAiError::validation("Budget ceiling must be positive"));
            }
            if budget.currency.trim().is_empty() {
                return Err(TravelAiError::validation("Budget currency cannot be empty"));
            }
        }
        Ok(())
    }

    /// Inclusive number of days in the date range
    #[must_use]
    pub fn duration_days(&self) -> i64 {
        (self.dates.end_date - self.dates.start_date).num_days() + 1
    }

    /// Every calendar date of the trip in order
    #[must_use]
    pub fn date_range(&self) -> Vec<NaiveDate> {
        self.dates
            .start_date
            .iter_days()
            .take_while(|date| *date <= self.dates.end_date)
            .collect()
    }

    /// Currency the traveler budgets in
    #[must_use]
    pub fn currency(&self) -> &str {
        self.budget
            .as_ref()
            .map_or(DEFAULT_CURRENCY, |b| b.currency.as_str())
    }

    #[must_use]
    pub fn destination(&self) -> &str {
        self.location.destination.trim()
    }

    #[must_use]
    pub fn origin(&self) -> &str {
        self.location.base_city.trim()
    }

    /// Trip styles joined for prompts
    #[must_use]
    pub fn styles_label(&self) -> String {
        if self.trip_style.is_empty() {
            "general sightseeing".to_string()
        } else {
            self.trip_style.join(", ")
        }
    }

    /// "3 (2 adults, 1 children, 0 infants)"
    #[must_use]
    pub fn travelers_label(&self) -> String {
        format!(
            "{} ({} adults, {} children, {} infants)",
            self.travelers.count,
            self.travelers.adults,
            self.travelers.children,
            self.travelers.infants
        )
    }

    #[must_use]
    pub fn budget_label(&self) -> String {
        self.budget.as_ref().map_or_else(
            || "No specific budget mentioned".to_string(),
            |b| format!("{} {}", b.ceiling, b.currency),
        )
    }

    #[must_use]
    pub fn interests_label(&self) -> String {
        join_or(&self.preferences.interests, "No specific interests mentioned")
    }

    #[must_use]
    pub fn dietary_label(&self) -> String {
        join_or(
            &self.preferences.dietary_preferences,
            "No specific dietary preferences",
        )
    }

    #[must_use]
    pub fn context_label(&self) -> &str {
        self.additional_context
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or("No additional preferences specified")
    }

    #[must_use]
    pub fn accessibility_needs(&self) -> bool {
        self.preferences
            .accessibility
            .as_ref()
            .is_some_and(AccessibilityInfo::any)
    }
}

fn join_or(values: &[String], empty: &str) -> String {
    if values.is_empty() {
        empty.to_string()
    } else {
        values.join(", ")
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A three day cultural trip to Jaipur used across unit tests
    pub fn jaipur_request() -> TripRequest {
        serde_json::from_value(serde_json::json!({
            "location": {"destination": "Jaipur", "baseCity": "Delhi"},
            "dates": {"startDate": "2025-11-10", "endDate": "2025-11-12"},
            "travelers": {"count": 2, "adults": 2},
            "budget": {"ceiling": 30000, "currency": "INR"},
            "tripStyle": ["cultural"],
            "preferences": {"interests": ["history"], "dietaryPreferences": ["vegetarian"]}
        }))
        .expect("fixture request")
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::jaipur_request;
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_wire_format_defaults() {
        let request = jaipur_request();
        assert_eq!(request.preferences.pace, "moderate");
        assert_eq!(request.currency(), "INR");
        assert!(!request.accessibility_needs());
        assert!(request.validate().is_ok());
    }

    #[rstest]
    #[case("2025-11-10", "2025-11-10", 1)]
    #[case("2025-11-10", "2025-11-12", 3)]
    #[case("2025-12-30", "2026-01-02", 4)]
    fn test_date_range_is_inclusive(#[case] start: &str, #[case] end: &str, #[case] days: usize) {
        let mut request = jaipur_request();
        request.dates.start_date = start.parse().unwrap();
        request.dates.end_date = end.parse().unwrap();
        let range = request.date_range();
        assert_eq!(range.len(), days);
        assert_eq!(request.duration_days(), days as i64);
        assert_eq!(range.first().copied(), Some(request.dates.start_date));
        assert_eq!(range.last().copied(), Some(request.dates.end_date));
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let mut request = jaipur_request();
        request.dates.end_date = "2025-11-01".parse().unwrap();
        let err = request.validate().unwrap_err();
        assert!(matches!(err, TravelAiError::Validation { .. }));
    }

    #[test]
    fn test_long_trips_are_accepted() {
        let mut request = jaipur_request();
        request.dates.end_date = request.dates.start_date + chrono::Days::new(30);
        assert!(request.validate().is_ok());
        assert_eq!(request.duration_days(), 31);
        assert_eq!(request.date_range().len(), 31);
    }

    #[rstest]
    #[case::empty_destination(|r: &mut TripRequest| r.location.destination = "  ".into())]
    #[case::no_travelers(|r: &mut TripRequest| r.travelers.count = 0)]
    #[case::zero_budget(|r: &mut TripRequest| r.budget.as_mut().unwrap().ceiling = 0)]
    fn test_invalid_requests(#[case] mutate: fn(&mut TripRequest)) {
        let mut request = jaipur_request();
        mutate(&mut request);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_currency_defaults_without_budget() {
        let mut request = jaipur_request();
        request.budget = None;
        assert_eq!(request.currency(), "USD");
        assert_eq!(request.budget_label(), "No specific budget mentioned");
    }
}
