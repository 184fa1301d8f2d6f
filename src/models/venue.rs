//! Venues that can be scheduled into a day: restaurants and activities

use serde::{Deserialize, Serialize};

use super::itinerary::{Activity, Cost, Dining};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VenueKind {
    Restaurant,
    Activity,
}

/// A schedulable venue, tagged with the day it was allocated to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VenueRecord {
    pub kind: VenueKind,
    pub activity: Activity,
    pub assigned_day: Option<u32>,
}

impl VenueRecord {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.activity.title
    }

    #[must_use]
    pub fn is_assigned(&self) -> bool {
        self.assigned_day.is_some()
    }
}

impl From<Activity> for VenueRecord {
    fn from(activity: Activity) -> Self {
        Self {
            kind: VenueKind::Activity,
            activity,
            assigned_day: None,
        }
    }
}

impl From<Dining> for VenueRecord {
    fn from(dining: Dining) -> Self {
        let description = dining.description.unwrap_or_else(|| {
            if dining.cuisine.trim().is_empty() {
                format!("Meal at {}", dining.name)
            } else {
                format!("{} cuisine at {}", dining.cuisine, dining.name)
            }
        });
        let mut location = dining.location;
        if location.name.trim().is_empty() {
            location.name.clone_from(&dining.name);
        }
        Self {
            kind: VenueKind::Restaurant,
            activity: Activity {
                title: dining.name,
                activity_type: "dining".to_string(),
                description,
                location,
                duration: None,
                cost: Cost {
                    currency: String::new(),
                    range: dining.price_range,
                    per_unit: Some("per person".to_string()),
                },
                images: dining.images,
                links: dining.links,
                priority: 3,
                highlights: dining.signature_dishes,
                warnings: Vec::new(),
            },
            assigned_day: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dining_becomes_restaurant_venue() {
        let dining: Dining = serde_json::from_value(serde_json::json!({
            "name": "Laxmi Mishthan Bhandar",
            "cuisine": "Rajasthani",
            "price_range": "300-600",
            "signature_dishes": ["Pyaaz kachori"],
            "reservation_link": "https://example.org/lmb"
        }))
        .unwrap();
        let venue = VenueRecord::from(dining);
        assert_eq!(venue.kind, VenueKind::Restaurant);
        assert_eq!(venue.name(), "Laxmi Mishthan Bhandar");
        assert_eq!(venue.activity.location.name, "Laxmi Mishthan Bhandar");
        assert_eq!(venue.activity.highlights, vec!["Pyaaz kachori".to_string()]);
        assert_eq!(venue.activity.description, "Rajasthani cuisine at Laxmi Mishthan Bhandar");
        assert!(!venue.is_assigned());
    }
}
