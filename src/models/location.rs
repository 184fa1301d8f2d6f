//! Location model for geographic coordinates and map links

use haversine::{Location as HaversineLocation, Units, distance};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, PickFirst, serde_as};

const MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/?api=1&query=";

/// Latitude/longitude pair as used throughout the itinerary document
#[serde_as]
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Latitude in decimal degrees
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub lat: f64,
    /// Longitude in decimal degrees
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub lng: f64,
}

impl Coordinates {
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Providers emit 0,0 when they do not know a position
    #[must_use]
    pub fn is_known(&self) -> bool {
        !(self.lat == 0.0 && self.lng == 0.0) && self.lat.is_finite() && self.lng.is_finite()
    }

    /// Great-circle distance in kilometers
    #[must_use]
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        let from = HaversineLocation {
            latitude: self.lat,
            longitude: self.lng,
        };
        let to = HaversineLocation {
            latitude: other.lat,
            longitude: other.lng,
        };
        distance(from, to, Units::Kilometers)
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.lat, self.lng)
    }
}

/// A named place with optional coordinates and a map link
#[serde_as]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct GeoLocation {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub altitude: Option<f64>,
    #[serde(default)]
    pub google_maps_link: Option<String>,
}

impl GeoLocation {
    /// Create a location with only a name
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Coordinates if present and meaningful
    #[must_use]
    pub fn known_coordinates(&self) -> Option<Coordinates> {
        self.coordinates.filter(Coordinates::is_known)
    }

    /// Fill the map link from the name, else from coordinates, else from `fallback_query`
    pub fn ensure_map_link(&mut self, fallback_query: &str) {
        let has_link = self
            .google_maps_link
            .as_ref()
            .is_some_and(|link| !link.trim().is_empty());
        if has_link {
            return;
        }
        self.google_maps_link = Some(
            maps_link(Some(&self.name), self.known_coordinates().as_ref())
                .unwrap_or_else(|| maps_search_url(fallback_query)),
        );
    }
}

/// Build a map search link from a name or a coordinate pair
#[must_use]
pub fn maps_link(name: Option<&str>, coordinates: Option<&Coordinates>) -> Option<String> {
    if let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) {
        return Some(maps_search_url(name));
    }
    coordinates
        .filter(|c| c.is_known())
        .map(|c| maps_search_url(&format!("{},{}", c.lat, c.lng)))
}

/// Map search URL for free text
#[must_use]
pub fn maps_search_url(query: &str) -> String {
    format!("{MAPS_SEARCH_URL}{}", urlencoding::encode(query.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_link_prefers_name() {
        let coords = Coordinates::new(26.9124, 75.7873);
        let link = maps_link(Some("Hawa Mahal"), Some(&coords)).unwrap();
        assert!(link.ends_with("Hawa%20Mahal"));
    }

    #[test]
    fn test_maps_link_uses_coordinates_without_name() {
        let coords = Coordinates::new(26.9124, 75.7873);
        let link = maps_link(Some("  "), Some(&coords)).unwrap();
        assert!(link.contains("26.9124"));
        assert!(maps_link(None, None).is_none());
    }

    #[test]
    fn test_placeholder_coordinates_fall_back_to_query() {
        let origin = Coordinates::new(0.0, 0.0);
        assert!(maps_link(Some(""), Some(&origin)).is_none());

        let mut location = GeoLocation {
            coordinates: Some(origin),
            ..GeoLocation::default()
        };
        location.ensure_map_link("Jaipur");
        let link = location.google_maps_link.unwrap();
        assert!(link.ends_with("query=Jaipur"), "got {link}");
    }

    #[test]
    fn test_ensure_map_link_keeps_existing() {
        let mut location = GeoLocation::named("Amber Fort");
        location.google_maps_link = Some("https://example.org/amber".to_string());
        location.ensure_map_link("Jaipur");
        assert_eq!(
            location.google_maps_link.as_deref(),
            Some("https://example.org/amber")
        );
    }

    #[test]
    fn test_ensure_map_link_falls_back_to_query() {
        let mut location = GeoLocation::default();
        location.ensure_map_link("Jaipur");
        assert!(location.google_maps_link.unwrap().ends_with("Jaipur"));
    }

    #[test]
    fn test_coordinates_accept_strings() {
        let coords: Coordinates =
            serde_json::from_str(r#"{"lat": "26.91", "lng": 75.78}"#).unwrap();
        assert_eq!(coords.lat, 26.91);
        assert!(coords.is_known());
        assert!(!Coordinates::new(0.0, 0.0).is_known());
    }

    #[test]
    fn test_distance_km() {
        let delhi = Coordinates::new(28.6139, 77.2090);
        let jaipur = Coordinates::new(26.9124, 75.7873);
        let km = delhi.distance_km(&jaipur);
        assert!((230.0..250.0).contains(&km), "got {km}");
    }
}
