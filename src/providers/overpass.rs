//! Hotel and restaurant listings from OpenStreetMap through the Overpass API

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{Listing, ListingSource};
use crate::models::Coordinates;
use crate::{Result, TravelAiError};

const PROVIDER: &str = "overpass";
const HOTEL_RADIUS_M: u32 = 3000;
const RESTAURANT_RADIUS_M: u32 = 2000;
const MAX_RESULTS: usize = 20;

pub struct Overpass {
    client: ClientWithMiddleware,
    url: String,
}

impl Overpass {
    pub fn new(client: ClientWithMiddleware, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
        }
    }

    async fn query(&self, filter: &str, radius_m: u32, near: Coordinates) -> Result<Vec<Listing>> {
        let query = format!(
            "[out:json][timeout:25];node[{filter}](around:{radius_m},{},{});out body {MAX_RESULTS};",
            near.lat, near.lng
        );
        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(format!("data={}", urlencoding::encode(&query)))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TravelAiError::upstream(PROVIDER, format!("HTTP {status}")));
        }
        let body: OverpassResponse = response.json().await?;
        let listings: Vec<Listing> = body
            .elements
            .into_iter()
            .filter_map(Element::into_listing)
            .collect();
        debug!(filter, count = listings.len(), "Listings fetched");
        Ok(listings)
    }
}

#[async_trait]
impl ListingSource for Overpass {
    #[instrument(skip(self))]
    async fn hotels(&self, near: Coordinates) -> Result<Vec<Listing>> {
        self.query(r#""tourism"="hotel""#, HOTEL_RADIUS_M, near).await
    }

    #[instrument(skip(self))]
    async fn restaurants(&self, near: Coordinates) -> Result<Vec<Listing>> {
        self.query(r#""amenity"="restaurant""#, RESTAURANT_RADIUS_M, near)
            .await
    }
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<Element>,
}

#[derive(Debug, Deserialize)]
struct Element {
    lat: Option<f64>,
    lon: Option<f64>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

impl Element {
    /// Named elements only; tags mapped to amenity labels
    fn into_listing(self) -> Option<Listing> {
        let name = self.tags.get("name")?.trim().to_string();
        if name.is_empty() {
            return None;
        }
        let tag = |key: &str| self.tags.get(key).map(String::as_str);
        let yes = |key: &str| tag(key).is_some_and(|v| v != "no");

        let mut amenities = Vec::new();
        if tag("internet_access").is_some_and(|v| matches!(v, "yes" | "wlan" | "wifi")) {
            amenities.push("Wi-Fi".to_string());
        }
        for (key, label) in [
            ("air_conditioning", "Air conditioning"),
            ("swimming_pool", "Swimming pool"),
            ("parking", "Parking"),
            ("breakfast", "Breakfast"),
            ("wheelchair", "Wheelchair accessible"),
        ] {
            if yes(key) {
                amenities.push(label.to_string());
            }
        }

        let link = tag("website")
            .or_else(|| tag("contact:website"))
            .map(str::to_string);
        let coordinates = self.lat.zip(self.lon).map(|(lat, lon)| Coordinates::new(lat, lon));
        let cuisine = tag("cuisine").map(|c| c.replace(';', ", "));

        Some(Listing {
            name,
            coordinates,
            amenities,
            cuisine,
            link,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elements_map_to_listings() {
        let response: OverpassResponse = serde_json::from_value(serde_json::json!({
            "elements": [
                {"id": 1, "lat": 26.92, "lon": 75.82, "tags": {
                    "name": "Hotel Pearl Palace",
                    "internet_access": "wlan",
                    "air_conditioning": "yes",
                    "wheelchair": "no",
                    "website": "https://pearl.example"
                }},
                {"id": 2, "lat": 26.93, "lon": 75.81, "tags": {"tourism": "hotel"}},
                {"id": 3, "lat": 26.91, "lon": 75.80, "tags": {"name": "Tapri", "cuisine": "indian;chai"}}
            ]
        }))
        .unwrap();
        let listings: Vec<Listing> = response
            .elements
            .into_iter()
            .filter_map(Element::into_listing)
            .collect();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].amenities, vec!["Wi-Fi", "Air conditioning"]);
        assert_eq!(listings[0].link.as_deref(), Some("https://pearl.example"));
        assert_eq!(listings[1].cuisine.as_deref(), Some("indian, chai"));
        assert!(listings[1].link.is_none());
    }
}
