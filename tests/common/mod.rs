//! Fakes shared by the integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aventra::config::GenerationConfig;
use aventra::models::{Coordinates, DailyWeather};
use aventra::providers::{
    ContentProvider, Geocoder, ImageQuery, ImageSearch, Listing, ListingSource, WeatherProvider,
};
use aventra::{Providers, Result, TravelAiError, TripRequest};
use chrono::NaiveDate;

/// Every call fails as if the upstream were down
pub struct Unavailable;

fn down<T>() -> Result<T> {
    Err(TravelAiError::upstream("fake", "unavailable"))
}

#[async_trait]
impl ContentProvider for Unavailable {
    async fn complete(&self, _prompt: &str, _system: Option<&str>) -> Result<String> {
        down()
    }
}

#[async_trait]
impl Geocoder for Unavailable {
    async fn geocode(&self, _place: &str) -> Result<Coordinates> {
        down()
    }
}

#[async_trait]
impl WeatherProvider for Unavailable {
    async fn forecast(&self, _at: Coordinates, _start: NaiveDate, _days: u32) -> Result<Vec<DailyWeather>> {
        down()
    }
}

#[async_trait]
impl ListingSource for Unavailable {
    async fn hotels(&self, _near: Coordinates) -> Result<Vec<Listing>> {
        down()
    }

    async fn restaurants(&self, _near: Coordinates) -> Result<Vec<Listing>> {
        down()
    }
}

#[async_trait]
impl ImageSearch for Unavailable {
    async fn search(&self, _query: &ImageQuery) -> Result<Option<String>> {
        down()
    }
}

/// Replies with the first canned response whose marker occurs in the prompt
pub struct Scripted {
    replies: Vec<(&'static str, String)>,
}

impl Scripted {
    pub fn new(replies: Vec<(&'static str, serde_json::Value)>) -> Self {
        Self {
            replies: replies
                .into_iter()
                .map(|(marker, value)| (marker, value.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl ContentProvider for Scripted {
    async fn complete(&self, prompt: &str, _system: Option<&str>) -> Result<String> {
        self.replies
            .iter()
            .find(|(marker, _)| prompt.contains(marker))
            .map(|(_, reply)| format!("```json\n{reply}\n```"))
            .ok_or_else(|| TravelAiError::upstream("scripted", "no reply for prompt"))
    }
}

/// Content that never answers in time
pub struct Stalled;

#[async_trait]
impl ContentProvider for Stalled {
    async fn complete(&self, _prompt: &str, _system: Option<&str>) -> Result<String> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        down()
    }
}

pub fn failing_providers() -> Providers {
    with_content(Arc::new(Unavailable))
}

pub fn with_content(content: Arc<dyn ContentProvider>) -> Providers {
    let unavailable = Arc::new(Unavailable);
    Providers {
        content,
        geocoder: unavailable.clone(),
        weather: unavailable.clone(),
        listings: unavailable.clone(),
        images: unavailable,
    }
}

pub fn generation_config() -> GenerationConfig {
    GenerationConfig::default()
}

pub fn jaipur_request() -> TripRequest {
    serde_json::from_value(serde_json::json!({
        "location": {"destination": "Jaipur", "baseCity": "Delhi"},
        "dates": {"startDate": "2025-11-10", "endDate": "2025-11-12"},
        "travelers": {"count": 2, "adults": 2},
        "budget": {"ceiling": 30000, "currency": "INR"},
        "tripStyle": ["cultural"],
        "preferences": {
            "interests": ["history"],
            "dietaryPreferences": ["vegetarian"],
            "pace": "moderate"
        }
    }))
    .expect("valid request")
}
