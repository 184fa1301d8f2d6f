//! Activity catalog with images and normalized currencies

use futures::future::join_all;
use tracing::{info, instrument};

use super::{request_structured, trip_details};
use crate::models::components::with_fallback;
use crate::models::{Activity, ActivityCatalog, TripRequest};
use crate::providers::{ImageQuery, ImageSearch, Providers};

const SYSTEM: &str = "You are a travel expert with in-depth knowledge of destinations worldwide. \
Provide diverse, interesting, and realistic activity recommendations suitable for the specified \
trip style and traveler preferences. Include accurate location information, costs, and timing \
estimates.";

fn prompt(request: &TripRequest) -> String {
    format!(
        r#"Generate a comprehensive list of activities and things to do in {destination} for a {days}-day trip.

{details}
Interests: {interests}

Provide a diverse range of activities including:
1. Must-see attractions and landmarks
2. Cultural experiences (museums, historical sites, performances)
3. Outdoor activities appropriate for the location
4. Local experiences (markets, festivals, workshops)
5. Hidden gems and off-the-beaten-path options
6. Family-friendly activities if traveling with children

Return as a structured JSON with the following schema:
{{
  "must_see": [{{
    "title": string,
    "type": string,
    "description": string,
    "location": {{"name": string, "coordinates": {{"lat": number, "lng": number}}}},
    "duration": integer (in minutes),
    "cost": {{"currency": "{currency}", "range": string}},
    "priority": integer (1-5, 1 is highest),
    "images": [],
    "booking_link": string,
    "highlights": [string],
    "warnings": [{{"type": string, "message": string, "priority": integer (1-3)}}]
  }}],
  "cultural": [same structure],
  "outdoor": [same structure],
  "local_experiences": [same structure],
  "hidden_gems": [same structure],
  "family_friendly": [same structure]
}}
Leave "images" empty; they are filled in separately."#,
        destination = request.destination(),
        days = request.duration_days(),
        details = trip_details(request),
        interests = request.interests_label(),
        currency = request.currency(),
    )
}

#[instrument(skip_all, fields(destination = %request.destination()))]
pub async fn generate(providers: &Providers, request: &TripRequest) -> ActivityCatalog {
    let generated = request_structured::<ActivityCatalog>(
        providers.content.as_ref(),
        &prompt(request),
        SYSTEM,
    )
    .await;
    let mut catalog = with_fallback(generated, request);
    for activity in catalog.iter_mut() {
        activity.cost.currency = normalize_currency(&activity.cost.currency, request.currency());
    }
    attach_images(providers.images.as_ref(), &mut catalog, request.destination()).await;
    info!(count = catalog.len(), "Activities ready");
    catalog
}

/// Fill missing images through the image chain, all lookups in parallel
pub async fn attach_images(images: &dyn ImageSearch, catalog: &mut ActivityCatalog, destination: &str) {
    let lookups = catalog
        .iter_mut()
        .filter(|activity| activity.images.is_empty())
        .map(|activity| async move {
            let query = image_query(activity, destination);
            if let Ok(Some(url)) = images.search(&query).await {
                activity.images.push(url);
            }
        });
    join_all(lookups).await;
}

fn image_query(activity: &Activity, destination: &str) -> ImageQuery {
    ImageQuery {
        name: activity.title.clone(),
        destination: destination.to_string(),
        coordinates: activity.location.known_coordinates(),
    }
}

/// ISO 4217 code for a currency symbol or alias; unknown or missing values use `fallback`
#[must_use]
pub fn normalize_currency(raw: &str, fallback: &str) -> String {
    let value = raw.trim();
    let lower = value.to_lowercase();
    let mapped = match lower.trim_end_matches('.') {
        "₹" | "rs" | "inr" | "rupee" | "rupees" => Some("INR"),
        "$" | "us$" | "usd" | "dollar" | "dollars" => Some("USD"),
        "€" | "eur" | "euro" | "euros" => Some("EUR"),
        "£" | "gbp" | "pound" | "pounds" => Some("GBP"),
        "¥" | "jpy" | "yen" => Some("JPY"),
        _ => None,
    };
    if let Some(code) = mapped {
        return code.to_string();
    }
    if value.len() == 3 && value.chars().all(|c| c.is_ascii_alphabetic()) {
        return value.to_ascii_uppercase();
    }
    fallback.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Result, TravelAiError};
    use async_trait::async_trait;
    use rstest::rstest;

    #[rstest]
    #[case("₹", "INR")]
    #[case("Rs.", "INR")]
    #[case("$", "USD")]
    #[case("euros", "EUR")]
    #[case("chf", "CHF")]
    #[case("", "INR")]
    #[case("local currency", "INR")]
    fn test_normalize_currency(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_currency(raw, "INR"), expected);
    }

    struct ByName;

    #[async_trait]
    impl ImageSearch for ByName {
        async fn search(&self, query: &ImageQuery) -> Result<Option<String>> {
            match query.name.as_str() {
                "Hawa Mahal" => Ok(Some("https://img/hawa.jpg".to_string())),
                _ => Err(TravelAiError::upstream("images", "not found")),
            }
        }
    }

    #[tokio::test]
    async fn test_attach_images_fills_only_missing() {
        let mut catalog: ActivityCatalog = serde_json::from_value(serde_json::json!({
            "must_see": [
                {"title": "Hawa Mahal"},
                {"title": "Amber Fort", "images": ["https://img/amber.jpg"]},
                {"title": "Unknown Lane"}
            ]
        }))
        .unwrap();
        attach_images(&ByName, &mut catalog, "Jaipur").await;
        assert_eq!(catalog.must_see[0].images, vec!["https://img/hawa.jpg"]);
        assert_eq!(catalog.must_see[1].images, vec!["https://img/amber.jpg"]);
        assert!(catalog.must_see[2].images.is_empty());
    }
}
