//! Hotels and restaurants: generated, enriched from listings, then gap-filled

use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use super::{request_structured, trip_details};
use crate::models::components::{GENERIC_AMENITIES, with_fallback};
use crate::models::lenient;
use crate::models::location::maps_search_url;
use crate::models::{Accommodation, AccommodationsAndDining, Dining, GeoLocation, Links, TripRequest};
use crate::providers::{Listing, Providers};

/// Upper bound on entries per list once listings are merged in
const MAX_ENTRIES: usize = 8;

const SYSTEM: &str = "You are a hospitality and culinary expert with extensive knowledge of \
accommodations and dining options worldwide. Provide realistic, diverse, and accurate \
recommendations for accommodations and dining that match the trip style and preferences. \
Include realistic prices, locations, and details for all recommendations.";

const GAP_SYSTEM: &str = "You are a hospitality researcher. Fill in only the requested \
details for the named places.";

fn prompt(request: &TripRequest) -> String {
    format!(
        r#"Generate hotel and restaurant recommendations for {destination}.

{details}
Dietary preferences: {dietary}

Provide recommendations for:
1. Accommodations: a range of options (luxury, mid-range, budget) in different areas, with
   amenities suitable for the travelers, price range, location and key features.
2. Dining options: a variety of cuisines with emphasis on local specialties, a range of price
   points, options that accommodate the dietary preferences, signature dishes.

Return as a structured JSON with the following schema:
{{
  "accommodations": [{{
    "name": string, "type": string,
    "location": {{"name": string, "coordinates": {{"lat": number, "lng": number}}}},
    "price_range": string, "rating": number (1-5),
    "images": [string], "amenities": [string],
    "booking_link": string, "description": string
  }}],
  "dining": [{{
    "name": string, "cuisine": string, "price_range": string,
    "dietary_options": [string], "signature_dishes": [string],
    "location": {{"name": string, "coordinates": {{"lat": number, "lng": number}}}},
    "images": [string], "reservation_link": string, "description": string
  }}]
}}"#,
        destination = request.destination(),
        details = trip_details(request),
        dietary = request.dietary_label(),
    )
}

#[instrument(skip_all, fields(destination = %request.destination()))]
pub async fn generate(providers: &Providers, request: &TripRequest) -> AccommodationsAndDining {
    let generated = request_structured::<AccommodationsAndDining>(
        providers.content.as_ref(),
        &prompt(request),
        SYSTEM,
    )
    .await;
    let mut result = with_fallback(generated, request);

    let (hotels, restaurants) = fetch_listings(providers, request.destination()).await;
    merge_hotels(&mut result.accommodations, hotels);
    merge_restaurants(&mut result.dining, restaurants);

    if has_gaps(&result) {
        fill_gaps(providers, request, &mut result).await;
    }
    finalize(&mut result, request.destination());

    info!(
        accommodations = result.accommodations.len(),
        dining = result.dining.len(),
        "Accommodations and dining ready"
    );
    result
}

async fn fetch_listings(providers: &Providers, destination: &str) -> (Vec<Listing>, Vec<Listing>) {
    let center = match providers.geocoder.geocode(destination).await {
        Ok(coords) if coords.is_known() => coords,
        Ok(_) => return (Vec::new(), Vec::new()),
        Err(err) => {
            debug!(error = %err, "No coordinates for listing lookup");
            return (Vec::new(), Vec::new());
        }
    };
    let (hotels, restaurants) = tokio::join!(
        providers.listings.hotels(center),
        providers.listings.restaurants(center)
    );
    let unwrap = |result: crate::Result<Vec<Listing>>, kind: &str| {
        result.unwrap_or_else(|err| {
            warn!(kind, error = %err, "Listing lookup failed");
            Vec::new()
        })
    };
    (unwrap(hotels, "hotels"), unwrap(restaurants, "restaurants"))
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

fn listing_location(listing: &Listing) -> GeoLocation {
    GeoLocation {
        name: listing.name.clone(),
        coordinates: listing.coordinates,
        ..GeoLocation::default()
    }
}

/// Enrich matching hotels from listings and append unmatched listings up to the cap
pub fn merge_hotels(accommodations: &mut Vec<Accommodation>, listings: Vec<Listing>) {
    for listing in listings {
        if let Some(existing) = accommodations.iter_mut().find(|a| same_name(&a.name, &listing.name)) {
            if existing.location.known_coordinates().is_none() {
                existing.location.coordinates = listing.coordinates;
            }
            if existing.amenities.is_empty() {
                existing.amenities = listing.amenities;
            }
            if existing.links.is_empty() {
                existing.links.link = listing.link;
            }
        } else if accommodations.len() < MAX_ENTRIES {
            accommodations.push(Accommodation {
                accommodation_type: "hotel".to_string(),
                location: listing_location(&listing),
                price_range: String::new(),
                rating: None,
                images: Vec::new(),
                amenities: listing.amenities,
                links: Links {
                    link: listing.link,
                    ..Links::default()
                },
                description: None,
                name: listing.name,
            });
        }
    }
}

/// Enrich matching restaurants from listings and append unmatched listings up to the cap
pub fn merge_restaurants(dining: &mut Vec<Dining>, listings: Vec<Listing>) {
    for listing in listings {
        if let Some(existing) = dining.iter_mut().find(|d| same_name(&d.name, &listing.name)) {
            if existing.location.known_coordinates().is_none() {
                existing.location.coordinates = listing.coordinates;
            }
            if existing.cuisine.trim().is_empty() {
                existing.cuisine = listing.cuisine.unwrap_or_default();
            }
            if existing.links.is_empty() {
                existing.links.link = listing.link;
            }
        } else if dining.len() < MAX_ENTRIES {
            dining.push(Dining {
                cuisine: listing.cuisine.clone().unwrap_or_else(|| "Local".to_string()),
                price_range: String::new(),
                dietary_options: Vec::new(),
                signature_dishes: Vec::new(),
                location: listing_location(&listing),
                images: Vec::new(),
                links: Links {
                    link: listing.link,
                    ..Links::default()
                },
                description: None,
                name: listing.name,
            });
        }
    }
}

fn has_gaps(result: &AccommodationsAndDining) -> bool {
    result
        .accommodations
        .iter()
        .any(|a| a.amenities.is_empty() || a.links.is_empty())
        || result.dining.iter().any(|d| d.links.is_empty())
}

#[derive(Debug, Deserialize, Default)]
struct GapFill {
    #[serde(default)]
    accommodations: Vec<GapEntry>,
    #[serde(default)]
    dining: Vec<GapEntry>,
}

#[derive(Debug, Deserialize)]
struct GapEntry {
    #[serde(default, deserialize_with = "lenient::string")]
    name: String,
    #[serde(default, deserialize_with = "lenient::string_list")]
    amenities: Vec<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    link: Option<String>,
}

fn gap_prompt(result: &AccommodationsAndDining, destination: &str) -> String {
    let hotels: Vec<&str> = result
        .accommodations
        .iter()
        .filter(|a| a.amenities.is_empty() || a.links.is_empty())
        .map(|a| a.name.as_str())
        .collect();
    let restaurants: Vec<&str> = result
        .dining
        .iter()
        .filter(|d| d.links.is_empty())
        .map(|d| d.name.as_str())
        .collect();
    format!(
        r#"For these places in {destination}, list typical amenities (hotels only) and an official website or booking page URL.
Hotels: {hotels}
Restaurants: {restaurants}

Return JSON:
{{"accommodations": [{{"name": string, "amenities": [string], "link": string}}],
  "dining": [{{"name": string, "link": string}}]}}"#,
        hotels = serde_json::to_string(&hotels).unwrap_or_default(),
        restaurants = serde_json::to_string(&restaurants).unwrap_or_default(),
    )
}

/// One narrowly scoped call for amenities and links the listings did not supply
async fn fill_gaps(providers: &Providers, request: &TripRequest, result: &mut AccommodationsAndDining) {
    let prompt = gap_prompt(result, request.destination());
    let fill = match request_structured::<GapFill>(providers.content.as_ref(), &prompt, GAP_SYSTEM).await
    {
        Ok(fill) => fill,
        Err(err) => {
            debug!(error = %err, "Gap fill failed");
            return;
        }
    };
    apply_gap_fill(result, fill);
}

fn apply_gap_fill(result: &mut AccommodationsAndDining, fill: GapFill) {
    for entry in fill.accommodations {
        if let Some(hotel) = result.accommodations.iter_mut().find(|a| same_name(&a.name, &entry.name)) {
            if hotel.amenities.is_empty() {
                hotel.amenities = entry.amenities;
            }
            if hotel.links.is_empty() {
                hotel.links.link = entry.link;
            }
        }
    }
    for entry in fill.dining {
        if let Some(restaurant) = result.dining.iter_mut().find(|d| same_name(&d.name, &entry.name)) {
            if restaurant.links.is_empty() {
                restaurant.links.link = entry.link;
            }
        }
    }
}

/// Last resort: generic amenities and a map search link
pub fn finalize(result: &mut AccommodationsAndDining, destination: &str) {
    let search_link = |name: &str, location: &GeoLocation| {
        let area = if location.name.trim().is_empty() || same_name(&location.name, name) {
            destination
        } else {
            location.name.as_str()
        };
        maps_search_url(&format!("{name} {area}"))
    };
    for hotel in &mut result.accommodations {
        if hotel.amenities.is_empty() {
            hotel.amenities = GENERIC_AMENITIES.iter().map(ToString::to_string).collect();
        }
        if hotel.links.is_empty() {
            hotel.links.link = Some(search_link(&hotel.name, &hotel.location));
        }
    }
    for restaurant in &mut result.dining {
        if restaurant.links.is_empty() {
            restaurant.links.link = Some(search_link(&restaurant.name, &restaurant.location));
        }
    }
}
