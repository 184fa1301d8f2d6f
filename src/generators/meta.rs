//! Journey geometry and resolved endpoint coordinates

use tracing::{debug, info, instrument};

use super::{request_structured, trip_details};
use crate::models::components::with_fallback;
use crate::models::{Coordinates, MetaInfo, TripRequest};
use crate::providers::{Geocoder, Providers};

const SYSTEM: &str = "You are a geographic and trip metadata specialist. Provide accurate meta \
information about the journey including altitudes, distances, coordinates, and elevation \
profiles. Use realistic geographic data.";

fn prompt(request: &TripRequest) -> String {
    format!(
        r#"Generate detailed meta information for a trip from {origin} to {destination}.

{details}

Include the following information:
1. Geographic data (distances, altitudes, coordinates for key locations)
2. Elevation profiles between main points
3. Journey path coordinates
4. Altitude-related advisories if applicable
5. Total trip distance in kilometers

Return as a structured JSON with the following schema:
{{
  "journey_path": {{
    "overview": [{{"lat": number, "lng": number}}],
    "distance_km": number,
    "elevation_profile": [{{"distance": number, "elevation": number}}]
  }},
  "altitude_info": {{"highest_point": number, "lowest_point": number, "advisory": string}},
  "key_coordinates": [{{"name": string, "lat": number, "lng": number, "altitude": number}}]
}}
Include "{origin}" and "{destination}" among key_coordinates."#,
        origin = request.origin(),
        destination = request.destination(),
        details = trip_details(request),
    )
}

/// Meta information with origin and destination coordinates resolved where possible
#[instrument(skip_all, fields(destination = %request.destination()))]
pub async fn generate(providers: &Providers, request: &TripRequest) -> MetaInfo {
    let prompt = prompt(request);
    let (generated, origin, destination) = tokio::join!(
        request_structured::<MetaInfo>(providers.content.as_ref(), &prompt, SYSTEM),
        resolve(providers.geocoder.as_ref(), request.origin()),
        resolve(providers.geocoder.as_ref(), request.destination()),
    );
    let mut meta = with_fallback(generated, request);
    meta.origin = origin.or_else(|| meta.key_coordinate_for(request.origin()));
    meta.destination = destination.or_else(|| meta.key_coordinate_for(request.destination()));
    info!(
        key_points = meta.key_coordinates.len(),
        origin_known = meta.origin.is_some(),
        destination_known = meta.destination.is_some(),
        "Meta information ready"
    );
    meta
}

async fn resolve(geocoder: &dyn Geocoder, place: &str) -> Option<Coordinates> {
    match geocoder.geocode(place).await {
        Ok(coords) if coords.is_known() => Some(coords),
        Ok(_) => None,
        Err(err) => {
            debug!(place, error = %err, "Geocoding failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::request::fixtures::jaipur_request;
    use crate::{Result, TravelAiError};
    use async_trait::async_trait;

    struct Fixed(Option<Coordinates>);

    #[async_trait]
    impl Geocoder for Fixed {
        async fn geocode(&self, _place: &str) -> Result<Coordinates> {
            self.0.ok_or_else(|| TravelAiError::upstream("geocoder", "not found"))
        }
    }

    #[tokio::test]
    async fn test_resolve_ignores_placeholder_and_errors() {
        let jaipur = Coordinates::new(26.9124, 75.7873);
        assert_eq!(resolve(&Fixed(Some(jaipur)), "Jaipur").await, Some(jaipur));
        assert_eq!(resolve(&Fixed(Some(Coordinates::new(0.0, 0.0))), "Jaipur").await, None);
        assert_eq!(resolve(&Fixed(None), "Jaipur").await, None);
    }

    #[test]
    fn test_prompt_names_both_endpoints() {
        let prompt = prompt(&jaipur_request());
        assert!(prompt.starts_with("Generate detailed meta information for a trip from Delhi to Jaipur"));
        assert!(prompt.contains(r#"Include "Delhi" and "Jaipur" among key_coordinates."#));
    }
}
