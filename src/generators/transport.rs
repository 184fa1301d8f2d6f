//! Transport options to and around the destination

use tracing::{info, instrument};

use super::{request_structured, trip_details};
use crate::models::components::with_fallback;
use crate::models::{Links, TransportOptions, TripRequest};
use crate::providers::Providers;

const SYSTEM: &str = "You are a transportation specialist with expertise in global travel \
options. Provide realistic and accurate transport options with details like costs, durations, \
and operators. Use realistic travel times, prices, and schedules.";

fn prompt(request: &TripRequest) -> String {
    format!(
        r#"Generate realistic transportation options for a trip from {origin} to {destination}.

{details}

Provide detailed transportation options including:
1. Main transportation to the destination (flights, trains, buses, etc.)
2. Local transportation options at the destination
3. Airport/station transfers if applicable
4. Recommended transportation between points of interest

Return as a structured JSON with the following schema:
{{
  "main_transport": [{{
    "mode": string (flight, train, bus, car, etc.),
    "from": string, "to": string,
    "departure_time": string, "arrival_time": string,
    "duration": integer (in minutes),
    "operator": string,
    "cost": {{"currency": "{currency}", "range": string, "per_unit": string}},
    "booking_link": string,
    "details": string
  }}],
  "local_transport": [{{
    "mode": string, "area": string,
    "cost": {{"currency": "{currency}", "range": string, "per_unit": string}},
    "details": string
  }}],
  "transfers": [{{
    "from": string, "to": string, "mode": string, "duration": integer,
    "cost": {{"currency": "{currency}", "range": string}}
  }}],
  "route_transport": [{{
    "from": string, "to": string, "recommended_mode": string,
    "duration": integer, "details": string
  }}]
}}"#,
        origin = request.origin(),
        destination = request.destination(),
        currency = request.currency(),
        details = trip_details(request),
    )
}

/// Search links for the common ways of reaching `destination` from `origin`
#[derive(Debug, Clone, PartialEq)]
pub struct TransportLinks {
    pub flights: String,
    pub trains: String,
    pub buses: String,
    pub rentals: String,
}

impl TransportLinks {
    #[must_use]
    pub fn new(origin: &str, destination: &str) -> Self {
        let from = urlencoding::encode(origin.trim());
        let to = urlencoding::encode(destination.trim());
        Self {
            flights: format!("https://www.google.com/travel/flights?q={from}+to+{to}"),
            trains: format!("https://www.thetrainline.com/search/{from}/{to}"),
            buses: format!("https://www.flixbus.com/route/{from}/{to}"),
            rentals: format!("https://www.rentalcars.com/search/?locationName={to}"),
        }
    }

    /// Link matching a transport mode; anything unrecognized is treated as a drive
    #[must_use]
    pub fn for_mode(&self, mode: &str) -> &str {
        let mode = mode.to_lowercase();
        if mode.contains("flight") || mode.contains("air") || mode.contains("plane") {
            &self.flights
        } else if mode.contains("train") || mode.contains("rail") {
            &self.trains
        } else if mode.contains("bus") || mode.contains("coach") {
            &self.buses
        } else {
            &self.rentals
        }
    }
}

#[instrument(skip_all, fields(destination = %request.destination()))]
pub async fn generate(providers: &Providers, request: &TripRequest) -> TransportOptions {
    let generated = request_structured::<TransportOptions>(
        providers.content.as_ref(),
        &prompt(request),
        SYSTEM,
    )
    .await;
    let mut transport = with_fallback(generated, request);
    add_search_links(&mut transport, request);
    info!(
        main = transport.main_transport.len(),
        local = transport.local_transport.len(),
        "Transport options ready"
    );
    transport
}

/// Give main transport entries without any link a search link for their mode
pub fn add_search_links(transport: &mut TransportOptions, request: &TripRequest) {
    for entry in &mut transport.main_transport {
        if entry.links.is_empty() {
            let from = if entry.from.trim().is_empty() { request.origin() } else { entry.from.as_str() };
            let to = if entry.to.trim().is_empty() { request.destination() } else { entry.to.as_str() };
            let links = TransportLinks::new(from, to);
            entry.links = Links::to(links.for_mode(&entry.mode));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::request::fixtures::jaipur_request;
    use rstest::rstest;

    #[rstest]
    #[case("Flight", "https://www.google.com/travel/flights?q=New%20Delhi+to+Jaipur")]
    #[case("train", "https://www.thetrainline.com/search/New%20Delhi/Jaipur")]
    #[case("Volvo bus", "https://www.flixbus.com/route/New%20Delhi/Jaipur")]
    #[case("car", "https://www.rentalcars.com/search/?locationName=Jaipur")]
    fn test_links_by_mode(#[case] mode: &str, #[case] expected: &str) {
        let links = TransportLinks::new("New Delhi", "Jaipur");
        assert_eq!(links.for_mode(mode), expected);
    }

    #[test]
    fn test_existing_links_are_kept() {
        let request = jaipur_request();
        let mut transport: TransportOptions = serde_json::from_value(serde_json::json!({
            "main_transport": [
                {"mode": "train", "booking_link": "https://irctc.example"},
                {"mode": "bus"}
            ]
        }))
        .unwrap();
        add_search_links(&mut transport, &request);
        assert_eq!(
            transport.main_transport[0].links.booking_link.as_deref(),
            Some("https://irctc.example")
        );
        assert_eq!(
            transport.main_transport[1].links.url(),
            Some("https://www.flixbus.com/route/Delhi/Jaipur")
        );
    }
}
