//! Travel documents, emergency contacts and the trip name

use tracing::{info, instrument};

use super::{request_structured, trip_details};
use crate::models::components::with_fallback;
use crate::models::{EssentialInfo, TripName, TripRequest};
use crate::providers::Providers;

const ESSENTIALS_SYSTEM: &str = "You are a travel advisor. List the travel documents and local \
emergency contacts a visitor needs. Be accurate and concise.";

const NAME_SYSTEM: &str = "You are a creative travel copywriter. Write short, evocative trip \
titles.";

fn essentials_prompt(request: &TripRequest) -> String {
    format!(
        r#"What essential information does a traveler from {origin} need for a trip to {destination}?

{details}

Return JSON:
{{
  "documents": [string],
  "emergency_contacts": [{{"type": string, "number": string}}]
}}"#,
        origin = request.origin(),
        destination = request.destination(),
        details = trip_details(request),
    )
}

fn name_prompt(request: &TripRequest) -> String {
    format!(
        r#"Create a catchy name of at most six words for a {days}-day {styles} trip to {destination}.

Return JSON: {{"trip_name": string}}"#,
        days = request.duration_days(),
        styles = request.styles_label(),
        destination = request.destination(),
    )
}

#[instrument(skip_all, fields(destination = %request.destination()))]
pub async fn essential_info(providers: &Providers, request: &TripRequest) -> EssentialInfo {
    let generated = request_structured::<EssentialInfo>(
        providers.content.as_ref(),
        &essentials_prompt(request),
        ESSENTIALS_SYSTEM,
    )
    .await;
    let info = with_fallback(generated, request);
    if info.is_empty() {
        return EssentialInfo::standard();
    }
    info!(
        documents = info.documents.len(),
        contacts = info.emergency_contacts.len(),
        "Essential info ready"
    );
    info
}

#[instrument(skip_all, fields(destination = %request.destination()))]
pub async fn trip_name(providers: &Providers, request: &TripRequest) -> TripName {
    let generated = request_structured::<TripName>(
        providers.content.as_ref(),
        &name_prompt(request),
        NAME_SYSTEM,
    )
    .await;
    let name = with_fallback(generated, request);
    if name.trip_name.trim().is_empty() {
        return <TripName as crate::models::Component>::fallback(request);
    }
    name
}
