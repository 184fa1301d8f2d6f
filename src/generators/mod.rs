//! Component generators
//!
//! Each generator prompts the content provider for one slice of the trip,
//! optionally enriches it from auxiliary providers, and never fails: on any
//! error it logs and returns the component's fallback.

pub mod accommodations;
pub mod activities;
pub mod essentials;
pub mod meta;
pub mod transport;
pub mod weather;

use serde::de::DeserializeOwned;

use crate::Result;
use crate::models::TripRequest;
use crate::normalize::parse_as;
use crate::providers::ContentProvider;

const JSON_ONLY_INSTRUCTION: &str = "You must respond with valid, properly formatted JSON only. \
No explanations, comments, or text outside the JSON structure.";

const JSON_ONLY_SUFFIX: &str = "\n\nOutput must be valid JSON without any commentary, \
markdown formatting, or code block syntax.";

/// Ask for JSON and parse the reply into `T`
pub async fn request_structured<T: DeserializeOwned>(
    content: &dyn ContentProvider,
    prompt: &str,
    system_instruction: &str,
) -> Result<T> {
    let system = format!("{}\n\n{JSON_ONLY_INSTRUCTION}", system_instruction.trim());
    let prompt = format!("{}{JSON_ONLY_SUFFIX}", prompt.trim());
    let reply = content.complete(&prompt, Some(&system)).await?;
    parse_as(&reply)
}

/// Trip facts shared by most prompts
pub(crate) fn trip_details(request: &TripRequest) -> String {
    format!(
        "Trip details:\n\
         - Trip dates: {} to {} (Duration: {} days)\n\
         - Trip styles: {}\n\
         - Number of travelers: {}\n\
         - Pace preference: {}\n\
         - Budget: {}\n\n\
         Additional preferences:\n{}",
        request.dates.start_date,
        request.dates.end_date,
        request.duration_days(),
        request.styles_label(),
        request.travelers_label(),
        request.preferences.pace,
        request.budget_label(),
        request.context_label(),
    )
}
