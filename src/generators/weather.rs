//! Daily weather: real forecast with generated advisories, simulated otherwise

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use super::{request_structured, trip_details};
use crate::Result;
use crate::models::components::with_fallback;
use crate::models::lenient;
use crate::models::{DailyWeather, TripRequest, WeatherReport};
use crate::providers::Providers;

const SYSTEM: &str = "You are a meteorologist with expertise in global weather patterns. \
Provide realistic weather forecasts based on historical data for the specified location and \
time period. Include temperature ranges, precipitation chances, wind information, and any \
relevant weather advisories.";

const ADVISORY_SYSTEM: &str = "You are a travel meteorologist. Write short, practical advisories \
for travelers based on the forecast data provided. Do not change the forecast values.";

fn simulation_prompt(request: &TripRequest) -> String {
    format!(
        r#"Generate a realistic weather forecast for {destination} from {start} to {end}.

{details}

Return as a structured JSON with the following schema:
{{
  "forecast": [{{
    "date": "YYYY-MM-DD",
    "temperature": {{"min": number, "max": number}},
    "conditions": string,
    "precipitation": {{"probability": number (0-100), "amount": string}},
    "wind": {{"speed": number, "unit": "km/h", "direction": string}},
    "advisory": string
  }}],
  "general_advisory": string
}}
Include one forecast entry per trip day."#,
        destination = request.destination(),
        start = request.dates.start_date,
        end = request.dates.end_date,
        details = trip_details(request),
    )
}

fn advisory_prompt(request: &TripRequest, forecast: &[DailyWeather]) -> String {
    let days: Vec<String> = forecast
        .iter()
        .map(|day| {
            format!(
                "- {}: {}, {:.0}-{:.0} °C, {:.0}% precipitation, wind {:.0} {} {}",
                day.date,
                day.conditions,
                day.temperature.min,
                day.temperature.max,
                day.precipitation.probability,
                day.wind.speed,
                day.wind.unit,
                day.wind.direction,
            )
        })
        .collect();
    format!(
        r#"Forecast for {destination}:
{days}

Trip styles: {styles}. Travelers: {travelers}.

Return JSON:
{{"advisories": [{{"date": "YYYY-MM-DD", "advisory": string}}], "general_advisory": string}}"#,
        destination = request.destination(),
        days = days.join("\n"),
        styles = request.styles_label(),
        travelers = request.travelers_label(),
    )
}

#[derive(Debug, Deserialize)]
struct Advisories {
    #[serde(default)]
    advisories: Vec<DayAdvisory>,
    #[serde(default, deserialize_with = "lenient::string")]
    general_advisory: String,
}

#[derive(Debug, Deserialize)]
struct DayAdvisory {
    date: NaiveDate,
    #[serde(default, deserialize_with = "lenient::string")]
    advisory: String,
}

#[instrument(skip_all, fields(destination = %request.destination()))]
pub async fn generate(providers: &Providers, request: &TripRequest) -> WeatherReport {
    match live_forecast(providers, request).await {
        Ok(report) => {
            info!(days = report.forecast.len(), "Live forecast ready");
            return report;
        }
        Err(err) => warn!(error = %err, "Live forecast unavailable, simulating"),
    }
    let simulated = request_structured::<WeatherReport>(
        providers.content.as_ref(),
        &simulation_prompt(request),
        SYSTEM,
    )
    .await;
    let mut report = with_fallback(simulated, request);
    derive_missing_advisories(&mut report);
    report
}

async fn live_forecast(providers: &Providers, request: &TripRequest) -> Result<WeatherReport> {
    let coordinates = providers.geocoder.geocode(request.destination()).await?;
    let days = u32::try_from(request.duration_days()).unwrap_or(1);
    let forecast = providers
        .weather
        .forecast(coordinates, request.dates.start_date, days)
        .await?;
    if forecast.is_empty() {
        return Err(crate::TravelAiError::upstream("forecast", "no forecast days returned"));
    }
    let mut report = WeatherReport {
        forecast,
        general_advisory: String::new(),
    };

    match request_structured::<Advisories>(
        providers.content.as_ref(),
        &advisory_prompt(request, &report.forecast),
        ADVISORY_SYSTEM,
    )
    .await
    {
        Ok(advisories) => layer_advisories(&mut report, advisories),
        Err(err) => debug!(error = %err, "Advisory generation failed, deriving from data"),
    }
    derive_missing_advisories(&mut report);
    Ok(report)
}

fn layer_advisories(report: &mut WeatherReport, advisories: Advisories) {
    for entry in advisories.advisories {
        if let Some(day) = report.forecast.iter_mut().find(|d| d.date == entry.date)
            && !entry.advisory.trim().is_empty()
        {
            day.advisory = entry.advisory;
        }
    }
    report.general_advisory = advisories.general_advisory;
}

/// Rule of thumb advisory from the raw numbers
fn derive_advisory(day: &DailyWeather) -> String {
    let mut notes = Vec::new();
    if day.precipitation.probability >= 60.0 {
        notes.push("High chance of rain, carry an umbrella and plan indoor alternatives.");
    } else if day.precipitation.probability >= 30.0 {
        notes.push("Possible showers, keep a light rain jacket handy.");
    }
    if day.temperature.max >= 35.0 {
        notes.push("Very hot, stay hydrated and avoid the midday sun.");
    } else if day.temperature.min <= 0.0 {
        notes.push("Freezing temperatures, dress in warm layers.");
    }
    if day.wind.speed >= 40.0 {
        notes.push("Strong winds expected.");
    }
    if notes.is_empty() {
        "Pleasant conditions expected.".to_string()
    } else {
        notes.join(" ")
    }
}

fn derive_missing_advisories(report: &mut WeatherReport) {
    for day in &mut report.forecast {
        if day.advisory.trim().is_empty() {
            day.advisory = derive_advisory(day);
        }
    }
    if report.general_advisory.trim().is_empty() {
        report.general_advisory = "Check the local forecast each morning before heading out.".to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::components::Component;
    use crate::models::request::fixtures::jaipur_request;

    fn day(date: &str, rain: f64, max: f64) -> DailyWeather {
        let mut day = DailyWeather::unavailable(date.parse().unwrap());
        day.advisory = String::new();
        day.precipitation.probability = rain;
        day.temperature.max = max;
        day
    }

    #[test]
    fn test_advisories_layer_onto_matching_days() {
        let mut report = WeatherReport {
            forecast: vec![day("2025-11-10", 10.0, 28.0), day("2025-11-11", 10.0, 28.0)],
            general_advisory: String::new(),
        };
        let advisories: Advisories = serde_json::from_value(serde_json::json!({
            "advisories": [{"date": "2025-11-11", "advisory": "Hazy morning"}],
            "general_advisory": "Dry season"
        }))
        .unwrap();
        layer_advisories(&mut report, advisories);
        derive_missing_advisories(&mut report);
        assert_eq!(report.forecast[0].advisory, "Pleasant conditions expected.");
        assert_eq!(report.forecast[1].advisory, "Hazy morning");
        assert_eq!(report.general_advisory, "Dry season");
    }

    #[test]
    fn test_derived_advisory_mentions_rain_and_heat() {
        let advisory = derive_advisory(&day("2025-06-01", 75.0, 38.0));
        assert!(advisory.contains("rain"));
        assert!(advisory.contains("hot"));
    }

    #[test]
    fn test_fallback_matches_trip_length() {
        let report = WeatherReport::fallback(&jaipur_request());
        assert_eq!(report.forecast.len(), 3);
        assert!(report.forecast.iter().all(|d| d.wind.unit == "km/h"));
    }
}
