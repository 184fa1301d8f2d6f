//! Open-Meteo geocoding and daily forecast (no API key required)

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use reqwest_middleware::ClientWithMiddleware;
use tracing::{debug, instrument};

use super::{Geocoder, WeatherProvider};
use crate::config::ProvidersConfig;
use crate::models::Coordinates;
use crate::models::components::{DailyWeather, Precipitation, Wind};
use crate::models::itinerary::TemperatureRange;
use crate::{Result, TravelAiError};

const PROVIDER: &str = "open-meteo";
const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,precipitation_sum,\
precipitation_probability_max,windspeed_10m_max,winddirection_10m_dominant,weathercode";

pub struct OpenMeteo {
    client: ClientWithMiddleware,
    geocoding_base_url: String,
    forecast_base_url: String,
}

impl OpenMeteo {
    pub fn new(client: ClientWithMiddleware, config: &ProvidersConfig) -> Self {
        Self {
            client,
            geocoding_base_url: config.geocoding_base_url.trim_end_matches('/').to_string(),
            forecast_base_url: config.forecast_base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: String) -> Result<T> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TravelAiError::upstream(PROVIDER, format!("HTTP {status}")));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl Geocoder for OpenMeteo {
    #[instrument(skip(self))]
    async fn geocode(&self, place: &str) -> Result<Coordinates> {
        let url = format!(
            "{}/search?name={}&count=1&language=en&format=json",
            self.geocoding_base_url,
            urlencoding::encode(place.trim())
        );
        let response: openmeteo::GeocodingResponse = self.get(url).await?;
        let found = response
            .results
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| TravelAiError::upstream(PROVIDER, format!("No match for '{place}'")))?;
        debug!(name = %found.name, country = ?found.country, "Geocoded");
        Ok(Coordinates::new(found.latitude, found.longitude))
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteo {
    #[instrument(skip(self))]
    async fn forecast(
        &self,
        location: Coordinates,
        start: NaiveDate,
        days: u32,
    ) -> Result<Vec<DailyWeather>> {
        let end = start
            .checked_add_days(Days::new(u64::from(days.saturating_sub(1))))
            .ok_or_else(|| TravelAiError::validation("Forecast range out of bounds"))?;
        let url = format!(
            "{}/forecast?latitude={}&longitude={}&daily={DAILY_FIELDS}&timezone=auto&start_date={start}&end_date={end}",
            self.forecast_base_url, location.lat, location.lng
        );
        let response: openmeteo::ForecastResponse = self.get(url).await?;
        let daily = response
            .daily
            .ok_or_else(|| TravelAiError::upstream(PROVIDER, "Forecast had no daily data"))?;
        let forecast = daily.into_days();
        if forecast.is_empty() {
            return Err(TravelAiError::upstream(PROVIDER, "Forecast was empty"));
        }
        Ok(forecast)
    }
}

/// Eight-point compass name for a bearing in degrees
#[must_use]
pub fn compass_direction(degrees: f64) -> &'static str {
    const POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
    let index = ((degrees.rem_euclid(360.0) + 22.5) / 45.0) as usize % 8;
    POINTS[index]
}

/// `OpenMeteo` API response structures and conversion utilities
mod openmeteo {
    use super::{DailyWeather, Precipitation, TemperatureRange, Wind, compass_direction};
    use chrono::NaiveDate;
    use serde::Deserialize;

    /// Daily forecast response from `OpenMeteo`
    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        pub daily: Option<DailyData>,
    }

    /// Daily weather data from `OpenMeteo`
    #[derive(Debug, Deserialize)]
    pub struct DailyData {
        pub time: Vec<NaiveDate>,
        #[serde(rename = "temperature_2m_max")]
        pub temperature_max: Option<Vec<Option<f64>>>,
        #[serde(rename = "temperature_2m_min")]
        pub temperature_min: Option<Vec<Option<f64>>>,
        #[serde(rename = "windspeed_10m_max")]
        pub wind_speed_max: Option<Vec<Option<f64>>>,
        #[serde(rename = "winddirection_10m_dominant")]
        pub wind_direction: Option<Vec<Option<f64>>>,
        #[serde(rename = "precipitation_sum")]
        pub precipitation: Option<Vec<Option<f64>>>,
        #[serde(rename = "precipitation_probability_max")]
        pub precipitation_probability: Option<Vec<Option<f64>>>,
        #[serde(rename = "weathercode")]
        pub weather_code: Option<Vec<Option<u8>>>,
    }

    /// Geocoding response from `OpenMeteo`
    #[derive(Debug, Deserialize)]
    pub struct GeocodingResponse {
        pub results: Option<Vec<GeocodingResult>>,
    }

    #[derive(Debug, Deserialize)]
    pub struct GeocodingResult {
        pub name: String,
        pub latitude: f64,
        pub longitude: f64,
        pub country: Option<String>,
    }

    fn at<T: Copy>(series: Option<&Vec<Option<T>>>, index: usize) -> Option<T> {
        series.and_then(|values| values.get(index).copied().flatten())
    }

    impl DailyData {
        pub fn into_days(self) -> Vec<DailyWeather> {
            self.time
                .iter()
                .enumerate()
                .map(|(i, date)| {
                    let default_range = TemperatureRange::default();
                    let precipitation = at(self.precipitation.as_ref(), i);
                    DailyWeather {
                        date: *date,
                        temperature: TemperatureRange {
                            min: at(self.temperature_min.as_ref(), i).unwrap_or(default_range.min),
                            max: at(self.temperature_max.as_ref(), i).unwrap_or(default_range.max),
                        },
                        conditions: at(self.weather_code.as_ref(), i)
                            .map_or("Unknown", weather_code_to_description)
                            .to_string(),
                        precipitation: Precipitation {
                            probability: at(self.precipitation_probability.as_ref(), i)
                                .unwrap_or_default(),
                            amount: precipitation
                                .map_or_else(|| "Unknown".to_string(), |mm| format!("{mm:.1} mm")),
                        },
                        wind: Wind {
                            speed: at(self.wind_speed_max.as_ref(), i).unwrap_or_default(),
                            unit: "km/h".to_string(),
                            direction: at(self.wind_direction.as_ref(), i)
                                .map_or("Unknown", compass_direction)
                                .to_string(),
                        },
                        advisory: String::new(),
                    }
                })
                .collect()
        }
    }

    /// Convert `OpenMeteo` weather code to human-readable description
    #[must_use]
    pub fn weather_code_to_description(code: u8) -> &'static str {
        match code {
            0 => "Clear sky",
            1 => "Mainly clear",
            2 => "Partly cloudy",
            3 => "Overcast",
            45 | 48 => "Fog",
            51 | 53 | 55 => "Drizzle",
            56 | 57 => "Freezing drizzle",
            61 => "Slight rain",
            63 => "Moderate rain",
            65 => "Heavy rain",
            66 | 67 => "Freezing rain",
            71 | 73 | 75 | 77 => "Snow",
            80..=82 => "Rain showers",
            85 | 86 => "Snow showers",
            95 => "Thunderstorm",
            96 | 99 => "Thunderstorm with hail",
            _ => "Unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, "N")]
    #[case(350.0, "N")]
    #[case(44.0, "NE")]
    #[case(180.0, "S")]
    #[case(275.0, "W")]
    #[case(-90.0, "W")]
    fn test_compass_direction(#[case] degrees: f64, #[case] expected: &str) {
        assert_eq!(compass_direction(degrees), expected);
    }

    #[test]
    fn test_daily_data_conversion() {
        let response: openmeteo::ForecastResponse = serde_json::from_value(serde_json::json!({
            "daily": {
                "time": ["2025-11-10", "2025-11-11"],
                "temperature_2m_max": [29.1, null],
                "temperature_2m_min": [14.2, 15.0],
                "precipitation_sum": [0.0, 2.46],
                "precipitation_probability_max": [5, 60],
                "windspeed_10m_max": [11.5, 20.0],
                "winddirection_10m_dominant": [270, 90],
                "weathercode": [0, 63]
            }
        }))
        .unwrap();
        let days = response.daily.unwrap().into_days();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].conditions, "Clear sky");
        assert_eq!(days[0].wind.direction, "W");
        assert_eq!(days[1].temperature.max, 25.0);
        assert_eq!(days[1].precipitation.amount, "2.5 mm");
        assert_eq!(days[1].precipitation.probability, 60.0);
        assert_eq!(days[1].conditions, "Moderate rain");
    }
}
