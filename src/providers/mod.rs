//! External collaborators: the content model and the auxiliary data sources
//!
//! Each collaborator is an object-safe async trait so generators can be
//! exercised against fakes. [`Providers`] bundles one implementation of each.

pub mod gemini;
pub mod images;
pub mod open_meteo;
pub mod overpass;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::config::AventraConfig;
use crate::http::build_client;
use crate::models::{Coordinates, DailyWeather};
use crate::{Result, TravelAiError};

/// Generative text service
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Complete `prompt`, optionally steered by a system instruction
    async fn complete(&self, prompt: &str, system_instruction: Option<&str>) -> Result<String>;
}

/// Place name to coordinates
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, place: &str) -> Result<Coordinates>;
}

/// Daily forecast starting at `start` for `days` days
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn forecast(
        &self,
        location: Coordinates,
        start: NaiveDate,
        days: u32,
    ) -> Result<Vec<DailyWeather>>;
}

/// A hotel or restaurant found in a listing database
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Listing {
    pub name: String,
    pub coordinates: Option<Coordinates>,
    pub amenities: Vec<String>,
    pub cuisine: Option<String>,
    pub link: Option<String>,
}

/// Hotels and restaurants around a point
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn hotels(&self, near: Coordinates) -> Result<Vec<Listing>>;
    async fn restaurants(&self, near: Coordinates) -> Result<Vec<Listing>>;
}

/// What an image is wanted for
#[derive(Debug, Clone, PartialEq)]
pub struct ImageQuery {
    pub name: String,
    pub destination: String,
    pub coordinates: Option<Coordinates>,
}

impl ImageQuery {
    /// Free-text form, "name destination"
    #[must_use]
    pub fn text(&self) -> String {
        format!("{} {}", self.name, self.destination).trim().to_string()
    }
}

/// Image URL lookup; `Ok(None)` when the source has nothing
#[async_trait]
pub trait ImageSearch: Send + Sync {
    async fn search(&self, query: &ImageQuery) -> Result<Option<String>>;
}

/// Image sources tried in order; the first non-empty URL wins
pub struct ImageChain {
    sources: Vec<Arc<dyn ImageSearch>>,
}

impl ImageChain {
    #[must_use]
    pub fn new(sources: Vec<Arc<dyn ImageSearch>>) -> Self {
        Self { sources }
    }
}

#[async_trait]
impl ImageSearch for ImageChain {
    async fn search(&self, query: &ImageQuery) -> Result<Option<String>> {
        for source in &self.sources {
            match source.search(query).await {
                Ok(Some(url)) if !url.trim().is_empty() => return Ok(Some(url)),
                Ok(_) => {}
                Err(err) => debug!(query = %query.name, error = %err, "Image source failed"),
            }
        }
        Ok(None)
    }
}

/// Wraps a collaborator so every call holds a permit of a shared semaphore
pub struct Throttled<T: ?Sized> {
    inner: Arc<T>,
    permits: Arc<Semaphore>,
}

impl<T: ?Sized> Throttled<T> {
    pub fn new(inner: Arc<T>, permits: Arc<Semaphore>) -> Self {
        Self { inner, permits }
    }

    async fn permit(&self) -> Result<tokio::sync::SemaphorePermit<'_>> {
        self.permits
            .acquire()
            .await
            .map_err(|_| TravelAiError::upstream("throttle", "provider pool is shut down"))
    }
}

#[async_trait]
impl<T: ContentProvider + ?Sized> ContentProvider for Throttled<T> {
    async fn complete(&self, prompt: &str, system_instruction: Option<&str>) -> Result<String> {
        let _permit = self.permit().await?;
        self.inner.complete(prompt, system_instruction).await
    }
}

#[async_trait]
impl<T: Geocoder + ?Sized> Geocoder for Throttled<T> {
    async fn geocode(&self, place: &str) -> Result<Coordinates> {
        let _permit = self.permit().await?;
        self.inner.geocode(place).await
    }
}

#[async_trait]
impl<T: WeatherProvider + ?Sized> WeatherProvider for Throttled<T> {
    async fn forecast(
        &self,
        location: Coordinates,
        start: NaiveDate,
        days: u32,
    ) -> Result<Vec<DailyWeather>> {
        let _permit = self.permit().await?;
        self.inner.forecast(location, start, days).await
    }
}

#[async_trait]
impl<T: ListingSource + ?Sized> ListingSource for Throttled<T> {
    async fn hotels(&self, near: Coordinates) -> Result<Vec<Listing>> {
        let _permit = self.permit().await?;
        self.inner.hotels(near).await
    }

    async fn restaurants(&self, near: Coordinates) -> Result<Vec<Listing>> {
        let _permit = self.permit().await?;
        self.inner.restaurants(near).await
    }
}

#[async_trait]
impl<T: ImageSearch + ?Sized> ImageSearch for Throttled<T> {
    async fn search(&self, query: &ImageQuery) -> Result<Option<String>> {
        let _permit = self.permit().await?;
        self.inner.search(query).await
    }
}

/// One implementation of every collaborator
#[derive(Clone)]
pub struct Providers {
    pub content: Arc<dyn ContentProvider>,
    pub geocoder: Arc<dyn Geocoder>,
    pub weather: Arc<dyn WeatherProvider>,
    pub listings: Arc<dyn ListingSource>,
    pub images: Arc<dyn ImageSearch>,
}

impl Providers {
    /// Production providers built from configuration
    pub fn from_config(config: &AventraConfig) -> Result<Self> {
        let content_client = build_client(config.content.timeout(), config.content.max_retries)?;
        let aux_client = build_client(config.providers.timeout(), config.providers.max_retries)?;
        let open_meteo = Arc::new(open_meteo::OpenMeteo::new(
            aux_client.clone(),
            &config.providers,
        ));
        let images = ImageChain::new(vec![
            Arc::new(images::CommonsGeoSearch::new(
                aux_client.clone(),
                &config.providers.commons_url,
            )),
            Arc::new(images::WikipediaPageImage::new(
                aux_client.clone(),
                &config.providers.wikipedia_url,
            )),
            Arc::new(images::Openverse::new(
                aux_client.clone(),
                &config.providers.openverse_url,
            )),
        ]);
        Ok(Self {
            content: Arc::new(gemini::GeminiProvider::new(content_client, &config.content)),
            geocoder: open_meteo.clone(),
            weather: open_meteo,
            listings: Arc::new(overpass::Overpass::new(
                aux_client,
                &config.providers.overpass_url,
            )),
            images: Arc::new(images),
        })
    }

    /// Same providers with every call bounded by `permits`
    #[must_use]
    pub fn throttled(self, permits: &Arc<Semaphore>) -> Self {
        Self {
            content: Arc::new(Throttled::new(self.content, permits.clone())),
            geocoder: Arc::new(Throttled::new(self.geocoder, permits.clone())),
            weather: Arc::new(Throttled::new(self.weather, permits.clone())),
            listings: Arc::new(Throttled::new(self.listings, permits.clone())),
            images: Arc::new(Throttled::new(self.images, permits.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Option<&'static str>);

    #[async_trait]
    impl ImageSearch for Fixed {
        async fn search(&self, _query: &ImageQuery) -> Result<Option<String>> {
            Ok(self.0.map(str::to_string))
        }
    }

    struct Broken;

    #[async_trait]
    impl ImageSearch for Broken {
        async fn search(&self, _query: &ImageQuery) -> Result<Option<String>> {
            Err(TravelAiError::upstream("images", "down"))
        }
    }

    fn query() -> ImageQuery {
        ImageQuery {
            name: "Hawa Mahal".to_string(),
            destination: "Jaipur".to_string(),
            coordinates: None,
        }
    }

    #[tokio::test]
    async fn test_image_chain_first_non_empty_wins() {
        let chain = ImageChain::new(vec![
            Arc::new(Broken),
            Arc::new(Fixed(Some(" "))),
            Arc::new(Fixed(Some("https://img/2"))),
            Arc::new(Fixed(Some("https://img/3"))),
        ]);
        assert_eq!(
            chain.search(&query()).await.unwrap().as_deref(),
            Some("https://img/2")
        );
    }

    #[tokio::test]
    async fn test_image_chain_empty_when_nothing_found() {
        let chain = ImageChain::new(vec![Arc::new(Broken), Arc::new(Fixed(None))]);
        assert!(chain.search(&query()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_closed_semaphore_rejects_calls() {
        let permits = Arc::new(Semaphore::new(1));
        let images = Throttled::new(Arc::new(Fixed(Some("https://img"))) as Arc<dyn ImageSearch>, permits.clone());
        assert!(images.search(&query()).await.unwrap().is_some());
        permits.close();
        assert!(images.search(&query()).await.is_err());
    }
}
