//! Image lookup sources: Wikimedia Commons geosearch, Wikipedia page images, Openverse

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

use super::{ImageQuery, ImageSearch};
use crate::{Result, TravelAiError};

const THUMB_WIDTH: u32 = 800;
const GEOSEARCH_RADIUS_M: u32 = 1000;

async fn fetch<T: DeserializeOwned>(
    client: &ClientWithMiddleware,
    provider: &str,
    url: String,
) -> Result<T> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(TravelAiError::upstream(provider, format!("HTTP {status}")));
    }
    Ok(response.json().await?)
}

/// File pages near the venue's coordinates on Wikimedia Commons
pub struct CommonsGeoSearch {
    client: ClientWithMiddleware,
    url: String,
}

impl CommonsGeoSearch {
    pub fn new(client: ClientWithMiddleware, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl ImageSearch for CommonsGeoSearch {
    #[instrument(skip_all, fields(name = %query.name))]
    async fn search(&self, query: &ImageQuery) -> Result<Option<String>> {
        let Some(coords) = query.coordinates.filter(|c| c.is_known()) else {
            return Ok(None);
        };
        let url = format!(
            "{}?action=query&generator=geosearch&ggscoord={}%7C{}&ggsradius={GEOSEARCH_RADIUS_M}\
&ggslimit=5&ggsnamespace=6&prop=imageinfo&iiprop=url&iiurlwidth={THUMB_WIDTH}&format=json",
            self.url, coords.lat, coords.lng
        );
        let body: wiki::QueryResponse = fetch(&self.client, "wikimedia-commons", url).await?;
        Ok(body.first_image())
    }
}

/// Lead image of the Wikipedia article titled like the venue
pub struct WikipediaPageImage {
    client: ClientWithMiddleware,
    url: String,
}

impl WikipediaPageImage {
    pub fn new(client: ClientWithMiddleware, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl ImageSearch for WikipediaPageImage {
    #[instrument(skip_all, fields(name = %query.name))]
    async fn search(&self, query: &ImageQuery) -> Result<Option<String>> {
        if query.name.trim().is_empty() {
            return Ok(None);
        }
        let url = format!(
            "{}?action=query&titles={}&prop=pageimages&pithumbsize={THUMB_WIDTH}&redirects=1&format=json",
            self.url,
            urlencoding::encode(query.name.trim())
        );
        let body: wiki::QueryResponse = fetch(&self.client, "wikipedia", url).await?;
        Ok(body.first_image())
    }
}

/// Openly licensed images matching free text
pub struct Openverse {
    client: ClientWithMiddleware,
    url: String,
}

impl Openverse {
    pub fn new(client: ClientWithMiddleware, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenverseResponse {
    #[serde(default)]
    results: Vec<OpenverseImage>,
}

#[derive(Debug, Deserialize)]
struct OpenverseImage {
    url: Option<String>,
    thumbnail: Option<String>,
}

impl OpenverseResponse {
    fn first_image(self) -> Option<String> {
        let first = self.results.into_iter().next()?;
        first
            .url
            .filter(|u| !u.is_empty())
            .or(first.thumbnail)
            .filter(|u| !u.is_empty())
    }
}

#[async_trait]
impl ImageSearch for Openverse {
    #[instrument(skip_all, fields(name = %query.name))]
    async fn search(&self, query: &ImageQuery) -> Result<Option<String>> {
        let text = query.text();
        if text.is_empty() {
            return Ok(None);
        }
        let url = format!("{}?q={}&page_size=1", self.url, urlencoding::encode(&text));
        let body: OpenverseResponse = fetch(&self.client, "openverse", url).await?;
        Ok(body.first_image())
    }
}

/// MediaWiki `action=query` payloads shared by Commons and Wikipedia
mod wiki {
    use super::{Deserialize, HashMap};

    #[derive(Debug, Deserialize)]
    pub struct QueryResponse {
        pub query: Option<Query>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Query {
        #[serde(default)]
        pub pages: HashMap<String, Page>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Page {
        #[serde(default)]
        pub index: Option<u32>,
        pub thumbnail: Option<Thumbnail>,
        #[serde(default)]
        pub imageinfo: Vec<ImageInfo>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Thumbnail {
        pub source: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct ImageInfo {
        pub thumburl: Option<String>,
        pub url: Option<String>,
    }

    impl Page {
        fn image(&self) -> Option<String> {
            self.thumbnail
                .as_ref()
                .map(|t| t.source.clone())
                .or_else(|| {
                    self.imageinfo
                        .iter()
                        .find_map(|info| info.thumburl.clone().or_else(|| info.url.clone()))
                })
                .filter(|u| !u.is_empty())
        }
    }

    impl QueryResponse {
        /// Image of the best ranked page; geosearch ranks by `index`
        pub fn first_image(&self) -> Option<String> {
            let mut pages: Vec<&Page> = self.query.as_ref()?.pages.values().collect();
            pages.sort_by_key(|p| p.index.unwrap_or(u32::MAX));
            pages.into_iter().find_map(Page::image)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wikipedia_thumbnail() {
        let body: wiki::QueryResponse = serde_json::from_value(serde_json::json!({
            "query": {"pages": {"123": {"title": "Hawa Mahal",
                "thumbnail": {"source": "https://upload.example/hawa.jpg"}}}}
        }))
        .unwrap();
        assert_eq!(
            body.first_image().as_deref(),
            Some("https://upload.example/hawa.jpg")
        );
    }

    #[test]
    fn test_commons_geosearch_prefers_lowest_index() {
        let body: wiki::QueryResponse = serde_json::from_value(serde_json::json!({
            "query": {"pages": {
                "1": {"index": 2, "imageinfo": [{"thumburl": "https://c/far.jpg"}]},
                "2": {"index": 1, "imageinfo": [{"url": "https://c/near.jpg"}]}
            }}
        }))
        .unwrap();
        assert_eq!(body.first_image().as_deref(), Some("https://c/near.jpg"));
    }

    #[test]
    fn test_missing_page_has_no_image() {
        let body: wiki::QueryResponse = serde_json::from_value(serde_json::json!({
            "query": {"pages": {"-1": {"missing": ""}}}
        }))
        .unwrap();
        assert!(body.first_image().is_none());
    }

    #[test]
    fn test_openverse_falls_back_to_thumbnail() {
        let body: OpenverseResponse = serde_json::from_value(serde_json::json!({
            "results": [{"url": "", "thumbnail": "https://ov/thumb.jpg"}]
        }))
        .unwrap();
        assert_eq!(body.first_image().as_deref(), Some("https://ov/thumb.jpg"));
    }
}
