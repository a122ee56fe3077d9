//! Nominatim geocoding client.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// A coordinate pair as returned by the geocoding service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Free-text place search returning the best match, if any.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn search(&self, query: &str) -> Result<Option<Coordinates>>;
}

#[derive(Clone)]
pub struct NominatimClient {
    client: Client,
    search_url: Url,
}

/// Nominatim reports coordinates as decimal strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

impl NominatimClient {
    /// `user_agent` identifies this application, as Nominatim's usage policy requires.
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        let search_url = Url::parse(&format!("{}/search", base_url.trim_end_matches('/')))
            .context("Invalid geocoder URL")?;

        tracing::info!(base_url = base_url, "Geocoder client initialized");

        Ok(Self { client, search_url })
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn search(&self, query: &str) -> Result<Option<Coordinates>> {
        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("q", query)
            .append_pair("limit", "1");

        debug!(query = query, "Geocoding request");

        let places: Vec<NominatimPlace> = self
            .client
            .get(url)
            .send()
            .await
            .context("Geocoder request failed")?
            .error_for_status()
            .context("Geocoder returned an error status")?
            .json()
            .await
            .context("Invalid geocoder response")?;

        let Some(place) = places.into_iter().next() else {
            return Ok(None);
        };

        let lat = place.lat.parse::<f64>().context("Invalid latitude")?;
        let lng = place.lon.parse::<f64>().context("Invalid longitude")?;

        Ok(Some(Coordinates { lat, lng }))
    }
}
