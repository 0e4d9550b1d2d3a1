//! Municipality autocomplete client
//!
//! Login asks for a city; candidates come from a geocoding service with
//! the GeoJSON-ish shape of api-adresse.data.gouv.fr: a `features` array
//! whose `properties` carry the municipality name and INSEE code.

use crate::config::ServerConfig;
use crate::error::Result;
use crate::types::City;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    properties: FeatureProperties,
}

#[derive(Debug, Deserialize)]
struct FeatureProperties {
    name: String,
    citycode: String,
}

/// Client for the municipality search endpoint
pub struct CitySearchClient {
    client: reqwest::Client,
    base_url: String,
}

impl CitySearchClient {
    /// Creates a search client from server configuration
    pub fn new(config: &ServerConfig) -> Result<Self> {
        Ok(Self {
            client: super::http_client(config)?,
            base_url: config.geocode_url.trim_end_matches('/').to_string(),
        })
    }

    /// Search municipalities matching a free-text query
    ///
    /// # Returns
    ///
    /// Returns candidate cities in service ranking order; an empty vec
    /// when nothing matches.
    pub async fn search(&self, query: &str) -> Result<Vec<City>> {
        debug!("Searching municipalities for '{}'", query);
        let response = self
            .client
            .get(format!("{}/search/", self.base_url))
            .query(&[("q", query), ("type", "municipality"), ("autocomplete", "1")])
            .send()
            .await?
            .error_for_status()?;

        let body: SearchResponse = response.json().await?;
        Ok(body
            .features
            .into_iter()
            .map(|f| City {
                name: f.properties.name,
                code: f.properties.citycode,
            })
            .collect())
    }
}
