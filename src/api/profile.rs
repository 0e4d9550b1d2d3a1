//! Profile client
//!
//! Profiles are the only mutable state a pseudonym carries: a biography
//! and an avatar URL, keyed by user id.

use crate::config::ServerConfig;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A user profile as served by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Biography text
    #[serde(default)]
    pub bio: Option<String>,
    /// Durable URL of the avatar image
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// A partial profile update; `None` fields are left untouched
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Client for the profile endpoints
pub struct ProfileClient {
    client: reqwest::Client,
    base_url: String,
}

impl ProfileClient {
    /// Creates a profile client from server configuration
    pub fn new(config: &ServerConfig) -> Result<Self> {
        Ok(Self {
            client: super::http_client(config)?,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch a user's profile
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or a non-success status
    /// (including 404 for unknown users).
    pub async fn get(&self, user_id: &str) -> Result<Profile> {
        debug!("Fetching profile for {}", user_id);
        let response = self
            .client
            .get(format!("{}/api/profile/{}", self.base_url, user_id))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    /// Apply a partial update and return the resulting profile
    pub async fn update(&self, user_id: &str, update: &ProfileUpdate) -> Result<Profile> {
        debug!("Updating profile for {}", user_id);
        let response = self
            .client
            .put(format!("{}/api/profile/{}", self.base_url, user_id))
            .json(update)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}
