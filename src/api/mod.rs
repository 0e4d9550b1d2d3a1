//! HTTP collaborators
//!
//! The realtime channel only carries chat traffic; uploads, profiles, and
//! city autocomplete go over plain HTTP. Each client wraps a configured
//! `reqwest::Client` with the base URL it talks to.

mod geocode;
mod profile;
mod upload;

pub use geocode::CitySearchClient;
pub use profile::{Profile, ProfileClient, ProfileUpdate};
pub use upload::UploadClient;

use crate::config::ServerConfig;
use crate::error::{PalaverError, Result};
use std::time::Duration;

/// Build the shared HTTP client from server configuration
pub(crate) fn http_client(config: &ServerConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_seconds))
        .user_agent(concat!("palaver/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| PalaverError::Config(format!("failed to build HTTP client: {}", e)).into())
}
