//! File upload client
//!
//! Uploads go to `POST /api/upload` as multipart form data; the server
//! answers with the durable URL the uploaded file is served from. That URL
//! is what private and room messages carry as their attachment.

use crate::config::ServerConfig;
use crate::error::{PalaverError, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    file_url: String,
}

/// Client for the upload endpoint
pub struct UploadClient {
    client: reqwest::Client,
    base_url: String,
}

impl UploadClient {
    /// Creates an upload client from server configuration
    pub fn new(config: &ServerConfig) -> Result<Self> {
        Ok(Self {
            client: super::http_client(config)?,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Upload a file and return its durable URL
    ///
    /// Relative URLs in the response are resolved against the API base so
    /// callers always get an absolute URL.
    ///
    /// # Arguments
    ///
    /// * `path` - Local path of the file to upload
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the server rejects
    /// the upload.
    pub async fn upload(&self, path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| PalaverError::validation("file", "path has no file name"))?
            .to_string();

        debug!("Uploading {}", path.display());
        let bytes = tokio::fs::read(path).await.map_err(PalaverError::Io)?;
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(format!("{}/api/upload", self.base_url))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;

        let body: UploadResponse = response.json().await?;
        let url = self.absolutize(&body.file_url)?;
        info!("Uploaded {} -> {}", path.display(), url);
        Ok(url)
    }

    fn absolutize(&self, file_url: &str) -> Result<String> {
        if file_url.starts_with("http://") || file_url.starts_with("https://") {
            return Ok(file_url.to_string());
        }
        let base = url::Url::parse(&self.base_url)
            .map_err(|e| PalaverError::Config(format!("bad api_url: {}", e)))?;
        let joined = base
            .join(file_url)
            .map_err(|e| PalaverError::Protocol(format!("bad fileUrl '{}': {}", file_url, e)))?;
        Ok(joined.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> UploadClient {
        UploadClient::new(&ServerConfig::default()).unwrap()
    }

    #[test]
    fn test_absolutize_keeps_absolute_urls() {
        let url = client().absolutize("https://cdn.example.net/x.png").unwrap();
        assert_eq!(url, "https://cdn.example.net/x.png");
    }

    #[test]
    fn test_absolutize_resolves_relative_urls() {
        let url = client().absolutize("/uploads/x.png").unwrap();
        assert_eq!(url, "http://127.0.0.1:8080/uploads/x.png");
    }

    #[test]
    fn test_upload_response_shape() {
        let body: UploadResponse =
            serde_json::from_str(r#"{"fileUrl":"/uploads/x.png"}"#).unwrap();
        assert_eq!(body.file_url, "/uploads/x.png");
    }
}
