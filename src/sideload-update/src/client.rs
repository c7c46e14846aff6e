//! HTTP client for manifests and packages.

use futures::StreamExt;
use reqwest::Client;
use std::path::Path;
use tokio::io::AsyncWriteExt;

use crate::error::{UpdateError, UpdateResult};
use crate::manifest::Manifest;

/// Client for manifest and package endpoints.
#[derive(Debug, Clone)]
pub struct ManifestClient {
    client: Client,
}

impl ManifestClient {
    /// Create a new client.
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent(concat!("sideload/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }

    /// Validate a manifest URL syntactically.
    pub fn validate_url(url: &str) -> UpdateResult<reqwest::Url> {
        reqwest::Url::parse(url).map_err(|_| UpdateError::InvalidManifestUrl {
            url: url.to_string(),
        })
    }

    /// Fetch and parse a manifest.
    pub async fn fetch_manifest(&self, url: &str) -> UpdateResult<Manifest> {
        let parsed = Self::validate_url(url)?;
        let response = self.client.get(parsed).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpdateError::ServerError {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        Manifest::parse(&body).map_err(|_| UpdateError::InvalidManifest {
            url: url.to_string(),
        })
    }

    /// Probe a package URL and return the entity tag, if the server sends
    /// one. Only transport failures are errors; a server that answers
    /// without a tag simply yields `None`.
    pub async fn head_entity_tag(&self, url: &str) -> UpdateResult<Option<String>> {
        let response = self.client.head(url).send().await?;
        Ok(response
            .headers()
            .get(reqwest::header::ETAG)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string))
    }

    /// Stream a package to `dest`.
    pub async fn download(&self, url: &str, dest: &Path) -> UpdateResult<()> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpdateError::ServerError {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
        }

        file.flush().await?;
        Ok(())
    }
}

impl Default for ManifestClient {
    fn default() -> Self {
        Self::new()
    }
}
