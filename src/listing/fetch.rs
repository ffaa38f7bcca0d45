// src/listing/fetch.rs
use log::{debug, error, info};
use std::time::Duration;

use crate::utils::ListingError;

pub struct ListingClient {
    client: reqwest::Client,
    url: String,
}

impl ListingClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ListingError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ror-serverlist/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// One GET of the master listing. No retries.
    pub async fn fetch(&self) -> Result<String, ListingError> {
        info!("Fetching server list from {}", self.url);
        let response = match self.client.get(&self.url).send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to reach master server: {}", e);
                return Err(e.into());
            }
        };

        let status = response.status();
        if !status.is_success() {
            error!("Master server returned {}", status);
            return Err(ListingError::Status(status.as_u16()));
        }

        let text = response.text().await?;
        debug!("Received {} bytes of listing", text.len());
        Ok(text)
    }
}
