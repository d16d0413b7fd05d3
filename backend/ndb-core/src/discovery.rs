//! Debug target discovery.
//!
//! The inspector publishes its debuggable targets as a JSON array at a
//! well-known HTTP endpoint (`http://127.0.0.1:9229/json` by default). Only
//! the first target is used.

use crate::config::InspectorConfig;
use crate::error::discovery::DiscoveryError;
use crate::protocol::DebugTarget;

use common::{ErrorLocation, HttpStatusCode};

use std::panic::Location;

use log::{debug, info};
use reqwest::Client;
use url::Url;

/// Resolves the channel endpoint of the first available debug target.
#[derive(Debug, Clone)]
pub struct TargetLocator {
    discovery_url: Url,
    client: Client,
}

impl TargetLocator {
    pub fn new(config: &InspectorConfig) -> Result<Self, DiscoveryError> {
        let discovery_url = config.discovery_url()?;
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            discovery_url,
            client,
        })
    }

    pub fn discovery_url(&self) -> &Url {
        &self.discovery_url
    }

    /// Fetch the full target listing.
    ///
    /// # Errors
    ///
    /// - [`DiscoveryError::Http`] if the endpoint cannot be reached
    /// - [`DiscoveryError::Status`] on a non-2xx response
    /// - [`DiscoveryError::Decode`] if the body is not a target array
    pub async fn list_targets(&self) -> Result<Vec<DebugTarget>, DiscoveryError> {
        debug!("Fetching debug targets from {}", self.discovery_url);

        let response = self.client.get(self.discovery_url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DiscoveryError::Status {
                message: response.text().await.unwrap_or_default(),
                status_code: HttpStatusCode(status.as_u16()),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let body = response.text().await?;
        let targets: Vec<DebugTarget> =
            serde_json::from_str(&body).map_err(|e| DiscoveryError::Decode {
                message: format!("Invalid target list from {}: {e}", self.discovery_url),
                location: ErrorLocation::from(Location::caller()),
            })?;

        debug!("Discovered {} debug target(s)", targets.len());
        Ok(targets)
    }

    /// Resolve the first available target.
    ///
    /// # Errors
    ///
    /// Everything [`list_targets`](Self::list_targets) returns, plus
    /// [`DiscoveryError::NoTargets`] when the listing is empty.
    pub async fn locate(&self) -> Result<DebugTarget, DiscoveryError> {
        let target = self
            .list_targets()
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DiscoveryError::NoTargets {
                message: format!("{} returned an empty target list", self.discovery_url),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(
            "Using debug target {} at {}",
            target.url, target.web_socket_debugger_url
        );
        Ok(target)
    }
}
