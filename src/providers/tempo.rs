//! NASA TEMPO satellite data client.

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::error;

use crate::providers::{SatelliteProvider, synthetic};
use crate::readings::PollutantBundle;

const DEFAULT_BASE_URL: &str = "https://tempo.si.edu/api";

/// Client for the TEMPO instrument service.
///
/// The readings themselves are synthesized for now; only the health probe
/// talks to the real endpoint.
/// TODO: swap the synthesized columns for real TEMPO L3 retrievals once the
/// public data API is available.
#[derive(Debug, Clone)]
pub struct TempoClient {
    base_url: String,
}

impl TempoClient {
    pub fn new(base_url: String) -> Self {
        Self { base_url }
    }

    /// Builds a client from `NASA_TEMPO_BASE_URL`, falling back to the
    /// public instrument host.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("NASA_TEMPO_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }
}

#[async_trait]
impl SatelliteProvider for TempoClient {
    async fn satellite_readings(&self, latitude: f64, longitude: f64) -> Result<PollutantBundle> {
        Ok(synthetic::satellite_bundle(latitude, longitude))
    }

    async fn health_check(&self) -> bool {
        let client = match reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
        {
            Ok(client) => client,
            Err(_) => return false,
        };

        match client.get(format!("{}/status", self.base_url)).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                error!(error = %e, "TEMPO health check failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_readings_are_deterministic_per_location() {
        let client = TempoClient::new("http://unused".to_string());

        let a = client.satellite_readings(40.7, -74.0).await.unwrap();
        let b = client.satellite_readings(40.7, -74.0).await.unwrap();

        assert_eq!(a.levels, b.levels);
        assert_eq!(a.source, "tempo-synthetic");
    }
}
