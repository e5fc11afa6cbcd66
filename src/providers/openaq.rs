//! OpenAQ ground-station client.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::time::Duration;
use tracing::warn;

use crate::providers::{GroundProvider, synthetic};
use crate::readings::{PollutantBundle, PollutantLevels};

const DEFAULT_BASE_URL: &str = "https://api.openaq.org";

/// Search radius around the requested point, in meters.
const RADIUS_METERS: u32 = 10_000;

/// Client for OpenAQ's latest-measurements API. Station values within the
/// search radius are averaged per pollutant; any fetch or parse failure
/// falls back to synthesized readings.
#[derive(Debug, Clone)]
pub struct OpenAqClient {
    base_url: String,
    api_key: Option<String>,
}

impl OpenAqClient {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self { base_url, api_key }
    }

    /// Builds a client from `OPENAQ_API_KEY`; the key is optional for the
    /// public tier.
    pub fn from_env() -> Self {
        Self::new(
            DEFAULT_BASE_URL.to_string(),
            std::env::var("OPENAQ_API_KEY").ok(),
        )
    }

    async fn fetch_latest(&self, latitude: f64, longitude: f64) -> Result<PollutantBundle> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        let mut request = client.get(format!("{}/v2/latest", self.base_url)).query(&[
            ("coordinates", format!("{latitude},{longitude}")),
            ("radius", RADIUS_METERS.to_string()),
            ("limit", "10".to_string()),
        ]);

        if let Some(key) = &self.api_key {
            request = request.header("X-API-Key", key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("OpenAQ returned status {}", response.status()));
        }

        let json: serde_json::Value = response.json().await?;
        Ok(process_latest(&json))
    }
}

#[async_trait]
impl GroundProvider for OpenAqClient {
    async fn ground_readings(&self, latitude: f64, longitude: f64) -> Result<PollutantBundle> {
        match self.fetch_latest(latitude, longitude).await {
            Ok(bundle) => Ok(bundle),
            Err(e) => {
                warn!(error = %e, "OpenAQ fetch failed, synthesizing ground readings");
                Ok(synthetic::ground_bundle(latitude, longitude))
            }
        }
    }
}

/// Averages measurement values per pollutant across all stations in the
/// response. Parameters the engine does not track are ignored.
fn process_latest(json: &serde_json::Value) -> PollutantBundle {
    let mut series: HashMap<&str, Vec<f64>> = HashMap::new();

    for result in json["results"].as_array().map(Vec::as_slice).unwrap_or(&[]) {
        for measurement in result["measurements"]
            .as_array()
            .map(Vec::as_slice)
            .unwrap_or(&[])
        {
            let Some(parameter) = measurement["parameter"].as_str() else {
                continue;
            };
            let Some(value) = measurement["value"].as_f64() else {
                continue;
            };

            if let Some(key) = normalize_parameter(parameter) {
                series.entry(key).or_default().push(value);
            }
        }
    }

    let average = |key: &str| -> Option<f64> {
        let values = series.get(key)?;
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    };

    PollutantBundle {
        levels: PollutantLevels {
            pm25: average("pm25"),
            pm10: average("pm10"),
            no2: average("no2"),
            o3: average("o3"),
            hcho: None,
        },
        timestamp: Utc::now(),
        source: "openaq".to_string(),
    }
}

fn normalize_parameter(parameter: &str) -> Option<&'static str> {
    match parameter {
        "pm25" | "pm2.5" => Some("pm25"),
        "pm10" => Some("pm10"),
        "no2" => Some("no2"),
        "o3" => Some("o3"),
        _ => None,
    }
}
