//! OpenWeatherMap client for current conditions and day-ahead projections.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{Days, Utc};
use std::time::Duration;
use tracing::{error, warn};

use crate::providers::{WeatherProvider, synthetic};
use crate::readings::WeatherObservation;

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Client for the OpenWeatherMap current-weather and 5-day forecast APIs.
///
/// Without an API key, and on any fetch failure, observations are
/// synthesized deterministically instead.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    base_url: String,
    api_key: Option<String>,
}

impl OpenWeatherClient {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self { base_url, api_key }
    }

    /// Builds a client from `WEATHER_API_BASE_URL` / `WEATHER_API_KEY`.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("WEATHER_API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url, std::env::var("WEATHER_API_KEY").ok())
    }

    fn http_client(&self) -> Result<reqwest::Client> {
        Ok(reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .build()?)
    }

    async fn fetch_current(&self, latitude: f64, longitude: f64, key: &str) -> Result<WeatherObservation> {
        let response = self
            .http_client()?
            .get(format!("{}/weather", self.base_url))
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("appid", key.to_string()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("weather API returned status {}", response.status()));
        }

        let json: serde_json::Value = response.json().await?;
        Ok(process_current(&json))
    }

    async fn fetch_forecast_day(
        &self,
        latitude: f64,
        longitude: f64,
        days_ahead: u64,
        key: &str,
    ) -> Result<WeatherObservation> {
        let response = self
            .http_client()?
            .get(format!("{}/forecast", self.base_url))
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("appid", key.to_string()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("forecast API returned status {}", response.status()));
        }

        let json: serde_json::Value = response.json().await?;

        let target = Utc::now()
            .date_naive()
            .checked_add_days(Days::new(days_ahead))
            .context("forecast date out of range")?;
        let target_prefix = target.format("%Y-%m-%d").to_string();

        average_day(&json, &target_prefix)
            .ok_or_else(|| anyhow!("no forecast entries for {target_prefix}"))
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current_weather(&self, latitude: f64, longitude: f64) -> Result<WeatherObservation> {
        let Some(key) = self.api_key.clone() else {
            return Ok(synthetic::current_weather(latitude, longitude));
        };

        match self.fetch_current(latitude, longitude, &key).await {
            Ok(obs) => Ok(obs),
            Err(e) => {
                warn!(error = %e, "weather fetch failed, synthesizing observation");
                Ok(synthetic::current_weather(latitude, longitude))
            }
        }
    }

    async fn forecast_day(
        &self,
        latitude: f64,
        longitude: f64,
        days_ahead: u64,
    ) -> Result<WeatherObservation> {
        let Some(key) = self.api_key.clone() else {
            return Ok(synthetic::forecast_day(latitude, longitude, days_ahead));
        };

        match self
            .fetch_forecast_day(latitude, longitude, days_ahead, &key)
            .await
        {
            Ok(obs) => Ok(obs),
            Err(e) => {
                warn!(days_ahead, error = %e, "forecast fetch failed, synthesizing projection");
                Ok(synthetic::forecast_day(latitude, longitude, days_ahead))
            }
        }
    }

    async fn health_check(&self) -> bool {
        let Some(key) = &self.api_key else {
            return false;
        };

        let client = match reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
        {
            Ok(client) => client,
            Err(_) => return false,
        };

        match client
            .get(format!("{}/weather", self.base_url))
            .query(&[("q", "London"), ("appid", key.as_str())])
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                error!(error = %e, "weather health check failed");
                false
            }
        }
    }
}

fn process_current(json: &serde_json::Value) -> WeatherObservation {
    WeatherObservation {
        temperature: json["main"]["temp"].as_f64(),
        humidity: json["main"]["humidity"].as_f64(),
        pressure: json["main"]["pressure"].as_f64(),
        wind_speed: json["wind"]["speed"].as_f64(),
        conditions: json["weather"][0]["description"].as_str().map(String::from),
    }
}

/// Averages all 3-hourly forecast entries whose `dt_txt` falls on the
/// target day. Returns `None` when the feed has no entries for that day
/// (the API only covers ~5 days out).
fn average_day(json: &serde_json::Value, date_prefix: &str) -> Option<WeatherObservation> {
    let mut temperatures = Vec::new();
    let mut humidities = Vec::new();
    let mut pressures = Vec::new();
    let mut wind_speeds = Vec::new();
    let mut conditions = None;

    for item in json["list"].as_array().map(Vec::as_slice).unwrap_or(&[]) {
        let Some(dt_txt) = item["dt_txt"].as_str() else {
            continue;
        };
        if !dt_txt.starts_with(date_prefix) {
            continue;
        }

        if let Some(v) = item["main"]["temp"].as_f64() {
            temperatures.push(v);
        }
        if let Some(v) = item["main"]["humidity"].as_f64() {
            humidities.push(v);
        }
        if let Some(v) = item["main"]["pressure"].as_f64() {
            pressures.push(v);
        }
        if let Some(v) = item["wind"]["speed"].as_f64() {
            wind_speeds.push(v);
        }
        if conditions.is_none() {
            conditions = item["weather"][0]["description"].as_str().map(String::from);
        }
    }

    if temperatures.is_empty() {
        return None;
    }

    let mean = |values: &[f64]| {
        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        }
    };

    Some(WeatherObservation {
        temperature: mean(&temperatures),
        humidity: mean(&humidities),
        pressure: mean(&pressures),
        wind_speed: mean(&wind_speeds),
        conditions,
    })
}
