//! Deterministic synthesized readings.
//!
//! Every value is a pure function of the location (and day offset), so
//! fallback data reproduces exactly across runs and platforms. Used as the
//! failure fallback for the real clients, as an offline data source, and in
//! tests.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;

use crate::noise;
use crate::providers::{GroundProvider, SatelliteProvider, WeatherProvider};
use crate::readings::{
    PollutantBundle, PollutantLevels, WeatherObservation, conditions_for_humidity,
};

/// Rough urban-density proxy in [0, 3) derived from the coordinates.
fn urban_factor(latitude: f64, longitude: f64) -> f64 {
    (latitude.abs() + longitude.abs() / 100.0) % 3.0
}

/// Synthesized satellite bundle (NO2, O3, HCHO).
pub fn satellite_bundle(latitude: f64, longitude: f64) -> PollutantBundle {
    let urban = urban_factor(latitude, longitude);

    PollutantBundle {
        levels: PollutantLevels {
            no2: Some(20.0 + urban * 10.0 + noise::bounded(latitude.to_bits(), 10) as f64),
            o3: Some(50.0 + urban * 15.0 + noise::bounded(longitude.to_bits(), 15) as f64),
            hcho: Some(5.0 + urban * 2.0),
            ..Default::default()
        },
        timestamp: Utc::now(),
        source: "tempo-synthetic".to_string(),
    }
}

/// Synthesized ground-station bundle (PM2.5, PM10, NO2, O3).
pub fn ground_bundle(latitude: f64, longitude: f64) -> PollutantBundle {
    let seed = noise::location_seed(latitude, longitude);

    PollutantBundle {
        levels: PollutantLevels {
            pm25: Some(15.0 + noise::bounded(latitude.to_bits(), 20) as f64),
            pm10: Some(25.0 + noise::bounded(longitude.to_bits(), 30) as f64),
            no2: Some(18.0 + noise::bounded(seed, 15) as f64),
            o3: Some(45.0 + noise::bounded(noise::mix64(seed), 25) as f64),
            ..Default::default()
        },
        timestamp: Utc::now(),
        source: "ground-synthetic".to_string(),
    }
}

/// Synthesized current weather for a location.
pub fn current_weather(latitude: f64, longitude: f64) -> WeatherObservation {
    let seed = noise::location_seed(latitude, longitude);

    // Colder toward the poles, with bounded local variation.
    let temperature = 20.0 - latitude.abs() * 0.5 + noise::centered(seed, 5) as f64;
    let humidity =
        (50.0 + noise::bounded(longitude.to_bits(), 30) as f64).clamp(0.0, 100.0);
    let wind_speed = 5.0 + noise::bounded(noise::mix64(seed), 15) as f64;
    let pressure = 1013.0 + noise::centered(latitude.to_bits(), 10) as f64;

    WeatherObservation {
        temperature: Some(temperature),
        humidity: Some(humidity),
        wind_speed: Some(wind_speed),
        pressure: Some(pressure),
        conditions: Some(conditions_for_humidity(humidity).to_string()),
    }
}

/// Synthesized weather projection for `days_ahead` days out.
pub fn forecast_day(latitude: f64, longitude: f64, days_ahead: u64) -> WeatherObservation {
    let seed = noise::mix64_pair(noise::location_seed(latitude, longitude), days_ahead);

    let temperature = 20.0 + noise::centered(seed, 7) as f64;
    let humidity = (50.0 + noise::centered(noise::mix64_pair(seed, 1), 15) as f64).clamp(0.0, 100.0);
    let wind_speed = (5.0 + noise::centered(noise::mix64_pair(seed, 2), 5) as f64).max(0.0);
    let pressure = 1013.0 + noise::centered(noise::mix64_pair(seed, 3), 10) as f64;

    WeatherObservation {
        temperature: Some(temperature),
        humidity: Some(humidity),
        wind_speed: Some(wind_speed),
        pressure: Some(pressure),
        conditions: Some(conditions_for_humidity(humidity).to_string()),
    }
}

/// Provider implementation backed entirely by the synthesis functions.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticDataSource;

#[async_trait]
impl SatelliteProvider for SyntheticDataSource {
    async fn satellite_readings(&self, latitude: f64, longitude: f64) -> Result<PollutantBundle> {
        Ok(satellite_bundle(latitude, longitude))
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[async_trait]
impl GroundProvider for SyntheticDataSource {
    async fn ground_readings(&self, latitude: f64, longitude: f64) -> Result<PollutantBundle> {
        Ok(ground_bundle(latitude, longitude))
    }
}

#[async_trait]
impl WeatherProvider for SyntheticDataSource {
    async fn current_weather(&self, latitude: f64, longitude: f64) -> Result<WeatherObservation> {
        Ok(current_weather(latitude, longitude))
    }

    async fn forecast_day(
        &self,
        latitude: f64,
        longitude: f64,
        days_ahead: u64,
    ) -> Result<WeatherObservation> {
        Ok(forecast_day(latitude, longitude, days_ahead))
    }

    async fn health_check(&self) -> bool {
        true
    }
}
