//! Upstream data providers.
//!
//! Each collaborator sits behind an async trait so the engine can be driven
//! by real HTTP clients, by the deterministic synthetic source, or by test
//! stubs. Every concrete client bounds its requests with a timeout and
//! falls back to synthesized data instead of propagating fetch failures.

mod openaq;
mod tempo;
pub mod synthetic;
mod weather;

pub use openaq::OpenAqClient;
pub use synthetic::SyntheticDataSource;
pub use tempo::TempoClient;
pub use weather::OpenWeatherClient;

use anyhow::Result;
use async_trait::async_trait;

use crate::readings::{PollutantBundle, WeatherObservation};

/// Satellite-derived pollutant estimates (NO2, O3, HCHO) for a point.
#[async_trait]
pub trait SatelliteProvider: Send + Sync {
    async fn satellite_readings(&self, latitude: f64, longitude: f64) -> Result<PollutantBundle>;

    /// Whether the upstream service is reachable.
    async fn health_check(&self) -> bool;
}

/// Ground-station measurements (PM2.5, PM10, NO2, O3) for a point.
#[async_trait]
pub trait GroundProvider: Send + Sync {
    async fn ground_readings(&self, latitude: f64, longitude: f64) -> Result<PollutantBundle>;
}

/// Current and projected weather for a point.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current_weather(&self, latitude: f64, longitude: f64) -> Result<WeatherObservation>;

    /// Weather projection `days_ahead` days from now (1-based).
    async fn forecast_day(
        &self,
        latitude: f64,
        longitude: f64,
        days_ahead: u64,
    ) -> Result<WeatherObservation>;

    /// Whether the upstream service is reachable.
    async fn health_check(&self) -> bool;
}
