//! 7-day forecast generation.

use anyhow::{Context, Result};
use chrono::{Datelike, Days, NaiveDate, Utc};
use tracing::{error, warn};

use crate::forecast::types::{DayForecast, ForecastBaseline, Trend};
use crate::index::types::IndexResult;
use crate::noise;
use crate::providers::{WeatherProvider, synthetic};
use crate::readings::WeatherObservation;

/// Number of days a standard forecast covers.
pub const HORIZON_DAYS: u64 = 7;

/// Generates multi-day forecasts from a baseline index and a weather
/// forecast provider.
pub struct ForecastGenerator<W> {
    weather: W,
}

impl<W: WeatherProvider> ForecastGenerator<W> {
    pub fn new(weather: W) -> Self {
        Self { weather }
    }

    /// Produces the 7-day forecast starting tomorrow.
    ///
    /// Without a current index result a fixed baseline is synthesized, so
    /// forecasts stay independently triggerable from index computation.
    /// Never fails: any internal error yields the documented default
    /// forecast instead.
    pub async fn generate(
        &self,
        latitude: f64,
        longitude: f64,
        current: Option<&IndexResult>,
    ) -> Vec<DayForecast> {
        self.generate_from(latitude, longitude, Utc::now().date_naive(), current)
            .await
    }

    /// Same as [`generate`](Self::generate) with an explicit "today",
    /// which keeps the output reproducible under test.
    pub async fn generate_from(
        &self,
        latitude: f64,
        longitude: f64,
        today: NaiveDate,
        current: Option<&IndexResult>,
    ) -> Vec<DayForecast> {
        match self.try_generate(latitude, longitude, today, current).await {
            Ok(days) => days,
            Err(e) => {
                error!(error = %e, "forecast generation failed, returning default forecast");
                default_forecast(today)
            }
        }
    }

    async fn try_generate(
        &self,
        latitude: f64,
        longitude: f64,
        today: NaiveDate,
        current: Option<&IndexResult>,
    ) -> Result<Vec<DayForecast>> {
        let baseline = current
            .map(ForecastBaseline::from_index)
            .unwrap_or_default();

        let mut days = Vec::with_capacity(HORIZON_DAYS as usize);

        for days_ahead in 1..=HORIZON_DAYS {
            let date = today
                .checked_add_days(Days::new(days_ahead))
                .context("forecast date out of range")?;

            let weather = match self
                .weather
                .forecast_day(latitude, longitude, days_ahead)
                .await
            {
                Ok(obs) => obs,
                Err(e) => {
                    warn!(days_ahead, error = %e, "weather forecast unavailable, synthesizing");
                    synthetic::forecast_day(latitude, longitude, days_ahead)
                }
            };

            days.push(day_forecast(&baseline, date, days_ahead, weather));
        }

        Ok(days)
    }
}

/// Projects one day forward from the shared baseline. Days are independent
/// of each other; only the baseline and that day's weather feed in.
pub fn day_forecast(
    baseline: &ForecastBaseline,
    date: NaiveDate,
    days_ahead: u64,
    weather: WeatherObservation,
) -> DayForecast {
    let impact = weather_impact(&weather);
    let seasonal = seasonal_factor(date.month());
    let jitter = day_jitter(days_ahead);

    let index = (i32::from(baseline.index) + impact + seasonal + jitter).clamp(1, 5) as u8;
    let (no2_level, o3_level, pm25_level) = project_pollutants(baseline, &weather);

    DayForecast {
        date,
        index,
        no2_level,
        o3_level,
        pm25_level,
        confidence: confidence(days_ahead),
        trend: trend(baseline.index, index),
        weather,
    }
}

/// Integer weather impact on the display-scale index, clamped to [-2, 2].
pub fn weather_impact(weather: &WeatherObservation) -> i32 {
    let mut impact = 0;

    let temperature = weather.temperature();
    if temperature > 30.0 {
        impact += 1;
    } else if temperature < 5.0 {
        impact -= 1;
    }

    let wind = weather.wind_speed();
    if wind > 10.0 {
        impact -= 1;
    } else if wind < 2.0 {
        impact += 1;
    }

    let humidity = weather.humidity();
    if humidity > 80.0 {
        impact += 1;
    } else if humidity < 30.0 {
        impact -= 1;
    }

    impact.clamp(-2, 2)
}

/// Seasonal index pressure: ozone season (Jun-Aug) and particulate season
/// (Dec-Feb) push up, spring and fall push down.
pub fn seasonal_factor(month: u32) -> i32 {
    match month {
        6..=8 | 12 | 1 | 2 => 1,
        _ => -1,
    }
}

/// Deterministic day-to-day variation in {-1, 0, 1}, keyed only by the day
/// offset so a fixed offset always reproduces the same term.
pub fn day_jitter(days_ahead: u64) -> i32 {
    noise::centered(days_ahead, 1) as i32
}

/// Projects pollutant levels via multiplicative weather adjustments on the
/// ratios of temperature, wind, and humidity to their defaults.
pub fn project_pollutants(
    baseline: &ForecastBaseline,
    weather: &WeatherObservation,
) -> (f64, f64, f64) {
    let t = weather.temperature() / WeatherObservation::DEFAULT_TEMPERATURE;
    let w = weather.wind_speed() / WeatherObservation::DEFAULT_WIND_SPEED;
    let h = weather.humidity() / WeatherObservation::DEFAULT_HUMIDITY;

    // NO2 rises with temperature, falls with wind.
    let no2 = baseline.no2 * (1.0 + (t - 1.0) * 0.2) * (1.0 - (w - 1.0) * 0.1);
    // O3 rises with temperature, mildly with humidity.
    let o3 = baseline.o3 * (1.0 + (t - 1.0) * 0.3) * (1.0 + (h - 1.0) * 0.1);
    // PM2.5 falls with wind, rises with humidity.
    let pm25 = baseline.pm25 * (1.0 - (w - 1.0) * 0.2) * (1.0 + (h - 1.0) * 0.1);

    (no2, o3, pm25)
}

/// Confidence decays 0.1 per day from 0.9 at day 1, floored at 0.3.
pub fn confidence(days_ahead: u64) -> f64 {
    (0.9 - (days_ahead as f64 - 1.0) * 0.1).clamp(0.3, 1.0)
}

/// Classifies the projected index against the baseline.
pub fn trend(baseline_index: u8, projected_index: u8) -> Trend {
    let baseline = f64::from(baseline_index);
    let projected = f64::from(projected_index);

    if projected > baseline + 0.5 {
        Trend::Worsening
    } else if projected < baseline - 0.5 {
        Trend::Improving
    } else {
        Trend::Stable
    }
}

/// The documented fallback forecast: 7 moderate days at fixed levels.
pub fn default_forecast(today: NaiveDate) -> Vec<DayForecast> {
    let baseline = ForecastBaseline::default();

    (1..=HORIZON_DAYS)
        .map(|days_ahead| DayForecast {
            date: today
                .checked_add_days(Days::new(days_ahead))
                .unwrap_or(NaiveDate::MAX),
            index: baseline.index,
            no2_level: baseline.no2,
            o3_level: baseline.o3,
            pm25_level: baseline.pm25,
            weather: WeatherObservation {
                temperature: Some(WeatherObservation::DEFAULT_TEMPERATURE),
                humidity: Some(WeatherObservation::DEFAULT_HUMIDITY),
                wind_speed: Some(WeatherObservation::DEFAULT_WIND_SPEED),
                pressure: Some(WeatherObservation::DEFAULT_PRESSURE),
                conditions: Some("partly cloudy".to_string()),
            },
            confidence: 0.5,
            trend: Trend::Stable,
        })
        .collect()
}
