//! Raw reading types shared between providers and the index calculator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pollutants the engine understands.
///
/// NO2, O3, PM2.5 and PM10 carry EPA breakpoint tables; HCHO is reported by
/// the satellite instrument but has no standard index mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pollutant {
    No2,
    O3,
    Pm25,
    Pm10,
    Hcho,
}

impl Pollutant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pollutant::No2 => "no2",
            Pollutant::O3 => "o3",
            Pollutant::Pm25 => "pm25",
            Pollutant::Pm10 => "pm10",
            Pollutant::Hcho => "hcho",
        }
    }
}

/// Per-pollutant concentrations in physical units (µg/m³ or ppb).
///
/// `None` means "no measurement available", which is distinct from a zero
/// concentration. Values are never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PollutantLevels {
    pub no2: Option<f64>,
    pub o3: Option<f64>,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub hcho: Option<f64>,
}

impl PollutantLevels {
    pub fn get(&self, pollutant: Pollutant) -> Option<f64> {
        match pollutant {
            Pollutant::No2 => self.no2,
            Pollutant::O3 => self.o3,
            Pollutant::Pm25 => self.pm25,
            Pollutant::Pm10 => self.pm10,
            Pollutant::Hcho => self.hcho,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.no2.is_none()
            && self.o3.is_none()
            && self.pm25.is_none()
            && self.pm10.is_none()
            && self.hcho.is_none()
    }
}

/// A set of pollutant readings from one upstream source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollutantBundle {
    pub levels: PollutantLevels,
    pub timestamp: DateTime<Utc>,
    /// Provenance identifier, e.g. `tempo-synthetic` or `openaq`.
    pub source: String,
}

/// A weather snapshot, current or projected.
///
/// Every field is optional; accessors substitute the documented defaults,
/// chosen so that a fully-absent observation triggers no index correction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    /// Temperature in °C. Default 20.
    pub temperature: Option<f64>,
    /// Relative humidity in percent (0-100). Default 50.
    pub humidity: Option<f64>,
    /// Wind speed on an m/s-like scale. Default 5.
    pub wind_speed: Option<f64>,
    /// Barometric pressure in hPa. Default 1013.
    pub pressure: Option<f64>,
    /// Free-text conditions label, e.g. "partly cloudy".
    pub conditions: Option<String>,
}

impl WeatherObservation {
    pub const DEFAULT_TEMPERATURE: f64 = 20.0;
    pub const DEFAULT_HUMIDITY: f64 = 50.0;
    pub const DEFAULT_WIND_SPEED: f64 = 5.0;
    pub const DEFAULT_PRESSURE: f64 = 1013.0;

    pub fn temperature(&self) -> f64 {
        self.temperature.unwrap_or(Self::DEFAULT_TEMPERATURE)
    }

    pub fn humidity(&self) -> f64 {
        self.humidity.unwrap_or(Self::DEFAULT_HUMIDITY)
    }

    pub fn wind_speed(&self) -> f64 {
        self.wind_speed.unwrap_or(Self::DEFAULT_WIND_SPEED)
    }

    pub fn pressure(&self) -> f64 {
        self.pressure.unwrap_or(Self::DEFAULT_PRESSURE)
    }
}

/// Maps relative humidity to a coarse conditions label.
pub fn conditions_for_humidity(humidity: f64) -> &'static str {
    if humidity < 30.0 {
        "clear"
    } else if humidity < 60.0 {
        "partly cloudy"
    } else if humidity < 80.0 {
        "cloudy"
    } else {
        "overcast"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_defaults() {
        let empty = WeatherObservation::default();
        assert_eq!(empty.temperature(), 20.0);
        assert_eq!(empty.humidity(), 50.0);
        assert_eq!(empty.wind_speed(), 5.0);
        assert_eq!(empty.pressure(), 1013.0);
    }

    #[test]
    fn test_weather_explicit_values_win() {
        let obs = WeatherObservation {
            temperature: Some(31.0),
            wind_speed: Some(1.0),
            ..Default::default()
        };
        assert_eq!(obs.temperature(), 31.0);
        assert_eq!(obs.wind_speed(), 1.0);
        assert_eq!(obs.humidity(), 50.0);
    }

    #[test]
    fn test_levels_get_and_empty() {
        let mut levels = PollutantLevels::default();
        assert!(levels.is_empty());

        levels.pm25 = Some(12.0);
        assert!(!levels.is_empty());
        assert_eq!(levels.get(Pollutant::Pm25), Some(12.0));
        assert_eq!(levels.get(Pollutant::No2), None);
    }

    #[test]
    fn test_conditions_for_humidity_bands() {
        assert_eq!(conditions_for_humidity(10.0), "clear");
        assert_eq!(conditions_for_humidity(45.0), "partly cloudy");
        assert_eq!(conditions_for_humidity(70.0), "cloudy");
        assert_eq!(conditions_for_humidity(95.0), "overcast");
    }

    #[test]
    fn test_pollutant_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Pollutant::Pm25).unwrap(),
            "\"pm25\""
        );
    }
}
