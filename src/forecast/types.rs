//! Forecast data types.

use chrono::NaiveDate;
use serde::Serialize;

use crate::index::types::IndexResult;
use crate::readings::WeatherObservation;

/// Direction of the projected index relative to the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Worsening,
    Stable,
}

/// Projection for a single future day.
#[derive(Debug, Clone, Serialize)]
pub struct DayForecast {
    pub date: NaiveDate,
    /// Projected display-scale index, 1-5.
    pub index: u8,
    pub no2_level: f64,
    pub o3_level: f64,
    pub pm25_level: f64,
    /// The weather projection this day was computed from.
    pub weather: WeatherObservation,
    /// Forecast confidence, 0.3-1.0, decaying with the horizon.
    pub confidence: f64,
    pub trend: Trend,
}

/// Starting point a forecast projects forward from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastBaseline {
    pub index: u8,
    pub no2: f64,
    pub o3: f64,
    pub pm25: f64,
}

impl Default for ForecastBaseline {
    /// Synthesized baseline used when no current index is supplied.
    fn default() -> Self {
        ForecastBaseline {
            index: 3,
            no2: 25.0,
            o3: 60.0,
            pm25: 20.0,
        }
    }
}

impl ForecastBaseline {
    /// Builds a baseline from a computed index result, substituting the
    /// synthesized defaults for pollutants the result has no reading for.
    pub fn from_index(result: &IndexResult) -> Self {
        let fallback = ForecastBaseline::default();
        ForecastBaseline {
            index: result.scaled_index,
            no2: result.readings.no2.unwrap_or(fallback.no2),
            o3: result.readings.o3.unwrap_or(fallback.o3),
            pm25: result.readings.pm25.unwrap_or(fallback.pm25),
        }
    }
}

/// One synthesized historical day.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryDay {
    pub date: NaiveDate,
    pub index: u8,
    pub no2_level: f64,
    pub o3_level: f64,
    pub pm25_level: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::types::IndexResult;
    use crate::readings::PollutantLevels;

    #[test]
    fn test_default_baseline() {
        let base = ForecastBaseline::default();
        assert_eq!(base.index, 3);
        assert_eq!(base.no2, 25.0);
        assert_eq!(base.o3, 60.0);
        assert_eq!(base.pm25, 20.0);
    }

    #[test]
    fn test_baseline_from_index_result() {
        let mut result = IndexResult::default_result();
        result.scaled_index = 4;
        result.readings = PollutantLevels {
            no2: Some(42.0),
            pm25: Some(18.0),
            ..Default::default()
        };

        let base = ForecastBaseline::from_index(&result);
        assert_eq!(base.index, 4);
        assert_eq!(base.no2, 42.0);
        assert_eq!(base.o3, 60.0); // absent reading falls back
        assert_eq!(base.pm25, 18.0);
    }
}
