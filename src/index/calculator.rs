//! Core index calculation: source merging, sub-index interpolation, weather
//! corrections, and the 1-5 display index.

use chrono::Utc;
use std::collections::HashMap;
use tracing::debug;

use crate::index::breakpoints::{INDEXED_POLLUTANTS, table_for};
use crate::index::scale::scale_to_display;
use crate::index::types::{Derivation, IndexResult};
use crate::readings::{Pollutant, PollutantBundle, PollutantLevels, WeatherObservation};

/// Computes the current air quality index from up to two pollutant sources
/// and a weather observation.
///
/// Never fails: when no pollutant carries a usable signal the documented
/// default result is returned instead, flagged via
/// [`Derivation::Defaulted`].
pub fn compute_index(
    satellite: Option<&PollutantBundle>,
    ground: Option<&PollutantBundle>,
    weather: &WeatherObservation,
) -> IndexResult {
    let readings = merge_readings(satellite, ground);

    let mut sub_indices = HashMap::new();
    for pollutant in INDEXED_POLLUTANTS {
        // Zero or absent concentrations are "no signal", never scored.
        if let Some(concentration) = readings.get(pollutant).filter(|c| *c > 0.0) {
            if let Some(sub) = pollutant_sub_index(pollutant, concentration) {
                sub_indices.insert(pollutant, sub);
            }
        }
    }

    if sub_indices.is_empty() {
        debug!("no scoreable pollutant in either source, returning default result");
        return IndexResult::default_result();
    }

    let overall = *sub_indices.values().max().unwrap_or(&0);
    let corrected = apply_weather_corrections(overall, weather);

    IndexResult {
        scaled_index: scale_to_display(corrected),
        sub_indices,
        readings,
        sources: collect_sources(satellite, ground),
        weather_factor: weather_factor(weather),
        derivation: Derivation::Computed,
        timestamp: Utc::now(),
    }
}

/// Merges the satellite and ground bundles into one set of concentrations.
///
/// NO2 and O3 prefer the satellite value, falling back to ground when the
/// satellite reports nothing usable. Particulates come only from ground
/// stations; HCHO only from the satellite instrument.
pub fn merge_readings(
    satellite: Option<&PollutantBundle>,
    ground: Option<&PollutantBundle>,
) -> PollutantLevels {
    let sat = satellite.map(|b| b.levels).unwrap_or_default();
    let gnd = ground.map(|b| b.levels).unwrap_or_default();

    PollutantLevels {
        no2: positive(sat.no2).or(gnd.no2),
        o3: positive(sat.o3).or(gnd.o3),
        pm25: gnd.pm25,
        pm10: gnd.pm10,
        hcho: sat.hcho,
    }
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v > 0.0)
}

fn collect_sources(
    satellite: Option<&PollutantBundle>,
    ground: Option<&PollutantBundle>,
) -> Vec<String> {
    let mut sources: Vec<String> = [satellite, ground]
        .into_iter()
        .flatten()
        .map(|b| b.source.clone())
        .collect();

    if sources.is_empty() {
        sources.push("default".to_string());
    }
    sources
}

/// Interpolates the EPA sub-index (0-500) for one pollutant concentration.
///
/// Picks the first bracket whose upper bound contains the concentration, so
/// exact bracket boundaries map to exactly `aqi_low`/`aqi_high`.
/// Concentrations above the top bracket clamp to 500. Returns `None` for
/// pollutants without a breakpoint table.
pub fn pollutant_sub_index(pollutant: Pollutant, concentration: f64) -> Option<u16> {
    let table = table_for(pollutant)?;

    for &(c_low, c_high, aqi_low, aqi_high) in table {
        if concentration <= c_high {
            let slope = f64::from(aqi_high - aqi_low) / (c_high - c_low);
            let aqi = slope * (concentration - c_low) + f64::from(aqi_low);
            return Some(aqi.round().clamp(0.0, 500.0) as u16);
        }
    }

    Some(500)
}

/// Applies additive weather corrections to an EPA-scale index, clamped to
/// [0, 500]. The corrections are order-independent; missing weather fields
/// default to values that trigger none of them.
pub fn apply_weather_corrections(epa: u16, weather: &WeatherObservation) -> u16 {
    let mut corrected = i32::from(epa);

    let wind = weather.wind_speed();
    if wind > 10.0 {
        corrected -= 10; // better dispersion
    } else if wind < 2.0 {
        corrected += 15; // stagnant air
    }

    let temperature = weather.temperature();
    if temperature > 30.0 {
        corrected += 10; // more photochemistry
    } else if temperature < 5.0 {
        corrected -= 5;
    }

    let humidity = weather.humidity();
    if humidity > 80.0 {
        corrected += 5; // particle growth
    } else if humidity < 30.0 {
        corrected -= 5;
    }

    if weather.pressure() < 1000.0 {
        corrected += 10; // poor dispersion
    }

    corrected.clamp(0, 500) as u16
}

/// Summarizes how favorable the weather is for pollutant buildup on a 0-1
/// scale. Reported alongside the index; never fed back into it.
pub fn weather_factor(weather: &WeatherObservation) -> f64 {
    let mut factor: f64 = 0.5;

    let wind = weather.wind_speed();
    if wind > 10.0 {
        factor -= 0.2;
    } else if wind < 2.0 {
        factor += 0.2;
    }

    let temperature = weather.temperature();
    if temperature > 30.0 {
        factor += 0.1;
    } else if temperature < 5.0 {
        factor -= 0.1;
    }

    let humidity = weather.humidity();
    if humidity > 80.0 {
        factor += 0.1;
    } else if humidity < 30.0 {
        factor -= 0.1;
    }

    factor.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::breakpoints::INDEXED_POLLUTANTS;
    use approx::assert_relative_eq;
    use chrono::Utc;

    fn bundle(levels: PollutantLevels, source: &str) -> PollutantBundle {
        PollutantBundle {
            levels,
            timestamp: Utc::now(),
            source: source.to_string(),
        }
    }

    fn weather(temp: f64, humidity: f64, wind: f64, pressure: f64) -> WeatherObservation {
        WeatherObservation {
            temperature: Some(temp),
            humidity: Some(humidity),
            wind_speed: Some(wind),
            pressure: Some(pressure),
            conditions: None,
        }
    }

    #[test]
    fn test_sub_index_exact_at_bracket_boundaries() {
        for pollutant in INDEXED_POLLUTANTS {
            for &(c_low, c_high, aqi_low, aqi_high) in table_for(pollutant).unwrap() {
                assert_eq!(
                    pollutant_sub_index(pollutant, c_low),
                    Some(aqi_low),
                    "{} lower boundary {}",
                    pollutant.as_str(),
                    c_low
                );
                assert_eq!(
                    pollutant_sub_index(pollutant, c_high),
                    Some(aqi_high),
                    "{} upper boundary {}",
                    pollutant.as_str(),
                    c_high
                );
            }
        }
    }

    #[test]
    fn test_sub_index_clamps_above_top_bracket() {
        assert_eq!(pollutant_sub_index(Pollutant::Pm25, 9999.0), Some(500));
        assert_eq!(pollutant_sub_index(Pollutant::No2, 5000.0), Some(500));
    }

    #[test]
    fn test_sub_index_none_for_unmapped_pollutant() {
        assert_eq!(pollutant_sub_index(Pollutant::Hcho, 12.0), None);
    }

    #[test]
    fn test_merge_prefers_satellite_gases() {
        let sat = bundle(
            PollutantLevels {
                no2: Some(40.0),
                o3: Some(60.0),
                hcho: Some(5.0),
                ..Default::default()
            },
            "tempo",
        );
        let gnd = bundle(
            PollutantLevels {
                no2: Some(25.0),
                o3: Some(45.0),
                pm25: Some(10.0),
                pm10: Some(20.0),
                ..Default::default()
            },
            "openaq",
        );

        let merged = merge_readings(Some(&sat), Some(&gnd));
        assert_eq!(merged.no2, Some(40.0));
        assert_eq!(merged.o3, Some(60.0));
        assert_eq!(merged.pm25, Some(10.0));
        assert_eq!(merged.pm10, Some(20.0));
        assert_eq!(merged.hcho, Some(5.0));
    }

    #[test]
    fn test_merge_falls_back_on_missing_or_zero_satellite_gas() {
        let sat = bundle(
            PollutantLevels {
                no2: Some(0.0),
                ..Default::default()
            },
            "tempo",
        );
        let gnd = bundle(
            PollutantLevels {
                no2: Some(18.0),
                o3: Some(45.0),
                ..Default::default()
            },
            "openaq",
        );

        let merged = merge_readings(Some(&sat), Some(&gnd));
        assert_eq!(merged.no2, Some(18.0));
        assert_eq!(merged.o3, Some(45.0));
    }

    #[test]
    fn test_merge_never_takes_particulates_from_satellite() {
        let sat = bundle(
            PollutantLevels {
                pm25: Some(99.0),
                pm10: Some(99.0),
                ..Default::default()
            },
            "tempo",
        );

        let merged = merge_readings(Some(&sat), None);
        assert_eq!(merged.pm25, None);
        assert_eq!(merged.pm10, None);
    }

    #[test]
    fn test_compute_index_worked_example() {
        // no2=53 tops the 0-53 bracket at 50; pm25=35.4 tops 12.1-35.4 at
        // 100. Worst pollutant governs, default weather adjusts nothing.
        let sat = bundle(
            PollutantLevels {
                no2: Some(53.0),
                ..Default::default()
            },
            "tempo",
        );
        let gnd = bundle(
            PollutantLevels {
                pm25: Some(35.4),
                ..Default::default()
            },
            "openaq",
        );

        let result = compute_index(Some(&sat), Some(&gnd), &WeatherObservation::default());

        assert_eq!(result.sub_indices[&Pollutant::No2], 50);
        assert_eq!(result.sub_indices[&Pollutant::Pm25], 100);
        assert_eq!(result.scaled_index, 2);
        assert_eq!(result.derivation, Derivation::Computed);
        assert_eq!(result.sources, vec!["tempo", "openaq"]);
    }

    #[test]
    fn test_compute_index_defaults_on_empty_input() {
        let result = compute_index(None, None, &WeatherObservation::default());

        assert_eq!(result.scaled_index, 3);
        assert!(result.sub_indices.is_empty());
        assert_eq!(result.sources, vec!["default".to_string()]);
        assert_eq!(result.weather_factor, 0.5);
        assert_eq!(result.derivation, Derivation::Defaulted);
    }

    #[test]
    fn test_compute_index_defaults_when_all_signals_zero() {
        let gnd = bundle(
            PollutantLevels {
                pm25: Some(0.0),
                pm10: Some(0.0),
                ..Default::default()
            },
            "openaq",
        );

        let result = compute_index(None, Some(&gnd), &WeatherObservation::default());
        assert_eq!(result.derivation, Derivation::Defaulted);
    }

    #[test]
    fn test_scaled_index_in_range_for_extreme_inputs() {
        let gnd = bundle(
            PollutantLevels {
                pm25: Some(9999.0),
                pm10: Some(9999.0),
                ..Default::default()
            },
            "openaq",
        );
        let worst = compute_index(None, Some(&gnd), &weather(45.0, 95.0, 0.5, 980.0));
        assert_eq!(worst.scaled_index, 5);

        let tiny = bundle(
            PollutantLevels {
                pm25: Some(0.1),
                ..Default::default()
            },
            "openaq",
        );
        let best = compute_index(None, Some(&tiny), &weather(-10.0, 10.0, 20.0, 1030.0));
        assert!((1..=5).contains(&best.scaled_index));
    }

    #[test]
    fn test_weather_corrections_monotone_in_wind() {
        let calm = apply_weather_corrections(100, &weather(20.0, 50.0, 1.0, 1013.0));
        let neutral = apply_weather_corrections(100, &weather(20.0, 50.0, 5.0, 1013.0));
        let windy = apply_weather_corrections(100, &weather(20.0, 50.0, 12.0, 1013.0));

        assert!(calm >= neutral);
        assert!(windy <= neutral);
        assert_eq!(neutral, 100);
    }

    #[test]
    fn test_weather_corrections_clamp() {
        assert_eq!(apply_weather_corrections(0, &weather(-10.0, 10.0, 20.0, 1013.0)), 0);
        assert_eq!(apply_weather_corrections(495, &weather(35.0, 90.0, 1.0, 990.0)), 500);
    }

    #[test]
    fn test_weather_factor_bounds_and_direction() {
        assert_relative_eq!(weather_factor(&WeatherObservation::default()), 0.5);

        let stagnant = weather_factor(&weather(35.0, 90.0, 1.0, 1013.0));
        assert_relative_eq!(stagnant, 0.9, epsilon = 1e-12);

        let dispersive = weather_factor(&weather(0.0, 20.0, 15.0, 1013.0));
        assert_relative_eq!(dispersive, 0.1, epsilon = 1e-12);

        for f in [stagnant, dispersive] {
            assert!((0.0..=1.0).contains(&f));
        }
    }

    #[test]
    fn test_compute_index_is_idempotent() {
        let sat = bundle(
            PollutantLevels {
                no2: Some(80.0),
                o3: Some(60.0),
                hcho: Some(4.0),
                ..Default::default()
            },
            "tempo",
        );
        let gnd = bundle(
            PollutantLevels {
                pm25: Some(22.0),
                pm10: Some(40.0),
                ..Default::default()
            },
            "openaq",
        );
        let obs = weather(28.0, 65.0, 3.0, 1005.0);

        let a = compute_index(Some(&sat), Some(&gnd), &obs);
        let b = compute_index(Some(&sat), Some(&gnd), &obs);

        assert_eq!(a.scaled_index, b.scaled_index);
        assert_eq!(a.sub_indices, b.sub_indices);
        assert_eq!(a.weather_factor, b.weather_factor);
        assert_eq!(a.readings, b.readings);
    }

    #[test]
    fn test_unmapped_pollutant_excluded_from_aggregation() {
        // HCHO alone carries no index signal, so the default path applies.
        let sat = bundle(
            PollutantLevels {
                hcho: Some(12.0),
                ..Default::default()
            },
            "tempo",
        );

        let result = compute_index(Some(&sat), None, &WeatherObservation::default());
        assert!(!result.sub_indices.contains_key(&Pollutant::Hcho));
        assert_eq!(result.derivation, Derivation::Defaulted);
    }
}
