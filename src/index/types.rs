//! Result types produced by the index calculator.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

use crate::readings::{Pollutant, PollutantLevels};

/// Whether a result came out of the real calculation or the documented
/// fallback. The fallback is part of the contract, not a swallowed error,
/// so callers can surface it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Derivation {
    Computed,
    Defaulted,
}

/// Snapshot of the current air quality at a point.
#[derive(Debug, Clone, Serialize)]
pub struct IndexResult {
    /// Display-scale index, always 1-5.
    pub scaled_index: u8,
    /// EPA-scale sub-indices (0-500), present only for pollutants with a
    /// valid concentration and a breakpoint table.
    pub sub_indices: HashMap<Pollutant, u16>,
    /// The merged concentrations the calculation actually used.
    pub readings: PollutantLevels,
    /// Provenance identifiers of the contributing sources.
    pub sources: Vec<String>,
    /// Informational dispersion-favorability factor, 0-1.
    pub weather_factor: f64,
    pub derivation: Derivation,
    pub timestamp: DateTime<Utc>,
}

impl IndexResult {
    /// The documented fallback result: moderate index, no sub-indices,
    /// neutral weather factor.
    pub fn default_result() -> Self {
        IndexResult {
            scaled_index: 3,
            sub_indices: HashMap::new(),
            readings: PollutantLevels::default(),
            sources: vec!["default".to_string()],
            weather_factor: 0.5,
            derivation: Derivation::Defaulted,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_result_shape() {
        let r = IndexResult::default_result();
        assert_eq!(r.scaled_index, 3);
        assert!(r.sub_indices.is_empty());
        assert_eq!(r.sources, vec!["default".to_string()]);
        assert_eq!(r.weather_factor, 0.5);
        assert_eq!(r.derivation, Derivation::Defaulted);
    }
}
