//! Output formatting and persistence for index results.
//!
//! Supports pretty-printing, JSON serialization, and CSV append.

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use crate::index::types::{Derivation, IndexResult};
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

use crate::readings::Pollutant;

/// Flattened, CSV-friendly view of an [`IndexResult`] for one location.
#[derive(Debug, Serialize)]
pub struct IndexRecord {
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub scaled_index: u8,

    // merged concentrations
    pub no2: Option<f64>,
    pub o3: Option<f64>,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub hcho: Option<f64>,

    // EPA-scale sub-indices
    pub no2_sub_index: Option<u16>,
    pub o3_sub_index: Option<u16>,
    pub pm25_sub_index: Option<u16>,
    pub pm10_sub_index: Option<u16>,

    pub weather_factor: f64,
    pub derivation: Derivation,
    /// Provenance identifiers joined with `;`.
    pub sources: String,
}

impl IndexRecord {
    pub fn from_result(latitude: f64, longitude: f64, result: &IndexResult) -> Self {
        IndexRecord {
            timestamp: result.timestamp,
            latitude,
            longitude,
            scaled_index: result.scaled_index,
            no2: result.readings.no2,
            o3: result.readings.o3,
            pm25: result.readings.pm25,
            pm10: result.readings.pm10,
            hcho: result.readings.hcho,
            no2_sub_index: result.sub_indices.get(&Pollutant::No2).copied(),
            o3_sub_index: result.sub_indices.get(&Pollutant::O3).copied(),
            pm25_sub_index: result.sub_indices.get(&Pollutant::Pm25).copied(),
            pm10_sub_index: result.sub_indices.get(&Pollutant::Pm10).copied(),
            weather_factor: result.weather_factor,
            derivation: result.derivation,
            sources: result.sources.join(";"),
        }
    }
}

/// Logs a serializable value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Appends an [`IndexRecord`] as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &str, record: &IndexRecord) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(record)?;
    writer.flush()?;

    Ok(())
}
