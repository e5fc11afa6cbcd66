//! EPA breakpoint tables for sub-index interpolation.

use crate::readings::Pollutant;

/// One concentration bracket: `(c_low, c_high, aqi_low, aqi_high)`.
pub type Bracket = (f64, f64, u16, u16);

/// Six-tier EPA tables (Good through Hazardous) per pollutant.
/// Concentrations are µg/m³ for particulates and ppb for gases.
static PM25: &[Bracket] = &[
    (0.0, 12.0, 0, 50),
    (12.1, 35.4, 51, 100),
    (35.5, 55.4, 101, 150),
    (55.5, 150.4, 151, 200),
    (150.5, 250.4, 201, 300),
    (250.5, 500.4, 301, 500),
];

static PM10: &[Bracket] = &[
    (0.0, 54.0, 0, 50),
    (55.0, 154.0, 51, 100),
    (155.0, 254.0, 101, 150),
    (255.0, 354.0, 151, 200),
    (355.0, 424.0, 201, 300),
    (425.0, 604.0, 301, 500),
];

static NO2: &[Bracket] = &[
    (0.0, 53.0, 0, 50),
    (54.0, 100.0, 51, 100),
    (101.0, 360.0, 101, 150),
    (361.0, 649.0, 151, 200),
    (650.0, 1249.0, 201, 300),
    (1250.0, 2049.0, 301, 500),
];

static O3: &[Bracket] = &[
    (0.0, 54.0, 0, 50),
    (55.0, 70.0, 51, 100),
    (71.0, 85.0, 101, 150),
    (86.0, 105.0, 151, 200),
    (106.0, 200.0, 201, 300),
    (201.0, 500.0, 301, 500),
];

/// Returns the breakpoint table for `pollutant`, or `None` for pollutants
/// without a standard index mapping (HCHO).
pub fn table_for(pollutant: Pollutant) -> Option<&'static [Bracket]> {
    match pollutant {
        Pollutant::Pm25 => Some(PM25),
        Pollutant::Pm10 => Some(PM10),
        Pollutant::No2 => Some(NO2),
        Pollutant::O3 => Some(O3),
        Pollutant::Hcho => None,
    }
}

/// Pollutants that participate in sub-index aggregation, i.e. those with a
/// breakpoint table.
pub const INDEXED_POLLUTANTS: [Pollutant; 4] = [
    Pollutant::No2,
    Pollutant::O3,
    Pollutant::Pm25,
    Pollutant::Pm10,
];
