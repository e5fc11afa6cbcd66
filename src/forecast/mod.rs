//! Multi-day air quality projection.
//!
//! Projects a baseline index and its constituent pollutants across a 7-day
//! horizon using day-by-day weather projections, a seasonal factor, and a
//! deterministic jitter term, with confidence decaying over the horizon.

pub mod generator;
pub mod history;
pub mod types;
