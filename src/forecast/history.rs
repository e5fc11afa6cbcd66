//! Synthesized historical series.
//!
//! There is no stored history; past days are reconstructed from the current
//! baseline with deterministic, bounded variation that grows with age.

use chrono::{Days, NaiveDate, Utc};

use crate::forecast::types::{ForecastBaseline, HistoryDay};
use crate::noise;

/// Builds a `days`-long backwards series ending yesterday, ordered by
/// ascending date.
pub fn generate_history(baseline: &ForecastBaseline, days: u64) -> Vec<HistoryDay> {
    generate_history_from(baseline, Utc::now().date_naive(), days)
}

/// Same as [`generate_history`] with an explicit "today" for reproducible
/// output under test.
pub fn generate_history_from(
    baseline: &ForecastBaseline,
    today: NaiveDate,
    days: u64,
) -> Vec<HistoryDay> {
    (1..=days)
        .rev()
        .map(|days_ago| {
            let date = today
                .checked_sub_days(Days::new(days_ago))
                .unwrap_or(NaiveDate::MIN);

            // Older days wander further from the baseline, capped at +-2.
            let range = ((days_ago / 3) as i64 + 1).min(2);
            let variation = noise::centered(days_ago, range) as i32;

            HistoryDay {
                date,
                index: (i32::from(baseline.index) + variation).clamp(1, 5) as u8,
                no2_level: (baseline.no2 + f64::from(variation) * 5.0).max(0.0),
                o3_level: (baseline.o3 + f64::from(variation) * 3.0).max(0.0),
                pm25_level: (baseline.pm25 + f64::from(variation) * 2.0).max(0.0),
            }
        })
        .collect()
}
