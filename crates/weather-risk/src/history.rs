//! Historical temperature averages
//!
//! An empty window yields `None`, never a 0°C average.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default comparison window (days)
pub const DEFAULT_HISTORY_DAYS: usize = 7;

/// One day of historical weather
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub max_temp_c: f64,
    pub min_temp_c: f64,
    pub avg_temp_c: f64,
    pub condition: String,
}

/// Arithmetic mean of daily average temperatures.
///
/// Non-finite samples are ignored; returns `None` when nothing usable remains.
pub fn historical_average(daily_avgs_c: &[f64]) -> Option<f64> {
    let (sum, count) = daily_avgs_c
        .iter()
        .filter(|t| t.is_finite())
        .fold((0.0, 0usize), |(sum, count), t| (sum + t, count + 1));

    if count < daily_avgs_c.len() {
        debug!("Ignored {} non-finite daily averages", daily_avgs_c.len() - count);
    }

    (count > 0).then(|| sum / count as f64)
}

/// Mean of `avg_temp_c` over the most recent `days` entries (by date)
pub fn average_of_last_days(history: &[DailySummary], days: usize) -> Option<f64> {
    let mut recent: Vec<&DailySummary> = history.iter().collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date));

    let temps: Vec<f64> = recent.iter().take(days).map(|d| d.avg_temp_c).collect();
    historical_average(&temps)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(date: &str, avg: f64) -> DailySummary {
        DailySummary {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            max_temp_c: avg + 4.0,
            min_temp_c: avg - 4.0,
            avg_temp_c: avg,
            condition: "Sunny".to_string(),
        }
    }

    #[test]
    fn test_empty_is_none() {
        assert_eq!(historical_average(&[]), None);
    }

    #[test]
    fn test_mean() {
        assert_eq!(historical_average(&[10.0, 20.0, 30.0]), Some(20.0));
        assert_eq!(historical_average(&[0.0]), Some(0.0));
    }

    #[test]
    fn test_non_finite_samples_skipped() {
        assert_eq!(historical_average(&[f64::NAN, 12.0, 14.0]), Some(13.0));
        assert_eq!(historical_average(&[f64::NAN]), None);
    }

    #[test]
    fn test_last_days_window() {
        let history = vec![
            day("2026-10-10", 100.0),
            day("2026-10-12", 20.0),
            day("2026-10-11", 10.0),
            day("2026-10-13", 30.0),
        ];

        assert_eq!(average_of_last_days(&history, 3), Some(20.0));
        assert_eq!(average_of_last_days(&history, 0), None);
        assert_eq!(average_of_last_days(&[], DEFAULT_HISTORY_DAYS), None);
    }
}
