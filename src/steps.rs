//! Daily step aggregation

use crate::types::{DailyStepCount, SensorReading};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Step aggregator for cumulative sensor readings
pub struct StepAggregator;

impl StepAggregator {
    /// One step count per date present in the input: the day's maximum reading.
    ///
    /// The counter is assumed non-decreasing within a day, so the maximum is
    /// the day's total.
    pub fn aggregate(user_id: &str, readings: &[SensorReading]) -> Vec<DailyStepCount> {
        let mut by_date: BTreeMap<NaiveDate, i64> = BTreeMap::new();

        for reading in readings {
            by_date
                .entry(reading.date())
                .and_modify(|max| *max = (*max).max(reading.step))
                .or_insert(reading.step);
        }

        by_date
            .into_iter()
            .map(|(date, step)| DailyStepCount {
                user_id: user_id.to_string(),
                date,
                step,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn reading(ts: &str, step: i64) -> SensorReading {
        SensorReading::new(
            "u1",
            NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap(),
            step,
        )
    }

    #[test]
    fn test_daily_max_per_date() {
        let readings = vec![
            reading("2023-03-01 09:00:00", 1200),
            reading("2023-03-01 18:00:00", 8400),
            reading("2023-03-01 12:00:00", 4000),
            reading("2023-03-02 08:00:00", 300),
            reading("2023-03-02 21:00:00", 5100),
        ];

        let daily = StepAggregator::aggregate("u1", &readings);

        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].step, 8400);
        assert_eq!(daily[1].step, 5100);
        assert!(daily[0].date < daily[1].date);
    }

    #[test]
    fn test_empty_readings() {
        assert!(StepAggregator::aggregate("u1", &[]).is_empty());
    }
}
