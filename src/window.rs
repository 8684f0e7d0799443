//! Window averaging
//!
//! Partitions a user's daily records into contiguous, non-overlapping windows of
//! `window_days` calendar days and averages each metric inside every window.
//!
//! Windows start at the earliest date and advance by exactly `window_days`,
//! regardless of gaps in the data. Each window covers `[start, start + window_days)`.
//! A window is emitted while its start is strictly before the latest date, so a
//! user with a single date yields no windows and the final window may be short.

use crate::error::DaylineError;
use crate::types::{DailyRecord, Metric, WindowAverage};
use chrono::{Days, NaiveDate};

/// Default window length in days (weekly averages)
pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// Fixed-step window averager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowAverager {
    window_days: u32,
}

impl Default for WindowAverager {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
        }
    }
}

impl WindowAverager {
    /// Create an averager; `window_days` must be at least 1
    pub fn new(window_days: u32) -> Result<Self, DaylineError> {
        if window_days == 0 {
            return Err(DaylineError::InvalidWindow(window_days));
        }
        Ok(Self { window_days })
    }

    pub fn window_days(&self) -> u32 {
        self.window_days
    }

    /// Average one user's records window by window.
    ///
    /// Records need not be sorted. Missing values are ignored per metric; a
    /// metric with no values in a window is NaN and the row is still emitted.
    pub fn average(&self, records: &[DailyRecord]) -> Vec<WindowAverage> {
        let (Some(first), Some(last)) = (
            records.iter().map(|r| r.date).min(),
            records.iter().map(|r| r.date).max(),
        ) else {
            return Vec::new();
        };
        let user_id = &records[0].user_id;

        let mut windows = Vec::new();
        for current in self.window_starts(first, last) {
            let Some(end) = current.checked_add_days(Days::new(u64::from(self.window_days))) else {
                break;
            };

            let in_window: Vec<&DailyRecord> = records
                .iter()
                .filter(|r| r.date >= current && r.date < end)
                .collect();

            windows.push(WindowAverage {
                user_id: user_id.clone(),
                window_start: current,
                avg_step: metric_mean(&in_window, Metric::Step),
                avg_sleep: metric_mean(&in_window, Metric::Sleep),
                avg_drink: metric_mean(&in_window, Metric::Drink),
                avg_eat: metric_mean(&in_window, Metric::Eat),
                avg_care: metric_mean(&in_window, Metric::Care),
            });
        }

        windows
    }

    /// Start dates of the windows `average` would emit for the span `[first, last]`
    pub fn window_starts(&self, first: NaiveDate, last: NaiveDate) -> Vec<NaiveDate> {
        let mut starts = Vec::new();
        let mut current = first;
        while current < last {
            starts.push(current);
            match current.checked_add_days(Days::new(u64::from(self.window_days))) {
                Some(next) => current = next,
                None => break,
            }
        }
        starts
    }
}

fn metric_mean(records: &[&DailyRecord], metric: Metric) -> f64 {
    nan_mean(records.iter().filter_map(|r| r.metric(metric)))
}

/// Mean of the non-NaN values, or NaN when there are none
pub(crate) fn nan_mean<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    let (sum, count) = values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn day(offset: u64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 3, 1)
            .unwrap()
            .checked_add_days(Days::new(offset))
            .unwrap()
    }

    fn full_day(offset: u64) -> DailyRecord {
        DailyRecord {
            sleep_hours: Some(7.0 + offset as f64),
            drink_count: Some(2),
            eat_count: Some(3),
            selfcare_count: Some(1),
            step: Some(1000 * (offset as i64 + 1)),
            ..DailyRecord::empty("u1", day(offset))
        }
    }

    #[test]
    fn test_ten_day_span_gives_two_windows() {
        let records: Vec<DailyRecord> = (0..10).map(full_day).collect();
        let windows = WindowAverager::new(7).unwrap().average(&records);

        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].window_start, day(0));
        assert_eq!(windows[1].window_start, day(7));

        // First window: days 0..7 -> steps 1000..7000, sleep 7..13
        assert_eq!(windows[0].avg_step, 4000.0);
        assert_eq!(windows[0].avg_sleep, 10.0);
        // Trailing window covers the last 3 days only
        assert_eq!(windows[1].avg_step, 9000.0);
        assert_eq!(windows[1].avg_sleep, 15.0);
        assert_eq!(windows[1].avg_drink, 2.0);
    }

    #[test]
    fn test_single_date_yields_no_windows() {
        let windows = WindowAverager::default().average(&[full_day(0)]);
        assert!(windows.is_empty());
        assert!(WindowAverager::default().average(&[]).is_empty());
    }

    #[test]
    fn test_missing_metric_is_nan_and_row_kept() {
        let records = vec![
            DailyRecord {
                step: Some(500),
                ..DailyRecord::empty("u1", day(0))
            },
            DailyRecord {
                step: Some(1500),
                sleep_hours: Some(8.0),
                ..DailyRecord::empty("u1", day(3))
            },
        ];

        let windows = WindowAverager::default().average(&records);

        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].avg_step, 1000.0);
        assert_eq!(windows[0].avg_sleep, 8.0);
        assert!(windows[0].avg_drink.is_nan());
        assert!(windows[0].avg_eat.is_nan());
        assert!(windows[0].avg_care.is_nan());
    }

    #[test]
    fn test_windows_step_over_gaps() {
        // Data on day 0 and day 20 only: every intermediate window is still
        // emitted with all metrics NaN.
        let records = vec![full_day(0), full_day(20)];
        let windows = WindowAverager::new(7).unwrap().average(&records);

        assert_eq!(
            windows.iter().map(|w| w.window_start).collect::<Vec<_>>(),
            vec![day(0), day(7), day(14)]
        );
        assert!(windows[1].avg_step.is_nan());
        assert_eq!(windows[2].avg_step, 21000.0);
    }

    #[test]
    fn test_last_date_on_window_boundary_is_not_averaged() {
        // Span of exactly window_days + 1 days: the final date would start a
        // new window at the latest date, which the loop does not emit.
        let records: Vec<DailyRecord> = (0..8).map(full_day).collect();
        let windows = WindowAverager::new(7).unwrap().average(&records);

        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].avg_step, 4000.0);
    }

    #[test]
    fn test_unsorted_records() {
        let records = vec![full_day(4), full_day(0), full_day(2)];
        let windows = WindowAverager::new(2).unwrap().average(&records);

        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].avg_step, 1000.0);
        assert_eq!(windows[1].avg_step, 3000.0);
    }

    #[test]
    fn test_zero_window_rejected() {
        assert!(matches!(
            WindowAverager::new(0),
            Err(DaylineError::InvalidWindow(0))
        ));
    }

    #[test]
    fn test_window_starts_match_average() {
        let averager = WindowAverager::new(3).unwrap();
        let records: Vec<DailyRecord> = (0..10).map(full_day).collect();

        let starts = averager.window_starts(day(0), day(9));
        let windows = averager.average(&records);

        assert_eq!(starts, windows.iter().map(|w| w.window_start).collect::<Vec<_>>());
        assert_eq!(starts, vec![day(0), day(3), day(6)]);
    }

    #[test]
    fn test_nan_mean_skips_nan() {
        assert_eq!(nan_mean([1.0, f64::NAN, 3.0]), 2.0);
        assert!(nan_mean(std::iter::empty()).is_nan());
    }
}
