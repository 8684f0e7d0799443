//! Daily record merging
//!
//! Outer-joins the per-date signal tables of one user into a single record per
//! calendar date. Any date present in any input appears in the output; signals
//! missing for a date stay `None` rather than being filled with zero.

use crate::types::{ActivityCounts, DailyRecord, DailySleepRecord, DailyStepCount};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Date-keyed outer join across sleep, activity counts and steps
pub struct DailyRecordMerger;

impl DailyRecordMerger {
    /// Merge one user's signals; output is sorted by date
    pub fn merge(
        user_id: &str,
        sleep: &[DailySleepRecord],
        counts: &ActivityCounts,
        steps: &[DailyStepCount],
    ) -> Vec<DailyRecord> {
        let mut by_date: BTreeMap<NaiveDate, DailyRecord> = BTreeMap::new();

        for night in sleep {
            record_for(&mut by_date, user_id, night.date).sleep_hours = Some(night.sleep_hours);
        }
        for (date, count) in &counts.drink {
            record_for(&mut by_date, user_id, *date).drink_count = Some(*count);
        }
        for (date, count) in &counts.eat {
            record_for(&mut by_date, user_id, *date).eat_count = Some(*count);
        }
        for (date, count) in &counts.selfcare {
            record_for(&mut by_date, user_id, *date).selfcare_count = Some(*count);
        }
        for day in steps {
            record_for(&mut by_date, user_id, day.date).step = Some(day.step);
        }

        by_date.into_values().collect()
    }
}

fn record_for<'a>(
    by_date: &'a mut BTreeMap<NaiveDate, DailyRecord>,
    user_id: &str,
    date: NaiveDate,
) -> &'a mut DailyRecord {
    by_date
        .entry(date)
        .or_insert_with(|| DailyRecord::empty(user_id, date))
}
