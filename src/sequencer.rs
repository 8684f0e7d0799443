//! Day sequencing
//!
//! Builds the sequence dataset: for every date with a resolvable night of
//! sleep, the sleep hours followed by that date's activity labels. Dates
//! without a sleep pairing are left out entirely.

use crate::activity::ActivityCounter;
use crate::sleep::SleepReconstructor;
use crate::types::{DailySleepRecord, DaySequence, Event};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Day sequencer over sleep records and per-date labels
pub struct DaySequencer;

impl DaySequencer {
    /// Sequence one user's event stream
    pub fn sequence_user(user_id: &str, events: &[Event]) -> Vec<DaySequence> {
        let sleep = SleepReconstructor::reconstruct(user_id, events);
        let labels = ActivityCounter::labels_by_date(events, sleep.iter().map(|r| r.date));
        Self::sequence(&sleep, &labels)
    }

    /// Combine sleep records with already collected labels, in sleep-record order
    pub fn sequence(
        sleep: &[DailySleepRecord],
        labels: &BTreeMap<NaiveDate, Vec<String>>,
    ) -> Vec<DaySequence> {
        sleep
            .iter()
            .map(|night| DaySequence {
                sleep_hours: night.sleep_hours,
                activities: labels
                    .get(&night.date)
                    .map(|day| day.iter().filter(|l| l.as_str() != "None").cloned().collect())
                    .unwrap_or_default(),
            })
            .collect()
    }
}
