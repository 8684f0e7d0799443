//! Activity counting
//!
//! Counts tracked activity categories per calendar date and collects the
//! ordered non-sleep labels recorded on each date. Dates here are the event's
//! own date; only sleep reconstruction shifts dates.

use crate::types::{ActivityCounts, Event, EventLabel};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Tracked activity categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityCategory {
    Drink,
    Eat,
    /// "Take shower" or "Go to bathroom"
    SelfCare,
}

impl ActivityCategory {
    /// Category a label counts towards, if any
    pub fn from_label(label: &EventLabel) -> Option<Self> {
        match label {
            EventLabel::Drink => Some(ActivityCategory::Drink),
            EventLabel::Eat => Some(ActivityCategory::Eat),
            EventLabel::TakeShower | EventLabel::GoToBathroom => Some(ActivityCategory::SelfCare),
            _ => None,
        }
    }
}

/// Activity counter for tagged event streams
pub struct ActivityCounter;

impl ActivityCounter {
    /// Count drink, eat and self-care occurrences per date
    pub fn count(events: &[Event]) -> ActivityCounts {
        let mut counts = ActivityCounts::default();

        for event in events {
            let table = match ActivityCategory::from_label(&event.label) {
                Some(ActivityCategory::Drink) => &mut counts.drink,
                Some(ActivityCategory::Eat) => &mut counts.eat,
                Some(ActivityCategory::SelfCare) => &mut counts.selfcare,
                None => continue,
            };
            *table.entry(event.date()).or_insert(0) += 1;
        }

        counts
    }

    /// Ordered activity labels for each requested date.
    ///
    /// Sleep/wake tags and "None" labels are excluded; stream order is kept.
    /// A requested date with no activities maps to an empty list.
    pub fn labels_by_date<I>(events: &[Event], dates: I) -> BTreeMap<NaiveDate, Vec<String>>
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let mut by_date: BTreeMap<NaiveDate, Vec<String>> = BTreeMap::new();
        for event in events {
            if is_sequence_label(&event.label) {
                by_date
                    .entry(event.date())
                    .or_default()
                    .push(event.label.as_str().to_string());
            }
        }

        dates
            .into_iter()
            .map(|date| (date, by_date.get(&date).cloned().unwrap_or_default()))
            .collect()
    }
}

fn is_sequence_label(label: &EventLabel) -> bool {
    !label.is_sleep_marker() && *label != EventLabel::None
}
