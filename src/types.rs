//! Core types for the Dayline pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: raw events and sensor readings, per-day derived tables, the merged
//! daily record, and the two output datasets.

use chrono::{NaiveDate, NaiveDateTime};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// Activity tag as recorded in a user's tag log
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventLabel {
    Sleep,
    WakeUp,
    Drink,
    Eat,
    TakeShower,
    GoToBathroom,
    /// Literal "None" tag (or an empty cell)
    None,
    /// Any other activity name, kept verbatim
    Other(String),
}

impl EventLabel {
    pub fn as_str(&self) -> &str {
        match self {
            EventLabel::Sleep => "Sleep",
            EventLabel::WakeUp => "Wake up",
            EventLabel::Drink => "Drink",
            EventLabel::Eat => "Eat",
            EventLabel::TakeShower => "Take shower",
            EventLabel::GoToBathroom => "Go to bathroom",
            EventLabel::None => "None",
            EventLabel::Other(name) => name.as_str(),
        }
    }

    /// True for the two labels that delimit a night ("Sleep" / "Wake up")
    pub fn is_sleep_marker(&self) -> bool {
        matches!(self, EventLabel::Sleep | EventLabel::WakeUp)
    }
}

impl From<&str> for EventLabel {
    fn from(label: &str) -> Self {
        match label {
            "Sleep" => EventLabel::Sleep,
            "Wake up" => EventLabel::WakeUp,
            "Drink" => EventLabel::Drink,
            "Eat" => EventLabel::Eat,
            "Take shower" => EventLabel::TakeShower,
            "Go to bathroom" => EventLabel::GoToBathroom,
            "None" | "" => EventLabel::None,
            other => EventLabel::Other(other.to_string()),
        }
    }
}

impl From<String> for EventLabel {
    fn from(label: String) -> Self {
        match EventLabel::from(label.as_str()) {
            EventLabel::Other(_) => EventLabel::Other(label),
            known => known,
        }
    }
}

impl From<EventLabel> for String {
    fn from(label: EventLabel) -> Self {
        match label {
            EventLabel::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

/// A single timestamped activity tag for a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub user_id: String,
    pub label: EventLabel,
    /// Wall-clock start time as written in the log
    pub start: NaiveDateTime,
}

impl Event {
    pub fn new(user_id: impl Into<String>, label: impl Into<EventLabel>, start: NaiveDateTime) -> Self {
        Self {
            user_id: user_id.into(),
            label: label.into(),
            start,
        }
    }

    /// Calendar date of the event's own timestamp
    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }
}

/// A cumulative step-counter reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub user_id: String,
    pub client_time: NaiveDateTime,
    pub step: i64,
}

impl SensorReading {
    pub fn new(user_id: impl Into<String>, client_time: NaiveDateTime, step: i64) -> Self {
        Self {
            user_id: user_id.into(),
            client_time,
            step,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.client_time.date()
    }
}

/// Nightly sleep duration attributed to the date the user woke into
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySleepRecord {
    pub user_id: String,
    pub date: NaiveDate,
    /// Hours between the paired sleep and wake events. Negative values
    /// indicate an irregular pairing in the source log.
    pub sleep_hours: f64,
}

/// Per-date occurrence counts for the tracked activity categories.
///
/// A date only appears in a table when at least one matching event was
/// recorded that day; an absent date means "no data", not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityCounts {
    pub drink: BTreeMap<NaiveDate, u32>,
    pub eat: BTreeMap<NaiveDate, u32>,
    /// "Take shower" and "Go to bathroom" counted together
    pub selfcare: BTreeMap<NaiveDate, u32>,
}

impl ActivityCounts {
    pub fn is_empty(&self) -> bool {
        self.drink.is_empty() && self.eat.is_empty() && self.selfcare.is_empty()
    }
}

/// Daily step count (the day's maximum cumulative reading)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStepCount {
    pub user_id: String,
    pub date: NaiveDate,
    pub step: i64,
}

/// One user's merged signals for a single calendar date.
///
/// Every field is independently optional: `None` means the source had no
/// entry for this date, which is distinct from a zero count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub user_id: String,
    pub date: NaiveDate,
    pub sleep_hours: Option<f64>,
    pub drink_count: Option<u32>,
    pub eat_count: Option<u32>,
    pub selfcare_count: Option<u32>,
    pub step: Option<i64>,
}

impl DailyRecord {
    /// A record for `date` with no signals present yet
    pub fn empty(user_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            user_id: user_id.into(),
            date,
            sleep_hours: None,
            drink_count: None,
            eat_count: None,
            selfcare_count: None,
            step: None,
        }
    }

    /// Value of `metric` for this day, if present
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Step => self.step.map(|s| s as f64),
            Metric::Sleep => self.sleep_hours,
            Metric::Drink => self.drink_count.map(f64::from),
            Metric::Eat => self.eat_count.map(f64::from),
            Metric::Care => self.selfcare_count.map(f64::from),
        }
    }
}

/// One day of the sequence dataset: the night's sleep hours followed by the
/// day's activity labels in recorded order.
///
/// Serializes as a flat array, e.g. `[7.5, "Drink", "Eat"]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DaySequence {
    pub sleep_hours: f64,
    pub activities: Vec<String>,
}

impl Serialize for DaySequence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.activities.len() + 1))?;
        seq.serialize_element(&self.sleep_hours)?;
        for activity in &self.activities {
            seq.serialize_element(activity)?;
        }
        seq.end()
    }
}

/// Averaged metrics selectable from a window row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Step,
    Sleep,
    Drink,
    Eat,
    Care,
}

/// Metric means over one fixed-length window of a user's timeline.
/// A metric with no data inside the window is NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowAverage {
    pub user_id: String,
    pub window_start: NaiveDate,
    pub avg_step: f64,
    pub avg_sleep: f64,
    pub avg_drink: f64,
    pub avg_eat: f64,
    pub avg_care: f64,
}

/// Roster entry carrying a user's depression measurements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub depression_class: String,
    pub depression_score: f64,
}

/// A window row joined with the user's depression measurements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AveragesRow {
    pub user_id: String,
    pub avg_step: f64,
    pub avg_sleep: f64,
    pub avg_drink: f64,
    pub avg_eat: f64,
    pub avg_care: f64,
    pub depression_class: String,
    pub depression_score: f64,
    pub window_start: NaiveDate,
}

impl AveragesRow {
    pub fn from_window(window: WindowAverage, profile: &UserProfile) -> Self {
        Self {
            user_id: window.user_id,
            avg_step: window.avg_step,
            avg_sleep: window.avg_sleep,
            avg_drink: window.avg_drink,
            avg_eat: window.avg_eat,
            avg_care: window.avg_care,
            depression_class: profile.depression_class.clone(),
            depression_score: profile.depression_score,
            window_start: window.window_start,
        }
    }

    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Step => self.avg_step,
            Metric::Sleep => self.avg_sleep,
            Metric::Drink => self.avg_drink,
            Metric::Eat => self.avg_eat,
            Metric::Care => self.avg_care,
        }
    }
}
