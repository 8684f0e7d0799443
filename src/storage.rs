//! User data sources
//!
//! The pipeline reads three inputs: the user roster, each user's tagged event
//! log and each user's step sensor log. Sources hand these over through
//! [`UserDataSource`]. A missing per-user log is reported as `Ok(None)` so the
//! caller can skip that user; a missing roster is an error.
//!
//! [`CsvDirectorySource`] reads the on-disk layout:
//!
//! ```text
//! <root>/user_information.csv        user_id, depression_class, depression_score, ...
//! <root>/user_tags/<user_id>.csv     labelName, start, end
//! <root>/user_data/data_<user_id>.csv client_time, step, ...
//! ```

use crate::error::DaylineError;
use crate::types::{Event, SensorReading, UserProfile};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::debug;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

/// Roster file name under the data root
pub const ROSTER_FILE: &str = "user_information.csv";
/// Directory holding per-user tag logs
pub const TAGS_DIR: &str = "user_tags";
/// Directory holding per-user sensor logs
pub const SENSOR_DIR: &str = "user_data";

/// Trait for anything that can supply the roster and per-user logs
pub trait UserDataSource {
    /// The user roster; its absence is fatal to a batch
    fn roster(&self) -> Result<Vec<UserProfile>, DaylineError>;

    /// A user's tagged events in recorded order, or `None` if there is no log
    fn events(&self, user_id: &str) -> Result<Option<Vec<Event>>, DaylineError>;

    /// A user's step readings, or `None` if there is no log
    fn sensor_readings(&self, user_id: &str) -> Result<Option<Vec<SensorReading>>, DaylineError>;
}

/// CSV files laid out under a single data directory
#[derive(Debug, Clone)]
pub struct CsvDirectorySource {
    root: PathBuf,
}

impl CsvDirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn roster_path(&self) -> PathBuf {
        self.root.join(ROSTER_FILE)
    }

    pub fn tags_path(&self, user_id: &str) -> PathBuf {
        self.root.join(TAGS_DIR).join(format!("{}.csv", user_id))
    }

    pub fn sensor_path(&self, user_id: &str) -> PathBuf {
        self.root.join(SENSOR_DIR).join(format!("data_{}.csv", user_id))
    }
}

impl UserDataSource for CsvDirectorySource {
    fn roster(&self) -> Result<Vec<UserProfile>, DaylineError> {
        let path = self.roster_path();
        if !path.exists() {
            return Err(DaylineError::MissingRoster(path.display().to_string()));
        }
        read_roster(File::open(&path)?)
    }

    fn events(&self, user_id: &str) -> Result<Option<Vec<Event>>, DaylineError> {
        let path = self.tags_path(user_id);
        if !path.exists() {
            return Ok(None);
        }
        debug!("Reading tags for {} from {}", user_id, path.display());
        read_events(user_id, File::open(&path)?).map(Some)
    }

    fn sensor_readings(&self, user_id: &str) -> Result<Option<Vec<SensorReading>>, DaylineError> {
        let path = self.sensor_path(user_id);
        if !path.exists() {
            return Ok(None);
        }
        debug!("Reading sensor data for {} from {}", user_id, path.display());
        read_sensor_readings(user_id, File::open(&path)?).map(Some)
    }
}

/// In-memory source, mainly for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    profiles: Vec<UserProfile>,
    events: HashMap<String, Vec<Event>>,
    readings: HashMap<String, Vec<SensorReading>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(
        mut self,
        user_id: impl Into<String>,
        depression_class: impl Into<String>,
        depression_score: f64,
    ) -> Self {
        self.profiles.push(UserProfile {
            user_id: user_id.into(),
            depression_class: depression_class.into(),
            depression_score,
        });
        self
    }

    pub fn with_events(mut self, user_id: impl Into<String>, events: Vec<Event>) -> Self {
        self.events.insert(user_id.into(), events);
        self
    }

    pub fn with_readings(mut self, user_id: impl Into<String>, readings: Vec<SensorReading>) -> Self {
        self.readings.insert(user_id.into(), readings);
        self
    }
}

impl UserDataSource for InMemorySource {
    fn roster(&self) -> Result<Vec<UserProfile>, DaylineError> {
        Ok(self.profiles.clone())
    }

    fn events(&self, user_id: &str) -> Result<Option<Vec<Event>>, DaylineError> {
        Ok(self.events.get(user_id).cloned())
    }

    fn sensor_readings(&self, user_id: &str) -> Result<Option<Vec<SensorReading>>, DaylineError> {
        Ok(self.readings.get(user_id).cloned())
    }
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    user_id: String,
    depression_class: String,
    depression_score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct TagRow {
    #[serde(rename = "labelName", default)]
    label_name: String,
    start: String,
}

#[derive(Debug, Deserialize)]
struct SensorRow {
    client_time: String,
    #[serde(default)]
    step: String,
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader)
}

/// Read a roster CSV; extra columns are ignored and an empty score is NaN
pub fn read_roster<R: Read>(reader: R) -> Result<Vec<UserProfile>, DaylineError> {
    let mut rdr = csv_reader(reader);
    let mut profiles = Vec::new();
    for row in rdr.deserialize::<RosterRow>() {
        let row = row?;
        profiles.push(UserProfile {
            user_id: row.user_id,
            depression_class: row.depression_class,
            depression_score: row.depression_score.unwrap_or(f64::NAN),
        });
    }
    Ok(profiles)
}

/// Read a tag log CSV (`labelName, start, end`); the `end` column is ignored.
///
/// Rows with an empty `start` carry no date and are dropped.
pub fn read_events<R: Read>(user_id: &str, reader: R) -> Result<Vec<Event>, DaylineError> {
    let mut rdr = csv_reader(reader);
    let mut events = Vec::new();
    for row in rdr.deserialize::<TagRow>() {
        let row = row?;
        if row.start.is_empty() {
            debug!("Dropping tag '{}' without start time for {}", row.label_name, user_id);
            continue;
        }
        events.push(Event::new(user_id, row.label_name, parse_timestamp(&row.start)?));
    }
    Ok(events)
}

/// Read a sensor log CSV (`client_time, step`); rows without a time or a step
/// are dropped
pub fn read_sensor_readings<R: Read>(
    user_id: &str,
    reader: R,
) -> Result<Vec<SensorReading>, DaylineError> {
    let mut rdr = csv_reader(reader);
    let mut readings = Vec::new();
    for row in rdr.deserialize::<SensorRow>() {
        let row = row?;
        if row.client_time.is_empty() {
            debug!("Dropping sensor reading without client_time for {}", user_id);
            continue;
        }
        let Some(step) = parse_step(&row.step)? else {
            continue;
        };
        readings.push(SensorReading::new(
            user_id,
            parse_timestamp(&row.client_time)?,
            step,
        ));
    }
    Ok(readings)
}

const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];

/// Parse a log timestamp as local wall-clock time.
///
/// Offset-bearing RFC 3339 values keep their written local time, so the
/// calendar date is the one recorded in the log.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, DaylineError> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.naive_local());
    }
    for format in TIMESTAMP_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt);
        }
    }
    if let Some(midnight) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight);
    }

    Err(DaylineError::DateParseError(format!(
        "Unrecognized timestamp '{}'",
        value
    )))
}

/// Parse a step cell; accepts integer or float notation, empty means missing
fn parse_step(value: &str) -> Result<Option<i64>, DaylineError> {
    if value.is_empty() || value.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    if let Ok(step) = value.parse::<i64>() {
        return Ok(Some(step));
    }
    match value.parse::<f64>() {
        Ok(step) if step.is_finite() => Ok(Some(step as i64)),
        _ => Err(DaylineError::ParseError(format!("Invalid step value '{}'", value))),
    }
}
