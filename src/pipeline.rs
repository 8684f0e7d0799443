//! Dataset assembly
//!
//! This module provides the public API for Dayline. It runs every stage per
//! user and assembles the two output datasets:
//!
//! - Averages: tags + sensor log → sleep / activity counts / steps → daily
//!   records → window averages, joined to the roster.
//! - Sequences: tags → sleep + per-date labels → day sequences.
//!
//! Users missing a required log are skipped with a diagnostic; the batch only
//! fails when the roster itself cannot be read.

use crate::activity::ActivityCounter;
use crate::categorize::{categorize_metric, Category};
use crate::config::PipelineConfig;
use crate::error::{DaylineError, SourceKind};
use crate::merger::DailyRecordMerger;
use crate::sequencer::DaySequencer;
use crate::sleep::SleepReconstructor;
use crate::steps::StepAggregator;
use crate::storage::UserDataSource;
use crate::types::{
    AveragesRow, DailyRecord, DaySequence, Event, Metric, SensorReading, UserProfile,
    WindowAverage,
};
use crate::window::WindowAverager;
use log::{debug, error, warn};
use std::collections::{BTreeSet, HashMap};

/// Build the averages dataset with a given window length (stateless, one-shot).
///
/// # Example
/// ```ignore
/// let source = CsvDirectorySource::new("data");
/// let dataset = build_averages(&source, 7)?;
/// ```
pub fn build_averages(
    source: &dyn UserDataSource,
    window_days: u32,
) -> Result<AveragesDataset, DaylineError> {
    DatasetAssembler::with_window_days(window_days)?.assemble_averages(source)
}

/// Build the day-sequence dataset (stateless, one-shot).
pub fn build_day_sequences(source: &dyn UserDataSource) -> Result<SequenceDataset, DaylineError> {
    DatasetAssembler::default().assemble_sequences(source)
}

/// Merge one user's raw logs into daily records.
pub fn daily_records(
    user_id: &str,
    events: &[Event],
    readings: &[SensorReading],
) -> Vec<DailyRecord> {
    // Stage 1: per-day signals
    let sleep = SleepReconstructor::reconstruct(user_id, events);
    let counts = ActivityCounter::count(events);
    let steps = StepAggregator::aggregate(user_id, readings);

    debug!(
        "User {}: {} sleep days, {} drink days, {} eat days, {} self-care days, {} step days",
        user_id,
        sleep.len(),
        counts.drink.len(),
        counts.eat.len(),
        counts.selfcare.len(),
        steps.len()
    );

    // Stage 2: outer join on date
    DailyRecordMerger::merge(user_id, &sleep, &counts, &steps)
}

/// A user left out of a dataset, with the reason
#[derive(Debug)]
pub struct SkippedUser {
    pub user_id: String,
    pub reason: DaylineError,
}

/// Averages dataset plus the users that could not be processed
#[derive(Debug, Default)]
pub struct AveragesDataset {
    pub rows: Vec<AveragesRow>,
    pub skipped: Vec<SkippedUser>,
}

/// Sequence dataset plus the users that could not be processed
#[derive(Debug, Default)]
pub struct SequenceDataset {
    /// Day sequences of all users, concatenated in user order
    pub sequences: Vec<DaySequence>,
    pub skipped: Vec<SkippedUser>,
}

/// Accumulates window rows across users and joins the roster once at the end
#[derive(Debug, Default)]
pub struct AveragesBuilder {
    windows: Vec<WindowAverage>,
}

impl AveragesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend<I: IntoIterator<Item = WindowAverage>>(&mut self, windows: I) {
        self.windows.extend(windows);
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Inner-join the accumulated rows with the roster on `user_id`.
    ///
    /// Rows whose user is not on the roster are dropped. When a user appears
    /// more than once on the roster the first entry is used.
    pub fn finish(self, roster: &[UserProfile]) -> Vec<AveragesRow> {
        let mut profiles: HashMap<&str, &UserProfile> = HashMap::new();
        for profile in roster {
            profiles.entry(profile.user_id.as_str()).or_insert(profile);
        }

        self.windows
            .into_iter()
            .filter_map(|window| {
                let profile = *profiles.get(window.user_id.as_str())?;
                Some(AveragesRow::from_window(window, profile))
            })
            .collect()
    }
}

/// Runs the per-user stages over a data source.
#[derive(Debug, Clone, Copy, Default)]
pub struct DatasetAssembler {
    config: PipelineConfig,
    averager: WindowAverager,
}

impl DatasetAssembler {
    /// Create an assembler from a validated configuration
    pub fn new(config: PipelineConfig) -> Result<Self, DaylineError> {
        config.validate()?;
        Ok(Self {
            config,
            averager: WindowAverager::new(config.window_days)?,
        })
    }

    /// Create an assembler with a specific window length
    pub fn with_window_days(window_days: u32) -> Result<Self, DaylineError> {
        Self::new(PipelineConfig::with_window_days(window_days))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Window rows for one user (no roster join)
    pub fn user_windows(
        &self,
        user_id: &str,
        events: &[Event],
        readings: &[SensorReading],
    ) -> Vec<WindowAverage> {
        let records = daily_records(user_id, events, readings);
        self.averager.average(&records)
    }

    /// Build the averages dataset across every roster user
    pub fn assemble_averages(
        &self,
        source: &dyn UserDataSource,
    ) -> Result<AveragesDataset, DaylineError> {
        let roster = source.roster()?;
        let mut builder = AveragesBuilder::new();
        let mut skipped = Vec::new();

        for user_id in unique_user_ids(&roster) {
            let readings = match load(&user_id, SourceKind::Sensor, source.sensor_readings(&user_id)) {
                Ok(readings) => readings,
                Err(reason) => {
                    skipped.push(SkippedUser { user_id, reason });
                    continue;
                }
            };
            let events = match load(&user_id, SourceKind::Tags, source.events(&user_id)) {
                Ok(events) => events,
                Err(reason) => {
                    skipped.push(SkippedUser { user_id, reason });
                    continue;
                }
            };

            let windows = self.user_windows(&user_id, &events, &readings);
            debug!("User {}: {} windows", user_id, windows.len());
            builder.extend(windows);
        }

        Ok(AveragesDataset {
            rows: builder.finish(&roster),
            skipped,
        })
    }

    /// Build the day-sequence dataset across every roster user
    pub fn assemble_sequences(
        &self,
        source: &dyn UserDataSource,
    ) -> Result<SequenceDataset, DaylineError> {
        let roster = source.roster()?;
        let mut dataset = SequenceDataset::default();

        for user_id in unique_user_ids(&roster) {
            match load(&user_id, SourceKind::Tags, source.events(&user_id)) {
                Ok(events) => {
                    dataset
                        .sequences
                        .extend(DaySequencer::sequence_user(&user_id, &events));
                }
                Err(reason) => dataset.skipped.push(SkippedUser { user_id, reason }),
            }
        }

        Ok(dataset)
    }

    /// Categorize one metric of an averages table with the configured policy
    pub fn categorize(&self, rows: &[AveragesRow], metric: Metric) -> Vec<Option<Category>> {
        categorize_metric(rows, metric, self.config.boundary_policy)
    }
}

/// Roster user ids, de-duplicated and in ascending order.
///
/// Ids compare numerically when every id is an integer, and as text otherwise.
fn unique_user_ids(roster: &[UserProfile]) -> Vec<String> {
    let mut ids: Vec<String> = roster
        .iter()
        .map(|p| p.user_id.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let numeric: Option<Vec<i64>> = ids.iter().map(|id| id.parse().ok()).collect();
    if let Some(numeric) = numeric {
        let mut keyed: Vec<(i64, String)> = numeric.into_iter().zip(ids).collect();
        keyed.sort();
        ids = keyed.into_iter().map(|(_, id)| id).collect();
    }
    ids
}

/// Resolve a per-user load, logging why a user is being skipped
fn load<T>(
    user_id: &str,
    kind: SourceKind,
    loaded: Result<Option<T>, DaylineError>,
) -> Result<T, DaylineError> {
    match loaded {
        Ok(Some(value)) => Ok(value),
        Ok(None) => {
            warn!("no {}: {}", kind, user_id);
            Err(DaylineError::MissingSource {
                user_id: user_id.to_string(),
                kind,
            })
        }
        Err(e) => {
            error!("Failed to read {} for {}: {}", kind, user_id, e);
            Err(e)
        }
    }
}
