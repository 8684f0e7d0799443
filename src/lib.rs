//! Dayline - Daily behaviour datasets from tagged-event and step-sensor logs
//!
//! Dayline turns per-user lifelog exports into two datasets through a
//! deterministic pipeline: sleep reconstruction + activity counting + step
//! aggregation → daily records → window averages → roster join.
//!
//! ## Datasets
//!
//! - **Averages**: one row per user per fixed-length window, joined to the
//!   user's depression class and score
//! - **Sequences**: one flat `[sleep_hours, label, ...]` record per day with a
//!   resolvable night of sleep

pub mod activity;
pub mod categorize;
pub mod config;
pub mod encoder;
pub mod error;
pub mod merger;
pub mod pipeline;
pub mod sequencer;
pub mod sleep;
pub mod steps;
pub mod storage;
pub mod types;
pub mod window;

pub use categorize::{categorize_column, categorize_metric, BoundaryPolicy, Category};
pub use config::PipelineConfig;
pub use error::DaylineError;
pub use pipeline::{
    build_averages, build_day_sequences, AveragesBuilder, AveragesDataset, DatasetAssembler,
    SequenceDataset, SkippedUser,
};
pub use storage::{CsvDirectorySource, InMemorySource, UserDataSource};

/// Dayline version
pub const DAYLINE_VERSION: &str = env!("CARGO_PKG_VERSION");
