//! Standard-deviation categorization
//!
//! Maps a numeric column onto three ordinal buckets by distance from the
//! column mean: `0` (low), `1` (typical), `2` (high). Statistics are the mean
//! and population standard deviation over the non-missing values.

use crate::types::{AveragesRow, Metric};
use crate::window::nan_mean;
use serde::{Deserialize, Serialize, Serializer};

/// Ordinal category relative to the column distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    /// Below `mean - std`
    Low = 0,
    Typical = 1,
    /// Above `mean + std`
    High = 2,
}

impl Category {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

/// How values lying exactly on `mean ± std` are bucketed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// `High` only above `mean + std`, `Typical` only strictly inside the
    /// band; everything else, including both boundaries, is `Low`.
    #[default]
    SourceCompatible,
    /// Both boundaries count as `Typical`.
    InclusiveTypical,
}

/// Mean and population standard deviation of a column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnStats {
    pub mean: f64,
    pub std: f64,
}

impl ColumnStats {
    /// Statistics over non-NaN values; `None` if there are none
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mean = nan_mean(values.iter().copied());
        if mean.is_nan() {
            return None;
        }
        let variance = nan_mean(values.iter().map(|v| (v - mean).powi(2)));
        Some(Self {
            mean,
            std: variance.sqrt(),
        })
    }

    pub fn categorize(&self, value: f64, policy: BoundaryPolicy) -> Option<Category> {
        if value.is_nan() {
            return None;
        }
        let upper = self.mean + self.std;
        let lower = self.mean - self.std;

        let category = match policy {
            BoundaryPolicy::SourceCompatible => {
                if value > upper {
                    Category::High
                } else if value > lower && value < upper {
                    Category::Typical
                } else {
                    Category::Low
                }
            }
            BoundaryPolicy::InclusiveTypical => {
                if value > upper {
                    Category::High
                } else if value >= lower {
                    Category::Typical
                } else {
                    Category::Low
                }
            }
        };
        Some(category)
    }
}

/// Categorize every value of a column; NaN inputs stay missing
pub fn categorize_column(values: &[f64], policy: BoundaryPolicy) -> Vec<Option<Category>> {
    match ColumnStats::from_values(values) {
        Some(stats) => values.iter().map(|v| stats.categorize(*v, policy)).collect(),
        None => vec![None; values.len()],
    }
}

/// Categorize one averaged metric across an averages table
pub fn categorize_metric(
    rows: &[AveragesRow],
    metric: Metric,
    policy: BoundaryPolicy,
) -> Vec<Option<Category>> {
    let values: Vec<f64> = rows.iter().map(|r| r.metric(metric)).collect();
    categorize_column(&values, policy)
}
