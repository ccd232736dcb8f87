// Dune data types
// Boundary cases, per-dune geometry and summary statistics

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// How a profile segment begins and ends relative to its crests and troughs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryCase {
    /// Starts on a trough, ends on a crest
    TroughCrest,
    /// Starts and ends on a trough
    TroughTrough,
    /// Starts on a crest, ends on a trough
    CrestTrough,
    /// Starts and ends on a crest
    CrestCrest,
}

impl BoundaryCase {
    /// Resolve the case from the first and last crest and trough indices
    ///
    /// Returns `None` when either pair coincides, which no case describes.
    pub fn classify(crests: &[usize], troughs: &[usize]) -> Option<Self> {
        let (c0, cn) = (*crests.first()?, *crests.last()?);
        let (t0, tn) = (*troughs.first()?, *troughs.last()?);

        let starts_trough = match c0.cmp(&t0) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Less => false,
            std::cmp::Ordering::Equal => return None,
        };
        let ends_crest = match cn.cmp(&tn) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Less => false,
            std::cmp::Ordering::Equal => return None,
        };

        Some(match (starts_trough, ends_crest) {
            (true, true) => BoundaryCase::TroughCrest,
            (true, false) => BoundaryCase::TroughTrough,
            (false, false) => BoundaryCase::CrestTrough,
            (false, true) => BoundaryCase::CrestCrest,
        })
    }

    /// Whether the segment opens with a trough
    pub fn starts_with_trough(&self) -> bool {
        matches!(self, BoundaryCase::TroughCrest | BoundaryCase::TroughTrough)
    }

    /// Crest positions (into the crest list) that bound a whole dune
    pub fn crest_range(&self, crest_count: usize) -> Range<usize> {
        match self {
            BoundaryCase::TroughCrest => 0..crest_count.saturating_sub(1),
            BoundaryCase::TroughTrough => 0..crest_count,
            BoundaryCase::CrestTrough => 1..crest_count,
            BoundaryCase::CrestCrest => 1..crest_count.saturating_sub(1),
        }
    }

    /// Number of troughs a well-interleaved segment has for `crest_count` crests
    pub fn expected_troughs(&self, crest_count: usize) -> usize {
        match self {
            BoundaryCase::TroughCrest | BoundaryCase::CrestTrough => crest_count,
            BoundaryCase::TroughTrough => crest_count + 1,
            BoundaryCase::CrestCrest => crest_count.saturating_sub(1),
        }
    }

    /// Position of the trough following crest `i`
    pub fn following_trough(&self, i: usize) -> usize {
        if self.starts_with_trough() {
            i + 1
        } else {
            i
        }
    }
}

/// A single dune between two troughs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dune {
    /// Crest sample index
    pub crest: usize,

    /// Lee-side trough index (downstream of the crest)
    pub trough: usize,

    /// Stoss-side trough index (upstream of the crest)
    pub stoss_trough: usize,

    /// Trough-to-trough length in distance units
    pub length: f64,

    /// Crest elevation above the lee trough
    pub height: f64,

    /// Lee slope angle in degrees
    pub lee_slope_deg: f64,

    /// height / length
    pub aspect_ratio: f64,
}

/// Index-aligned per-dune arrays
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DuneMetrics {
    pub lengths: Vec<f64>,
    pub heights: Vec<f64>,
    pub aspect_ratios: Vec<f64>,
    pub lee_slopes_deg: Vec<f64>,
}

impl From<&[Dune]> for DuneMetrics {
    fn from(dunes: &[Dune]) -> Self {
        DuneMetrics {
            lengths: dunes.iter().map(|d| d.length).collect(),
            heights: dunes.iter().map(|d| d.height).collect(),
            aspect_ratios: dunes.iter().map(|d| d.aspect_ratio).collect(),
            lee_slopes_deg: dunes.iter().map(|d| d.lee_slope_deg).collect(),
        }
    }
}

impl DuneMetrics {
    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }
}

/// Aggregate statistics over the dunes of one profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuneSummary {
    pub count: usize,
    pub mean_length: f64,
    pub median_length: f64,
    pub mean_height: f64,
    pub median_height: f64,
    pub mean_aspect_ratio: f64,
    pub mean_lee_slope_deg: f64,
}

impl DuneSummary {
    /// Summarize a dune collection, `None` when it is empty
    pub fn from_dunes(dunes: &[Dune]) -> Option<Self> {
        if dunes.is_empty() {
            return None;
        }

        let metrics = DuneMetrics::from(dunes);
        Some(DuneSummary {
            count: dunes.len(),
            mean_length: mean(&metrics.lengths),
            median_length: median(&metrics.lengths),
            mean_height: mean(&metrics.heights),
            median_height: median(&metrics.heights),
            mean_aspect_ratio: mean(&metrics.aspect_ratios),
            mean_lee_slope_deg: mean(&metrics.lee_slopes_deg),
        })
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
