// Dune geometry
// Pairs crests with troughs and measures length, height and lee slope

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::{BoundaryCase, Dune};

#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("Crest and trough indices must both be non-empty")]
    EmptyIndices,

    #[error("Index {index} is out of range for a profile of {len} samples")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Elevation has {elevation} samples but distance has {distance}")]
    LengthMismatch { elevation: usize, distance: usize },

    #[error("Unexpected crest/trough pattern: crests {crests:?}, troughs {troughs:?}")]
    UnexpectedBoundary {
        crests: Vec<usize>,
        troughs: Vec<usize>,
    },
}

/// Validity bounds applied to derived dunes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Longest plausible dune, in distance units
    pub max_length: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        GeometryConfig { max_length: 300.0 }
    }
}

/// Derive dunes from crest and trough indices into `filtered`/`distance`
///
/// Each dune spans the trough before its crest to the trough after it.
/// Dunes with negative height or a length above `config.max_length` are
/// dropped.
pub fn derive_dunes(
    filtered: &[f64],
    distance: &[f64],
    crests: &[usize],
    troughs: &[usize],
    config: &GeometryConfig,
) -> Result<Vec<Dune>, GeometryError> {
    if filtered.len() != distance.len() {
        return Err(GeometryError::LengthMismatch {
            elevation: filtered.len(),
            distance: distance.len(),
        });
    }
    if crests.is_empty() || troughs.is_empty() {
        return Err(GeometryError::EmptyIndices);
    }
    if let Some(&index) = crests.iter().chain(troughs).find(|&&i| i >= filtered.len()) {
        return Err(GeometryError::IndexOutOfRange {
            index,
            len: filtered.len(),
        });
    }

    let unexpected = || {
        log::error!(
            "Unexpected crest/trough pattern: crests {:?}, troughs {:?}",
            crests,
            troughs
        );
        GeometryError::UnexpectedBoundary {
            crests: crests.to_vec(),
            troughs: troughs.to_vec(),
        }
    };

    let case = BoundaryCase::classify(crests, troughs).ok_or_else(unexpected)?;
    if troughs.len() != case.expected_troughs(crests.len()) {
        return Err(unexpected());
    }

    log::debug!(
        "{:?}: {} crests, {} troughs",
        case,
        crests.len(),
        troughs.len()
    );

    let mut dunes = Vec::new();
    for i in case.crest_range(crests.len()) {
        let crest = crests[i];
        let next = case.following_trough(i);
        let (stoss_trough, trough) = (troughs[next - 1], troughs[next]);

        if !(stoss_trough < crest && crest < trough) {
            return Err(unexpected());
        }

        let length = distance[trough] - distance[stoss_trough];
        let height = filtered[crest] - filtered[trough];

        if height < 0.0 || length > config.max_length {
            log::trace!(
                "Dropping dune at crest {}: height {:.3}, length {:.3}",
                crest,
                height,
                length
            );
            continue;
        }

        dunes.push(Dune {
            crest,
            trough,
            stoss_trough,
            length,
            height,
            lee_slope_deg: lee_slope(filtered, distance, crest, trough, height),
            aspect_ratio: height / length,
        });
    }

    Ok(dunes)
}

/// Lee slope angle in degrees between the points a sixth of the dune height
/// below the crest and above the trough
fn lee_slope(filtered: &[f64], distance: &[f64], crest: usize, trough: usize, height: f64) -> f64 {
    let lee = &filtered[crest..=trough];
    let sixth = height / 6.0;

    let upper = nearest(lee, filtered[crest] - sixth);
    let lower = nearest(lee, filtered[trough] + sixth);

    let run = distance[crest + lower] - distance[crest + upper];
    if run == 0.0 {
        return 0.0;
    }

    ((lee[upper] - lee[lower]) / run).atan().to_degrees()
}

/// First index whose value is closest to `target`
fn nearest(values: &[f64], target: f64) -> usize {
    let mut best = 0;
    let mut best_diff = f64::INFINITY;
    for (i, &v) in values.iter().enumerate() {
        let diff = (v - target).abs();
        if diff < best_diff {
            best = i;
            best_diff = diff;
        }
    }
    best
}
