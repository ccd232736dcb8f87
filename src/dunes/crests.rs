// Crest and trough extraction
// Matches wavelet-envelope maxima to crests of the ripple-filtered bed

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::peaks::{find_peaks, local_maxima};

#[derive(Debug, Error, PartialEq)]
pub enum ExtractionError {
    #[error("Filtered profile has {filtered} samples but the reconstruction has {reconstruction}")]
    LengthMismatch {
        filtered: usize,
        reconstruction: usize,
    },

    #[error("At least one crest is required to place troughs")]
    NoCrests,

    #[error("Segment {start}..{end} is invalid for a profile of {len} samples")]
    InvalidSegment { start: usize, end: usize, len: usize },

    #[error("Crest {crest} lies outside segment {start}..{end}")]
    CrestOutsideSegment { crest: usize, start: usize, end: usize },

    #[error("Crest indices must be strictly increasing: {0:?}")]
    UnorderedCrests(Vec<usize>),
}

/// Configuration for crest detection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrestConfig {
    /// Minimum prominence of a filtered-profile crest, in elevation units
    pub prominence: f64,
}

impl Default for CrestConfig {
    fn default() -> Self {
        CrestConfig { prominence: 0.1 }
    }
}

/// Match reconstruction maxima to crests of the filtered profile
///
/// `filtered` and `reconstruction` cover the same segment; returned indices
/// are shifted by `offset` (the segment start) into whole-profile indices.
/// Each reconstruction maximum picks the filtered crest nearest in index,
/// ties going to the lower index, and every filtered crest is used once.
pub fn match_crests(
    filtered: &[f64],
    reconstruction: &[f64],
    offset: usize,
    config: &CrestConfig,
) -> Result<Vec<usize>, ExtractionError> {
    if filtered.len() != reconstruction.len() {
        return Err(ExtractionError::LengthMismatch {
            filtered: filtered.len(),
            reconstruction: reconstruction.len(),
        });
    }

    let envelope_peaks = local_maxima(reconstruction);
    let bed_peaks = find_peaks(filtered, Some(config.prominence));

    log::debug!(
        "{} envelope maxima, {} filtered crests above prominence {}",
        envelope_peaks.len(),
        bed_peaks.len(),
        config.prominence
    );

    if bed_peaks.is_empty() {
        return Ok(Vec::new());
    }

    let mut matched: Vec<usize> = envelope_peaks
        .iter()
        .filter_map(|&target| {
            bed_peaks
                .iter()
                .enumerate()
                .min_by_key(|(_, &p)| p.abs_diff(target))
                .map(|(i, _)| i)
        })
        .collect();
    matched.sort_unstable();
    matched.dedup();

    Ok(matched.into_iter().map(|i| bed_peaks[i] + offset).collect())
}

/// Troughs between and around matched crests
///
/// Between two crests the trough is the lowest filtered sample in
/// `[c_i, c_{i+1})`. A leading trough is the lowest sample of `[start, c_0)`
/// unless it sits exactly at `start`; a trailing trough is the lowest sample
/// of `[c_last, end)` unless that is the crest itself. Ties take the first
/// sample.
pub fn find_troughs(
    filtered: &[f64],
    crests: &[usize],
    start: usize,
    end: usize,
) -> Result<Vec<usize>, ExtractionError> {
    if start >= end || end > filtered.len() {
        return Err(ExtractionError::InvalidSegment {
            start,
            end,
            len: filtered.len(),
        });
    }

    let (first, last) = match (crests.first(), crests.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return Err(ExtractionError::NoCrests),
    };

    if let Some(&crest) = crests.iter().find(|&&c| c < start || c >= end) {
        return Err(ExtractionError::CrestOutsideSegment { crest, start, end });
    }
    if crests.windows(2).any(|w| w[1] <= w[0]) {
        return Err(ExtractionError::UnorderedCrests(crests.to_vec()));
    }

    let mut troughs = Vec::with_capacity(crests.len() + 1);

    if let Some(i) = argmin(&filtered[start..first]) {
        if i != 0 {
            troughs.push(start + i);
        }
    }

    for pair in crests.windows(2) {
        if let Some(i) = argmin(&filtered[pair[0]..pair[1]]) {
            troughs.push(pair[0] + i);
        }
    }

    if let Some(i) = argmin(&filtered[last..end]) {
        if i != 0 {
            troughs.push(last + i);
        }
    }

    Ok(troughs)
}

/// Index of the first smallest value, skipping NaN
fn argmin(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| !v.is_nan())
        .fold(None, |best: Option<(usize, f64)>, (i, &v)| match best {
            Some((_, b)) if b <= v => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}
