// Edge gap filling for 1-D profiles
// Constant extrapolation of the first and last valid samples

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GapError {
    #[error("Series is empty")]
    Empty,

    #[error("All {0} samples are invalid")]
    AllInvalid(usize),
}

/// True when any sample is NaN or infinite
pub fn has_gaps(series: &[f64]) -> bool {
    series.iter().any(|v| !v.is_finite())
}

/// Replace leading and trailing runs of invalid samples
///
/// Leading invalid samples take the first valid value and trailing invalid
/// samples take the last valid value. Gaps between valid samples are left
/// as they are.
pub fn fill_edge_gaps(series: &[f64]) -> Result<Vec<f64>, GapError> {
    if series.is_empty() {
        return Err(GapError::Empty);
    }

    let first = series
        .iter()
        .position(|v| v.is_finite())
        .ok_or(GapError::AllInvalid(series.len()))?;
    // A first valid sample exists, so a last one does too
    let last = series.iter().rposition(|v| v.is_finite()).unwrap_or(first);

    let mut filled = series.to_vec();
    let (head, tail) = (series[first], series[last]);
    filled[..first].fill(head);
    filled[last + 1..].fill(tail);

    if first > 0 || last + 1 < series.len() {
        log::debug!(
            "Filled {} leading and {} trailing invalid samples",
            first,
            series.len() - last - 1
        );
    }

    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_series_is_unchanged() {
        let series = vec![1.0, 2.0, 3.0, 2.5];
        assert_eq!(fill_edge_gaps(&series).unwrap(), series);
        assert!(!has_gaps(&series));
    }

    #[test]
    fn test_edges_take_nearest_valid_value() {
        let series = vec![f64::NAN, f64::NAN, 1.5, 2.0, f64::NAN, 3.0, f64::INFINITY];
        assert!(has_gaps(&series));

        let filled = fill_edge_gaps(&series).unwrap();
        assert_eq!(filled[0], 1.5);
        assert_eq!(filled[1], 1.5);
        assert_eq!(filled[2], 1.5);
        assert_eq!(filled[3], 2.0);
        // Interior gap is not an edge
        assert!(filled[4].is_nan());
        assert_eq!(filled[5], 3.0);
        assert_eq!(filled[6], 3.0);
    }

    #[test]
    fn test_single_valid_sample() {
        let filled = fill_edge_gaps(&[f64::NAN, 4.0, f64::NAN]).unwrap();
        assert_eq!(filled, vec![4.0, 4.0, 4.0]);
    }

    #[test]
    fn test_all_invalid_fails() {
        assert_eq!(
            fill_edge_gaps(&[f64::NAN, f64::NAN]),
            Err(GapError::AllInvalid(2))
        );
        assert_eq!(fill_edge_gaps(&[]), Err(GapError::Empty));
    }
}
