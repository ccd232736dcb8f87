// Cross-correlation lag estimation
// Finds the downstream shift that best aligns two surveys of one line

use ndarray::{s, ArrayView1};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum LagError {
    #[error("Profiles differ in length: {earlier} vs {later}")]
    LengthMismatch { earlier: usize, later: usize },

    #[error("Profiles need at least 2 samples, got {0}")]
    TooShort(usize),

    #[error("Sample spacing must be positive, got {0}")]
    InvalidSpacing(f64),

    #[error("Profile sample {0} is not finite")]
    NonFinite(usize),

    #[error("No lags in {min_lag}..{max_lag} (at most {available} available)")]
    EmptyWindow {
        min_lag: usize,
        max_lag: usize,
        available: usize,
    },

    #[error("A profile has zero energy, correlation is undefined")]
    ZeroEnergy,
}

/// Search window for the lag, in samples
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LagConfig {
    /// Smallest lag considered (inclusive)
    pub min_lag: usize,

    /// Largest lag considered (exclusive)
    pub max_lag: usize,
}

impl Default for LagConfig {
    fn default() -> Self {
        LagConfig {
            min_lag: 5,
            max_lag: 300,
        }
    }
}

/// Best-matching shift between two profiles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LagResult {
    /// Shift in samples
    pub lag: usize,

    /// Shift in distance units
    pub delay: f64,

    /// Normalized correlation at `lag`
    pub correlation: f64,
}

/// Lag of `later` relative to `earlier` that maximizes normalized correlation
///
/// Only positive lags in `[min_lag, max_lag)` are searched, where a positive
/// lag means the bed moved towards larger distances. The correlation is
/// normalized by the zero-lag energy of both profiles, so an exact shifted
/// copy scores 1.
pub fn find_lag(
    earlier: &[f64],
    later: &[f64],
    spacing: f64,
    config: &LagConfig,
) -> Result<LagResult, LagError> {
    let n = earlier.len();
    if later.len() != n {
        return Err(LagError::LengthMismatch {
            earlier: n,
            later: later.len(),
        });
    }
    if n < 2 {
        return Err(LagError::TooShort(n));
    }
    if !(spacing.is_finite() && spacing > 0.0) {
        return Err(LagError::InvalidSpacing(spacing));
    }
    for series in [earlier, later] {
        if let Some(i) = series.iter().position(|v| !v.is_finite()) {
            return Err(LagError::NonFinite(i));
        }
    }

    let y1 = ArrayView1::from(earlier);
    let y2 = ArrayView1::from(later);

    let energy = (y1.dot(&y1) * y2.dot(&y2)).sqrt();
    if energy == 0.0 {
        return Err(LagError::ZeroEnergy);
    }

    // Zero lag sits at n / 2 of a centred correlation of length n
    let half = n / 2;
    let available = n - half;
    let hi = config.max_lag.min(available);
    if config.min_lag >= hi {
        return Err(LagError::EmptyWindow {
            min_lag: config.min_lag,
            max_lag: config.max_lag,
            available,
        });
    }

    let correlate = |k: usize| y2.slice(s![k..]).dot(&y1.slice(s![..n - k])) / energy;

    let (lag, correlation) = (config.min_lag + 1..hi).fold(
        (config.min_lag, correlate(config.min_lag)),
        |(best, best_corr), k| {
            let corr = correlate(k);
            if corr > best_corr {
                (k, corr)
            } else {
                (best, best_corr)
            }
        },
    );

    // Delay axis: n evenly spaced points over [-n·dM/2, n·dM/2]
    let width = n as f64 * spacing;
    let delay = -0.5 * width + (half + lag) as f64 * width / (n - 1) as f64;

    log::debug!(
        "Lag {} samples ({:.3} m), correlation {:.3}",
        lag,
        delay,
        correlation
    );

    Ok(LagResult {
        lag,
        delay,
        correlation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bump(n: usize, centre: f64, width: f64) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let x = (i as f64 - centre) / width;
                (-x * x).exp()
            })
            .collect()
    }

    #[test]
    fn test_self_correlation_peaks_at_zero() {
        let signal: Vec<f64> = (0..41).map(|i| ((i * 7) % 11) as f64 - 5.0).collect();
        let config = LagConfig {
            min_lag: 0,
            max_lag: 300,
        };

        let result = find_lag(&signal, &signal, 1.0, &config).unwrap();
        assert_eq!(result.lag, 0);
        assert!((result.correlation - 1.0).abs() < 1e-12);
        // Odd length puts the zero delay exactly on the axis
        assert!(result.delay.abs() < 1e-12);
    }

    #[test]
    fn test_detects_downstream_shift() {
        let earlier = bump(101, 30.0, 4.0);
        let later = bump(101, 40.0, 4.0);

        let result = find_lag(&earlier, &later, 0.5, &LagConfig::default()).unwrap();
        assert_eq!(result.lag, 10);
        assert!((result.correlation - 1.0).abs() < 1e-9);
        // -25.25 + 60 * 50.5 / 100
        assert!((result.delay - 5.05).abs() < 1e-9);
    }

    #[test]
    fn test_window_excludes_small_lags() {
        let signal = bump(101, 50.0, 4.0);
        let result = find_lag(&signal, &signal, 1.0, &LagConfig::default()).unwrap();

        // The autocorrelation decays away from zero, so the window edge wins
        assert_eq!(result.lag, 5);
        assert!(result.correlation < 0.5);
    }

    #[test]
    fn test_window_clipped_to_available_lags() {
        let earlier = bump(20, 5.0, 2.0);
        let later = bump(20, 14.0, 2.0);
        let config = LagConfig {
            min_lag: 0,
            max_lag: 300,
        };

        let result = find_lag(&earlier, &later, 1.0, &config).unwrap();
        assert_eq!(result.lag, 9);

        let config = LagConfig {
            min_lag: 10,
            max_lag: 300,
        };
        assert_eq!(
            find_lag(&earlier, &later, 1.0, &config),
            Err(LagError::EmptyWindow {
                min_lag: 10,
                max_lag: 300,
                available: 10
            })
        );
    }

    #[test]
    fn test_preconditions() {
        let config = LagConfig::default();
        assert_eq!(
            find_lag(&[1.0; 10], &[1.0; 9], 1.0, &config),
            Err(LagError::LengthMismatch {
                earlier: 10,
                later: 9
            })
        );
        assert_eq!(
            find_lag(&[1.0], &[1.0], 1.0, &config),
            Err(LagError::TooShort(1))
        );
        assert_eq!(
            find_lag(&[1.0; 20], &[1.0; 20], 0.0, &config),
            Err(LagError::InvalidSpacing(0.0))
        );
        assert_eq!(
            find_lag(&[0.0; 20], &[1.0; 20], 1.0, &config),
            Err(LagError::ZeroEnergy)
        );

        let mut gappy = vec![1.0; 20];
        gappy[3] = f64::NAN;
        assert_eq!(
            find_lag(&[1.0; 20], &gappy, 1.0, &config),
            Err(LagError::NonFinite(3))
        );
    }
}
