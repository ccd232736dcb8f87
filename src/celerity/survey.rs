// Dune celerity between surveys
// Converts the lag between two dated profiles into a migration rate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::lag::{find_lag, LagConfig, LagError, LagResult};
use crate::gaps::{fill_edge_gaps, GapError};
use crate::profile::{Profile, ProfileError};

#[derive(Debug, Error)]
pub enum CelerityError {
    #[error("Invalid profile: {0}")]
    Profile(#[from] ProfileError),

    #[error("Gap filling failed: {0}")]
    Gap(#[from] GapError),

    #[error("Lag estimation failed: {0}")]
    Lag(#[from] LagError),

    #[error("Survey at {later} does not follow survey at {earlier}")]
    NotChronological {
        earlier: DateTime<Utc>,
        later: DateTime<Utc>,
    },

    #[error("Surveys use different sample spacing: {earlier} vs {later}")]
    SpacingMismatch { earlier: f64, later: f64 },
}

/// A profile together with the time it was measured
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Survey {
    pub profile: Profile,
    pub surveyed_at: DateTime<Utc>,
}

impl Survey {
    pub fn new(profile: Profile, surveyed_at: DateTime<Utc>) -> Self {
        Survey {
            profile,
            surveyed_at,
        }
    }
}

/// Migration of the bed between two surveys
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Celerity {
    pub lag: LagResult,

    /// Time between the surveys
    pub interval_hours: f64,

    pub metres_per_hour: f64,

    pub metres_per_day: f64,
}

/// Relative tolerance when comparing sample spacing of two surveys
const SPACING_TOLERANCE: f64 = 1e-6;

/// Estimate dune celerity from two surveys of the same line
///
/// The filtered elevations are correlated after filling invalid edge
/// samples. `later` must be strictly after `earlier`.
pub fn estimate_celerity(
    earlier: &Survey,
    later: &Survey,
    config: &LagConfig,
) -> Result<Celerity, CelerityError> {
    if later.surveyed_at <= earlier.surveyed_at {
        return Err(CelerityError::NotChronological {
            earlier: earlier.surveyed_at,
            later: later.surveyed_at,
        });
    }

    let spacing = earlier.profile.mean_spacing()?;
    let later_spacing = later.profile.mean_spacing()?;
    if (spacing - later_spacing).abs() > SPACING_TOLERANCE * spacing.abs() {
        return Err(CelerityError::SpacingMismatch {
            earlier: spacing,
            later: later_spacing,
        });
    }

    let y1 = fill_edge_gaps(earlier.profile.filtered_elevation())?;
    let y2 = fill_edge_gaps(later.profile.filtered_elevation())?;
    let lag = find_lag(&y1, &y2, spacing, config)?;

    let interval_hours =
        (later.surveyed_at - earlier.surveyed_at).num_milliseconds() as f64 / 3_600_000.0;
    let metres_per_hour = lag.delay / interval_hours;

    log::info!(
        "{} -> {}: {:.3} m in {:.1} h ({:.3} m/day, r = {:.2})",
        earlier.profile.id,
        later.profile.id,
        lag.delay,
        interval_hours,
        metres_per_hour * 24.0,
        lag.correlation
    );

    Ok(Celerity {
        lag,
        interval_hours,
        metres_per_hour,
        metres_per_day: metres_per_hour * 24.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn survey(id: &str, centre: f64, at: DateTime<Utc>) -> Survey {
        let distance: Vec<f64> = (0..101).map(|i| i as f64 * 0.5).collect();
        let elevation: Vec<f64> = (0..101)
            .map(|i| {
                let x = (i as f64 - centre) / 4.0;
                (-x * x).exp()
            })
            .collect();
        Survey::new(Profile::new(id, distance, elevation).unwrap(), at)
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 6, 0, 0).unwrap()
    }

    #[test]
    fn test_celerity_from_shifted_survey() {
        let earlier = survey("line-1/a", 30.0, start());
        let later = survey("line-1/b", 40.0, start() + Duration::hours(48));

        let celerity = estimate_celerity(&earlier, &later, &LagConfig::default()).unwrap();
        assert_eq!(celerity.lag.lag, 10);
        assert!((celerity.interval_hours - 48.0).abs() < 1e-12);
        assert!((celerity.metres_per_hour - 5.05 / 48.0).abs() < 1e-9);
        assert!((celerity.metres_per_day - 5.05 / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_edge_gaps_are_filled() {
        let earlier = survey("a", 30.0, start());
        let mut later = survey("b", 40.0, start() + Duration::hours(12));
        later.profile.elevation[0] = f64::NAN;
        later.profile.elevation[100] = f64::NAN;

        let celerity = estimate_celerity(&earlier, &later, &LagConfig::default()).unwrap();
        assert_eq!(celerity.lag.lag, 10);
    }

    #[test]
    fn test_requires_chronological_order() {
        let earlier = survey("a", 30.0, start());
        let later = survey("b", 40.0, start());

        assert!(matches!(
            estimate_celerity(&earlier, &later, &LagConfig::default()),
            Err(CelerityError::NotChronological { .. })
        ));
        assert!(matches!(
            estimate_celerity(&later, &earlier, &LagConfig::default()),
            Err(CelerityError::NotChronological { .. })
        ));
    }

    #[test]
    fn test_spacing_must_match() {
        let earlier = survey("a", 30.0, start());
        let mut later = survey("b", 40.0, start() + Duration::hours(1));
        for d in later.profile.distance.iter_mut() {
            *d *= 2.0;
        }

        assert!(matches!(
            estimate_celerity(&earlier, &later, &LagConfig::default()),
            Err(CelerityError::SpacingMismatch { .. })
        ));
    }

    #[test]
    fn test_all_invalid_profile_fails() {
        let earlier = survey("a", 30.0, start());
        let mut later = survey("b", 40.0, start() + Duration::hours(1));
        later.profile.elevation.fill(f64::NAN);

        assert!(matches!(
            estimate_celerity(&earlier, &later, &LagConfig::default()),
            Err(CelerityError::Gap(GapError::AllInvalid(101)))
        ));
    }
}
