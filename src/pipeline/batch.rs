// Batch processing
// Independent profiles and survey pairs on the rayon pool

use rayon::prelude::*;

use super::analysis::{analyze_profile, AnalysisError, ProfileAnalysis};
use super::config::AnalysisConfig;
use crate::celerity::{estimate_celerity, Celerity, CelerityError, LagConfig, Survey};
use crate::profile::Profile;

/// Analyse many profiles in parallel, results in input order
pub fn analyze_batch(
    profiles: &[Profile],
    config: &AnalysisConfig,
) -> Vec<Result<ProfileAnalysis, AnalysisError>> {
    let results: Vec<_> = profiles
        .par_iter()
        .map(|profile| analyze_profile(profile, config))
        .collect();

    let failed = results.iter().filter(|r| r.is_err()).count();
    log::info!(
        "Analysed {} profiles ({} failed)",
        results.len(),
        failed
    );

    results
}

/// Celerity between each consecutive pair of surveys
///
/// Surveys are expected in chronological order; a pair out of order yields
/// `CelerityError::NotChronological` for that pair only.
pub fn estimate_celerity_series(
    surveys: &[Survey],
    config: &LagConfig,
) -> Vec<Result<Celerity, CelerityError>> {
    surveys
        .par_windows(2)
        .map(|pair| estimate_celerity(&pair[0], &pair[1], config))
        .collect()
}
