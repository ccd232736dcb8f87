// Per-profile dune analysis
// Gap filling, decomposition, crest/trough extraction and geometry in order

use serde::Serialize;
use thiserror::Error;

use super::config::AnalysisConfig;
use super::trace::{AnalysisStage, TraceBuilder, TraceEntry, TraceError, TraceWriter};
use crate::dunes::{
    derive_dunes, find_troughs, match_crests, Dune, DuneMetrics, DuneSummary, ExtractionError,
    GeometryError,
};
use crate::gaps::{fill_edge_gaps, has_gaps, GapError};
use crate::profile::{Profile, ProfileError};
use crate::wavelet::{decompose, Decomposition, WaveletError};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Invalid profile: {0}")]
    Profile(#[from] ProfileError),

    #[error("Gap filling failed: {0}")]
    Gap(#[from] GapError),

    #[error("Wavelet decomposition failed: {0}")]
    Wavelet(#[from] WaveletError),

    #[error("Crest extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Dune geometry failed: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Trace write failed: {0}")]
    Trace(#[from] TraceError),

    #[error("Range {start}..{end} is invalid for a profile of {len} samples")]
    InvalidRange { start: usize, end: usize, len: usize },
}

/// Everything derived from one profile
#[derive(Debug, Clone, Serialize)]
pub struct ProfileAnalysis {
    pub profile_id: String,

    /// Analysed range `[start, end)`
    pub start: usize,
    pub end: usize,

    /// Mean sample spacing (dM)
    pub spacing: f64,

    /// Dune-band reconstruction, aligned with `start..end`
    pub reconstruction: Vec<f64>,

    /// Crest indices into the whole profile
    pub crests: Vec<usize>,

    /// Trough indices into the whole profile
    pub troughs: Vec<usize>,

    pub dunes: Vec<Dune>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<DuneSummary>,

    /// Wavelet coefficients kept for inspection
    #[serde(skip)]
    pub decomposition: Decomposition,
}

impl ProfileAnalysis {
    /// Index-aligned per-dune arrays
    pub fn metrics(&self) -> DuneMetrics {
        DuneMetrics::from(self.dunes.as_slice())
    }
}

/// Analyse one profile
pub fn analyze_profile(
    profile: &Profile,
    config: &AnalysisConfig,
) -> Result<ProfileAnalysis, AnalysisError> {
    run(profile, config, |_| Ok(()))
}

/// Analyse one profile, appending one trace entry per completed stage
pub fn analyze_profile_traced(
    profile: &Profile,
    config: &AnalysisConfig,
    writer: &TraceWriter,
) -> Result<ProfileAnalysis, AnalysisError> {
    run(profile, config, |entry| writer.write(&entry))
}

fn run<F>(
    profile: &Profile,
    config: &AnalysisConfig,
    mut record: F,
) -> Result<ProfileAnalysis, AnalysisError>
where
    F: FnMut(TraceEntry) -> Result<(), TraceError>,
{
    profile.validate()?;

    let len = profile.len();
    let (start, end) = config.range(len);
    if start >= end || end > len || end - start < 2 {
        return Err(AnalysisError::InvalidRange { start, end, len });
    }

    let id = profile.id.as_str();
    let spacing = profile.mean_spacing()?;

    // Gap filling
    let raw = &profile.elevation[start..end];
    if has_gaps(raw) {
        log::warn!("Profile {}: filling invalid edge samples", id);
    }
    let elevation = fill_edge_gaps(raw)?;
    let filtered = fill_edge_gaps(profile.filtered_elevation())?;
    record(TraceBuilder::new(id, AnalysisStage::GapFill).complete(format!(
        "Prepared {} samples ({}..{}) of a {:.1} m profile",
        end - start,
        start,
        end,
        profile.span()
    )))?;

    // Decomposition
    let decomposition = decompose(
        &elevation,
        &profile.distance[start..end],
        spacing,
        &config.wavelet,
    )?;
    let reconstruction = decomposition.reconstruction();
    let periods = decomposition.fourier_periods();
    record(TraceBuilder::new(id, AnalysisStage::Decomposition).complete_with(
        "Reconstructed dune band",
        serde_json::json!({
            "scales": decomposition.scales.len(),
            "periods": [periods.first(), periods.last()],
            "dominant_period": decomposition.dominant_period(),
        }),
    ))?;

    // Crests
    let crests = match_crests(&filtered[start..end], &reconstruction, start, &config.crests)?;
    record(TraceBuilder::new(id, AnalysisStage::CrestExtraction).complete_with(
        "Matched crests",
        serde_json::json!({ "crests": crests.len() }),
    ))?;

    // Troughs
    let troughs = if crests.is_empty() {
        log::warn!("Profile {}: no crests detected", id);
        Vec::new()
    } else {
        find_troughs(&filtered, &crests, start, end)?
    };
    record(TraceBuilder::new(id, AnalysisStage::TroughExtraction).complete_with(
        "Placed troughs",
        serde_json::json!({ "troughs": troughs.len() }),
    ))?;

    // Geometry
    let dunes = if crests.is_empty() || troughs.is_empty() {
        Vec::new()
    } else {
        derive_dunes(
            &filtered,
            &profile.distance,
            &crests,
            &troughs,
            &config.geometry,
        )?
    };
    let summary = DuneSummary::from_dunes(&dunes);
    record(TraceBuilder::new(id, AnalysisStage::Geometry).complete_with(
        "Derived dune geometry",
        serde_json::json!({ "dunes": dunes.len(), "summary": summary }),
    ))?;

    log::info!(
        "Profile {}: {} crests, {} troughs, {} dunes",
        id,
        crests.len(),
        troughs.len(),
        dunes.len()
    );

    Ok(ProfileAnalysis {
        profile_id: profile.id.clone(),
        start,
        end,
        spacing,
        reconstruction,
        crests,
        troughs,
        dunes,
        summary,
        decomposition,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::trace::read_trace_file;
    use crate::wavelet::WaveletConfig;
    use tempfile::TempDir;

    fn two_dune_profile() -> Profile {
        let distance: Vec<f64> = (0..9).map(|i| i as f64).collect();
        let elevation = vec![0.0, 1.0, 2.0, 1.0, 0.0, 1.0, 2.0, 1.0, 0.0];
        Profile::new("two-dunes", distance, elevation).unwrap()
    }

    fn short_band() -> AnalysisConfig {
        AnalysisConfig {
            wavelet: WaveletConfig {
                low_scale: 2.0,
                high_scale: 8.0,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_two_dune_profile() {
        let analysis = analyze_profile(&two_dune_profile(), &short_band()).unwrap();

        assert_eq!(analysis.reconstruction.len(), 9);
        assert_eq!(analysis.crests, vec![2, 6]);
        assert_eq!(analysis.troughs, vec![4, 8]);
        assert_eq!(analysis.dunes.len(), 1);

        let dune = &analysis.dunes[0];
        assert!((dune.height - 2.0).abs() < 1e-12);
        assert!((dune.length - 4.0).abs() < 1e-12);
        assert!((dune.lee_slope_deg - 45.0).abs() < 1e-9);

        let metrics = analysis.metrics();
        assert_eq!(metrics.aspect_ratios, vec![0.5]);
        assert_eq!(analysis.summary.unwrap().count, 1);
    }

    #[test]
    fn test_edge_gaps_are_filled() {
        let mut profile = two_dune_profile();
        profile.elevation[0] = f64::NAN;
        profile.elevation[8] = f64::NAN;

        let analysis = analyze_profile(&profile, &short_band()).unwrap();
        assert!(analysis.reconstruction.iter().all(|v| v.is_finite()));
        assert_eq!(analysis.crests, vec![2, 6]);
    }

    #[test]
    fn test_flat_profile_has_no_dunes() {
        let distance: Vec<f64> = (0..64).map(|i| i as f64).collect();
        let profile = Profile::new("flat", distance, vec![3.0; 64]).unwrap();

        let analysis = analyze_profile(&profile, &short_band()).unwrap();
        assert!(analysis.crests.is_empty());
        assert!(analysis.troughs.is_empty());
        assert!(analysis.dunes.is_empty());
        assert!(analysis.summary.is_none());
    }

    #[test]
    fn test_invalid_range() {
        let config = AnalysisConfig {
            start: 5,
            end: Some(20),
            ..short_band()
        };
        assert!(matches!(
            analyze_profile(&two_dune_profile(), &config),
            Err(AnalysisError::InvalidRange {
                start: 5,
                end: 20,
                len: 9
            })
        ));
    }

    #[test]
    fn test_all_invalid_elevation_fails() {
        let mut profile = two_dune_profile();
        profile.elevation.fill(f64::NAN);
        assert!(matches!(
            analyze_profile(&profile, &short_band()),
            Err(AnalysisError::Gap(GapError::AllInvalid(9)))
        ));
    }

    #[test]
    fn test_traced_analysis_records_every_stage() {
        let temp_dir = TempDir::new().unwrap();
        let writer = TraceWriter::new(temp_dir.path().join("trace.jsonl"));

        analyze_profile_traced(&two_dune_profile(), &short_band(), &writer).unwrap();

        let entries = read_trace_file(writer.path()).unwrap();
        let stages: Vec<AnalysisStage> = entries.iter().map(|e| e.stage).collect();
        assert_eq!(stages, AnalysisStage::ALL.to_vec());
        assert!(entries.iter().all(|e| e.profile_id == "two-dunes"));
        assert_eq!(entries[4].progress, 1.0);
        assert_eq!(entries[2].data.as_ref().unwrap()["crests"], 2);
    }

    #[test]
    fn test_trace_reports_span_and_period_band() {
        let mut entries = Vec::new();
        run(&two_dune_profile(), &short_band(), |entry| {
            entries.push(entry);
            Ok(())
        })
        .unwrap();

        assert_eq!(entries[0].message, "Prepared 9 samples (0..9) of a 8.0 m profile");

        let data = entries[1].data.as_ref().unwrap();
        let periods = data["periods"].as_array().unwrap();
        assert_eq!(periods.len(), 2);
        let (shortest, longest) = (periods[0].as_f64().unwrap(), periods[1].as_f64().unwrap());
        assert!(shortest > 0.0 && shortest < longest);

        let dominant = data["dominant_period"].as_f64().unwrap();
        assert!(dominant >= shortest && dominant <= longest);
    }

    #[test]
    fn test_serialized_analysis_skips_coefficients() {
        let analysis = analyze_profile(&two_dune_profile(), &short_band()).unwrap();
        let json = serde_json::to_value(&analysis).unwrap();

        assert_eq!(json["crests"], serde_json::json!([2, 6]));
        assert!(json.get("decomposition").is_none());
    }
}
