// Dunescan - Wavelet-based dune analysis for river-bed profiles
// Module declarations and public re-exports

pub mod celerity;
pub mod dunes;
pub mod gaps;
pub mod pipeline;
pub mod profile;
pub mod wavelet;

pub use celerity::{
    estimate_celerity, find_lag, Celerity, CelerityError, LagConfig, LagError, LagResult, Survey,
};
pub use dunes::{
    derive_dunes, find_troughs, match_crests, BoundaryCase, CrestConfig, Dune, DuneMetrics,
    DuneSummary, ExtractionError, GeometryConfig, GeometryError,
};
pub use gaps::{fill_edge_gaps, fill_grid_gaps, GapError};
pub use pipeline::{
    analyze_batch, analyze_profile, analyze_profile_traced, estimate_celerity_series,
    AnalysisConfig, AnalysisError, ConfigError, ProfileAnalysis,
};
pub use profile::{Profile, ProfileError};
pub use wavelet::{decompose, Decomposition, Morlet, WaveletAnalysis, WaveletConfig, WaveletError};
