// Analysis pipeline module
// Runs the per-profile stages, batches and traces them

pub mod analysis;
pub mod batch;
pub mod config;
pub mod trace;

pub use analysis::{analyze_profile, analyze_profile_traced, AnalysisError, ProfileAnalysis};
pub use batch::{analyze_batch, estimate_celerity_series};
pub use config::{AnalysisConfig, ConfigError};
pub use trace::{read_trace_file, AnalysisStage, TraceBuilder, TraceEntry, TraceError, TraceWriter};
