// Dune detection module
// Crest/trough extraction and per-dune geometry

pub mod crests;
pub mod geometry;
pub mod peaks;
pub mod types;

pub use crests::{find_troughs, match_crests, CrestConfig, ExtractionError};
pub use geometry::{derive_dunes, GeometryConfig, GeometryError};
pub use peaks::{find_peaks, local_maxima, prominence};
pub use types::{BoundaryCase, Dune, DuneMetrics, DuneSummary};
