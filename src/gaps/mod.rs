// Gap filling module
// Repairs missing elevation samples before spectral analysis

pub mod edges;
pub mod grid;
mod triangulation;

pub use edges::{fill_edge_gaps, has_gaps, GapError};
pub use grid::fill_grid_gaps;
