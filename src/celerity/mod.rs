// Dune celerity module
// Lag estimation between surveys and migration rates

pub mod lag;
pub mod survey;

pub use lag::{find_lag, LagConfig, LagError, LagResult};
pub use survey::{estimate_celerity, Celerity, CelerityError, Survey};
