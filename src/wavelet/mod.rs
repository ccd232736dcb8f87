// Wavelet module
// Continuous Morlet wavelet decomposition of bed elevation profiles

pub mod morlet;
pub mod transform;

pub use morlet::Morlet;
pub use transform::{decompose, Decomposition, WaveletAnalysis, WaveletConfig, WaveletError};
