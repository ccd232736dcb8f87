// Continuous wavelet transform
// FFT convolution with sampled Morlet wavelets and band-limited reconstruction

use ndarray::Array2;
use realfft::num_complex::Complex;
use realfft::{ComplexToReal, FftError, RealFftPlanner, RealToComplex};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use super::morlet::Morlet;

#[derive(Debug, Error)]
pub enum WaveletError {
    #[error("Elevation has {elevation} samples but distance has {distance}")]
    LengthMismatch { elevation: usize, distance: usize },

    #[error("Cannot decompose an empty series")]
    Empty,

    #[error("Sample spacing must be positive and finite, got {0}")]
    InvalidSpacing(f64),

    #[error("Elevation is not finite at index {0}")]
    NonFinite(usize),

    #[error("Invalid scale band {low}..{high} with step {step}")]
    InvalidScales { low: f64, high: f64, step: f64 },

    #[error("FFT failed: {0}")]
    Fft(#[from] FftError),
}

/// Configuration for the dune-band decomposition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveletConfig {
    /// First reconstruction scale in distance units (lowLim)
    pub low_scale: f64,

    /// End of the reconstruction scales, exclusive (upLim)
    pub high_scale: f64,

    /// Spacing between consecutive reconstruction scales
    pub scale_step: f64,

    /// Scale resolution (dj) used in the reconstruction weights
    pub dj: f64,

    /// Report power divided by scale (bias rectification)
    pub unbias: bool,
}

impl Default for WaveletConfig {
    fn default() -> Self {
        WaveletConfig {
            low_scale: 20.0,
            high_scale: 300.0,
            scale_step: 1.0,
            dj: 0.125,
            unbias: true,
        }
    }
}

impl WaveletConfig {
    /// Evenly spaced scales `low_scale, low_scale + step, ...` below `high_scale`
    pub fn band_scales(&self) -> Result<Vec<f64>, WaveletError> {
        let invalid = WaveletError::InvalidScales {
            low: self.low_scale,
            high: self.high_scale,
            step: self.scale_step,
        };
        if !(self.low_scale > 0.0 && self.scale_step > 0.0 && self.high_scale > self.low_scale)
            || !self.high_scale.is_finite()
        {
            return Err(invalid);
        }

        let count = ((self.high_scale - self.low_scale) / self.scale_step).ceil() as usize;
        Ok((0..count)
            .map(|i| self.low_scale + i as f64 * self.scale_step)
            .collect())
    }
}

/// Wavelet coefficients of one series over a set of scales
#[derive(Debug, Clone)]
pub struct Decomposition {
    /// Scales in distance units, one row of coefficients each
    pub scales: Vec<f64>,

    /// Complex coefficients W_n(s), shape (scales, samples)
    pub coefficients: Array2<Complex<f64>>,

    /// Distance axis of the transformed samples
    pub distance: Vec<f64>,

    /// Sample spacing
    pub dt: f64,

    /// Scale resolution used for reconstruction
    pub dj: f64,

    /// Mean removed before transforming
    pub mean: f64,

    /// Whether power is divided by scale
    pub unbias: bool,

    /// Mother wavelet
    pub wavelet: Morlet,
}

impl Decomposition {
    /// Number of samples per scale
    pub fn len(&self) -> usize {
        self.coefficients.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Wavelet power |W|², divided by scale when unbiased
    pub fn power(&self) -> Array2<f64> {
        let mut power = self.coefficients.mapv(|c| c.norm_sqr());
        if self.unbias {
            for (mut row, &scale) in power.rows_mut().into_iter().zip(&self.scales) {
                row.mapv_inplace(|p| p / scale);
            }
        }
        power
    }

    /// Fourier periods matching each scale
    pub fn fourier_periods(&self) -> Vec<f64> {
        self.scales
            .iter()
            .map(|&s| self.wavelet.fourier_period(s))
            .collect()
    }

    /// Time-averaged power per scale
    pub fn global_spectrum(&self) -> Vec<f64> {
        let n = self.len().max(1) as f64;
        self.power().rows().into_iter().map(|row| row.sum() / n).collect()
    }

    /// Fourier period carrying the most time-averaged power
    pub fn dominant_period(&self) -> Option<f64> {
        let spectrum = self.global_spectrum();
        let (best, _) = spectrum
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_finite())
            .max_by(|a, b| a.1.total_cmp(b.1))?;
        Some(self.wavelet.fourier_period(self.scales[best]))
    }

    /// Inverse transform over the stored scales, mean added back
    pub fn reconstruction(&self) -> Vec<f64> {
        let factor = self.dj * self.dt.sqrt() / (self.wavelet.c_delta * self.wavelet.peak());
        let mut series = vec![0.0; self.len()];

        for (row, &scale) in self.coefficients.rows().into_iter().zip(&self.scales) {
            let weight = 1.0 / scale.sqrt();
            for (value, c) in series.iter_mut().zip(row.iter()) {
                *value += c.re * weight;
            }
        }

        series.iter().map(|v| v * factor + self.mean).collect()
    }
}

/// Continuous wavelet analysis of one elevation series
#[derive(Debug, Clone)]
pub struct WaveletAnalysis {
    data: Vec<f64>,
    distance: Vec<f64>,
    dt: f64,
    dj: f64,
    unbias: bool,
    wavelet: Morlet,
}

impl WaveletAnalysis {
    /// Validate inputs; `dt` is the uniform sample spacing
    pub fn new(elevation: &[f64], distance: &[f64], dt: f64) -> Result<Self, WaveletError> {
        if elevation.len() != distance.len() {
            return Err(WaveletError::LengthMismatch {
                elevation: elevation.len(),
                distance: distance.len(),
            });
        }
        if elevation.is_empty() {
            return Err(WaveletError::Empty);
        }
        if !(dt.is_finite() && dt > 0.0) {
            return Err(WaveletError::InvalidSpacing(dt));
        }
        if let Some(i) = elevation.iter().position(|v| !v.is_finite()) {
            return Err(WaveletError::NonFinite(i));
        }

        Ok(WaveletAnalysis {
            data: elevation.to_vec(),
            distance: distance.to_vec(),
            dt,
            dj: 0.125,
            unbias: true,
            wavelet: Morlet::default(),
        })
    }

    pub fn with_dj(mut self, dj: f64) -> Self {
        self.dj = dj;
        self
    }

    pub fn unbiased(mut self, unbias: bool) -> Self {
        self.unbias = unbias;
        self
    }

    pub fn mean(&self) -> f64 {
        self.data.iter().sum::<f64>() / self.data.len() as f64
    }

    /// Log-spaced scales from the smallest resolvable one (Fourier period
    /// of two samples) up to the series length
    pub fn optimal_scales(&self) -> Vec<f64> {
        let s0 = self.wavelet.scale_for_period(2.0 * self.dt);
        let n = self.data.len() as f64;
        let j = ((n * self.dt / s0).log2() / self.dj).trunc().max(0.0) as usize;
        (0..=j)
            .map(|i| s0 * 2f64.powf(i as f64 * self.dj))
            .collect()
    }

    /// Transform the demeaned series at the given scales
    pub fn transform(&self, scales: &[f64]) -> Result<Decomposition, WaveletError> {
        if let Some(&bad) = scales.iter().find(|s| !(s.is_finite() && **s > 0.0)) {
            return Err(WaveletError::InvalidScales {
                low: bad,
                high: bad,
                step: 0.0,
            });
        }

        let mean = self.mean();
        let anomaly: Vec<f64> = self.data.iter().map(|v| v - mean).collect();
        let mut planner = RealFftPlanner::<f64>::new();
        let mut coefficients = Array2::<Complex<f64>>::zeros((scales.len(), anomaly.len()));

        for (mut row, &scale) in coefficients.rows_mut().into_iter().zip(scales) {
            let kernel = self.sample_wavelet(scale);
            let convolved = convolve_same(&anomaly, &kernel, &mut planner)?;
            for (slot, value) in row.iter_mut().zip(convolved) {
                *slot = value;
            }
        }

        log::debug!(
            "Wavelet transform of {} samples over {} scales",
            anomaly.len(),
            scales.len()
        );

        Ok(Decomposition {
            scales: scales.to_vec(),
            coefficients,
            distance: self.distance.clone(),
            dt: self.dt,
            dj: self.dj,
            mean,
            unbias: self.unbias,
            wavelet: self.wavelet,
        })
    }

    /// Wavelet sampled over ten scale widths, centred on zero and
    /// normalized to unit energy
    fn sample_wavelet(&self, scale: f64) -> Vec<Complex<f64>> {
        let width = 10.0 * scale / self.dt;
        let count = (width.ceil() as usize).max(1);
        let norm = (self.dt / scale).sqrt();

        (0..count)
            .map(|j| {
                let t = ((1.0 - width) / 2.0 + j as f64) * self.dt;
                self.wavelet.time(t, scale) * norm
            })
            .collect()
    }
}

/// Decompose an elevation series over the configured dune band
pub fn decompose(
    elevation: &[f64],
    distance: &[f64],
    dt: f64,
    config: &WaveletConfig,
) -> Result<Decomposition, WaveletError> {
    let scales = config.band_scales()?;
    WaveletAnalysis::new(elevation, distance, dt)?
        .with_dj(config.dj)
        .unbiased(config.unbias)
        .transform(&scales)
}

/// Linear convolution of a real series with a complex kernel, cropped to the
/// series length and centred like the kernel
fn convolve_same(
    data: &[f64],
    kernel: &[Complex<f64>],
    planner: &mut RealFftPlanner<f64>,
) -> Result<Vec<Complex<f64>>, FftError> {
    let full_len = data.len() + kernel.len() - 1;
    let fft_len = full_len.next_power_of_two();
    let forward = planner.plan_fft_forward(fft_len);
    let inverse = planner.plan_fft_inverse(fft_len);

    let data_spectrum = real_spectrum(data.iter().copied(), &forward)?;
    let re_spectrum = real_spectrum(kernel.iter().map(|c| c.re), &forward)?;
    let im_spectrum = real_spectrum(kernel.iter().map(|c| c.im), &forward)?;

    let product = |kernel_spectrum: &[Complex<f64>]| -> Vec<Complex<f64>> {
        data_spectrum
            .iter()
            .zip(kernel_spectrum)
            .map(|(a, b)| a * b)
            .collect()
    };
    let re_full = inverse_real(product(&re_spectrum), &inverse)?;
    let im_full = inverse_real(product(&im_spectrum), &inverse)?;

    let start = (kernel.len() - 1) / 2;
    Ok((start..start + data.len())
        .map(|i| Complex::new(re_full[i], im_full[i]))
        .collect())
}

/// Zero-padded forward FFT of a real sequence
fn real_spectrum(
    values: impl Iterator<Item = f64>,
    fft: &Arc<dyn RealToComplex<f64>>,
) -> Result<Vec<Complex<f64>>, FftError> {
    let mut input = fft.make_input_vec();
    for (slot, value) in input.iter_mut().zip(values) {
        *slot = value;
    }
    let mut spectrum = fft.make_output_vec();
    fft.process(&mut input, &mut spectrum)?;
    Ok(spectrum)
}

/// Normalized inverse FFT back to a real sequence
fn inverse_real(
    mut spectrum: Vec<Complex<f64>>,
    fft: &Arc<dyn ComplexToReal<f64>>,
) -> Result<Vec<f64>, FftError> {
    // DC and Nyquist bins of a real signal have no imaginary part
    if let Some(first) = spectrum.first_mut() {
        first.im = 0.0;
    }
    if fft.len() % 2 == 0 {
        if let Some(last) = spectrum.last_mut() {
            last.im = 0.0;
        }
    }

    let mut output = fft.make_output_vec();
    fft.process(&mut spectrum, &mut output)?;
    let scale = 1.0 / output.len() as f64;
    Ok(output.into_iter().map(|v| v * scale).collect())
}
