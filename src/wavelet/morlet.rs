// Morlet mother wavelet
// Time-domain form and scale/period relations after Torrence & Compo (1998)

use realfft::num_complex::Complex;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Complex Morlet wavelet with admissibility correction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Morlet {
    /// Non-dimensional central frequency (ω0)
    pub omega0: f64,

    /// Reconstruction factor C_δ, empirical for a given ω0
    /// (0.776 for ω0 = 6)
    pub c_delta: f64,
}

impl Default for Morlet {
    fn default() -> Self {
        Morlet {
            omega0: 6.0,
            c_delta: 0.776,
        }
    }
}

impl Morlet {
    /// Wavelet value at time (or distance) `t` for scale `scale`
    pub fn time(&self, t: f64, scale: f64) -> Complex<f64> {
        let x = t / scale;
        let envelope = (-0.5 * x * x).exp() * PI.powf(-0.25);
        let correction = (-0.5 * self.omega0 * self.omega0).exp();
        let phase = self.omega0 * x;

        Complex::new((phase.cos() - correction) * envelope, phase.sin() * envelope)
    }

    /// ψ0(0), the real peak value of the unit-scale wavelet
    pub fn peak(&self) -> f64 {
        self.time(0.0, 1.0).re
    }

    /// Equivalent Fourier period of a scale
    pub fn fourier_period(&self, scale: f64) -> f64 {
        4.0 * PI * scale / (self.omega0 + (2.0 + self.omega0 * self.omega0).sqrt())
    }

    /// Scale whose Fourier period equals `period`
    pub fn scale_for_period(&self, period: f64) -> f64 {
        period * (self.omega0 + (2.0 + self.omega0 * self.omega0).sqrt()) / (4.0 * PI)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_value() {
        let morlet = Morlet::default();
        let expected = (1.0 - (-18.0f64).exp()) * PI.powf(-0.25);
        assert!((morlet.peak() - expected).abs() < 1e-12);
        assert!(morlet.time(0.0, 5.0).im.abs() < 1e-12);
    }

    #[test]
    fn test_envelope_decays() {
        let morlet = Morlet::default();
        assert!(morlet.time(4.0, 1.0).norm() < 1e-3);
        // Scale stretches the wavelet
        assert!((morlet.time(2.0, 2.0) - morlet.time(1.0, 1.0)).norm() < 1e-12);
    }

    #[test]
    fn test_period_scale_relation() {
        let morlet = Morlet::default();
        // ω0 = 6 gives a Fourier period of about 1.033 scales
        assert!((morlet.fourier_period(1.0) - 1.033).abs() < 1e-3);

        let scale = morlet.scale_for_period(40.0);
        assert!((morlet.fourier_period(scale) - 40.0).abs() < 1e-9);
    }
}
