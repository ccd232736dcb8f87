// Peak detection on sampled profiles
// Local maxima with plateau handling and topographic prominence

/// Indices of local maxima in `signal`
///
/// A sample is a maximum when it is strictly higher than its left neighbour
/// and than the first differing sample to its right. Flat plateaus report
/// their middle sample (rounded down). The first and last samples are never
/// maxima.
pub fn local_maxima(signal: &[f64]) -> Vec<usize> {
    let mut peaks = Vec::new();
    if signal.len() < 3 {
        return peaks;
    }

    let last = signal.len() - 1;
    let mut i = 1;
    while i < last {
        if signal[i - 1] < signal[i] {
            let mut ahead = i + 1;
            while ahead < last && signal[ahead] == signal[i] {
                ahead += 1;
            }

            if signal[ahead] < signal[i] {
                peaks.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }

    peaks
}

/// Height of a peak above the higher of its two bases
///
/// Each base is the lowest sample reached walking away from the peak until a
/// strictly higher sample or the end of the signal.
pub fn prominence(signal: &[f64], peak: usize) -> f64 {
    let height = signal[peak];

    let left_min = signal[..=peak]
        .iter()
        .rev()
        .take_while(|&&v| !(v > height))
        .fold(height, |min, &v| if v < min { v } else { min });

    let right_min = signal[peak..]
        .iter()
        .take_while(|&&v| !(v > height))
        .fold(height, |min, &v| if v < min { v } else { min });

    height - left_min.max(right_min)
}

/// Local maxima whose prominence is at least `min_prominence`
pub fn find_peaks(signal: &[f64], min_prominence: Option<f64>) -> Vec<usize> {
    let peaks = local_maxima(signal);
    match min_prominence {
        Some(threshold) => peaks
            .into_iter()
            .filter(|&p| prominence(signal, p) >= threshold)
            .collect(),
        None => peaks,
    }
}
