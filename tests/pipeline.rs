// End-to-end analysis of synthetic dune trains

use chrono::{Duration, TimeZone, Utc};
use dunescan::{
    analyze_profile, estimate_celerity, AnalysisConfig, LagConfig, Profile, Survey, WaveletConfig,
};

/// Asymmetric dune train: 45-sample stoss rise, 15-sample lee face, 1 m high
fn dune_elevation(i: usize) -> f64 {
    let p = i % 60;
    if p < 45 {
        10.0 + p as f64 / 45.0
    } else {
        10.0 + (60 - p) as f64 / 15.0
    }
}

fn dune_train(id: &str, n: usize, offset: usize) -> Profile {
    let distance: Vec<f64> = (0..n).map(|i| i as f64 * 0.5).collect();
    let elevation: Vec<f64> = (0..n).map(|i| dune_elevation(i + offset)).collect();
    Profile::new(id, distance, elevation).unwrap()
}

fn dune_band() -> AnalysisConfig {
    AnalysisConfig {
        wavelet: WaveletConfig {
            low_scale: 10.0,
            high_scale: 60.0,
            ..Default::default()
        },
        ..Default::default()
    }
}

#[test]
fn test_dune_train_geometry() {
    let profile = dune_train("train", 420, 10);
    let analysis = analyze_profile(&profile, &dune_band()).unwrap();

    assert_eq!(analysis.crests, vec![35, 95, 155, 215, 275, 335, 395]);
    assert_eq!(analysis.troughs, vec![50, 110, 170, 230, 290, 350, 410]);

    // Starts on a crest, so the first crest has no stoss trough
    assert_eq!(analysis.dunes.len(), 6);
    let lee_angle = (1.0f64 / 7.5).atan().to_degrees();
    for dune in &analysis.dunes {
        assert!((dune.length - 30.0).abs() < 1e-9);
        assert!((dune.height - 1.0).abs() < 1e-9);
        assert!((dune.lee_slope_deg - lee_angle).abs() < 1e-6);
        assert!((dune.aspect_ratio - dune.height / dune.length).abs() < 1e-12);
    }

    let summary = analysis.summary.unwrap();
    assert_eq!(summary.count, 6);
    assert!((summary.median_length - 30.0).abs() < 1e-9);
}

#[test]
fn test_crests_and_troughs_interleave() {
    let profile = dune_train("train", 420, 10);
    let analysis = analyze_profile(&profile, &dune_band()).unwrap();

    let mut all: Vec<usize> = analysis
        .crests
        .iter()
        .chain(&analysis.troughs)
        .copied()
        .collect();
    all.sort_unstable();
    all.dedup();
    assert_eq!(all.len(), analysis.crests.len() + analysis.troughs.len());
    assert!(analysis.crests.windows(2).all(|w| w[0] < w[1]));
    assert!(analysis.troughs.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_dune_train_celerity() {
    let t0 = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();

    let demeaned = |profile: Profile| {
        let elevation = profile.elevation.iter().map(|z| z - 10.5).collect();
        Profile::new(profile.id, profile.distance, elevation).unwrap()
    };
    let earlier = Survey::new(demeaned(dune_train("t0", 420, 10)), t0);
    // Bed moved 8 samples (4 m) downstream
    let later = Survey::new(demeaned(dune_train("t1", 420, 2)), t0 + Duration::hours(24));

    let celerity = estimate_celerity(&earlier, &later, &LagConfig::default()).unwrap();
    assert_eq!(celerity.lag.lag, 8);
    assert!(celerity.lag.correlation > 0.9);
    assert!((celerity.lag.delay - 4.260143198090688).abs() < 1e-9);
    assert!((celerity.metres_per_day - celerity.lag.delay).abs() < 1e-9);
}
