mod common;

use common::{Ma1, simulate_table};
use rust_dsge::{
    estimation::{EstimationConfig, Posterior},
    filter::InitKind,
    model::prelude::*,
    state_space::{DataWindow, ObservationTable},
};

#[test]
// Purpose
// -------
// On a long simulated sample the likelihood prefers the data-generating
// parameters to clearly wrong ones.
//
// Given
// -----
// - 2000 periods of MA(1) data at (μ, β, σ) = (0.75, 0.5, 0.25).
// - Each parameter moved up and down by a step well beyond sampling
//   error.
//
// Expect
// ------
// - Every perturbation lowers the log-likelihood.
fn likelihood_peaks_near_true_parameters() {
    // Arrange
    let model = Ma1::new(0.75, 0.5, 0.25);
    let table = simulate_table(&model, 2000, 11);
    let posterior = Posterior::new(&model, &table, &EstimationConfig::default()).expect("posterior");
    let at_truth = posterior.log_likelihood(model.parameters()).expect("likelihood at truth");

    for (name, step) in [("mu", 0.1), ("beta", 0.2), ("sigma", 0.08)] {
        for sign in [-1.0, 1.0] {
            // Act
            let mut params = model.parameters().clone();
            let value = params.get(name).expect("known parameter") + sign * step;
            params.set(name, value).expect("set");
            let moved = posterior.log_likelihood(&params).expect("likelihood");

            // Assert
            assert!(moved < at_truth, "{name} {sign:+}: {moved} should be below {at_truth}");
        }
    }
}

/// Central-difference gradient of the log-likelihood in model space.
fn likelihood_gradient(posterior: &Posterior<'_, Ma1>, at: &ParameterRegistry) -> Vec<f64> {
    let h = 1e-5;
    at.free_names()
        .iter()
        .map(|name| {
            let value = at.get(name).expect("known parameter");
            let mut up = at.clone();
            up.set(name, value + h).expect("set");
            let mut down = at.clone();
            down.set(name, value - h).expect("set");
            let (l_up, l_down) = (
                posterior.log_likelihood(&up).expect("likelihood"),
                posterior.log_likelihood(&down).expect("likelihood"),
            );
            (l_up - l_down) / (2.0 * h)
        })
        .collect()
}

#[test]
// Purpose
// -------
// The score vanishes at the data-generating parameters on average over
// repeated samples, while a wrong mean gives a systematic slope.
//
// Given
// -----
// - 8 samples of 500 MA(1) periods at (μ, β, σ) = (0.75, 0.5, 0.25).
// - Finite-difference gradients at the truth and at μ + 0.2.
//
// Expect
// ------
// - At the truth each averaged component lies within 4 standard errors of
//   zero.
// - At μ + 0.2 the averaged μ slope is negative and far outside that band.
fn score_averages_to_zero_at_truth() {
    // Arrange
    let model = Ma1::new(0.75, 0.5, 0.25);
    let mut shifted = model.parameters().clone();
    shifted.set("mu", 0.95).expect("set");
    let seeds = 1..=8u64;
    let n = seeds.clone().count() as f64;

    // Act
    let (mut at_truth, mut at_shifted) = (Vec::new(), Vec::new());
    for seed in seeds {
        let table = simulate_table(&model, 500, 100 + seed);
        let posterior =
            Posterior::new(&model, &table, &EstimationConfig::default()).expect("posterior");
        at_truth.push(likelihood_gradient(&posterior, model.parameters()));
        at_shifted.push(likelihood_gradient(&posterior, &shifted));
    }

    // Assert
    let mut mu_band = 0.0;
    for k in 0..3 {
        let column: Vec<f64> = at_truth.iter().map(|g| g[k]).collect();
        let mean = column.iter().sum::<f64>() / n;
        let var = column.iter().map(|g| (g - mean).powi(2)).sum::<f64>() / (n - 1.0);
        let band = 4.0 * (var / n).sqrt();
        assert!(mean.abs() < band, "score {k} averages {mean}, band {band}");
        if k == 0 {
            mu_band = band;
        }
    }
    let shifted_mu = at_shifted.iter().map(|g| g[0]).sum::<f64>() / n;
    assert!(shifted_mu < -3.0 * mu_band, "slope {shifted_mu} at μ + 0.2, band {mu_band}");
}

#[test]
// Purpose
// -------
// Missing observations and a presample window change which periods
// contribute, not whether the filter runs.
//
// Given
// -----
// - 200 simulated periods, every tenth blanked out.
// - A window that uses the first 20 periods as presample.
//
// Expect
// ------
// - Blank periods contribute exactly 0.
// - Presample periods are excluded from the total.
// - The stationary initialization is used.
fn missing_periods_and_presample_are_skipped() {
    // Arrange
    let model = Ma1::new(0.75, 0.5, 0.25);
    let full = simulate_table(&model, 200, 3);
    let mut values = full.values().clone();
    for t in (0..200).step_by(10) {
        values[[t, 0]] = f64::NAN;
    }
    let table = ObservationTable::new(full.observables().to_vec(), values).expect("table");
    let config = EstimationConfig::default().with_window(DataWindow::new(0, 20, 200));

    // Act
    let posterior = Posterior::new(&model, &table, &config).expect("posterior");
    let out = posterior.filter(model.parameters()).expect("filter");

    // Assert
    assert_eq!(out.init, InitKind::Stationary);
    for t in (0..200).step_by(10) {
        assert_eq!(out.period_log_likelihoods[t], 0.0);
    }
    let main: f64 = out.period_log_likelihoods.iter().skip(20).sum();
    assert!((out.log_likelihood - main).abs() < 1e-9);
    assert!(out.log_likelihood.is_finite());
}
