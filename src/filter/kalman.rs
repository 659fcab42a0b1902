//! Kalman filter with missing observations and correlated noise.
//!
//! Model
//! -----
//! ```text
//! sₜ = T sₜ₋₁ + C′ + wₜ        Var(wₜ) = R Q Rᵀ
//! yₜ = Z sₜ + D + vₜ           Var(vₜ) = H,  Cov(wₜ, vₜ) = G
//! ```
//! with `R Q Rᵀ`, `H` and `G` read from the combined covariance.
//!
//! Per period, with `P⁻` the predicted covariance and only the rows of the
//! observed entries of `yₜ`:
//! ```text
//! F = Z P⁻ Zᵀ + H + Z G + Gᵀ Zᵀ
//! K = (P⁻ Zᵀ + G) F⁻¹
//! P = P⁻ − K (P⁻ Zᵀ + G)ᵀ
//! ```
//! A period with nothing observed keeps the prediction and contributes
//! zero. `F` is factored by Cholesky; a failed factorization or a pivot
//! below `pd_tolerance` is a `NotPositiveDefinite` error, never a clipped
//! likelihood.
use crate::{
    filter::{
        errors::{FilterError, FilterResult},
        init::{InitKind, initialize},
        options::FilterOptions,
    },
    solver::types::TransitionSystem,
    state_space::measurement::MeasurementSystem,
    utils::{symmetrize, to_dmatrix},
};
use nalgebra::{Cholesky, DMatrix, DVector};
use ndarray::{Array1, Array2, Array3, s};
use std::f64::consts::PI;

/// Full filter output.
///
/// - `log_likelihood`: sum of `period_log_likelihoods` after the presample.
/// - `period_log_likelihoods`: one entry per period, presample included.
/// - `filtered_states` / `filtered_covariances`: `E[sₜ | y₁..ₜ]` and its
///   covariance, indexed by period first.
#[derive(Debug, Clone, PartialEq)]
pub struct KalmanOutput {
    pub log_likelihood: f64,
    pub period_log_likelihoods: Array1<f64>,
    pub filtered_states: Array2<f64>,
    pub filtered_covariances: Array3<f64>,
    pub init: InitKind,
}

/// Run the filter and keep the filtered moments.
///
/// # Errors
/// - `EmptyData`, `DimensionMismatch` or `InvalidOptions` for malformed
///   input.
/// - Numerical variants (see [`FilterError::is_numerical`]) when the
///   system is degenerate at these parameters.
pub fn filter(
    transition: &TransitionSystem, measurement: &MeasurementSystem, data: &Array2<f64>,
    opts: &FilterOptions,
) -> FilterResult<KalmanOutput> {
    let n = transition.n_states();
    let mut moments = Moments {
        states: Array2::zeros((data.nrows(), n)),
        covs: Array3::zeros((data.nrows(), n, n)),
    };
    let (log_likelihood, period_log_likelihoods, init) =
        run(transition, measurement, data, opts, Some(&mut moments))?;
    Ok(KalmanOutput {
        log_likelihood,
        period_log_likelihoods,
        filtered_states: moments.states,
        filtered_covariances: moments.covs,
        init,
    })
}

/// Log-likelihood only; skips storing the filtered moments.
pub fn log_likelihood(
    transition: &TransitionSystem, measurement: &MeasurementSystem, data: &Array2<f64>,
    opts: &FilterOptions,
) -> FilterResult<f64> {
    run(transition, measurement, data, opts, None).map(|(ll, _, _)| ll)
}

struct Moments {
    states: Array2<f64>,
    covs: Array3<f64>,
}

impl Moments {
    fn record(&mut self, period: usize, mean: &DVector<f64>, cov: &DMatrix<f64>) {
        for (dst, src) in self.states.row_mut(period).iter_mut().zip(mean.iter()) {
            *dst = *src;
        }
        for ((i, j), dst) in self.covs.slice_mut(s![period, .., ..]).indexed_iter_mut() {
            *dst = cov[(i, j)];
        }
    }
}

fn run(
    transition: &TransitionSystem, measurement: &MeasurementSystem, data: &Array2<f64>,
    opts: &FilterOptions, mut moments: Option<&mut Moments>,
) -> FilterResult<(f64, Array1<f64>, InitKind)> {
    opts.validate()?;
    check_dimensions(transition, measurement, data, opts)?;
    let n = transition.n_states();
    let n_periods = data.nrows();

    let t = to_dmatrix(&transition.t.view());
    let c = DVector::from_iterator(n, transition.c.iter().copied());
    let z = to_dmatrix(&measurement.z.view());
    let d = DVector::from_iterator(measurement.d.len(), measurement.d.iter().copied());
    let combined = to_dmatrix(&measurement.combined.view());
    let w_cov = combined.view((0, 0), (n, n)).into_owned();
    let g = combined.view((0, n), (n, z.nrows())).into_owned();
    let h = combined.view((n, n), (z.nrows(), z.nrows())).into_owned();

    let start = initialize(&t, &c, &w_cov, &opts.init)?;
    let init_kind = start.kind;
    let (mut s_filt, mut p_filt) = (start.mean, start.cov);
    let mut period_ll = Array1::zeros(n_periods);
    let mut observed = Vec::with_capacity(z.nrows());

    for period in 0..n_periods {
        let s_pred = &t * &s_filt + &c;
        let mut p_pred = &t * &p_filt * t.transpose() + &w_cov;
        symmetrize(&mut p_pred);

        observed.clear();
        observed.extend(data.row(period).iter().enumerate().filter(|(_, y)| !y.is_nan()).map(|(i, _)| i));
        if observed.is_empty() {
            s_filt = s_pred;
            p_filt = p_pred;
            if let Some(m) = moments.as_deref_mut() {
                m.record(period, &s_filt, &p_filt);
            }
            continue;
        }

        let z_o = z.select_rows(observed.iter());
        let g_o = g.select_columns(observed.iter());
        let h_o = h.select_rows(observed.iter()).select_columns(observed.iter());
        let y_o = DVector::from_iterator(observed.len(), observed.iter().map(|&i| data[[period, i]]));
        let d_o = d.select_rows(observed.iter());

        // Cov(sₜ, yₜ | past)
        let cross = &p_pred * z_o.transpose() + &g_o;
        let z_g = &z_o * &g_o;
        let mut f = &z_o * &p_pred * z_o.transpose() + &h_o + &z_g + z_g.transpose();
        symmetrize(&mut f);

        let chol = Cholesky::new(f).ok_or(FilterError::NotPositiveDefinite {
            period,
            min_pivot: f64::NAN,
        })?;
        let l = chol.l_dirty();
        let min_pivot = (0..observed.len()).map(|i| l[(i, i)] * l[(i, i)]).fold(f64::INFINITY, f64::min);
        if min_pivot.is_nan() || min_pivot <= opts.pd_tolerance {
            return Err(FilterError::NotPositiveDefinite { period, min_pivot });
        }
        let log_det: f64 = 2.0 * (0..observed.len()).map(|i| l[(i, i)].ln()).sum::<f64>();

        let innovation = y_o - &z_o * &s_pred - d_o;
        let f_inv_v = chol.solve(&innovation);
        let ll = -0.5
            * (observed.len() as f64 * (2.0 * PI).ln() + log_det + innovation.dot(&f_inv_v));
        if !ll.is_finite() {
            return Err(FilterError::NonFiniteLikelihood { period, value: ll });
        }
        period_ll[period] = ll;

        // K = cross F⁻¹, so K v = cross F⁻¹ v and K crossᵀ = cross F⁻¹ crossᵀ.
        s_filt = s_pred + &cross * f_inv_v;
        let f_inv_cross_t = chol.solve(&cross.transpose());
        p_filt = p_pred - &cross * f_inv_cross_t;
        symmetrize(&mut p_filt);
        if let Some(m) = moments.as_deref_mut() {
            m.record(period, &s_filt, &p_filt);
        }
    }

    let total = period_ll.slice(s![opts.presample_periods..]).sum();
    Ok((total, period_ll, init_kind))
}

fn check_dimensions(
    transition: &TransitionSystem, measurement: &MeasurementSystem, data: &Array2<f64>,
    opts: &FilterOptions,
) -> FilterResult<()> {
    let n = transition.n_states();
    let n_obs = measurement.n_observables();
    if data.nrows() == 0 {
        return Err(FilterError::EmptyData);
    }
    let checks = [
        ("T", transition.t.dim(), (n, n)),
        ("C′", (transition.c.len(), 1), (n, 1)),
        ("Z", measurement.z.dim(), (n_obs, n)),
        ("D", (measurement.d.len(), 1), (n_obs, 1)),
        ("combined covariance", measurement.combined.dim(), (n + n_obs, n + n_obs)),
        ("data", data.dim(), (data.nrows(), n_obs)),
    ];
    for (what, found, expected) in checks {
        if found != expected {
            return Err(FilterError::DimensionMismatch { what, expected, found });
        }
    }
    if opts.presample_periods >= data.nrows() {
        return Err(FilterError::InvalidOptions {
            reason: format!(
                "presample of {} periods leaves no main sample in {} periods",
                opts.presample_periods,
                data.nrows()
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{filter::options::FilterInit, model::spec::ModelSpec};
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn scalar_system(phi: f64, q: f64, e: f64, m: f64) -> (TransitionSystem, MeasurementSystem) {
        let none: [&str; 0] = [];
        let spec = ModelSpec::new(&["s"], &["e"], &none, &["y"], &["eq"]).expect("spec");
        let transition = TransitionSystem { t: array![[phi]], r: array![[1.0]], c: array![0.0] };
        let measurement = MeasurementSystem::new(
            &spec,
            &transition,
            array![[1.0]],
            array![0.0],
            array![[q]],
            array![[e]],
            array![[m]],
        )
        .expect("measurement");
        (transition, measurement)
    }

    fn normal_ll(x: f64, var: f64) -> f64 {
        -0.5 * ((2.0 * PI).ln() + var.ln() + x * x / var)
    }

    #[test]
    // Purpose
    // -------
    // An observed AR(1) without noise reproduces the exact Gaussian
    // likelihood.
    //
    // Given
    // -----
    // - sₜ = 0.5 sₜ₋₁ + εₜ, Var(ε) = 1, yₜ = sₜ, data (1, 0.5, −1),
    //   stationary initialization.
    //
    // Expect
    // ------
    // - ℓ ≈ N(1; 0, 4/3) + N(0; 0, 1) + N(−1.25; 0, 1) up to the tiny
    //   measurement noise; filtered states ≈ data.
    fn ar1_likelihood_matches_closed_form() {
        // Arrange
        let (transition, measurement) = scalar_system(0.5, 1.0, 1e-10, 0.0);
        let data = array![[1.0], [0.5], [-1.0]];

        // Act
        let out = filter(&transition, &measurement, &data, &FilterOptions::default()).expect("filter");

        // Assert
        let expected = normal_ll(1.0, 4.0 / 3.0) + normal_ll(0.0, 1.0) + normal_ll(-1.25, 1.0);
        assert_abs_diff_eq!(out.log_likelihood, expected, epsilon = 1e-6);
        assert_eq!(out.init, InitKind::Stationary);
        for (s, y) in out.filtered_states.iter().zip(data.iter()) {
            assert_abs_diff_eq!(s, y, epsilon = 1e-6);
        }
        let fast = log_likelihood(&transition, &measurement, &data, &FilterOptions::default())
            .expect("fast path");
        assert_eq!(fast, out.log_likelihood);
    }

    #[test]
    // Purpose
    // -------
    // A fully missing period keeps the prediction and contributes nothing.
    //
    // Given
    // -----
    // - The AR(1) above with data (1, NaN, 0.25).
    //
    // Expect
    // ------
    // - Period 1 contributes 0 and its filtered state is 0.5.
    // - Period 2 uses the two-step prediction variance 1 + 0.25.
    fn missing_period_skips_update() {
        let (transition, measurement) = scalar_system(0.5, 1.0, 1e-10, 0.0);
        let data = array![[1.0], [f64::NAN], [0.25]];

        let out = filter(&transition, &measurement, &data, &FilterOptions::default()).expect("filter");

        assert_eq!(out.period_log_likelihoods[1], 0.0);
        assert_abs_diff_eq!(out.filtered_states[[1, 0]], 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(out.filtered_covariances[[1, 0, 0]], 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(
            out.period_log_likelihoods[2],
            normal_ll(0.0, 1.25),
            epsilon = 1e-6
        );
    }

    #[test]
    // Purpose
    // -------
    // Presample periods are filtered but excluded from the total.
    //
    // Given
    // -----
    // - Three periods, presample of one.
    //
    // Expect
    // ------
    // - Total equals the sum of the last two period contributions.
    fn presample_is_excluded_from_total() {
        let (transition, measurement) = scalar_system(0.5, 1.0, 0.1, 0.0);
        let data = array![[1.0], [0.5], [-1.0]];
        let opts = FilterOptions::default().with_presample(1);

        let out = filter(&transition, &measurement, &data, &opts).expect("filter");

        let tail = out.period_log_likelihoods[1] + out.period_log_likelihoods[2];
        assert_abs_diff_eq!(out.log_likelihood, tail, epsilon = 1e-14);
    }

    #[test]
    // Purpose
    // -------
    // Correlated noise enters the innovation variance through the cross
    // term.
    //
    // Given
    // -----
    // - T = 0 so sₜ = εₜ, yₜ = sₜ + uₜ + m εₜ, Q = 1, E = 0.5, m = 0.5,
    //   one observation y = 0.8.
    //
    // Expect
    // ------
    // - Var(y) = (1 + m)² + E = 2.75 and the single-period likelihood
    //   matches.
    fn correlated_noise_uses_cross_covariance() {
        let (transition, measurement) = scalar_system(0.0, 1.0, 0.5, 0.5);
        let data = array![[0.8]];

        let out = filter(&transition, &measurement, &data, &FilterOptions::default()).expect("filter");

        assert_abs_diff_eq!(out.log_likelihood, normal_ll(0.8, 2.75), epsilon = 1e-10);
    }

    #[test]
    // Purpose
    // -------
    // A singular innovation covariance is a numerical error, not a value.
    //
    // Given
    // -----
    // - Q = 0, E = 0 with a fixed, degenerate initial covariance.
    //
    // Expect
    // ------
    // - `NotPositiveDefinite` at period 0, flagged numerical.
    fn singular_innovation_covariance_is_numerical_error() {
        let (transition, measurement) = scalar_system(0.5, 0.0, 0.0, 0.0);
        let opts = FilterOptions::new(
            FilterInit::Fixed { mean: array![0.0], cov: array![[0.0]] },
            0,
            1e-12,
        )
        .expect("options");

        let err = filter(&transition, &measurement, &array![[0.3]], &opts).expect_err("singular");

        assert!(matches!(err, FilterError::NotPositiveDefinite { period: 0, .. }));
        assert!(err.is_numerical());
    }

    #[test]
    // Purpose
    // -------
    // Data with the wrong column count is a dimension error.
    //
    // Given
    // -----
    // - Two data columns for one observable.
    //
    // Expect
    // ------
    // - `DimensionMismatch` naming the data, not numerical.
    fn wrong_data_width_is_dimension_error() {
        let (transition, measurement) = scalar_system(0.5, 1.0, 0.1, 0.0);
        let err = log_likelihood(&transition, &measurement, &array![[1.0, 2.0]], &FilterOptions::default())
            .expect_err("dimension");
        assert!(matches!(err, FilterError::DimensionMismatch { what: "data", .. }));
        assert!(!err.is_numerical());
    }
}
