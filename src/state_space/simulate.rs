//! Synthetic data from a solved state-space system.
//!
//! Shocks are drawn as `εₜ = L_Q zₜ` and measurement noise as
//! `vₜ = L_E wₜ + M εₜ`, where `L Lᵀ` is the PSD factor of the covariance,
//! so singular covariances (for example `E = 0`) are fine.
use crate::{
    solver::types::TransitionSystem,
    state_space::{
        errors::{DataError, DataResult},
        measurement::MeasurementSystem,
    },
    utils::{psd_factor, to_array2},
};
use ndarray::{Array1, Array2};
use rand::Rng;
use rand_distr::StandardNormal;

/// Simulated states and observations, one row per retained period.
#[derive(Debug, Clone, PartialEq)]
pub struct Simulated {
    pub states: Array2<f64>,
    pub observations: Array2<f64>,
}

/// Simulate `periods` retained periods after discarding `burn` periods.
///
/// The state starts at zero, so `burn` should be long enough for the
/// constant `C′` to work through a stationary system.
///
/// # Errors
/// `InvalidSimulation` when `periods == 0` or the transition and
/// measurement systems disagree on dimensions.
pub fn simulate<R: Rng + ?Sized>(
    transition: &TransitionSystem, measurement: &MeasurementSystem, periods: usize, burn: usize,
    rng: &mut R,
) -> DataResult<Simulated> {
    if periods == 0 {
        return Err(DataError::InvalidSimulation { reason: "periods must be positive".into() });
    }
    let (n, k) = (transition.n_states(), transition.n_shocks());
    if measurement.n_states() != n || measurement.q.nrows() != k {
        return Err(DataError::InvalidSimulation {
            reason: format!(
                "transition has {n} states and {k} shocks, measurement has {} states and {} shocks",
                measurement.n_states(),
                measurement.q.nrows()
            ),
        });
    }
    let n_obs = measurement.n_observables();
    let shock_factor = to_array2(&psd_factor(&measurement.q));
    let noise_factor = to_array2(&psd_factor(&measurement.e));

    let mut states = Array2::zeros((periods, n));
    let mut observations = Array2::zeros((periods, n_obs));
    let mut s = Array1::<f64>::zeros(n);
    for t in 0..(burn + periods) {
        let eps = shock_factor.dot(&standard_normal(k, rng));
        s = transition.t.dot(&s) + transition.r.dot(&eps) + &transition.c;
        if t < burn {
            continue;
        }
        let noise = noise_factor.dot(&standard_normal(n_obs, rng)) + measurement.m.dot(&eps);
        let y = measurement.z.dot(&s) + &measurement.d + noise;
        let row = t - burn;
        states.row_mut(row).assign(&s);
        observations.row_mut(row).assign(&y);
    }
    Ok(Simulated { states, observations })
}

fn standard_normal<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Array1<f64> {
    Array1::from_shape_fn(len, |_| rng.sample::<f64, _>(StandardNormal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::spec::ModelSpec;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    // Purpose
    // -------
    // Simulated AR(1) data carry the right mean and variance.
    //
    // Given
    // -----
    // - sₜ = 0.5 sₜ₋₁ + εₜ + 1, Var(ε) = 1, yₜ = sₜ, 20 000 periods.
    //
    // Expect
    // ------
    // - Mean ≈ 2 and variance ≈ 1 / (1 − 0.25) within sampling error.
    fn ar1_moments_match_theory() {
        // Arrange
        let none: [&str; 0] = [];
        let spec = ModelSpec::new(&["s"], &["e"], &none, &["y"], &["eq"]).expect("spec");
        let transition =
            TransitionSystem { t: array![[0.5]], r: array![[1.0]], c: array![1.0] };
        let measurement = MeasurementSystem::new(
            &spec,
            &transition,
            array![[1.0]],
            array![0.0],
            array![[1.0]],
            array![[0.0]],
            array![[0.0]],
        )
        .expect("measurement");
        let mut rng = StdRng::seed_from_u64(11);

        // Act
        let sim = simulate(&transition, &measurement, 20_000, 100, &mut rng).expect("simulate");

        // Assert
        let y = sim.observations.column(0);
        let mean = y.mean().expect("non-empty");
        let var = y.mapv(|v| (v - mean).powi(2)).mean().expect("non-empty");
        assert_abs_diff_eq!(mean, 2.0, epsilon = 0.05);
        assert_abs_diff_eq!(var, 4.0 / 3.0, epsilon = 0.06);
        assert_eq!(sim.states, sim.observations);
    }

    #[test]
    // Purpose
    // -------
    // Zero retained periods is rejected.
    //
    // Given
    // -----
    // - periods = 0.
    //
    // Expect
    // ------
    // - `InvalidSimulation`.
    fn zero_periods_is_rejected() {
        let none: [&str; 0] = [];
        let spec = ModelSpec::new(&["s"], &["e"], &none, &["y"], &["eq"]).expect("spec");
        let transition = TransitionSystem { t: array![[0.0]], r: array![[1.0]], c: array![0.0] };
        let measurement = MeasurementSystem::new(
            &spec,
            &transition,
            array![[1.0]],
            array![0.0],
            array![[1.0]],
            array![[0.0]],
            array![[0.0]],
        )
        .expect("measurement");
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            simulate(&transition, &measurement, 0, 0, &mut rng),
            Err(DataError::InvalidSimulation { .. })
        ));
    }
}
