//! Bridging helpers between `ndarray` (public types) and `nalgebra`
//! (dense factorizations), plus a few small matrix checks shared by the
//! solver, the measurement mapper and the filter.
use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2, ArrayView2};

/// Copy an `ndarray` matrix into a column-major `DMatrix`.
pub fn to_dmatrix(a: &ArrayView2<'_, f64>) -> DMatrix<f64> {
    let (rows, cols) = a.dim();
    DMatrix::from_fn(rows, cols, |i, j| a[[i, j]])
}

pub fn to_dvector(v: &Array1<f64>) -> DVector<f64> {
    DVector::from_iterator(v.len(), v.iter().copied())
}

/// Copy a `DMatrix` back into an `ndarray` matrix.
pub fn to_array2(m: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)])
}

/// Largest `|a_ij - a_ji|`; `f64::INFINITY` for non-square input.
pub fn max_asymmetry(a: &Array2<f64>) -> f64 {
    let (rows, cols) = a.dim();
    if rows != cols {
        return f64::INFINITY;
    }
    let mut worst = 0.0f64;
    for i in 0..rows {
        for j in 0..i {
            worst = worst.max((a[[i, j]] - a[[j, i]]).abs());
        }
    }
    worst
}

/// Replace `a` by `(a + aᵀ) / 2`.
pub fn symmetrize(a: &mut DMatrix<f64>) {
    let n = a.nrows();
    for j in 0..n {
        for i in (j + 1)..n {
            let avg = 0.5 * (a[(i, j)] + a[(j, i)]);
            a[(i, j)] = avg;
            a[(j, i)] = avg;
        }
    }
}

/// First non-finite entry as `(row, col, value)`.
pub fn first_non_finite(a: &Array2<f64>) -> Option<(usize, usize, f64)> {
    a.indexed_iter().find(|(_, v)| !v.is_finite()).map(|((i, j), v)| (i, j, *v))
}

/// Smallest eigenvalue of a symmetric matrix; `0` for an empty one.
pub fn min_eigenvalue(a: &Array2<f64>) -> f64 {
    if a.is_empty() {
        return 0.0;
    }
    to_dmatrix(&a.view()).symmetric_eigen().eigenvalues.iter().copied().fold(f64::INFINITY, f64::min)
}

/// Factor `L` with `L Lᵀ = a` for a symmetric positive semi-definite `a`,
/// via the eigendecomposition so singular covariances are allowed.
/// Negative eigenvalues are clipped at zero.
pub fn psd_factor(a: &Array2<f64>) -> DMatrix<f64> {
    let eig = to_dmatrix(&a.view()).symmetric_eigen();
    let scales = eig.eigenvalues.map(|l| l.max(0.0).sqrt());
    let mut factor = eig.eigenvectors;
    for (j, scale) in scales.iter().enumerate() {
        factor.column_mut(j).scale_mut(*scale);
    }
    factor
}
