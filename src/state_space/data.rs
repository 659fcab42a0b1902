//! Observation tables and sample windows.
//!
//! An [`ObservationTable`] stores one row per period and one column per
//! observable, with `NaN` marking a missing entry. Before filtering, the
//! table is aligned to the model's observable order and sliced to a
//! [`DataWindow`]. The window only selects rows; the filter decides what
//! the presample rows mean.
use crate::{
    model::spec::ModelSpec,
    state_space::errors::{DataError, DataResult},
};
use ndarray::{Array2, Axis, s};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationTable {
    observables: Vec<String>,
    values: Array2<f64>,
}

impl ObservationTable {
    /// # Errors
    /// `ShapeMismatch` if the column count differs from the labels,
    /// `DuplicateObservable`, or `InfiniteValue` for `±∞` entries.
    pub fn new(observables: Vec<String>, values: Array2<f64>) -> DataResult<Self> {
        if values.ncols() != observables.len() {
            return Err(DataError::ShapeMismatch {
                what: "observation values",
                expected: (values.nrows(), observables.len()),
                found: values.dim(),
            });
        }
        for (i, name) in observables.iter().enumerate() {
            if observables[..i].contains(name) {
                return Err(DataError::DuplicateObservable { name: name.clone() });
            }
        }
        if let Some(((row, col), value)) = values.indexed_iter().find(|(_, v)| v.is_infinite()) {
            return Err(DataError::InfiniteValue { row, col, value: *value });
        }
        Ok(Self { observables, values })
    }

    pub fn observables(&self) -> &[String] {
        &self.observables
    }

    /// Rows are periods, columns follow [`ObservationTable::observables`].
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn n_periods(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_missing(&self) -> usize {
        self.values.iter().filter(|v| v.is_nan()).count()
    }

    /// Reorder columns to the specification's observable order, dropping
    /// columns the model does not use.
    pub fn align_to(&self, spec: &ModelSpec) -> DataResult<Self> {
        let mut columns = Vec::with_capacity(spec.n_observables());
        for name in spec.observables.names() {
            let col = self
                .observables
                .iter()
                .position(|o| o == name)
                .ok_or_else(|| DataError::MissingObservable { name: name.to_string() })?;
            columns.push(col);
        }
        Ok(Self {
            observables: spec.observables.names().map(str::to_string).collect(),
            values: self.values.select(Axis(1), &columns),
        })
    }

    /// Rows `[presample_start, mainsample_end)`.
    pub fn window(&self, window: &DataWindow) -> DataResult<Self> {
        window.check(self.n_periods())?;
        Ok(Self {
            observables: self.observables.clone(),
            values: self.values.slice(s![window.presample_start..window.mainsample_end, ..]).to_owned(),
        })
    }
}

/// Period boundaries as row indices into an observation table.
///
/// Rows `presample_start..mainsample_start` feed the filter recursion
/// without entering the likelihood; rows `mainsample_start..mainsample_end`
/// are the estimation sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataWindow {
    pub presample_start: usize,
    pub mainsample_start: usize,
    pub mainsample_end: usize,
}

impl DataWindow {
    pub fn new(presample_start: usize, mainsample_start: usize, mainsample_end: usize) -> Self {
        Self { presample_start, mainsample_start, mainsample_end }
    }

    /// Whole table as main sample.
    pub fn full(n_periods: usize) -> Self {
        Self::new(0, 0, n_periods)
    }

    pub fn presample_periods(&self) -> usize {
        self.mainsample_start - self.presample_start
    }

    pub fn check(&self, n_periods: usize) -> DataResult<()> {
        let ok = self.presample_start <= self.mainsample_start
            && self.mainsample_start < self.mainsample_end
            && self.mainsample_end <= n_periods;
        if !ok {
            return Err(DataError::InvalidWindow {
                presample_start: self.presample_start,
                mainsample_start: self.mainsample_start,
                mainsample_end: self.mainsample_end,
                n_periods,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    // Purpose
    // -------
    // Alignment follows the model's observable order and drops extras.
    //
    // Given
    // -----
    // - Table columns [y, extra, x]; model observables [x, y].
    //
    // Expect
    // ------
    // - Columns [x, y] with values taken from the matching source columns.
    fn align_reorders_and_drops_columns() {
        // Arrange
        let table = ObservationTable::new(
            names(&["y", "extra", "x"]),
            array![[1.0, 9.0, 2.0], [3.0, 9.0, f64::NAN]],
        )
        .expect("table");
        let none: [&str; 0] = [];
        let spec = ModelSpec::new(&["s"], &none, &none, &["x", "y"], &["e"]).expect("spec");

        // Act
        let aligned = table.align_to(&spec).expect("align");

        // Assert
        assert_eq!(aligned.observables(), &names(&["x", "y"])[..]);
        assert_eq!(aligned.values()[[0, 0]], 2.0);
        assert_eq!(aligned.values()[[1, 1]], 3.0);
        assert!(aligned.values()[[1, 0]].is_nan());
        assert_eq!(aligned.n_missing(), 1);
    }

    #[test]
    // Purpose
    // -------
    // Windows slice rows and validate their boundaries.
    //
    // Given
    // -----
    // - 5 periods; window (1, 2, 4) and an inverted window (3, 2, 4).
    //
    // Expect
    // ------
    // - Rows 1..4 with one presample period; `InvalidWindow` for the other.
    fn window_slices_rows() {
        let table = ObservationTable::new(names(&["x"]), array![[0.0], [1.0], [2.0], [3.0], [4.0]])
            .expect("table");
        let w = DataWindow::new(1, 2, 4);
        let sliced = table.window(&w).expect("window");
        assert_eq!(sliced.values().column(0).to_vec(), vec![1.0, 2.0, 3.0]);
        assert_eq!(w.presample_periods(), 1);
        assert!(matches!(
            table.window(&DataWindow::new(3, 2, 4)),
            Err(DataError::InvalidWindow { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Construction rejects malformed tables.
    //
    // Given
    // -----
    // - An infinite entry; a table missing an observable the model needs.
    //
    // Expect
    // ------
    // - `InfiniteValue` and `MissingObservable`.
    fn malformed_tables_are_rejected() {
        assert!(matches!(
            ObservationTable::new(names(&["x"]), array![[f64::INFINITY]]),
            Err(DataError::InfiniteValue { row: 0, col: 0, .. })
        ));
        let table = ObservationTable::new(names(&["x"]), array![[1.0]]).expect("table");
        let none: [&str; 0] = [];
        let spec = ModelSpec::new(&["s"], &none, &none, &["z"], &["e"]).expect("spec");
        assert!(matches!(table.align_to(&spec), Err(DataError::MissingObservable { .. })));
    }
}
