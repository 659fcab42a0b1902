//! Model specification: insertion-ordered symbol tables.
//!
//! States, shocks, expectational errors, observables and equation labels
//! each get a dense 0-based index in the order they were declared. Matrix
//! builders address entries by name through these tables, never by a
//! literal integer. Tables are built once and are immutable afterwards.
use crate::model::errors::{ModelError, ModelResult};
use indexmap::IndexMap;

/// Name → dense 0-based index, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolMap {
    kind: &'static str,
    index: IndexMap<String, usize>,
}

impl SymbolMap {
    pub fn from_names<S: AsRef<str>>(kind: &'static str, names: &[S]) -> ModelResult<Self> {
        let mut index = IndexMap::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            if index.contains_key(name) {
                return Err(ModelError::DuplicateSymbol { kind, name: name.to_string() });
            }
            let next = index.len();
            index.insert(name.to_string(), next);
        }
        Ok(Self { kind, index })
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Index of `name`.
    pub fn get(&self, name: &str) -> ModelResult<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| ModelError::UnknownSymbol { kind: self.kind, name: name.to_string() })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub states: SymbolMap,
    pub shocks: SymbolMap,
    pub expectational_errors: SymbolMap,
    pub observables: SymbolMap,
    pub equations: SymbolMap,
}

impl ModelSpec {
    /// Build all five tables.
    ///
    /// # Errors
    /// - `DuplicateSymbol` within any table.
    /// - `ShapeMismatch` when the number of equations differs from the
    ///   number of states (Γ0 and Γ1 must be square).
    pub fn new<S: AsRef<str>>(
        states: &[S], shocks: &[S], expectational_errors: &[S], observables: &[S],
        equations: &[S],
    ) -> ModelResult<Self> {
        let spec = Self {
            states: SymbolMap::from_names("state", states)?,
            shocks: SymbolMap::from_names("shock", shocks)?,
            expectational_errors: SymbolMap::from_names(
                "expectational error",
                expectational_errors,
            )?,
            observables: SymbolMap::from_names("observable", observables)?,
            equations: SymbolMap::from_names("equation", equations)?,
        };
        if spec.equations.len() != spec.states.len() {
            return Err(ModelError::ShapeMismatch {
                matrix: "equations",
                expected: (spec.states.len(), 1),
                found: (spec.equations.len(), 1),
            });
        }
        Ok(spec)
    }

    pub fn n_states(&self) -> usize {
        self.states.len()
    }

    pub fn n_shocks(&self) -> usize {
        self.shocks.len()
    }

    pub fn n_expectational_errors(&self) -> usize {
        self.expectational_errors.len()
    }

    pub fn n_observables(&self) -> usize {
        self.observables.len()
    }

    pub fn state(&self, name: &str) -> ModelResult<usize> {
        self.states.get(name)
    }

    pub fn shock(&self, name: &str) -> ModelResult<usize> {
        self.shocks.get(name)
    }

    pub fn expectational_error(&self, name: &str) -> ModelResult<usize> {
        self.expectational_errors.get(name)
    }

    pub fn observable(&self, name: &str) -> ModelResult<usize> {
        self.observables.get(name)
    }

    pub fn equation(&self, name: &str) -> ModelResult<usize> {
        self.equations.get(name)
    }
}
