//! ConceptorSet: the registry of per-pattern conceptors and the running
//! disjunctive aggregate.
//!
//! The aggregate A is the conceptor-logic OR over every pattern that has
//! finished loading; trace(A) / dim is the quota — the fraction of reservoir
//! state-space volume already claimed. Loading for a new pattern always reads
//! A *before* that pattern is aggregated, so the new pattern lands in
//! presently-free space. The fold itself is staged: `stage_aggregate`
//! computes the would-be A without mutating (the disjunction can fail on
//! degenerate operands), and `commit_aggregate` installs it infallibly once
//! the rest of the loading step has succeeded.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::conceptor::{c_or, Conceptor};
use crate::errors::{ConceptorError, Result};
use crate::linalg::Matrix;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConceptorSet {
    pub dim: usize,
    conceptors: BTreeMap<usize, Conceptor>,
    loaded: BTreeSet<usize>,
    active_id: Option<usize>,
    aggregate: Matrix,
}

impl ConceptorSet {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            conceptors: BTreeMap::new(),
            loaded: BTreeSet::new(),
            active_id: None,
            aggregate: Matrix::zeros(dim, dim),
        }
    }

    /// Register a conceptor under a pattern id.
    pub fn add(&mut self, id: usize, conceptor: Conceptor) -> Result<()> {
        if conceptor.dim != self.dim {
            return Err(ConceptorError::DimensionMismatch {
                expected: self.dim,
                got: conceptor.dim,
            });
        }
        if self.conceptors.contains_key(&id) {
            return Err(ConceptorError::DuplicateId(id));
        }
        self.conceptors.insert(id, conceptor);
        Ok(())
    }

    pub fn contains(&self, id: usize) -> bool {
        self.conceptors.contains_key(&id)
    }

    pub fn get(&self, id: usize) -> Result<&Conceptor> {
        self.conceptors.get(&id).ok_or(ConceptorError::UnknownId(id))
    }

    pub fn get_mut(&mut self, id: usize) -> Result<&mut Conceptor> {
        self.conceptors.get_mut(&id).ok_or(ConceptorError::UnknownId(id))
    }

    pub fn len(&self) -> usize {
        self.conceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conceptors.is_empty()
    }

    /// Select which conceptor gates state evolution during generation.
    pub fn set_active(&mut self, id: usize) -> Result<()> {
        if !self.conceptors.contains_key(&id) {
            return Err(ConceptorError::UnknownId(id));
        }
        self.active_id = Some(id);
        Ok(())
    }

    pub fn active_id(&self) -> Option<usize> {
        self.active_id
    }

    pub fn active(&self) -> Result<&Conceptor> {
        let id = self.active_id.ok_or(ConceptorError::NoActiveConceptor)?;
        self.get(id)
    }

    /// The current disjunctive aggregate A (pre-update view for loaders).
    pub fn aggregate(&self) -> &Matrix {
        &self.aggregate
    }

    /// Fold A over the loaded set plus one pending conceptor, without
    /// mutating.
    ///
    /// The fold runs from scratch in ascending id order, so staging the same
    /// membership twice reproduces A bit-for-bit. `c` stands in for `id`
    /// even when `id` is already registered, which is what lets the
    /// orchestrator stage before inserting into the registry.
    pub fn stage_aggregate(&self, id: usize, c: &Matrix) -> Result<Matrix> {
        let mut ids = self.loaded.clone();
        ids.insert(id);

        let mut a = Matrix::zeros(self.dim, self.dim);
        for lid in &ids {
            let cm = if *lid == id { c } else { &self.conceptors[lid].c };
            a = c_or(&a, cm)?;
        }
        Ok(a)
    }

    /// Install a staged aggregate and mark `id` as loaded. Infallible.
    pub fn commit_aggregate(&mut self, id: usize, aggregate: Matrix) {
        self.loaded.insert(id);
        self.aggregate = aggregate;
    }

    /// Fraction of state-space volume claimed by loaded patterns, in [0, 1].
    pub fn quota(&self) -> f64 {
        self.aggregate.trace() / self.dim as f64
    }
}
