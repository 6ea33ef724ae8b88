//! Incremental reservoir loading: ridge regression of a new pattern's input
//! drive onto the free subspace.
//!
//! Per pattern the loader sees the previous-step states Sold, the driving
//! inputs u, and the pre-update aggregate A, and solves normal equations
//! over the filtered states S = (I - A) Sold. Restricting the regression to
//! (I - A) confines the correction to directions no earlier pattern has
//! claimed, which is what keeps old patterns intact. The two loading methods
//! differ in the space the regression runs in, but both subtract what the
//! accumulated maps already explain so repeated content is not re-learned:
//!
//!   InputSimulation: state-space regression of the drive residual,
//!       (S^T S + ridge I) D_inc^T = S^T (Win u - D Sold)
//!   InputRecreation: input-space regression of the input residual,
//!       (S^T S + ridge I) R_inc^T = S^T (u - R Sold),
//!     committed as R += R_inc and D += Win R_inc
//!
//! Increments are returned, never applied: the orchestrator commits them
//! only after the whole pattern step succeeds.

use serde::{Deserialize, Serialize};

use crate::errors::{ConceptorError, Result};
use crate::linalg::Matrix;
use crate::observer::MatrixObserver;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadingMethod {
    InputSimulation,
    InputRecreation,
}

/// One pattern's solved weight corrections, pending commit.
#[derive(Clone, Debug)]
pub struct WeightIncrement {
    /// Correction to the recurrent drive (dim x dim).
    pub d_inc: Matrix,
    /// Correction to the input recreation map (input_dim x dim);
    /// `None` under InputSimulation.
    pub r_inc: Option<Matrix>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IncrementalLoader {
    pub ridge: f64,
    pub method: LoadingMethod,
}

impl IncrementalLoader {
    pub fn new(ridge: f64, method: LoadingMethod) -> Self {
        Self { ridge, method }
    }

    /// Solve one pattern's increment. `aggregate` is the pre-update A;
    /// `d` and `r` the corrections accumulated over all earlier patterns.
    pub fn compute_increment(
        &self,
        aggregate: &Matrix,
        sold: &[Vec<f64>],
        inputs: &[Vec<f64>],
        win: &Matrix,
        d: &Matrix,
        r: &Matrix,
        observer: &mut dyn MatrixObserver,
        tag: usize,
    ) -> Result<WeightIncrement> {
        let dim = aggregate.rows;
        if sold.is_empty() {
            return Err(ConceptorError::SingularSystem("empty state trajectory".into()));
        }
        if inputs.len() != sold.len() {
            return Err(ConceptorError::DimensionMismatch {
                expected: sold.len(),
                got: inputs.len(),
            });
        }
        for x in sold {
            if x.len() != dim {
                return Err(ConceptorError::DimensionMismatch { expected: dim, got: x.len() });
            }
        }
        for u in inputs {
            if u.len() != win.cols {
                return Err(ConceptorError::DimensionMismatch {
                    expected: win.cols,
                    got: u.len(),
                });
            }
        }

        // Free-subspace filter
        let f = Matrix::identity(dim).sub(aggregate);
        observer.record(&format!("F{tag}"), &f);

        let mut filtered = Vec::with_capacity(sold.len());
        let mut targets = Vec::with_capacity(sold.len());
        for (x_old, u) in sold.iter().zip(inputs.iter()) {
            filtered.push(f.matvec(x_old));
            let td = match self.method {
                LoadingMethod::InputSimulation => {
                    let mut td = win.matvec(u);
                    let explained = d.matvec(x_old);
                    for i in 0..dim {
                        td[i] -= explained[i];
                    }
                    td
                }
                LoadingMethod::InputRecreation => {
                    let explained = r.matvec(x_old);
                    u.iter().zip(explained.iter()).map(|(ui, ei)| ui - ei).collect()
                }
            };
            targets.push(td);
        }
        observer.record(&format!("Sold{tag}"), &Matrix::from_rows(&filtered));
        observer.record(&format!("Td{tag}"), &Matrix::from_rows(&targets));

        // Normal equations over the filtered states
        let width = targets[0].len();
        let mut sts = Matrix::zeros(dim, dim);
        let mut std_ = Matrix::zeros(dim, width);
        for (s, td) in filtered.iter().zip(targets.iter()) {
            for i in 0..dim {
                let si = s[i];
                if si == 0.0 { continue; }
                for j in 0..dim {
                    sts.data[i * dim + j] += si * s[j];
                }
                for j in 0..width {
                    std_.data[i * width + j] += si * td[j];
                }
            }
        }
        observer.record(&format!("sTs{tag}"), &sts);

        let ridged = sts.add_scaled_identity(self.ridge);
        observer.record(&format!("ridge_sTs{tag}"), &ridged);

        let inv = ridged.invert().ok_or_else(|| {
            ConceptorError::SingularSystem(
                "loading system not invertible; increase ridge or trajectory length".into(),
            )
        })?;

        let solved = inv.matmul(&std_).transpose();
        match self.method {
            LoadingMethod::InputSimulation => {
                observer.record(&format!("Dinc{tag}"), &solved);
                Ok(WeightIncrement { d_inc: solved, r_inc: None })
            }
            LoadingMethod::InputRecreation => {
                observer.record(&format!("Rinc{tag}"), &solved);
                let d_inc = win.matmul(&solved);
                observer.record(&format!("Dinc{tag}"), &d_inc);
                Ok(WeightIncrement { d_inc, r_inc: Some(solved) })
            }
        }
    }
}
