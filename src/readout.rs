//! Incremental readout learning: the linear output map grown across
//! patterns.
//!
//! For each new pattern the learner regresses the residual targets
//! y - Wout x over the free-subspace-filtered states and adds the solved
//! increment to the output map:
//!
//!   (S^T S + ridge I) Winc^T = S^T (Y - X Wout^T),    S = (I - A) X
//!   Wout <- Wout + Winc
//!
//! Filtering confines the increment to directions no earlier pattern has
//! claimed, while the residual target leaves the already-correct part of
//! the map untouched. Generation applies Wout to the raw reservoir state,
//! so the two together are what keep earlier patterns' outputs intact as
//! more patterns arrive. A failed solve surfaces as SingularSystem;
//! silently substituting anything would corrupt every previously fit
//! output.
//!
//! `stage` computes the would-be new map without mutating the learner;
//! the orchestrator calls `commit` only after the whole pattern step
//! succeeds.

use serde::{Deserialize, Serialize};

use crate::errors::{ConceptorError, Result};
use crate::linalg::Matrix;
use crate::observer::MatrixObserver;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IncrementalReadout {
    pub dim: usize,
    pub out_dim: usize,
    pub ridge: f64,
    /// Current output map (out_dim x dim).
    pub wout: Matrix,
}

/// Incremented Wout for one pattern, pending commit.
#[derive(Clone, Debug)]
pub struct ReadoutUpdate {
    wout: Matrix,
}

impl IncrementalReadout {
    pub fn new(dim: usize, out_dim: usize, ridge: f64) -> Self {
        Self {
            dim,
            out_dim,
            ridge,
            wout: Matrix::zeros(out_dim, dim),
        }
    }

    /// Solve one pattern's residual increment, without committing.
    pub fn stage(
        &self,
        aggregate: &Matrix,
        states: &[Vec<f64>],
        targets: &[Vec<f64>],
        observer: &mut dyn MatrixObserver,
        tag: usize,
    ) -> Result<ReadoutUpdate> {
        if states.is_empty() {
            return Err(ConceptorError::SingularSystem("empty state trajectory".into()));
        }
        if targets.len() != states.len() {
            return Err(ConceptorError::DimensionMismatch {
                expected: states.len(),
                got: targets.len(),
            });
        }
        for x in states {
            if x.len() != self.dim {
                return Err(ConceptorError::DimensionMismatch {
                    expected: self.dim,
                    got: x.len(),
                });
            }
        }
        for y in targets {
            if y.len() != self.out_dim {
                return Err(ConceptorError::DimensionMismatch {
                    expected: self.out_dim,
                    got: y.len(),
                });
            }
        }

        let f = Matrix::identity(self.dim).sub(aggregate);
        observer.record(&format!("Wout_F{tag}"), &f);

        let filtered: Vec<Vec<f64>> = states.iter().map(|x| f.matvec(x)).collect();
        observer.record(&format!("Wout_S{tag}"), &Matrix::from_rows(&filtered));

        // Residual against the raw state: what the current map gets wrong.
        let residuals: Vec<Vec<f64>> = states
            .iter()
            .zip(targets.iter())
            .map(|(x, y)| {
                let pred = self.wout.matvec(x);
                y.iter().zip(pred.iter()).map(|(yi, pi)| yi - pi).collect()
            })
            .collect();
        observer.record(&format!("Wout_R{tag}"), &Matrix::from_rows(&residuals));

        let mut sts = Matrix::zeros(self.dim, self.dim);
        let mut sty = Matrix::zeros(self.dim, self.out_dim);
        for (s, r) in filtered.iter().zip(residuals.iter()) {
            for i in 0..self.dim {
                let si = s[i];
                if si == 0.0 { continue; }
                for j in 0..self.dim {
                    sts.data[i * self.dim + j] += si * s[j];
                }
                for o in 0..self.out_dim {
                    sty.data[i * self.out_dim + o] += si * r[o];
                }
            }
        }
        observer.record(&format!("Wout_sTs{tag}"), &sts);
        observer.record(&format!("sTy{tag}"), &sty);

        let ridged = sts.add_scaled_identity(self.ridge);
        observer.record(&format!("Wout_ridge_sTs{tag}"), &ridged);
        let inv = ridged.invert().ok_or_else(|| {
            ConceptorError::SingularSystem(
                "readout system not invertible; increase ridge or trajectory length".into(),
            )
        })?;
        observer.record(&format!("Wout_inv_ridge_sTs{tag}"), &inv);

        let winc = inv.matmul(&sty).transpose();
        observer.record(&format!("Winc{tag}"), &winc);
        let wout = self.wout.add(&winc);
        observer.record(&format!("Wout{tag}"), &wout);

        Ok(ReadoutUpdate { wout })
    }

    /// Adopt a staged update. Infallible: all validation happened in `stage`.
    pub fn commit(&mut self, update: ReadoutUpdate) {
        self.wout = update.wout;
    }

    /// y = Wout x.
    pub fn output(&self, state: &[f64]) -> Vec<f64> {
        self.wout.matvec(state)
    }
}
