//! Reservoir: the fixed-size recurrent state machine.
//!
//! Holds the immutable base matrices (W*, Win, Wbias) and the current state.
//! Driving with an input sequence collects the state trajectory needed by the
//! loaders; autonomous generation steps are gated by a conceptor and driven
//! by the accumulated loading correction D instead of external input:
//!
//!   drive:     x(t) = tanh(W* x(t-1) + Win u(t) + Wbias)
//!   generate:  x(t) = C tanh(W* x(t-1) + D x(t-1) + Wbias)

use serde::{Deserialize, Serialize};

use crate::errors::{ConceptorError, Result};
use crate::linalg::Matrix;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Reservoir {
    pub dim: usize,
    pub input_dim: usize,
    /// Base recurrent weights, never mutated after construction.
    pub w_star: Matrix,
    pub win: Matrix,
    pub wbias: Vec<f64>,
    pub state: Vec<f64>,
}

/// Post-washout trajectory collected while driving one pattern.
#[derive(Clone, Debug, PartialEq)]
pub struct DriveRecord {
    /// x(t-1) for each kept step.
    pub sold: Vec<Vec<f64>>,
    /// x(t) for each kept step.
    pub states: Vec<Vec<f64>>,
    /// u(t) for each kept step.
    pub inputs: Vec<Vec<f64>>,
}

impl Reservoir {
    pub fn new(w_star: Matrix, win: Matrix, wbias: Vec<f64>) -> Result<Self> {
        let dim = w_star.rows;
        if w_star.cols != dim {
            return Err(ConceptorError::DimensionMismatch { expected: dim, got: w_star.cols });
        }
        if win.rows != dim {
            return Err(ConceptorError::DimensionMismatch { expected: dim, got: win.rows });
        }
        if wbias.len() != dim {
            return Err(ConceptorError::DimensionMismatch { expected: dim, got: wbias.len() });
        }
        let input_dim = win.cols;
        Ok(Self {
            dim,
            input_dim,
            w_star,
            win,
            wbias,
            state: vec![0.0; dim],
        })
    }

    pub fn reset(&mut self) {
        self.state.iter_mut().for_each(|v| *v = 0.0);
    }

    pub fn set_state(&mut self, state: &[f64]) -> Result<()> {
        if state.len() != self.dim {
            return Err(ConceptorError::DimensionMismatch {
                expected: self.dim,
                got: state.len(),
            });
        }
        self.state.copy_from_slice(state);
        Ok(())
    }

    /// Drive with an input sequence, discarding the first `washout` steps.
    pub fn drive(&mut self, inputs: &[Vec<f64>], washout: usize) -> Result<DriveRecord> {
        let kept = inputs.len().saturating_sub(washout);
        let mut record = DriveRecord {
            sold: Vec::with_capacity(kept),
            states: Vec::with_capacity(kept),
            inputs: Vec::with_capacity(kept),
        };

        for (t, u) in inputs.iter().enumerate() {
            if u.len() != self.input_dim {
                return Err(ConceptorError::DimensionMismatch {
                    expected: self.input_dim,
                    got: u.len(),
                });
            }
            let x_old = self.state.clone();
            let mut pre = self.w_star.matvec(&x_old);
            let drive = self.win.matvec(u);
            for i in 0..self.dim {
                pre[i] = (pre[i] + drive[i] + self.wbias[i]).tanh();
            }
            self.state = pre;

            if t >= washout {
                record.sold.push(x_old);
                record.states.push(self.state.clone());
                record.inputs.push(u.clone());
            }
        }
        Ok(record)
    }

    /// One autonomous step: input drive replaced by D x, state gated by C.
    pub fn generate_step(&mut self, d: &Matrix, c: &Matrix) {
        let mut pre = self.w_star.matvec(&self.state);
        let sim = d.matvec(&self.state);
        for i in 0..self.dim {
            pre[i] = (pre[i] + sim[i] + self.wbias[i]).tanh();
        }
        self.state = c.matvec(&pre);
    }
}
