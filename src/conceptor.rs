//! Conceptor: a soft projector over the reservoir state directions of one
//! pattern.
//!
//! From the pattern's state correlation matrix R and an aperture α:
//!
//!   C = R (R + α^-2 I)^-1
//!
//! Eigenvalues of C lie in [0, 1): a direction with large signal energy maps
//! near 1 (claimed), one with no energy maps to 0 (free). The aperture
//! controls how sharply that transition happens. Changing the aperture after
//! finalization is a closed-form morph of C, no refit of R:
//!
//!   C' = C (C + γ^-2 (I - C))^-1,   γ = α_new / α_old
//!
//! The module also carries the conceptor boolean algebra (NOT / AND / OR)
//! used to aggregate claimed volume across patterns.

use serde::{Deserialize, Serialize};

use crate::errors::{ConceptorError, Result};
use crate::linalg::Matrix;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Conceptor {
    pub dim: usize,
    pub aperture: f64,
    /// State correlation matrix of the finalized pattern.
    pub r: Matrix,
    /// Soft projector derived from `r` and `aperture`.
    pub c: Matrix,
    finalized: bool,
}

impl Conceptor {
    pub fn new(dim: usize, aperture: f64) -> Result<Self> {
        if aperture <= 0.0 || !aperture.is_finite() {
            return Err(ConceptorError::InvalidAperture(aperture));
        }
        Ok(Self {
            dim,
            aperture,
            r: Matrix::zeros(dim, dim),
            c: Matrix::zeros(dim, dim),
            finalized: false,
        })
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Compute R and C from a collected state trajectory (one row per step).
    ///
    /// Overwrites any previously stored R and C, using the current aperture.
    pub fn finalize(&mut self, states: &[Vec<f64>]) -> Result<()> {
        if states.is_empty() {
            return Err(ConceptorError::SingularSystem("empty state trajectory".into()));
        }
        for x in states {
            if x.len() != self.dim {
                return Err(ConceptorError::DimensionMismatch {
                    expected: self.dim,
                    got: x.len(),
                });
            }
        }

        // R = X^T X / T
        let mut r = Matrix::zeros(self.dim, self.dim);
        for x in states {
            for i in 0..self.dim {
                let xi = x[i];
                if xi == 0.0 { continue; }
                for j in 0..self.dim {
                    r.data[i * self.dim + j] += xi * x[j];
                }
            }
        }
        let r = r.scale(1.0 / states.len() as f64);

        // C = R (R + α^-2 I)^-1; the shifted matrix is positive definite.
        let shift = self.aperture.powi(-2);
        let inv = r
            .add_scaled_identity(shift)
            .invert()
            .ok_or_else(|| ConceptorError::SingularSystem("correlation ridge factor".into()))?;
        self.c = r.matmul(&inv);
        self.r = r;
        self.finalized = true;
        Ok(())
    }

    /// Rescale C in place for a new aperture, without touching R.
    pub fn set_aperture(&mut self, phi: f64) -> Result<()> {
        if phi <= 0.0 || !phi.is_finite() {
            return Err(ConceptorError::InvalidAperture(phi));
        }
        let gamma = phi / self.aperture;
        let eye = Matrix::identity(self.dim);
        let factor = self.c.add(&eye.sub(&self.c).scale(gamma.powi(-2)));
        let inv = factor
            .invert()
            .ok_or(ConceptorError::InvalidAperture(phi))?;
        self.c = self.c.matmul(&inv);
        self.aperture = phi;
        Ok(())
    }

    /// Generalized cosine between two conceptors' projector matrices.
    pub fn similarity(&self, other: &Conceptor) -> f64 {
        let dot: f64 = self
            .c
            .data
            .iter()
            .zip(other.c.data.iter())
            .map(|(a, b)| a * b)
            .sum();
        let na = self.c.frobenius_norm();
        let nb = other.c.frobenius_norm();
        if na < 1e-300 || nb < 1e-300 {
            return 0.0;
        }
        dot / (na * nb)
    }
}

// ---------------------------------------------------------------------------
// Conceptor boolean algebra
// ---------------------------------------------------------------------------

/// NOT C = I - C.
pub fn c_not(c: &Matrix) -> Matrix {
    Matrix::identity(c.rows).sub(c)
}

/// AND: (A^-1 + B^-1 - I)^-1. Both operands must be non-degenerate.
pub fn c_and(a: &Matrix, b: &Matrix) -> Result<Matrix> {
    let ia = a
        .invert()
        .ok_or_else(|| ConceptorError::SingularSystem("conjunction operand".into()))?;
    let ib = b
        .invert()
        .ok_or_else(|| ConceptorError::SingularSystem("conjunction operand".into()))?;
    let sum = ia.add(&ib).sub(&Matrix::identity(a.rows));
    sum.invert()
        .ok_or_else(|| ConceptorError::SingularSystem("conjunction factor".into()))
}

/// OR: (E_A + E_B)(I + E_A + E_B)^-1 with E = C (I - C)^-1.
///
/// Valid conceptors have eigenvalues strictly below 1, so (I - C) is
/// invertible; degenerate inputs surface as SingularSystem. The combination
/// is commutative and trace-monotone, and exactly idempotent in the hard
/// (0/1-eigenvalue) limit.
pub fn c_or(a: &Matrix, b: &Matrix) -> Result<Matrix> {
    let e_a = expand(a)?;
    let e_b = expand(b)?;
    let e = e_a.add(&e_b);
    let inv = e
        .add_scaled_identity(1.0)
        .invert()
        .ok_or_else(|| ConceptorError::SingularSystem("disjunction factor".into()))?;
    Ok(e.matmul(&inv))
}

/// E = C (I - C)^-1, the unbounded "correlation space" image of C.
fn expand(c: &Matrix) -> Result<Matrix> {
    let inv = c_not(c)
        .invert()
        .ok_or_else(|| ConceptorError::SingularSystem("disjunction operand has unit eigenvalue".into()))?;
    Ok(c.matmul(&inv))
}
