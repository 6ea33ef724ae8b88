//! Dense linear algebra kernel: Matrix (f64, row-major).
//!
//! Everything the conceptor machinery needs: multiply, transpose, elementwise
//! combination, trace, and a pivoting Gauss-Jordan inverse with a conditioning
//! tolerance. Inverses of possibly-singular systems always go through a
//! ridge-shifted matrix at the call site; `invert` returning `None` is the
//! conditioning failure signal.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pivot magnitude below which a system counts as singular.
pub const PIVOT_TOL: f64 = 1e-12;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    pub data: Vec<f64>,
    pub rows: usize,
    pub cols: usize,
}

impl Matrix {
    pub fn new(data: Vec<f64>, rows: usize, cols: usize) -> Self {
        assert_eq!(data.len(), rows * cols, "data length must equal rows*cols");
        Self { data, rows, cols }
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self { data: vec![0.0; rows * cols], rows, cols }
    }

    pub fn identity(dim: usize) -> Self {
        let mut data = vec![0.0f64; dim * dim];
        for i in 0..dim {
            data[i * dim + i] = 1.0;
        }
        Self { data, rows: dim, cols: dim }
    }

    /// Build from row slices. All rows must share the same length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Self {
        let n = rows.len();
        let m = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut data = Vec::with_capacity(n * m);
        for row in rows {
            assert_eq!(row.len(), m, "ragged rows");
            data.extend_from_slice(row);
        }
        Self { data, rows: n, cols: m }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, val: f64) {
        self.data[row * self.cols + col] = val;
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Matrix multiply: self @ other.
    pub fn matmul(&self, other: &Matrix) -> Matrix {
        assert_eq!(self.cols, other.rows, "inner dimensions must agree");
        let mut result = vec![0.0f64; self.rows * other.cols];
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self.data[i * self.cols + k];
                if a == 0.0 { continue; }
                for j in 0..other.cols {
                    result[i * other.cols + j] += a * other.data[k * other.cols + j];
                }
            }
        }
        Matrix::new(result, self.rows, other.cols)
    }

    /// Matrix-vector product: self @ v.
    pub fn matvec(&self, v: &[f64]) -> Vec<f64> {
        assert_eq!(self.cols, v.len(), "vector length must equal cols");
        let mut out = vec![0.0f64; self.rows];
        for i in 0..self.rows {
            let mut sum = 0.0;
            for j in 0..self.cols {
                sum += self.data[i * self.cols + j] * v[j];
            }
            out[i] = sum;
        }
        out
    }

    pub fn transpose(&self) -> Matrix {
        let mut data = vec![0.0f64; self.rows * self.cols];
        for i in 0..self.rows {
            for j in 0..self.cols {
                data[j * self.rows + i] = self.data[i * self.cols + j];
            }
        }
        Matrix::new(data, self.cols, self.rows)
    }

    pub fn add(&self, other: &Matrix) -> Matrix {
        assert_eq!((self.rows, self.cols), (other.rows, other.cols));
        let data = self.data.iter().zip(other.data.iter()).map(|(a, b)| a + b).collect();
        Matrix::new(data, self.rows, self.cols)
    }

    pub fn sub(&self, other: &Matrix) -> Matrix {
        assert_eq!((self.rows, self.cols), (other.rows, other.cols));
        let data = self.data.iter().zip(other.data.iter()).map(|(a, b)| a - b).collect();
        Matrix::new(data, self.rows, self.cols)
    }

    pub fn scale(&self, s: f64) -> Matrix {
        Matrix::new(self.data.iter().map(|v| v * s).collect(), self.rows, self.cols)
    }

    /// self + s * I.
    pub fn add_scaled_identity(&self, s: f64) -> Matrix {
        assert!(self.is_square(), "identity shift needs a square matrix");
        let mut m = self.clone();
        for i in 0..self.rows {
            m.data[i * self.cols + i] += s;
        }
        m
    }

    pub fn trace(&self) -> f64 {
        assert!(self.is_square(), "trace needs a square matrix");
        (0..self.rows).map(|i| self.data[i * self.cols + i]).sum()
    }

    pub fn frobenius_norm(&self) -> f64 {
        self.data.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    pub fn max_abs_diff(&self, other: &Matrix) -> f64 {
        assert_eq!((self.rows, self.cols), (other.rows, other.cols));
        self.data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
    }

    /// Invert via Gauss-Jordan elimination with partial pivoting.
    ///
    /// Returns `None` when a pivot falls below `PIVOT_TOL` — the caller
    /// decides whether that is a `SingularSystem` or an `InvalidAperture`.
    pub fn invert(&self) -> Option<Matrix> {
        assert!(self.is_square(), "inverse needs a square matrix");
        let dim = self.rows;
        let stride = 2 * dim;
        let mut aug = vec![0.0f64; dim * stride];

        // [A | I]
        for i in 0..dim {
            for j in 0..dim {
                aug[i * stride + j] = self.data[i * dim + j];
            }
            aug[i * stride + dim + i] = 1.0;
        }

        for col in 0..dim {
            // Partial pivoting
            let mut max_row = col;
            let mut max_val = aug[col * stride + col].abs();
            for row in (col + 1)..dim {
                let val = aug[row * stride + col].abs();
                if val > max_val {
                    max_val = val;
                    max_row = row;
                }
            }
            if max_val < PIVOT_TOL {
                return None;
            }

            if max_row != col {
                for j in 0..stride {
                    aug.swap(col * stride + j, max_row * stride + j);
                }
            }

            let pivot = aug[col * stride + col];
            for j in 0..stride {
                aug[col * stride + j] /= pivot;
            }

            for row in 0..dim {
                if row == col {
                    continue;
                }
                let factor = aug[row * stride + col];
                if factor == 0.0 {
                    continue;
                }
                for j in 0..stride {
                    aug[row * stride + j] -= factor * aug[col * stride + j];
                }
            }
        }

        let mut inv = vec![0.0f64; dim * dim];
        for i in 0..dim {
            for j in 0..dim {
                inv[i * dim + j] = aug[i * stride + dim + j];
            }
        }
        Some(Matrix::new(inv, dim, dim))
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Matrix({}x{})", self.rows, self.cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matmul_known() {
        let a = Matrix::new(vec![1.0, 2.0, 3.0, 4.0], 2, 2);
        let b = Matrix::new(vec![5.0, 6.0, 7.0, 8.0], 2, 2);
        let c = a.matmul(&b);
        assert_eq!(c.data, vec![19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn test_matvec() {
        let a = Matrix::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
        let y = a.matvec(&[1.0, 0.0, -1.0]);
        assert_eq!(y, vec![-2.0, -2.0]);
    }

    #[test]
    fn test_transpose() {
        let a = Matrix::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
        let t = a.transpose();
        assert_eq!((t.rows, t.cols), (3, 2));
        assert_eq!(t.get(2, 1), 6.0);
        assert_eq!(t.get(0, 1), 4.0);
    }

    #[test]
    fn test_invert_identity() {
        let inv = Matrix::identity(4).invert().unwrap();
        assert!(inv.max_abs_diff(&Matrix::identity(4)) < 1e-12);
    }

    #[test]
    fn test_invert_2x2() {
        let a = Matrix::new(vec![4.0, 7.0, 2.0, 6.0], 2, 2);
        let inv = a.invert().unwrap();
        let prod = a.matmul(&inv);
        assert!(prod.max_abs_diff(&Matrix::identity(2)) < 1e-10, "A A^-1 != I");
    }

    #[test]
    fn test_invert_singular() {
        let a = Matrix::new(vec![1.0, 2.0, 2.0, 4.0], 2, 2);
        assert!(a.invert().is_none());
    }

    #[test]
    fn test_trace_and_shift() {
        let a = Matrix::new(vec![1.0, 9.0, 9.0, 2.0], 2, 2);
        assert_eq!(a.trace(), 3.0);
        assert_eq!(a.add_scaled_identity(0.5).trace(), 4.0);
    }

    #[test]
    fn test_from_rows() {
        let m = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]);
        assert_eq!((m.rows, m.cols), (3, 2));
        assert_eq!(m.get(2, 0), 5.0);
    }

    #[test]
    fn test_serde_roundtrip() {
        let a = Matrix::new(vec![1.0, 2.0, 3.0, 4.0], 2, 2);
        let json = serde_json::to_string(&a).unwrap();
        let b: Matrix = serde_json::from_str(&json).unwrap();
        assert_eq!(a, b);
    }
}
