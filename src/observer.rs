//! Injectable observer for intermediate matrices.
//!
//! The loading pipeline reports every named intermediate (correlation
//! matrices, regression cross-products, weight increments) to a
//! `MatrixObserver` unconditionally. Production uses `NoopObserver`;
//! validation harnesses plug in `CollectingObserver` and compare against
//! reference matrices with a tolerance. Keys are stable strings like
//! `"sTs3"` — quantity name followed by the pattern id.

use crate::linalg::Matrix;

pub trait MatrixObserver {
    fn record(&mut self, key: &str, value: &Matrix);
}

/// Default observer: records nothing.
#[derive(Clone, Debug, Default)]
pub struct NoopObserver;

impl MatrixObserver for NoopObserver {
    fn record(&mut self, _key: &str, _value: &Matrix) {}
}

/// Test observer: keeps every reported (key, matrix) pair.
#[derive(Clone, Debug, Default)]
pub struct CollectingObserver {
    pub records: Vec<(String, Matrix)>,
}

impl CollectingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last matrix recorded under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&Matrix> {
        self.records.iter().rev().find(|(k, _)| k == key).map(|(_, m)| m)
    }

    /// Max absolute elementwise difference against an expected matrix.
    /// `None` when the key was never recorded or shapes differ.
    pub fn max_diff(&self, key: &str, expected: &Matrix) -> Option<f64> {
        let got = self.get(key)?;
        if (got.rows, got.cols) != (expected.rows, expected.cols) {
            return None;
        }
        Some(got.max_abs_diff(expected))
    }
}

impl MatrixObserver for CollectingObserver {
    fn record(&mut self, key: &str, value: &Matrix) {
        self.records.push((key.to_string(), value.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_observer_keeps_last() {
        let mut obs = CollectingObserver::new();
        obs.record("sTs0", &Matrix::identity(2));
        obs.record("sTs0", &Matrix::identity(2).scale(2.0));
        let got = obs.get("sTs0").unwrap();
        assert_eq!(got.get(0, 0), 2.0);
        assert_eq!(obs.records.len(), 2);
    }

    #[test]
    fn test_max_diff() {
        let mut obs = CollectingObserver::new();
        obs.record("C1", &Matrix::identity(3));
        let d = obs.max_diff("C1", &Matrix::identity(3).scale(1.5)).unwrap();
        assert!((d - 0.5).abs() < 1e-12);
        assert!(obs.max_diff("missing", &Matrix::identity(3)).is_none());
    }
}
