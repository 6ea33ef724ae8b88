//! Pattern sources: finite, restartable driving signals.
//!
//! Each source produces an ordered sequence of input frames (one `Vec<f64>`
//! per time step). The network consumes a source fully once per pattern
//! during the forward-collection phase; sampling again restarts from t = 0.

/// Sinusoidal timeseries: `amplitude * sin(2π (t + phase) / period)`.
#[derive(Clone, Debug)]
pub struct SinePattern {
    pub period: f64,
    pub amplitude: f64,
    pub phase: f64,
}

impl SinePattern {
    pub fn new(period: f64) -> Self {
        Self { period, amplitude: 1.0, phase: 0.0 }
    }

    pub fn sample(&self, len: usize) -> Vec<Vec<f64>> {
        (0..len)
            .map(|t| {
                let x = 2.0 * std::f64::consts::PI * (t as f64 + self.phase) / self.period;
                vec![self.amplitude * x.sin()]
            })
            .collect()
    }
}

/// Fixed cycle of values, repeated to the requested length.
#[derive(Clone, Debug)]
pub struct PeriodicPattern {
    pub values: Vec<f64>,
}

impl PeriodicPattern {
    pub fn new(values: Vec<f64>) -> Self {
        assert!(!values.is_empty(), "periodic pattern needs at least one value");
        Self { values }
    }

    pub fn period(&self) -> usize {
        self.values.len()
    }

    pub fn sample(&self, len: usize) -> Vec<Vec<f64>> {
        (0..len).map(|t| vec![self.values[t % self.values.len()]]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sine_periodicity() {
        let p = SinePattern::new(10.0);
        let s = p.sample(30);
        assert_eq!(s.len(), 30);
        for t in 0..20 {
            assert!((s[t][0] - s[t + 10][0]).abs() < 1e-12);
        }
        assert!(s[0][0].abs() < 1e-12);
    }

    #[test]
    fn test_sine_restartable() {
        let p = SinePattern::new(7.0);
        assert_eq!(p.sample(15), p.sample(15));
    }

    #[test]
    fn test_periodic_cycling() {
        let p = PeriodicPattern::new(vec![-0.4564, 0.6712, -2.3953, -2.1594]);
        assert_eq!(p.period(), 4);
        let s = p.sample(10);
        assert_eq!(s[0][0], -0.4564);
        assert_eq!(s[4][0], -0.4564);
        assert_eq!(s[9][0], 0.6712);
    }
}
