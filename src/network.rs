//! IncConceptorNet: the incremental conceptor network orchestrator.
//!
//! Sequences one pattern's load end to end: drive the reservoir and collect
//! the trajectory, compute the free-subspace weight increment, extend the
//! readout statistics, fit the pattern's conceptor, then advance the
//! aggregate. The aggregate read by the loader and readout is always the
//! pre-update one, so the new pattern is fit into presently-free space.
//!
//! Every fallible step runs before any shared state changes, including the
//! disjunction fold that produces the next aggregate; the commit at the end
//! is a block of infallible moves (plus a registry insert whose only failure
//! mode was already pre-checked), so a failed `load_pattern` leaves W, Wout,
//! and A exactly at their last-committed values and the id free for a retry.

use std::collections::BTreeMap;
use std::fmt;

use crate::conceptor::Conceptor;
use crate::conceptor_set::ConceptorSet;
use crate::errors::{ConceptorError, Result};
use crate::linalg::Matrix;
use crate::loader::{IncrementalLoader, LoadingMethod};
use crate::matrix_gen::MatrixGenerator;
use crate::observer::{MatrixObserver, NoopObserver};
use crate::readout::IncrementalReadout;
use crate::reservoir::Reservoir;

#[derive(Clone, Debug)]
pub struct NetworkConfig {
    pub reservoir_size: usize,
    pub input_dim: usize,
    pub output_dim: usize,
    /// Leading steps of each pattern discarded before statistics.
    pub washout: usize,
    pub aperture: f64,
    pub ridge_w: f64,
    pub ridge_wout: f64,
    pub loading_method: LoadingMethod,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            reservoir_size: 100,
            input_dim: 1,
            output_dim: 1,
            washout: 100,
            aperture: 1000.0,
            ridge_w: 0.01,
            ridge_wout: 0.01,
            loading_method: LoadingMethod::InputSimulation,
        }
    }
}

pub struct IncConceptorNet {
    pub config: NetworkConfig,
    pub reservoir: Reservoir,
    /// Accumulated loading correction; effective W = W* + D.
    pub d: Matrix,
    /// Accumulated input recreation map (input_dim x dim); stays zero under
    /// InputSimulation.
    pub r: Matrix,
    pub conceptors: ConceptorSet,
    loader: IncrementalLoader,
    readout: IncrementalReadout,
    last_states: BTreeMap<usize, Vec<f64>>,
    observer: Box<dyn MatrixObserver>,
}

impl fmt::Debug for IncConceptorNet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IncConceptorNet(dim={}, patterns={}, quota={:.4})",
            self.config.reservoir_size,
            self.conceptors.len(),
            self.quota()
        )
    }
}

impl IncConceptorNet {
    pub fn new(config: NetworkConfig, w_star: Matrix, win: Matrix, wbias: Vec<f64>) -> Result<Self> {
        if w_star.rows != config.reservoir_size {
            return Err(ConceptorError::DimensionMismatch {
                expected: config.reservoir_size,
                got: w_star.rows,
            });
        }
        if win.cols != config.input_dim {
            return Err(ConceptorError::DimensionMismatch {
                expected: config.input_dim,
                got: win.cols,
            });
        }
        if config.aperture <= 0.0 || !config.aperture.is_finite() {
            return Err(ConceptorError::InvalidAperture(config.aperture));
        }
        let dim = config.reservoir_size;
        let reservoir = Reservoir::new(w_star, win, wbias)?;
        Ok(Self {
            reservoir,
            d: Matrix::zeros(dim, dim),
            r: Matrix::zeros(config.input_dim, dim),
            conceptors: ConceptorSet::new(dim),
            loader: IncrementalLoader::new(config.ridge_w, config.loading_method),
            readout: IncrementalReadout::new(dim, config.output_dim, config.ridge_wout),
            last_states: BTreeMap::new(),
            observer: Box::new(NoopObserver),
            config,
        })
    }

    /// Construct the base matrices from seeded generators.
    pub fn from_generators(
        config: NetworkConfig,
        w_generator: &dyn MatrixGenerator,
        win_generator: &dyn MatrixGenerator,
        wbias_generator: &dyn MatrixGenerator,
        seed: u64,
    ) -> Result<Self> {
        let n = config.reservoir_size;
        let w_star = w_generator.generate(n, n, seed);
        let win = win_generator.generate(n, config.input_dim, seed.wrapping_add(1));
        let wbias = wbias_generator.generate(n, 1, seed.wrapping_add(2)).data;
        Self::new(config, w_star, win, wbias)
    }

    /// Replace the intermediate-matrix observer (NoopObserver by default).
    pub fn set_observer(&mut self, observer: Box<dyn MatrixObserver>) {
        self.observer = observer;
    }

    pub fn quota(&self) -> f64 {
        self.conceptors.quota()
    }

    /// Effective recurrent weights W* + D.
    pub fn w_effective(&self) -> Matrix {
        self.reservoir.w_star.add(&self.d)
    }

    pub fn wout(&self) -> &Matrix {
        &self.readout.wout
    }

    pub fn last_state(&self, id: usize) -> Result<&Vec<f64>> {
        self.last_states.get(&id).ok_or(ConceptorError::UnknownId(id))
    }

    /// Load a pattern whose readout target is the driving signal itself.
    pub fn load_pattern(&mut self, id: usize, inputs: &[Vec<f64>]) -> Result<()> {
        self.load_pattern_with_targets(id, inputs, inputs)
    }

    /// Load one pattern: drive, fit, and commit atomically.
    pub fn load_pattern_with_targets(
        &mut self,
        id: usize,
        inputs: &[Vec<f64>],
        targets: &[Vec<f64>],
    ) -> Result<()> {
        if self.conceptors.contains(id) {
            return Err(ConceptorError::DuplicateId(id));
        }
        if targets.len() != inputs.len() {
            return Err(ConceptorError::DimensionMismatch {
                expected: inputs.len(),
                got: targets.len(),
            });
        }
        if inputs.len() <= self.config.washout {
            return Err(ConceptorError::SingularSystem(
                "pattern shorter than washout".into(),
            ));
        }

        // Forward collection
        self.reservoir.reset();
        let record = self.reservoir.drive(inputs, self.config.washout)?;
        let kept_targets = &targets[self.config.washout..];

        self.observer.record(&format!("u{id}"), &Matrix::from_rows(&record.inputs));
        self.observer.record(&format!("X{id}"), &Matrix::from_rows(&record.states));
        self.observer.record(&format!("Xold{id}"), &Matrix::from_rows(&record.sold));

        // All regressions reference the pre-update aggregate
        let aggregate = self.conceptors.aggregate().clone();

        let increment = self.loader.compute_increment(
            &aggregate,
            &record.sold,
            &record.inputs,
            &self.reservoir.win,
            &self.d,
            &self.r,
            &mut *self.observer,
            id,
        )?;

        let staged_readout = self.readout.stage(
            &aggregate,
            &record.states,
            kept_targets,
            &mut *self.observer,
            id,
        )?;

        let mut conceptor = Conceptor::new(self.config.reservoir_size, self.config.aperture)?;
        conceptor.finalize(&record.states)?;
        self.observer.record(&format!("C{id}"), &conceptor.c);

        let aggregate_next = self.conceptors.stage_aggregate(id, &conceptor.c)?;

        // Commit
        self.conceptors.add(id, conceptor)?;
        self.d = self.d.add(&increment.d_inc);
        if let Some(r_inc) = increment.r_inc {
            self.r = self.r.add(&r_inc);
        }
        self.observer.record(&format!("D{id}"), &self.d);
        self.readout.commit(staged_readout);
        self.conceptors.commit_aggregate(id, aggregate_next);
        self.last_states.insert(id, self.reservoir.state.clone());
        Ok(())
    }

    /// Select the conceptor that gates generation.
    pub fn activate(&mut self, id: usize) -> Result<()> {
        self.conceptors.set_active(id)
    }

    /// Generate from the active pattern's saved last training state.
    pub fn generate(&mut self, steps: usize) -> Result<Vec<Vec<f64>>> {
        let id = self
            .conceptors
            .active_id()
            .ok_or(ConceptorError::NoActiveConceptor)?;
        let initial = self.last_state(id)?.clone();
        self.generate_from(steps, &initial)
    }

    /// Generate autonomously from an explicit initial state.
    pub fn generate_from(&mut self, steps: usize, initial_state: &[f64]) -> Result<Vec<Vec<f64>>> {
        let c = self.conceptors.active()?.c.clone();
        self.reservoir.set_state(initial_state)?;
        let mut outputs = Vec::with_capacity(steps);
        for _ in 0..steps {
            self.reservoir.generate_step(&self.d, &c);
            outputs.push(self.readout.output(&self.reservoir.state));
        }
        Ok(outputs)
    }
}
