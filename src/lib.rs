//! conceptor-net — incremental associative memory in a fixed-size echo state reservoir.
//!
//! Multiple temporal patterns are loaded one at a time into a single shared
//! recurrent weight matrix. Each pattern gets a conceptor: a soft projector
//! matrix characterizing the state directions the pattern occupies. The
//! disjunction of all loaded conceptors measures the occupied state-space
//! volume, and every new pattern is fit into the complement — so earlier
//! patterns survive later loads until the quota runs out.
//!
//! Core mapping:
//!   - Conceptor C = R (R + aperture^-2 I)^-1   (R = state correlation matrix)
//!   - Aggregate A = OR over loaded conceptors  (conceptor-logic disjunction)
//!   - Quota = trace(A) / reservoir size        (occupied volume fraction)
//!   - Loading: ridge regression of the new pattern's drive, restricted to
//!     the free subspace (I - A), committed as an additive correction D
//!   - Readout: residual ridge increments over the free subspace, so the
//!     output map grows without disturbing earlier patterns

pub mod errors;
pub mod linalg;
pub mod observer;
pub mod matrix_gen;
pub mod patterns;
pub mod conceptor;
pub mod conceptor_set;
pub mod reservoir;
pub mod loader;
pub mod readout;
pub mod network;
