//! conceptor-net error types.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ConceptorError {
    DimensionMismatch { expected: usize, got: usize },
    InvalidAperture(f64),
    SingularSystem(String),
    DuplicateId(usize),
    UnknownId(usize),
    NoActiveConceptor,
}

impl fmt::Display for ConceptorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DimensionMismatch { expected, got } => {
                write!(f, "DimensionMismatch: expected {expected}, got {got}")
            }
            Self::InvalidAperture(phi) => write!(f, "InvalidAperture: {phi}"),
            Self::SingularSystem(msg) => write!(f, "SingularSystem: {msg}"),
            Self::DuplicateId(id) => write!(f, "DuplicateId: pattern {id} already registered"),
            Self::UnknownId(id) => write!(f, "UnknownId: no pattern {id}"),
            Self::NoActiveConceptor => write!(f, "NoActiveConceptor: call activate() first"),
        }
    }
}

impl std::error::Error for ConceptorError {}

pub type Result<T> = std::result::Result<T, ConceptorError>;
