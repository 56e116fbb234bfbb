use thiserror::Error;

/// Contract violations reported before any random value is consumed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid weight {weight} at index {index}: weights must be finite and non-negative")]
    InvalidWeight { index: usize, weight: f64 },

    #[error("degenerate distribution: total weight is zero")]
    DegenerateDistribution,
}

pub type Result<T> = std::result::Result<T, Error>;
