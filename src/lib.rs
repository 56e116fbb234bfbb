//! Probability-proportional-to-size sampling with replacement.
//!
//! The core operation, [`sample`], draws `n` items where item `j` is chosen
//! with probability `weights[j] / sum(weights)`. It returns the selected
//! indices together with the uniform values that selected them, so a sample
//! can be checked against the cumulative weight sequence after the fact.
//!
//! In dollar-unit sampling the weights are reported amounts, which makes
//! every monetary unit in the books equally likely to be drawn. The
//! [`Population`] type wraps that use: exact decimal amounts, draws mapped
//! back to line item ids, and the taint of each audited draw.
//!
//! Randomness only enters through the `rand::Rng` the caller passes in;
//! seed it for reproducible samples.

mod cumulative;
mod error;
mod population;
mod sampler;

pub use cumulative::{CumulativeWeights, Search, DEFAULT_SEARCH};
pub use error::{Error, Result};
pub use population::{taint, DollarUnitSample, LineItem, Population};
pub use sampler::{sample, Sample, WeightedSampler};

#[cfg(feature = "python-bindings")]
mod python {
    use super::*;
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    impl From<Error> for PyErr {
        fn from(err: Error) -> PyErr {
            PyValueError::new_err(err.to_string())
        }
    }

    /// Draws `n` indices with replacement; returns `(indices, uniforms)`.
    #[pyfunction]
    #[pyo3(name = "sample", signature = (n, weights, seed = None))]
    fn py_sample(n: i64, weights: Vec<f64>, seed: Option<u64>) -> PyResult<(Vec<usize>, Vec<f64>)> {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let drawn = sample(n, &weights, &mut rng)?;
        Ok((drawn.indices, drawn.uniforms))
    }

    /// The cumulative weight sequence the sampler searches.
    #[pyfunction]
    #[pyo3(name = "cumulative_weights")]
    fn py_cumulative_weights(weights: Vec<f64>) -> PyResult<Vec<f64>> {
        Ok(CumulativeWeights::new(&weights)?.as_slice().to_vec())
    }

    #[pymodule]
    fn dollar_unit_sampling(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(py_sample, m)?)?;
        m.add_function(wrap_pyfunction!(py_cumulative_weights, m)?)?;
        Ok(())
    }
}
