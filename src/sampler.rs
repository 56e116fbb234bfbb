//! Weighted random sampling with replacement.
//!
//! Each draw takes one uniform value `t` in `[0, 1)` from the caller's random
//! source and selects the item whose cumulative interval contains it. The raw
//! uniforms are returned next to the indices so a sample can be replayed and
//! checked against the cumulative sequence.

use std::fmt::Display;

use log::{debug, trace};
use rand::Rng;

use crate::cumulative::{CumulativeWeights, Search, DEFAULT_SEARCH};
use crate::error::{Error, Result};

/// The outcome of `n` independent draws.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sample {
    /// The selected item for each draw, in draw order.
    pub indices: Vec<usize>,
    /// The uniform value that produced each selection.
    pub uniforms: Vec<f64>,
}

impl Sample {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterates over `(index, uniform)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.uniforms.iter().copied())
    }

    /// Bins the indices into `n_items` counts, the input a histogram needs.
    /// Indices at or beyond `n_items` are ignored.
    pub fn counts(&self, n_items: usize) -> Vec<u64> {
        let mut counts = vec![0; n_items];
        for &index in &self.indices {
            if let Some(count) = counts.get_mut(index) {
                *count += 1;
            }
        }
        counts
    }
}

/// A reusable sampler over a fixed set of weights.
#[derive(Debug, Clone)]
pub struct WeightedSampler {
    cumulative: CumulativeWeights,
    search: Search,
}

impl WeightedSampler {
    /// Builds a sampler using the default binary search.
    pub fn new(weights: &[f64]) -> Result<Self> {
        Self::with_search(weights, DEFAULT_SEARCH)
    }

    /// Builds a sampler with an explicit search strategy.
    pub fn with_search(weights: &[f64], search: Search) -> Result<Self> {
        let cumulative = CumulativeWeights::new(weights)?;
        debug!(
            "built sampler over {} items, total weight {}, {:?} search",
            cumulative.len(),
            cumulative.total(),
            search
        );
        Ok(Self { cumulative, search })
    }

    /// Number of items in the population.
    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }

    pub fn cumulative(&self) -> &CumulativeWeights {
        &self.cumulative
    }

    pub fn search(&self) -> Search {
        self.search
    }

    /// Maps a single uniform value onto an item.
    pub fn select(&self, t: f64) -> usize {
        self.cumulative.search(t, self.search)
    }

    /// Draws `n` items with replacement.
    pub fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Sample {
        let mut indices = Vec::with_capacity(n);
        let mut uniforms = Vec::with_capacity(n);
        for _ in 0..n {
            let t: f64 = rng.gen();
            let index = self.select(t);
            trace!("draw t={} -> item {}", t, index);
            indices.push(index);
            uniforms.push(t);
        }
        Sample { indices, uniforms }
    }

    /// Recomputes a sample from previously recorded uniforms.
    ///
    /// Every value must lie in `[0, 1)`; nothing is selected if one does not.
    pub fn replay<I>(&self, uniforms: I) -> Result<Sample>
    where
        I: IntoIterator<Item = f64>,
    {
        let uniforms: Vec<f64> = uniforms.into_iter().collect();
        if let Some(bad) = uniforms.iter().find(|t| !(0.0..1.0).contains(*t)) {
            return Err(Error::InvalidArgument(format!(
                "uniform draw {} is outside [0, 1)",
                bad
            )));
        }
        let indices = uniforms.iter().map(|&t| self.select(t)).collect();
        Ok(Sample { indices, uniforms })
    }
}

/// Converts a caller-supplied draw count, rejecting negative values.
pub(crate) fn draw_count<N>(n: N) -> Result<usize>
where
    N: TryInto<usize> + Display + Copy,
{
    n.try_into().map_err(|_| {
        Error::InvalidArgument(format!("draw count must be a non-negative integer, got {}", n))
    })
}

/// Draws `n` indices with replacement, item `j` chosen with probability
/// `weights[j] / sum(weights)`.
///
/// Arguments are checked in order (draw count, then each weight, then the
/// total) before any randomness is consumed. An all-zero population is only
/// an error when at least one draw is requested.
///
/// ```
/// use dollar_unit_sampling::sample;
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
///
/// let mut rng = StdRng::seed_from_u64(1);
/// let drawn = sample(100, &[1.0, 0.0, 3.0], &mut rng).unwrap();
/// assert_eq!(drawn.len(), 100);
/// assert!(drawn.indices.iter().all(|&i| i != 1));
/// ```
pub fn sample<N, R>(n: N, weights: &[f64], rng: &mut R) -> Result<Sample>
where
    N: TryInto<usize> + Display + Copy,
    R: Rng + ?Sized,
{
    let n = draw_count(n)?;
    match WeightedSampler::new(weights) {
        Ok(sampler) => Ok(sampler.sample(n, rng)),
        Err(Error::DegenerateDistribution) if n == 0 => Ok(Sample::default()),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_error_scenarios() {
        init_logger();
        let mut rng = StdRng::seed_from_u64(1);

        assert!(matches!(
            sample(5, &[1.0, -2.0, 3.0], &mut rng),
            Err(Error::InvalidWeight { index: 1, .. })
        ));
        assert_eq!(sample(5, &[0.0, 0.0, 0.0], &mut rng), Err(Error::DegenerateDistribution));
        assert!(matches!(
            sample(-1, &[1.0, 2.0, 3.0], &mut rng),
            Err(Error::InvalidArgument(_))
        ));

        let empty = sample(0, &[1.0, 2.0, 3.0], &mut rng).unwrap();
        assert!(empty.indices.is_empty() && empty.uniforms.is_empty());
    }

    #[test]
    fn test_zero_draws_edge_cases() {
        let mut rng = StdRng::seed_from_u64(1);
        // Nothing to draw, so an all-zero population is not an error.
        assert_eq!(sample(0, &[0.0, 0.0], &mut rng), Ok(Sample::default()));
        assert_eq!(sample(0usize, &[], &mut rng), Ok(Sample::default()));
        // A negative weight is still a contract violation.
        assert!(matches!(
            sample(0, &[1.0, -1.0], &mut rng),
            Err(Error::InvalidWeight { .. })
        ));
        // The count is checked before the weights.
        assert!(matches!(
            sample(-3i64, &[-1.0], &mut rng),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_errors_consume_no_randomness() {
        let mut used = StdRng::seed_from_u64(5);
        let mut fresh = StdRng::seed_from_u64(5);
        let _ = sample(10, &[1.0, -1.0], &mut used);
        let _ = sample(10, &[0.0], &mut used);
        let _ = sample(-10, &[1.0], &mut used);
        assert_eq!(used.gen::<u64>(), fresh.gen::<u64>());
    }

    #[test]
    fn test_textbook_draws() {
        // wc = [0.1, 0.3, 0.6, 1.0]; 0.65 and 0.95 both fall in [0.6, 1.0).
        let sampler = WeightedSampler::new(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        let replayed = sampler.replay([0.05, 0.65, 0.95]).unwrap();
        assert_eq!(replayed.indices, vec![0, 3, 3]);
        assert_eq!(replayed.uniforms, vec![0.05, 0.65, 0.95]);

        let boundaries = sampler.replay([0.0, 0.1, 0.3, 0.6, 0.25]).unwrap();
        assert_eq!(boundaries.indices, vec![0, 1, 2, 3, 1]);
    }

    #[test]
    fn test_replay_rejects_out_of_range_uniforms() {
        let sampler = WeightedSampler::new(&[1.0, 1.0]).unwrap();
        for bad in [1.0, -0.1, f64::NAN] {
            assert!(
                matches!(sampler.replay([0.5, bad]), Err(Error::InvalidArgument(_))),
                "Accepted {}",
                bad
            );
        }
    }

    #[test]
    fn test_replay_reproduces_sample() {
        let mut rng = StdRng::seed_from_u64(11);
        let sampler = WeightedSampler::new(&[0.5, 1.5, 0.0, 2.0]).unwrap();
        let drawn = sampler.sample(500, &mut rng);
        let replayed = sampler.replay(drawn.uniforms.iter().copied()).unwrap();
        assert_eq!(drawn, replayed);
    }

    #[test]
    fn test_same_seed_same_sample() {
        let weights = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0];
        let first = sample(1_000, &weights, &mut StdRng::seed_from_u64(2024)).unwrap();
        let second = sample(1_000, &weights, &mut StdRng::seed_from_u64(2024)).unwrap();
        assert_eq!(first, second);

        let other = sample(1_000, &weights, &mut StdRng::seed_from_u64(2025)).unwrap();
        assert_ne!(first.uniforms, other.uniforms);
    }

    #[test]
    fn test_indices_in_bounds_and_uniforms_in_unit_interval() {
        let mut rng = StdRng::seed_from_u64(3);
        for n_items in [1usize, 2, 17, 1000] {
            let weights: Vec<f64> = (0..n_items).map(|i| ((i * 37) % 11) as f64 + 0.5).collect();
            let drawn = sample(2_000, &weights, &mut rng).unwrap();
            assert_eq!(drawn.len(), 2_000);
            for (index, t) in drawn.iter() {
                assert!(index < n_items, "Index {} out of bounds for {} items", index, n_items);
                assert!((0.0..1.0).contains(&t), "Uniform {} outside [0, 1)", t);
            }
        }
    }

    #[test]
    fn test_zero_weight_items_are_never_selected() {
        init_logger();
        let mut rng = StdRng::seed_from_u64(17);
        let weights = [0.0, 3.0, 0.0, 1.0, 2.0, 0.0];
        let drawn = sample(10_000, &weights, &mut rng).unwrap();
        let counts = drawn.counts(weights.len());
        for (j, &weight) in weights.iter().enumerate() {
            if weight == 0.0 {
                assert_eq!(counts[j], 0, "Zero-weight item {} was drawn {} times", j, counts[j]);
            } else {
                assert!(counts[j] > 0, "Item {} was never drawn", j);
            }
        }
    }

    #[test]
    fn test_frequencies_pass_chi_square() {
        // Critical value of chi-square with 3 degrees of freedom at the 1% level.
        const CRITICAL_3DF_1PCT: f64 = 11.345;
        const TRIALS: u64 = 20;
        const DRAWS: usize = 10_000;

        let weights = [1.0, 2.0, 3.0, 4.0];
        let total: f64 = weights.iter().sum();
        let mut rejections = 0;

        for seed in 0..TRIALS {
            let mut rng = StdRng::seed_from_u64(seed);
            let drawn = sample(DRAWS, &weights, &mut rng).unwrap();
            let statistic: f64 = drawn
                .counts(weights.len())
                .iter()
                .zip(weights)
                .map(|(&observed, weight)| {
                    let expected = DRAWS as f64 * weight / total;
                    (observed as f64 - expected).powi(2) / expected
                })
                .sum();
            if statistic > CRITICAL_3DF_1PCT {
                rejections += 1;
            }
        }

        // About 0.2 rejections are expected; more than 3 is vanishingly unlikely.
        assert!(
            rejections <= 3,
            "Goodness of fit rejected in {} of {} trials",
            rejections,
            TRIALS
        );
    }

    #[test]
    fn test_linear_search_matches_binary() {
        let weights: Vec<f64> = (1..=40).map(|i| i as f64).collect();
        let binary = WeightedSampler::with_search(&weights, Search::Binary).unwrap();
        let linear = WeightedSampler::with_search(&weights, Search::Linear).unwrap();
        assert_eq!(linear.search(), Search::Linear);
        let a = binary.sample(5_000, &mut StdRng::seed_from_u64(8));
        let b = linear.sample(5_000, &mut StdRng::seed_from_u64(8));
        assert_eq!(a, b);
    }

    #[test]
    fn test_single_item_population() {
        let mut rng = StdRng::seed_from_u64(0);
        let drawn = sample(50u32, &[0.25], &mut rng).unwrap();
        assert!(drawn.indices.iter().all(|&i| i == 0));
        assert_eq!(drawn.counts(1), vec![50]);
    }
}
