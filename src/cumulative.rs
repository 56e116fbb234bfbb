//! The normalized cumulative weight sequence and the threshold search that
//! maps a uniform draw in `[0, 1)` onto an item.
//!
//! Item `j` owns the half-open interval `[wc[j-1], wc[j])` (with `wc[-1] = 0`),
//! so the selected index is the first `k` with `wc[k] > t`. A draw that lands
//! exactly on a boundary belongs to the item on its right. Zero-weight items
//! own empty intervals and are never selected, not even for `t = 0`.

use crate::error::{Error, Result};

/// How a uniform draw is located in the cumulative sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Search {
    /// Upper-bound binary search (first entry above the draw), O(log N).
    Binary,
    /// Scan from the first item, O(N). Competitive for a handful of items.
    Linear,
}

/// The search used when none is specified in the constructor.
pub const DEFAULT_SEARCH: Search = Search::Binary;

impl Default for Search {
    fn default() -> Self {
        DEFAULT_SEARCH
    }
}

/// Running sums of the weights divided by their total.
///
/// The sequence is non-decreasing and every entry from the last positive
/// weight onward is exactly `1.0`, so a draw in `[0, 1)` always resolves to
/// an item with positive weight.
#[derive(Debug, Clone, PartialEq)]
pub struct CumulativeWeights {
    cumulative: Vec<f64>,
    total: f64,
}

impl CumulativeWeights {
    /// Validates `weights` and builds the normalized sequence.
    ///
    /// Fails with [`Error::InvalidWeight`] on the first negative, NaN or
    /// infinite weight, and with [`Error::DegenerateDistribution`] when no
    /// weight is positive (this includes an empty slice).
    pub fn new(weights: &[f64]) -> Result<Self> {
        let mut total = 0.0_f64;
        let mut last_positive = None;
        for (index, &weight) in weights.iter().enumerate() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(Error::InvalidWeight { index, weight });
            }
            if weight > 0.0 {
                last_positive = Some(index);
            }
            total += weight;
        }

        let Some(last_positive) = last_positive else {
            return Err(Error::DegenerateDistribution);
        };
        // Finite weights can still sum past f64::MAX; rescale by the largest.
        let (scale, scaled_total) = if total.is_finite() {
            (1.0, total)
        } else {
            let max = weights.iter().copied().fold(0.0_f64, f64::max);
            (max, weights.iter().map(|&weight| weight / max).sum())
        };

        let mut running = 0.0_f64;
        let cumulative = weights
            .iter()
            .enumerate()
            .map(|(k, &weight)| {
                running += weight / scale;
                if k >= last_positive {
                    1.0
                } else {
                    (running / scaled_total).min(1.0)
                }
            })
            .collect();

        Ok(Self { cumulative, total })
    }

    /// Returns the index of the first entry strictly greater than `t`.
    ///
    /// `t` is expected in `[0, 1)`; values at or above 1 resolve to the last
    /// item rather than running off the end.
    pub fn search(&self, t: f64, search: Search) -> usize {
        let last = self.cumulative.len() - 1;
        let found = match search {
            Search::Binary => self.cumulative.partition_point(|&c| c <= t),
            Search::Linear => self
                .cumulative
                .iter()
                .position(|&c| c > t)
                .unwrap_or(last),
        };
        found.min(last)
    }

    /// The normalized selection probability of item `j`.
    pub fn probability(&self, j: usize) -> Option<f64> {
        let upper = *self.cumulative.get(j)?;
        let lower = if j == 0 { 0.0 } else { self.cumulative[j - 1] };
        Some(upper - lower)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.cumulative
    }

    /// Number of items, including zero-weight ones.
    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    /// Always false: construction rejects an empty population.
    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }

    /// The un-normalized sum of the weights, infinite if it exceeds `f64::MAX`.
    pub fn total(&self) -> f64 {
        self.total
    }
}
