//! Dollar-unit sampling over a population of line items.
//!
//! Every reported (book) amount is an upper bound on the item's true value
//! and doubles as its sampling weight, so each monetary unit in the
//! population is equally likely to be drawn. After auditing, the taint of a
//! drawn item is its true value divided by its reported amount.

use std::collections::HashMap;
use std::fmt::Display;

use rand::Rng;
use roaring::RoaringBitmap;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::cumulative::Search;
use crate::error::{Error, Result};
use crate::sampler::{self, Sample, WeightedSampler};

/// A single entry in the books.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineItem {
    pub id: u32,
    pub reported: Decimal,
}

/// An ordered collection of line items with unique ids.
#[derive(Debug, Clone, Default)]
pub struct Population {
    items: Vec<LineItem>,
    ids: RoaringBitmap,
    total_reported: Decimal,
}

impl Population {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a line item. Negative amounts, repeated ids and amounts that
    /// would push the total past `Decimal::MAX` are rejected.
    pub fn add(&mut self, id: u32, reported: Decimal) -> Result<()> {
        if reported < Decimal::ZERO {
            return Err(Error::InvalidWeight {
                index: self.items.len(),
                weight: reported.to_f64().unwrap_or(f64::NAN),
            });
        }
        let total_reported = self.total_reported.checked_add(reported).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "reported amount {} of line item {} overflows the population total",
                reported, id
            ))
        })?;
        if !self.ids.insert(id) {
            return Err(Error::InvalidArgument(format!("duplicate line item id {}", id)));
        }
        self.items.push(LineItem { id, reported });
        self.total_reported = total_reported;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// The sum of all reported amounts, computed exactly.
    pub fn total_reported(&self) -> Decimal {
        self.total_reported
    }

    /// Reported amounts as sampling weights, in item order.
    pub fn weights(&self) -> Result<Vec<f64>> {
        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                item.reported
                    .to_f64()
                    .ok_or(Error::InvalidWeight { index, weight: f64::NAN })
            })
            .collect()
    }

    /// A reusable sampler over the reported amounts.
    pub fn sampler(&self, search: Search) -> Result<WeightedSampler> {
        WeightedSampler::with_search(&self.weights()?, search)
    }

    /// Draws `n` monetary units with replacement and maps them to line items.
    pub fn draw<N, R>(&self, n: N, rng: &mut R) -> Result<DollarUnitSample>
    where
        N: TryInto<usize> + Display + Copy,
        R: Rng + ?Sized,
    {
        let n = sampler::draw_count(n)?;
        let sample = sampler::sample(n, &self.weights()?, rng)?;
        self.resolve(sample)
    }

    /// Maps an index sample, e.g. one replayed from recorded uniforms, onto
    /// this population's line items.
    ///
    /// Fails with [`Error::InvalidArgument`] on the first index that is not
    /// an item of this population.
    pub fn resolve(&self, sample: Sample) -> Result<DollarUnitSample> {
        let (ids, reported): (Vec<u32>, Vec<Decimal>) = sample
            .indices
            .iter()
            .map(|&index| {
                self.items
                    .get(index)
                    .map(|item| (item.id, item.reported))
                    .ok_or_else(|| {
                        Error::InvalidArgument(format!(
                            "sampled index {} is outside a population of {} items",
                            index,
                            self.items.len()
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .unzip();
        let distinct = ids.iter().copied().collect();
        Ok(DollarUnitSample {
            sample,
            ids,
            reported,
            distinct,
            total_reported: self.total_reported,
        })
    }
}

/// The ratio of an item's audited value to its reported amount.
///
/// Returns `None` for a zero reported amount, which can never be drawn.
pub fn taint(reported: Decimal, audited: Decimal) -> Option<Decimal> {
    audited.checked_div(reported)
}

/// A dollar-unit sample resolved to line items.
#[derive(Debug, Clone)]
pub struct DollarUnitSample {
    sample: Sample,
    ids: Vec<u32>,
    reported: Vec<Decimal>,
    distinct: RoaringBitmap,
    total_reported: Decimal,
}

impl DollarUnitSample {
    pub fn sample(&self) -> &Sample {
        &self.sample
    }

    /// Line item ids in draw order; an item drawn twice appears twice.
    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    /// The set of line items that have to be audited.
    pub fn distinct(&self) -> &RoaringBitmap {
        &self.distinct
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The taint of every draw, given audited values by line item id.
    /// Draws whose item has no audited value are skipped.
    pub fn taints(&self, audited: &HashMap<u32, Decimal>) -> Vec<Decimal> {
        self.ids
            .iter()
            .zip(&self.reported)
            .filter_map(|(id, &reported)| taint(reported, *audited.get(id)?))
            .collect()
    }

    /// The mean taint over the draws, `None` if no draw could be tainted or
    /// the taints sum past `Decimal::MAX`.
    pub fn mean_taint(&self, audited: &HashMap<u32, Decimal>) -> Option<Decimal> {
        let taints = self.taints(audited);
        if taints.is_empty() {
            return None;
        }
        let sum = taints
            .iter()
            .try_fold(Decimal::ZERO, |acc, &taint| acc.checked_add(taint))?;
        sum.checked_div(Decimal::from(taints.len()))
    }

    /// Point estimate of the population's true total: total reported amount
    /// times the mean taint. This is unbiased under PPS sampling; no
    /// confidence bound is implied.
    pub fn estimated_total(&self, audited: &HashMap<u32, Decimal>) -> Option<Decimal> {
        self.total_reported.checked_mul(self.mean_taint(audited)?)
    }
}
