//! Price outlier filtering around a search average

use crate::config::ConfigError;
use crate::scrape_core::SoldListing;

/// Keeps listings whose price lies inside a bias-scaled band around a given
/// average. Single pass: callers recompute the average on the retained set
/// but never re-filter against it.
pub struct OutlierFilter {
    bias: f64,
}

/// Retained listings plus how many were excluded. The excluded count is
/// informational only and never feeds back into computation.
#[derive(Debug)]
pub struct FilterOutcome {
    pub retained: Vec<SoldListing>,
    pub excluded: usize,
}

impl OutlierFilter {
    /// `bias` is the fractional band tolerance: 0.5 keeps prices within
    /// ±50% of the average. A non-positive bias is rejected: zero would
    /// exclude every record not exactly at the average. A bias of 1 or more
    /// is legal, the floor just clamps below zero.
    pub fn new(bias: f64) -> Result<Self, ConfigError> {
        if bias <= 0.0 || !bias.is_finite() {
            return Err(ConfigError::InvalidValue(format!(
                "outlier bias must be a positive fraction, got {}",
                bias
            )));
        }
        Ok(Self { bias })
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Retain every listing priced in `[average*(1-bias), average*(1+bias)]`
    /// inclusive. Pure: the same listings, average and bias always produce
    /// the same outcome.
    pub fn filter(&self, listings: Vec<SoldListing>, average: f64) -> FilterOutcome {
        let floor = average * (1.0 - self.bias);
        let ceiling = average * (1.0 + self.bias);

        let input_len = listings.len();
        let retained: Vec<SoldListing> = listings
            .into_iter()
            .filter(|l| l.price >= floor && l.price <= ceiling)
            .collect();
        let excluded = input_len - retained.len();

        FilterOutcome { retained, excluded }
    }
}
