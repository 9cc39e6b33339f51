//! Aggregate statistics over a listing collection

use crate::scrape_core::SoldListing;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Summary of one search's sold listings: arithmetic mean of prices and the
/// span of sale dates.
#[derive(Debug, Clone, Serialize)]
pub struct SaleStats {
    pub average: f64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum AggregateError {
    /// The average of zero records is undefined, not zero.
    EmptyResultSet,
}

impl std::fmt::Display for AggregateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregateError::EmptyResultSet => write!(f, "no records to aggregate"),
        }
    }
}

impl std::error::Error for AggregateError {}

/// Compute [`SaleStats`] for a non-empty listing sequence.
///
/// Deterministic: no wall clock, no randomness; the same input always yields
/// the same output. Equal timestamps tie-break to the first occurrence,
/// which cannot change the min/max values.
pub fn aggregate(listings: &[SoldListing]) -> Result<SaleStats, AggregateError> {
    let first = listings.first().ok_or(AggregateError::EmptyResultSet)?;

    let mut sum = 0.0;
    let mut start = first.sold_at;
    let mut end = first.sold_at;
    for listing in listings {
        sum += listing.price;
        if listing.sold_at < start {
            start = listing.sold_at;
        }
        if listing.sold_at > end {
            end = listing.sold_at;
        }
    }

    Ok(SaleStats {
        average: sum / listings.len() as f64,
        start,
        end,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn listing(price: f64, day: u32) -> SoldListing {
        SoldListing {
            title: "test".to_string(),
            sold_at: Utc.with_ymd_and_hms(2021, 1, day, 0, 0, 0).unwrap(),
            price,
            currency: "GBP".to_string(),
            url: "https://e/1".to_string(),
        }
    }

    #[test]
    fn test_average_is_arithmetic_mean() {
        let stats = aggregate(&[listing(10.0, 1), listing(20.0, 2), listing(30.0, 3)]).unwrap();
        assert_eq!(stats.average, 20.0);
    }

    #[test]
    fn test_date_span_is_min_max() {
        let stats = aggregate(&[listing(1.0, 15), listing(1.0, 2), listing(1.0, 28)]).unwrap();
        assert_eq!(stats.start, Utc.with_ymd_and_hms(2021, 1, 2, 0, 0, 0).unwrap());
        assert_eq!(stats.end, Utc.with_ymd_and_hms(2021, 1, 28, 0, 0, 0).unwrap());
        assert!(stats.start <= stats.end);
    }

    #[test]
    fn test_average_within_price_bounds() {
        let listings = [listing(5.0, 1), listing(9.0, 2), listing(7.5, 3)];
        let stats = aggregate(&listings).unwrap();
        assert!(stats.average >= 5.0 && stats.average <= 9.0);
    }

    #[test]
    fn test_single_listing_span_collapses() {
        let stats = aggregate(&[listing(4.0, 7)]).unwrap();
        assert_eq!(stats.start, stats.end);
        assert_eq!(stats.average, 4.0);
    }

    #[test]
    fn test_empty_input_is_an_error() {
        assert_eq!(aggregate(&[]).unwrap_err(), AggregateError::EmptyResultSet);
    }

    #[test]
    fn test_deterministic() {
        let listings = [listing(3.0, 1), listing(4.0, 2)];
        let a = aggregate(&listings).unwrap();
        let b = aggregate(&listings).unwrap();
        assert_eq!(a.average, b.average);
        assert_eq!(a.start, b.start);
        assert_eq!(a.end, b.end);
    }
}
