//! Multi-search comparison driver
//!
//! Runs the full extract → aggregate → filter flow once per search term, in
//! input order, and assembles the comparable result set. Terms are fully
//! independent: each gets its own provider session and nothing mutable is
//! shared between them.

use super::outliers::OutlierFilter;
use super::stats::{aggregate, AggregateError, SaleStats};
use crate::scrape_core::{
    collect_listings, Normalizer, PaginationError, ProviderError, ProviderFactory, SoldListing,
};
use serde::Serialize;
use std::sync::atomic::AtomicBool;

/// Term-level failure. Per-row normalization problems never reach this
/// level; they are absorbed by the pagination controller.
#[derive(Debug)]
pub enum EngineError {
    Provider(ProviderError),
    /// Nothing to aggregate, whether from zero scraped rows or from a
    /// filter that excluded every listing.
    EmptyResultSet,
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Provider(e) => write!(f, "{}", e),
            EngineError::EmptyResultSet => write!(f, "no sales to aggregate"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<AggregateError> for EngineError {
    fn from(err: AggregateError) -> Self {
        match err {
            AggregateError::EmptyResultSet => EngineError::EmptyResultSet,
        }
    }
}

/// One search term's completed result.
#[derive(Debug, Serialize)]
pub struct SearchResult {
    pub term: String,
    pub listings: Vec<SoldListing>,
    pub stats: SaleStats,
    /// Listings dropped by the outlier filter; informational only.
    pub excluded_outliers: usize,
}

/// Per-term outcome: a result, or a named failure. Never silently dropped.
#[derive(Debug)]
pub struct SearchReport {
    pub term: String,
    pub outcome: Result<SearchResult, EngineError>,
}

/// Ordered reports, one per requested term, insertion order = input order.
#[derive(Debug, Default)]
pub struct SearchResultSet {
    pub reports: Vec<SearchReport>,
}

impl SearchResultSet {
    pub fn failed_terms(&self) -> Vec<(&str, &EngineError)> {
        self.reports
            .iter()
            .filter_map(|r| r.outcome.as_ref().err().map(|e| (r.term.as_str(), e)))
            .collect()
    }

    pub fn has_provider_failure(&self) -> bool {
        self.reports
            .iter()
            .any(|r| matches!(r.outcome, Err(EngineError::Provider(_))))
    }
}

/// Run every term through collect → aggregate → (filter → re-aggregate).
///
/// A term that fails is recorded by name and the run continues with the
/// remaining terms. An interrupt aborts the whole run, after the current
/// term's session has been released. Sessions are closed on success, error
/// and interrupt alike.
pub async fn compare_searches(
    factory: &dyn ProviderFactory,
    terms: &[String],
    normalizer: &Normalizer,
    filter: Option<&OutlierFilter>,
    interrupt: &AtomicBool,
) -> Result<SearchResultSet, PaginationError> {
    let mut set = SearchResultSet::default();

    for term in terms {
        log::info!("Searching \"{}\"", term);

        let mut provider = match factory.open(term).await {
            Ok(p) => p,
            Err(e) => {
                log::error!("Could not open a session for \"{}\": {}", term, e);
                set.reports.push(SearchReport {
                    term: term.clone(),
                    outcome: Err(EngineError::Provider(e)),
                });
                continue;
            }
        };

        let collected = collect_listings(provider.as_mut(), normalizer, interrupt).await;
        if let Err(e) = provider.close().await {
            log::warn!("Failed to close the session for \"{}\": {}", term, e);
        }

        let listings = match collected {
            Ok(listings) => listings,
            Err(PaginationError::Interrupted) => return Err(PaginationError::Interrupted),
            Err(PaginationError::Provider(e)) => {
                log::error!("Search \"{}\" failed: {}", term, e);
                set.reports.push(SearchReport {
                    term: term.clone(),
                    outcome: Err(EngineError::Provider(e)),
                });
                continue;
            }
        };

        let outcome = build_result(term, listings, filter);
        if let Err(ref e) = outcome {
            log::warn!("Search \"{}\" produced no result: {}", term, e);
        }
        set.reports.push(SearchReport {
            term: term.clone(),
            outcome,
        });
    }

    Ok(set)
}

fn build_result(
    term: &str,
    listings: Vec<SoldListing>,
    filter: Option<&OutlierFilter>,
) -> Result<SearchResult, EngineError> {
    let stats = aggregate(&listings)?;

    let Some(filter) = filter else {
        return Ok(SearchResult {
            term: term.to_string(),
            listings,
            stats,
            excluded_outliers: 0,
        });
    };

    let outcome = filter.filter(listings, stats.average);
    if outcome.excluded > 0 {
        log::info!(
            "Excluded {} outlier sale(s) for \"{}\" (band ±{:.0}% around {:.2})",
            outcome.excluded,
            term,
            filter.bias() * 100.0,
            stats.average
        );
    }
    let stats = aggregate(&outcome.retained)?;

    Ok(SearchResult {
        term: term.to_string(),
        listings: outcome.retained,
        stats,
        excluded_outliers: outcome.excluded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn listing(price: f64) -> SoldListing {
        SoldListing {
            title: "t".to_string(),
            sold_at: Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap(),
            price,
            currency: "GBP".to_string(),
            url: "https://e/1".to_string(),
        }
    }

    #[test]
    fn test_build_result_without_filter() {
        let result = build_result("a", vec![listing(10.0), listing(20.0)], None).unwrap();
        assert_eq!(result.stats.average, 15.0);
        assert_eq!(result.excluded_outliers, 0);
        assert_eq!(result.listings.len(), 2);
    }

    #[test]
    fn test_build_result_refilters_stats() {
        let filter = OutlierFilter::new(0.5).unwrap();
        // Average 40; band [20, 60] drops the 70.0 sale; stats recompute
        // on the retained set.
        let result = build_result(
            "a",
            vec![listing(20.0), listing(30.0), listing(40.0), listing(70.0)],
            Some(&filter),
        );
        let result = result.unwrap();
        assert_eq!(result.excluded_outliers, 1);
        assert_eq!(result.listings.len(), 3);
        assert_eq!(result.stats.average, 30.0);
    }

    #[test]
    fn test_build_result_empty_input() {
        let err = build_result("a", Vec::new(), None).unwrap_err();
        assert!(matches!(err, EngineError::EmptyResultSet));
    }

    #[test]
    fn test_build_result_filtered_to_empty() {
        let filter = OutlierFilter::new(0.1).unwrap();
        // Average 500.5, band [450.45, 550.55], both listings far outside.
        let err = build_result("a", vec![listing(1.0), listing(1000.0)], Some(&filter))
            .unwrap_err();
        assert!(matches!(err, EngineError::EmptyResultSet));
    }

    #[test]
    fn test_result_set_failure_accessors() {
        let set = SearchResultSet {
            reports: vec![
                SearchReport {
                    term: "ok".to_string(),
                    outcome: build_result("ok", vec![listing(1.0)], None),
                },
                SearchReport {
                    term: "empty".to_string(),
                    outcome: Err(EngineError::EmptyResultSet),
                },
            ],
        };
        assert_eq!(set.failed_terms().len(), 1);
        assert_eq!(set.failed_terms()[0].0, "empty");
        assert!(!set.has_provider_failure());
    }
}
