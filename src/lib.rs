//! bidscope - sold-auction price extraction and comparison
//!
//! Scrapes completed eBay auctions per search term, normalizes each result
//! row into a typed sold listing, aggregates per-search statistics and
//! optionally drops price outliers before comparing searches side by side.

pub mod analysis_core;
pub mod config;
pub mod ebay;
pub mod export;
pub mod locale;
pub mod scrape_core;
