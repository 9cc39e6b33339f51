//! Scrape Core - Paginated Extraction Engine
//!
//! Turns a navigable result-set session into an ordered collection of typed
//! sold listings.
//!
//! # Architecture
//!
//! ```text
//! ProviderFactory::open(term) → PageProvider session
//!     ↓ per page
//! current_page_items() → RawItem blocks
//!     ↓ per row
//! Normalizer (locale-aware dates, prices, links)
//!     ↓
//! Vec<SoldListing> (page order, item order)
//! ```
//!
//! Per-row failures degrade tolerantly (skip + warn); provider failures
//! discard the whole collection.

pub mod normalizer;
pub mod paginator;
pub mod provider;

pub use normalizer::{NormalizeError, Normalizer, RawItem, SoldListing};
pub use paginator::{collect_listings, PaginationError};
pub use provider::{PageProvider, ProviderError, ProviderFactory};
