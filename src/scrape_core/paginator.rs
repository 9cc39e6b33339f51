//! Pagination controller
//!
//! Drives a provider session across all result pages and funnels every raw
//! row through the normalizer. Termination is explicit: the provider says
//! there is no next page, or it claims to have advanced while its location
//! did not change (a stalled host must not loop forever). The loop is
//! iterative, so depth is bounded only by the number of result pages, never
//! by the call stack.

use super::normalizer::{Normalizer, SoldListing};
use super::provider::{PageProvider, ProviderError};
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug)]
pub enum PaginationError {
    Provider(ProviderError),
    Interrupted,
}

impl std::fmt::Display for PaginationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaginationError::Provider(e) => write!(f, "provider failed: {}", e),
            PaginationError::Interrupted => write!(f, "interrupted at a page boundary"),
        }
    }
}

impl std::error::Error for PaginationError {}

impl From<ProviderError> for PaginationError {
    fn from(err: ProviderError) -> Self {
        PaginationError::Provider(err)
    }
}

/// Collect every sold listing the session can reach, in page order, item
/// order.
///
/// A row the normalizer rejects is logged and skipped; it aborts neither the
/// page nor the run. A provider failure aborts the whole collection and the
/// listings gathered so far are discarded with it: callers never see a
/// partial result on error.
///
/// The interrupt flag is honored only at page boundaries. The caller owns
/// the session and releases it after this returns, on every path.
pub async fn collect_listings(
    provider: &mut dyn PageProvider,
    normalizer: &Normalizer,
    interrupt: &AtomicBool,
) -> Result<Vec<SoldListing>, PaginationError> {
    if let Some(total) = provider.total_count() {
        log::info!("Source reports {} results", total);
    }

    let mut listings = Vec::new();
    let mut page = 1u32;

    loop {
        if interrupt.load(Ordering::Relaxed) {
            return Err(PaginationError::Interrupted);
        }

        let rows = provider.current_page_items().await?;
        let row_count = rows.len();
        let before = listings.len();
        for row in &rows {
            match normalizer.normalize(row) {
                Ok(listing) => listings.push(listing),
                Err(e) => log::warn!("Skipping malformed row on page {}: {}", page, e),
            }
        }
        log::debug!(
            "Page {}: kept {}/{} rows ({} collected)",
            page,
            listings.len() - before,
            row_count,
            listings.len()
        );

        let here = provider.location().to_string();
        if !provider.advance_to_next_page().await? {
            log::debug!("Reached end of results after page {}", page);
            break;
        }
        if provider.location() == here {
            log::warn!(
                "Provider reported a new page but stayed at {}, stopping after page {}",
                here,
                page
            );
            break;
        }
        page += 1;
    }

    Ok(listings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::Locale;
    use crate::scrape_core::normalizer::RawItem;
    use async_trait::async_trait;

    fn row(title: &str, price: &str) -> RawItem {
        RawItem {
            title: Some(title.to_string()),
            sold_date: Some("Sold 3 Jan 2021".to_string()),
            price: Some(price.to_string()),
            url: Some(format!("https://e/{}", title)),
        }
    }

    /// Provider driven by a fixed page script.
    struct ScriptedProvider {
        pages: Vec<Vec<RawItem>>,
        index: usize,
        location: String,
        /// Page index whose item fetch fails.
        fail_at: Option<usize>,
        /// Report successful advances without changing location.
        stall: bool,
    }

    impl ScriptedProvider {
        fn new(pages: Vec<Vec<RawItem>>) -> Self {
            Self {
                pages,
                index: 0,
                location: "page-1".to_string(),
                fail_at: None,
                stall: false,
            }
        }
    }

    #[async_trait]
    impl PageProvider for ScriptedProvider {
        async fn current_page_items(&mut self) -> Result<Vec<RawItem>, ProviderError> {
            if self.fail_at == Some(self.index) {
                return Err(ProviderError::Timeout("scripted".to_string()));
            }
            Ok(self.pages[self.index].clone())
        }

        fn total_count(&self) -> Option<u64> {
            Some(self.pages.iter().map(|p| p.len() as u64).sum())
        }

        async fn advance_to_next_page(&mut self) -> Result<bool, ProviderError> {
            if self.stall {
                return Ok(true);
            }
            if self.index + 1 >= self.pages.len() {
                return Ok(false);
            }
            self.index += 1;
            self.location = format!("page-{}", self.index + 1);
            Ok(true)
        }

        fn location(&self) -> &str {
            &self.location
        }

        async fn close(&mut self) -> Result<(), ProviderError> {
            Ok(())
        }
    }

    fn normalizer() -> Normalizer {
        Normalizer::new(Locale::EnGb)
    }

    #[tokio::test]
    async fn test_single_page_collects_in_order() {
        let mut provider = ScriptedProvider::new(vec![vec![
            row("a", "£1.00"),
            row("b", "£2.00"),
            row("c", "£3.00"),
            row("d", "£4.00"),
            row("e", "£5.00"),
        ]]);
        let interrupt = AtomicBool::new(false);

        let listings = collect_listings(&mut provider, &normalizer(), &interrupt)
            .await
            .unwrap();

        assert_eq!(listings.len(), 5);
        let titles: Vec<&str> = listings.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, ["a", "b", "c", "d", "e"]);
    }

    #[tokio::test]
    async fn test_multi_page_appends_page_order() {
        let mut provider = ScriptedProvider::new(vec![
            vec![row("a", "£1.00"), row("b", "£2.00")],
            vec![row("c", "£3.00")],
        ]);
        let interrupt = AtomicBool::new(false);

        let listings = collect_listings(&mut provider, &normalizer(), &interrupt)
            .await
            .unwrap();

        let titles: Vec<&str> = listings.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_malformed_row_is_skipped_not_fatal() {
        let mut provider = ScriptedProvider::new(vec![vec![
            row("a", "£1.00"),
            row("bad", "N/A"),
            row("c", "£3.00"),
        ]]);
        let interrupt = AtomicBool::new(false);

        let listings = collect_listings(&mut provider, &normalizer(), &interrupt)
            .await
            .unwrap();

        let titles: Vec<&str> = listings.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, ["a", "c"]);
    }

    #[tokio::test]
    async fn test_provider_failure_discards_prior_pages() {
        let mut provider = ScriptedProvider::new(vec![
            vec![row("a", "£1.00")],
            vec![row("b", "£2.00")],
        ]);
        provider.fail_at = Some(1);
        let interrupt = AtomicBool::new(false);

        let err = collect_listings(&mut provider, &normalizer(), &interrupt)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PaginationError::Provider(ProviderError::Timeout(_))
        ));
    }

    #[tokio::test]
    async fn test_stalled_provider_terminates() {
        let mut provider = ScriptedProvider::new(vec![
            vec![row("a", "£1.00")],
            vec![row("b", "£2.00")],
        ]);
        provider.stall = true;
        let interrupt = AtomicBool::new(false);

        let listings = collect_listings(&mut provider, &normalizer(), &interrupt)
            .await
            .unwrap();

        // Only the first page, and exactly once.
        let titles: Vec<&str> = listings.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, ["a"]);
    }

    #[tokio::test]
    async fn test_interrupt_checked_at_page_boundary() {
        let mut provider = ScriptedProvider::new(vec![vec![row("a", "£1.00")]]);
        let interrupt = AtomicBool::new(true);

        let err = collect_listings(&mut provider, &normalizer(), &interrupt)
            .await
            .unwrap_err();

        assert!(matches!(err, PaginationError::Interrupted));
    }
}
