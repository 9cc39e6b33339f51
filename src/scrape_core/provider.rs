//! Page-source provider contract
//!
//! The engine never talks to a rendering engine or HTTP stack directly; it
//! drives this capability set. A provider represents one stateful navigable
//! session and must not be driven from more than one logical flow at a time.

use super::normalizer::RawItem;
use async_trait::async_trait;

#[derive(Debug)]
pub enum ProviderError {
    /// The bounded wait for page content elapsed.
    Timeout(String),
    /// The page source answered, but not usefully (bad status, broken body).
    Http(String),
    /// The session could not be opened or moved.
    Navigation(String),
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderError::Timeout(msg) => write!(f, "timed out waiting for page content: {}", msg),
            ProviderError::Http(msg) => write!(f, "page request failed: {}", msg),
            ProviderError::Navigation(msg) => write!(f, "navigation failed: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

/// One open result-set session.
///
/// `advance_to_next_page` makes end-of-results a typed outcome: `false` at
/// the final page, never an error.
#[async_trait]
pub trait PageProvider: Send {
    /// Raw item blocks of the currently loaded page only.
    async fn current_page_items(&mut self) -> Result<Vec<RawItem>, ProviderError>;

    /// Total result count as reported by the source, if it reports one.
    fn total_count(&self) -> Option<u64>;

    /// Navigate forward. `true` iff a new page was reached.
    async fn advance_to_next_page(&mut self) -> Result<bool, ProviderError>;

    /// Opaque current-location token. The pagination controller compares it
    /// across an advance to catch hosts that report success without moving.
    fn location(&self) -> &str;

    /// Release the session. Called exactly once by the session owner.
    async fn close(&mut self) -> Result<(), ProviderError>;
}

/// Opens one provider session per search term.
#[async_trait]
pub trait ProviderFactory: Send + Sync {
    async fn open(&self, term: &str) -> Result<Box<dyn PageProvider>, ProviderError>;
}
