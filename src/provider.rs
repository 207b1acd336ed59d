//! Provider abstraction for fetching quotes from external market-data APIs

use crate::{error::ProviderError, types::Quote};
use async_trait::async_trait;

/// Trait for market-data providers
///
/// Implementations issue a single request for the given symbols. Batching
/// across the provider's per-request cap is handled by
/// [`QuoteFetcher`](crate::fetcher::QuoteFetcher).
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Fetches quotes for a batch of symbols
    ///
    /// # Arguments
    /// * `symbols` - Symbols to quote, at most the provider's batch cap
    ///
    /// # Returns
    /// Quotes in request order. Symbols the provider has no price for are
    /// left out.
    async fn fetch_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>, ProviderError>;

    /// Returns the name of this provider
    fn provider_name(&self) -> &'static str;
}
