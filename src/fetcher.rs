//! Batched quote fetching

use crate::{error::ProviderError, provider::QuoteProvider, types::Quote};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Splits a symbol list into provider-sized requests
///
/// Requests are issued one after another; each batch is put back into
/// request order and the batches are concatenated, so the output follows
/// the input order whatever order the provider answered in. Quotes for
/// symbols that were not requested are dropped. Any failed batch fails the
/// whole fetch.
pub struct QuoteFetcher {
    provider: Arc<dyn QuoteProvider>,
    batch_size: usize,
}

impl QuoteFetcher {
    /// Creates a fetcher; a `batch_size` of zero is treated as one
    pub fn new(provider: Arc<dyn QuoteProvider>, batch_size: usize) -> Self {
        Self {
            provider,
            batch_size: batch_size.max(1),
        }
    }

    /// Fetches quotes for every symbol
    pub async fn fetch(&self, symbols: &[String]) -> Result<Vec<Quote>, ProviderError> {
        let start = Instant::now();
        let mut quotes = Vec::with_capacity(symbols.len());

        for (batch, chunk) in symbols.chunks(self.batch_size).enumerate() {
            let received = self.provider.fetch_quotes(chunk).await?;
            tracing::debug!(
                batch,
                requested = chunk.len(),
                received = received.len(),
                provider = self.provider.provider_name(),
                "Fetched quote batch"
            );
            quotes.extend(in_request_order(chunk, received));
        }

        tracing::debug!(
            count = quotes.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Fetched all quotes"
        );

        Ok(quotes)
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }
}

fn in_request_order(requested: &[String], received: Vec<Quote>) -> Vec<Quote> {
    let mut by_symbol: HashMap<String, Quote> = received
        .into_iter()
        .map(|quote| (quote.symbol.clone(), quote))
        .collect();
    requested
        .iter()
        .filter_map(|symbol| by_symbol.remove(symbol))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::MockProvider;

    fn symbols(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("S{i:03}")).collect()
    }

    #[tokio::test]
    async fn test_batches_by_cap_and_preserves_order() {
        let provider = MockProvider::new();
        let all = symbols(300);
        for (i, symbol) in all.iter().enumerate() {
            provider.set_price(symbol, i as f64 + 1.0);
        }

        let fetcher = QuoteFetcher::new(Arc::new(provider.clone()), 150);
        let quotes = fetcher.fetch(&all).await.unwrap();

        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.batches()[0], all[..150].to_vec());
        assert_eq!(provider.batches()[1], all[150..].to_vec());
        let returned: Vec<String> = quotes.into_iter().map(|q| q.symbol).collect();
        assert_eq!(returned, all);
    }

    #[tokio::test]
    async fn test_partial_last_batch() {
        let provider = MockProvider::new();
        let all = symbols(151);
        for symbol in &all {
            provider.set_price(symbol, 1.0);
        }

        let fetcher = QuoteFetcher::new(Arc::new(provider.clone()), 150);
        assert_eq!(fetcher.fetch(&all).await.unwrap().len(), 151);
        assert_eq!(provider.batches()[1].len(), 1);
    }

    #[tokio::test]
    async fn test_single_batch_under_cap() {
        let provider = MockProvider::new();
        provider.set_price("NAV", 1.0);
        provider.set_price("VIA", 2.0);

        let fetcher = QuoteFetcher::new(Arc::new(provider.clone()), 150);
        let quotes = fetcher
            .fetch(&["NAV".to_string(), "VIA".to_string()])
            .await
            .unwrap();
        assert_eq!(provider.call_count(), 1);
        assert_eq!(quotes[1], Quote::new("VIA", "VIA coin", 2.0));
    }

    #[test]
    fn test_in_request_order() {
        let requested = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let received = vec![
            Quote::new("C", "c", 3.0),
            Quote::new("Z", "z", 9.0),
            Quote::new("A", "a", 1.0),
        ];
        let ordered: Vec<String> = in_request_order(&requested, received)
            .into_iter()
            .map(|q| q.symbol)
            .collect();
        assert_eq!(ordered, vec!["A", "C"]);
    }

    #[tokio::test]
    async fn test_failure_propagates() {
        let provider = MockProvider::new();
        provider.set_failing(true);

        let fetcher = QuoteFetcher::new(Arc::new(provider.clone()), 150);
        let result = fetcher.fetch(&symbols(300)).await;
        assert!(matches!(result, Err(ProviderError::ApiError(_))));
        assert_eq!(provider.call_count(), 1);
    }
}
