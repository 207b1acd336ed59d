//! LunarCrush quote provider implementation

use crate::{
    constants::{LUNARCRUSH_API_URL, LUNARCRUSH_ASSETS_DATA, REQUEST_TIMEOUT_SECS, USER_AGENT},
    error::ProviderError,
    provider::QuoteProvider,
    types::Quote,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// LunarCrush API response for asset queries
#[derive(Debug, Deserialize)]
struct AssetsResponse {
    data: Vec<AssetRow>,
}

#[derive(Debug, Deserialize)]
struct AssetRow {
    name: String,
    symbol: String,
    /// Null for assets the provider has no market data for
    price: Option<f64>,
}

/// LunarCrush quote provider
pub struct LunarCrushProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl LunarCrushProvider {
    /// Creates a provider against the public LunarCrush API
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        Self::with_base_url(LUNARCRUSH_API_URL, api_key)
    }

    /// Creates a provider against a custom base URL
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(ProviderError::NetworkError)?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    /// Puts the response rows back into request order
    ///
    /// Rows for symbols that were not requested, or that carry no price,
    /// are dropped.
    fn parse_response(&self, response: AssetsResponse, symbols: &[String]) -> Vec<Quote> {
        let mut rows: HashMap<String, AssetRow> = response
            .data
            .into_iter()
            .map(|row| (row.symbol.to_uppercase(), row))
            .collect();

        symbols
            .iter()
            .filter_map(|symbol| {
                let row = rows.remove(&symbol.to_uppercase())?;
                match row.price {
                    Some(price) => Some(Quote::new(symbol.clone(), row.name, price)),
                    None => {
                        tracing::debug!(symbol = %symbol, "No price in LunarCrush response");
                        None
                    }
                }
            })
            .collect()
    }
}

#[async_trait]
impl QuoteProvider for LunarCrushProvider {
    async fn fetch_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>, ProviderError> {
        if symbols.is_empty() {
            return Ok(Vec::new());
        }

        let joined = symbols.join(",");
        tracing::debug!(url = %self.base_url, symbols = symbols.len(), "Fetching quotes from LunarCrush");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("data", LUNARCRUSH_ASSETS_DATA),
                ("key", self.api_key.as_str()),
                ("symbol", joined.as_str()),
            ])
            .send()
            .await
            .map_err(ProviderError::NetworkError)?;

        // Check for rate limiting
        if response.status().as_u16() == 429 {
            return Err(ProviderError::RateLimitExceeded);
        }

        if !response.status().is_success() {
            return Err(ProviderError::ApiError(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let response_text = response.text().await.map_err(ProviderError::NetworkError)?;

        let assets: AssetsResponse = serde_json::from_str(&response_text).map_err(|e| {
            ProviderError::InvalidResponse(format!(
                "Failed to parse LunarCrush response: {}. Response: {}",
                e, response_text
            ))
        })?;

        let quotes = self.parse_response(assets, symbols);

        tracing::debug!(
            count = quotes.len(),
            "Successfully fetched quotes from LunarCrush"
        );

        Ok(quotes)
    }

    fn provider_name(&self) -> &'static str {
        "lunarcrush"
    }
}
