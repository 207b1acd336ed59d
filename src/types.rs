//! Types for the market digest tracker

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single price observation returned by a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Ticker symbol, e.g. `BTC`
    pub symbol: String,
    /// Display name, e.g. `Bitcoin`
    pub name: String,
    /// Price in USD
    pub price: f64,
}

impl Quote {
    /// Create a new quote
    pub fn new(symbol: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            price,
        }
    }
}

/// Baseline and latest price for one symbol
///
/// `name`, `symbol` and `start_price` are fixed when the baseline is
/// created; `current_price` and `percent_change` move on every refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub name: String,
    pub symbol: String,
    pub start_price: f64,
    pub current_price: f64,
    /// Absent until the first refresh, or when the baseline is zero
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_change: Option<f64>,
}

impl SnapshotEntry {
    /// Create a baseline entry from a quote
    pub fn baseline(quote: &Quote) -> Self {
        Self {
            name: quote.name.clone(),
            symbol: quote.symbol.clone(),
            start_price: quote.price,
            current_price: quote.price,
            percent_change: None,
        }
    }
}

/// A drafted notification ready for dispatch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Digest {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    /// Independent message units, sent one by one
    pub messages: Vec<String>,
}

impl Digest {
    pub fn new(messages: Vec<String>, generated_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            generated_at,
            messages,
        }
    }
}

/// Overall system health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    /// Snapshot is fresh and the last cycle succeeded
    Healthy,
    /// Tracking, but the last cycle failed or data is getting old
    Degraded,
    /// No snapshot has been established yet
    Unhealthy,
}

/// Component health information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Component name
    pub name: String,
    /// Component status
    pub status: HealthStatus,
    /// Optional status message
    pub message: Option<String>,
    /// Component-specific details
    pub details: std::collections::HashMap<String, serde_json::Value>,
    /// Last checked timestamp
    pub last_checked: DateTime<Utc>,
}
