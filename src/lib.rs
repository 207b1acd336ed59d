//! # Market Digest
//!
//! Polls a market-data provider for a universe of crypto assets, keeps a
//! running snapshot of each asset's baseline and current price, and sends
//! periodic digests listing the tracked assets and the top movers across
//! the whole universe.
//!
//! ## Usage
//!
//! ```no_run
//! use market_digest::{LogNotifier, LunarCrushProvider, PriceTracker, TrackerConfig};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TrackerConfig::from_env()?;
//! let provider = Arc::new(LunarCrushProvider::with_base_url(
//!     config.base_url.clone(),
//!     config.api_key.clone(),
//! )?);
//!
//! let mut tracker = PriceTracker::new(config, provider, Arc::new(LogNotifier));
//! tracker.start(chrono::Utc::now())?;
//! tracker
//!     .run_until(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! PriceTracker (one cycle per poll interval)
//!     ↓
//! QuoteFetcher → QuoteProvider (LunarCrush, batched)
//!     ↓
//! Snapshot (baseline vs current, keyed by symbol) → SnapshotStore (JSON file)
//!     ↓
//! AlertScheduler (notification interval gate)
//!     ↓
//! tracked subset + top_performers → MessageDrafter → Notifier (Telegram / log)
//! ```

pub mod change;
pub mod config;
pub mod constants;
pub mod digest;
pub mod error;
pub mod fetcher;
pub mod notifier;
pub mod notifiers;
pub mod provider;
pub mod providers;
pub mod ranking;
pub mod scheduler;
pub mod snapshot;
pub mod store;
pub mod tracker;
pub mod types;

// Re-export commonly used types
pub use config::TrackerConfig;
pub use error::{
    ChangeError, ConfigError, NotifyError, PersistenceError, ProviderError, SnapshotError,
    TrackerError,
};
pub use notifier::Notifier;
pub use notifiers::{LogNotifier, TelegramNotifier};
pub use provider::QuoteProvider;
pub use providers::LunarCrushProvider;
pub use snapshot::Snapshot;
pub use tracker::{CycleOutcome, PriceTracker};
pub use types::{ComponentHealth, Digest, HealthStatus, Quote, SnapshotEntry};
