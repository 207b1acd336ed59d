//! Tracking loop
//!
//! Drives the poll cycle: fetch, refresh the snapshot, persist it, and when
//! the notification interval has elapsed, draft and dispatch a digest.

use crate::{
    config::TrackerConfig,
    digest::MessageDrafter,
    error::TrackerError,
    fetcher::QuoteFetcher,
    notifier::Notifier,
    provider::QuoteProvider,
    ranking::top_performers,
    scheduler::AlertScheduler,
    snapshot::Snapshot,
    store::SnapshotStore,
    types::{ComponentHealth, Digest, HealthStatus},
};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use tokio::time::sleep;

/// Result of one successful cycle
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    /// A new baseline was fetched and persisted
    Baseline { entries: usize },
    /// The snapshot was refreshed; `digest` is set when one was dispatched
    Refreshed { digest: Option<Digest> },
}

/// Snapshot plus the notification clock that started with it
struct TrackingState {
    snapshot: Snapshot,
    scheduler: AlertScheduler,
}

/// Price tracker owning every stage of the poll cycle
pub struct PriceTracker {
    config: TrackerConfig,
    fetcher: QuoteFetcher,
    notifier: Arc<dyn Notifier>,
    store: SnapshotStore,
    drafter: MessageDrafter,
    state: Option<TrackingState>,
    last_success: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

impl PriceTracker {
    /// Creates a tracker; nothing is fetched until [`start`](Self::start) or a cycle runs
    pub fn new(
        config: TrackerConfig,
        provider: Arc<dyn QuoteProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let fetcher = QuoteFetcher::new(provider, config.batch_size);
        let store = SnapshotStore::new(config.snapshot_path.clone());
        let drafter = MessageDrafter::new(config.notification_interval);

        Self {
            config,
            fetcher,
            notifier,
            store,
            drafter,
            state: None,
            last_success: None,
            last_error: None,
        }
    }

    /// Prepares the persisted state
    ///
    /// Clears the store when a fresh baseline was requested, otherwise
    /// resumes a persisted snapshot if there is one. The notification clock
    /// of a resumed snapshot starts at `now`.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), TrackerError> {
        if self.config.reset_baseline {
            tracing::info!(path = %self.store.path().display(), "Clearing persisted snapshot");
            self.store.clear()?;
            return Ok(());
        }

        if let Some(snapshot) = self.store.load()? {
            let resumed: std::collections::HashSet<&str> =
                snapshot.entries().iter().map(|e| e.symbol.as_str()).collect();
            let drifted = self
                .config
                .universe
                .iter()
                .filter(|s| !resumed.contains(s.as_str()))
                .count();
            if drifted > 0 {
                tracing::warn!(
                    missing = drifted,
                    "Resumed snapshot does not cover the configured universe; clear it to re-baseline"
                );
            }

            tracing::info!(entries = snapshot.len(), "Resumed persisted snapshot");
            self.state = Some(TrackingState {
                snapshot,
                scheduler: AlertScheduler::new(self.config.notification_interval, now),
            });
        }

        Ok(())
    }

    /// Runs cycles until `shutdown` completes
    pub async fn run_until<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        tracing::info!(
            poll_interval_secs = self.config.poll_interval.as_secs(),
            notification_interval_secs = self.config.notification_interval.as_secs(),
            symbols = self.config.universe.len(),
            provider = self.fetcher.provider_name(),
            channel = self.notifier.channel_name(),
            "Starting price tracker"
        );

        loop {
            match self.run_cycle(Utc::now()).await {
                Ok(CycleOutcome::Baseline { entries }) => {
                    tracing::info!(entries, "Baseline snapshot created");
                }
                Ok(CycleOutcome::Refreshed { digest: Some(digest) }) => {
                    tracing::info!(
                        digest_id = %digest.id,
                        messages = digest.messages.len(),
                        "Digest dispatched"
                    );
                }
                Ok(CycleOutcome::Refreshed { digest: None }) => {
                    tracing::debug!("Snapshot refreshed");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Tracking cycle failed, retrying next tick");
                }
            }

            tokio::select! {
                _ = sleep(self.config.poll_interval) => {}
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested, stopping price tracker");
                    break;
                }
            }
        }
    }

    /// Runs a single cycle as of `now`
    ///
    /// Takes a baseline when there is no snapshot yet, otherwise refreshes
    /// it. A failed cycle leaves the persisted file as it was and sends
    /// nothing.
    pub async fn run_cycle(&mut self, now: DateTime<Utc>) -> Result<CycleOutcome, TrackerError> {
        let result = match self.state {
            None => self.establish_baseline(now).await,
            Some(_) => self.refresh(now).await,
        };

        match &result {
            Ok(_) => {
                self.last_success = Some(now);
                self.last_error = None;
            }
            Err(e) => self.last_error = Some(e.to_string()),
        }
        result
    }

    async fn establish_baseline(&mut self, now: DateTime<Utc>) -> Result<CycleOutcome, TrackerError> {
        let quotes = self.fetcher.fetch(&self.config.universe).await?;
        if quotes.len() < self.config.universe.len() {
            tracing::warn!(
                requested = self.config.universe.len(),
                received = quotes.len(),
                "Provider has no quote for some symbols; they are left out of the baseline"
            );
        }

        let snapshot = Snapshot::initialize(&quotes)?;
        self.store.save(&snapshot)?;

        let entries = snapshot.len();
        self.state = Some(TrackingState {
            snapshot,
            scheduler: AlertScheduler::new(self.config.notification_interval, now),
        });
        Ok(CycleOutcome::Baseline { entries })
    }

    async fn refresh(&mut self, now: DateTime<Utc>) -> Result<CycleOutcome, TrackerError> {
        let Some(state) = self.state.as_mut() else {
            return self.establish_baseline(now).await;
        };

        let quotes = self.fetcher.fetch(&state.snapshot.symbols()).await?;
        let mut refreshed = state.snapshot.clone();
        refreshed.refresh(&quotes)?;
        self.store.save(&refreshed)?;
        state.snapshot = refreshed;

        if !state.scheduler.is_due(now) {
            tracing::debug!(
                next_digest_in_secs = state.scheduler.remaining(now).as_secs(),
                "Digest not due yet"
            );
            return Ok(CycleOutcome::Refreshed { digest: None });
        }

        let tracked = state.snapshot.tracked(&self.config.tracked_assets);
        let top = top_performers(&state.snapshot, self.config.top_n);
        if tracked.is_empty() && top.is_empty() {
            return Ok(CycleOutcome::Refreshed { digest: None });
        }

        let digest = Digest::new(self.drafter.draft(&tracked, &top), now);
        self.notifier.send(&digest.messages).await?;
        state.scheduler.record_notification(now);

        Ok(CycleOutcome::Refreshed {
            digest: Some(digest),
        })
    }

    /// Current snapshot, if a baseline exists
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.state.as_ref().map(|state| &state.snapshot)
    }

    /// When the last digest went out (or the clock started)
    pub fn last_notification(&self) -> Option<DateTime<Utc>> {
        self.state
            .as_ref()
            .map(|state| state.scheduler.last_notification())
    }

    /// Perform a health check on the tracker
    ///
    /// # Returns
    /// ComponentHealth indicating the status of the tracker
    pub fn health_check(&self, now: DateTime<Utc>) -> ComponentHealth {
        let mut details = std::collections::HashMap::new();

        details.insert(
            "provider_name".to_string(),
            serde_json::json!(self.fetcher.provider_name()),
        );
        details.insert(
            "snapshot_entries".to_string(),
            serde_json::json!(self.snapshot().map_or(0, Snapshot::len)),
        );
        details.insert(
            "last_success".to_string(),
            serde_json::json!(self.last_success.map(|t| t.to_rfc3339())),
        );
        details.insert(
            "last_notification".to_string(),
            serde_json::json!(self.last_notification().map(|t| t.to_rfc3339())),
        );

        let stale_after = self
            .config
            .poll_interval
            .checked_mul(2)
            .and_then(|d| chrono::Duration::from_std(d).ok())
            .unwrap_or(chrono::Duration::MAX);
        let stale = self
            .last_success
            .map_or(true, |t| now.signed_duration_since(t) > stale_after);

        let (status, message) = match (&self.state, &self.last_error) {
            (None, Some(e)) => (
                HealthStatus::Unhealthy,
                format!("No baseline yet, last attempt failed: {e}"),
            ),
            (None, None) => (HealthStatus::Unhealthy, "No baseline yet".to_string()),
            (Some(_), Some(e)) => (HealthStatus::Degraded, format!("Last cycle failed: {e}")),
            (Some(_), None) if stale => (
                HealthStatus::Degraded,
                "Snapshot has not been refreshed recently".to_string(),
            ),
            (Some(_), None) => (
                HealthStatus::Healthy,
                "Price tracker is operational with fresh data".to_string(),
            ),
        };

        ComponentHealth {
            name: "price_tracker".to_string(),
            status,
            message: Some(message),
            details,
            last_checked: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        digest::{TOP_PERFORMERS_HEADER, TRACKED_HEADER},
        error::{ProviderError, SnapshotError},
        notifier::mock::MockNotifier,
        provider::mock::MockProvider,
    };
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    struct Harness {
        tracker: PriceTracker,
        provider: MockProvider,
        notifier: MockNotifier,
        dir: TempDir,
    }

    fn harness(tracked: &[&str], universe: &[&str]) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let mut config = TrackerConfig::new(strings(tracked), strings(universe));
        config.snapshot_path = dir.path().join("dump.json");

        let provider = MockProvider::new();
        let notifier = MockNotifier::new();
        let tracker = PriceTracker::new(
            config,
            Arc::new(provider.clone()),
            Arc::new(notifier.clone()),
        );
        Harness {
            tracker,
            provider,
            notifier,
            dir,
        }
    }

    fn set_prices(provider: &MockProvider, prices: &[(&str, f64)]) {
        for (symbol, price) in prices {
            provider.set_price(symbol, *price);
        }
    }

    #[tokio::test]
    async fn test_end_to_end_digest() {
        let mut h = harness(&["NAV", "VIA"], &["NAV", "VIA", "XYZ"]);
        set_prices(&h.provider, &[("NAV", 1.00), ("VIA", 2.00), ("XYZ", 0.50)]);

        let outcome = h.tracker.run_cycle(at(0)).await.unwrap();
        assert!(matches!(outcome, CycleOutcome::Baseline { entries: 3 }));

        set_prices(&h.provider, &[("NAV", 1.10), ("VIA", 1.90), ("XYZ", 1.00)]);
        let outcome = h.tracker.run_cycle(at(3600)).await.unwrap();
        let digest = match outcome {
            CycleOutcome::Refreshed { digest: Some(digest) } => digest,
            other => panic!("expected a digest, got {other:?}"),
        };

        assert_eq!(digest.messages.len(), 2);
        let tracked = &digest.messages[0];
        assert!(tracked.starts_with(TRACKED_HEADER));
        assert!(tracked.contains("Symbol:NAV\nPrice:1.1\nPercent Change:10.000"));
        assert!(tracked.contains("Symbol:VIA\nPrice:1.9\nPercent Change:-5.000"));
        assert!(!tracked.contains("XYZ"));

        let top = &digest.messages[1];
        assert!(top.starts_with(&format!("{TOP_PERFORMERS_HEADER}\nName:XYZ coin\nSymbol:XYZ\n1hr Change:100.000")));

        assert_eq!(h.notifier.sent(), vec![digest.messages.clone()]);
        assert_eq!(h.tracker.last_notification(), Some(at(3600)));
    }

    #[tokio::test]
    async fn test_no_digest_before_interval() {
        let mut h = harness(&["NAV"], &["NAV", "XYZ"]);
        set_prices(&h.provider, &[("NAV", 1.0), ("XYZ", 1.0)]);
        h.tracker.run_cycle(at(0)).await.unwrap();

        set_prices(&h.provider, &[("NAV", 2.0)]);
        let outcome = h.tracker.run_cycle(at(1800)).await.unwrap();
        assert!(matches!(outcome, CycleOutcome::Refreshed { digest: None }));
        assert!(h.notifier.sent().is_empty());
        assert_eq!(h.tracker.snapshot().unwrap().get("NAV").unwrap().current_price, 2.0);
    }

    #[tokio::test]
    async fn test_empty_tracked_subset_still_sends_top_performers() {
        let mut h = harness(&[], &["ABC", "XYZ"]);
        set_prices(&h.provider, &[("ABC", 1.0), ("XYZ", 1.0)]);
        h.tracker.run_cycle(at(0)).await.unwrap();

        set_prices(&h.provider, &[("ABC", 1.2)]);
        h.tracker.run_cycle(at(3600)).await.unwrap();

        let sent = h.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0][0], format!("{TRACKED_HEADER}\n"));
        assert!(sent[0][1].contains("Symbol:ABC\n1hr Change:20.000"));
    }

    #[tokio::test]
    async fn test_fetch_failure_skips_cycle_and_keeps_snapshot() {
        let mut h = harness(&["NAV"], &["NAV"]);
        set_prices(&h.provider, &[("NAV", 1.0)]);
        h.tracker.run_cycle(at(0)).await.unwrap();
        let saved = std::fs::read_to_string(h.dir.path().join("dump.json")).unwrap();

        h.provider.set_failing(true);
        let result = h.tracker.run_cycle(at(3600)).await;
        assert!(matches!(result, Err(TrackerError::Fetch(ProviderError::ApiError(_)))));
        assert!(h.notifier.sent().is_empty());
        assert_eq!(
            std::fs::read_to_string(h.dir.path().join("dump.json")).unwrap(),
            saved
        );
        assert_eq!(h.tracker.health_check(at(3600)).status, HealthStatus::Degraded);

        // Recovers on the next tick
        h.provider.set_failing(false);
        set_prices(&h.provider, &[("NAV", 1.5)]);
        assert!(matches!(
            h.tracker.run_cycle(at(7200)).await.unwrap(),
            CycleOutcome::Refreshed { digest: Some(_) }
        ));
    }

    #[tokio::test]
    async fn test_missing_quote_fails_loudly() {
        let mut h = harness(&["NAV", "VIA"], &["NAV", "VIA"]);
        set_prices(&h.provider, &[("NAV", 1.0), ("VIA", 2.0)]);
        h.tracker.run_cycle(at(0)).await.unwrap();

        // VIA delisted: provider now returns nothing for it
        let provider = MockProvider::new();
        provider.set_price("NAV", 1.2);
        h.tracker.fetcher = QuoteFetcher::new(Arc::new(provider), 150);

        let result = h.tracker.run_cycle(at(3600)).await;
        assert!(matches!(
            result,
            Err(TrackerError::Snapshot(SnapshotError::MissingQuote(ref s))) if s == "VIA"
        ));
        assert_eq!(h.tracker.snapshot().unwrap().get("NAV").unwrap().current_price, 1.0);
    }

    #[tokio::test]
    async fn test_failed_dispatch_keeps_scheduler_due() {
        let mut h = harness(&["NAV"], &["NAV"]);
        set_prices(&h.provider, &[("NAV", 1.0)]);
        h.tracker.run_cycle(at(0)).await.unwrap();

        h.notifier.set_failing(true);
        assert!(matches!(
            h.tracker.run_cycle(at(3600)).await,
            Err(TrackerError::Notify(_))
        ));
        assert_eq!(h.tracker.last_notification(), Some(at(0)));

        h.notifier.set_failing(false);
        h.tracker.run_cycle(at(3700)).await.unwrap();
        assert_eq!(h.notifier.sent().len(), 1);
        assert_eq!(h.tracker.last_notification(), Some(at(3700)));
    }

    #[tokio::test]
    async fn test_baseline_failure_retries_next_tick() {
        let mut h = harness(&["NAV"], &["NAV"]);
        h.provider.set_failing(true);
        assert!(h.tracker.run_cycle(at(0)).await.is_err());
        assert!(h.tracker.snapshot().is_none());
        assert_eq!(h.tracker.health_check(at(0)).status, HealthStatus::Unhealthy);

        h.provider.set_failing(false);
        set_prices(&h.provider, &[("NAV", 1.0)]);
        assert!(matches!(
            h.tracker.run_cycle(at(3600)).await.unwrap(),
            CycleOutcome::Baseline { entries: 1 }
        ));
        assert_eq!(h.tracker.last_notification(), Some(at(3600)));
    }

    #[tokio::test]
    async fn test_resume_from_persisted_snapshot() {
        let mut h = harness(&["NAV"], &["NAV"]);
        set_prices(&h.provider, &[("NAV", 1.0)]);
        h.tracker.run_cycle(at(0)).await.unwrap();

        let mut config = TrackerConfig::new(strings(&["NAV"]), strings(&["NAV"]));
        config.snapshot_path = h.dir.path().join("dump.json");
        let mut resumed = PriceTracker::new(
            config,
            Arc::new(h.provider.clone()),
            Arc::new(h.notifier.clone()),
        );
        resumed.start(at(100)).unwrap();
        assert_eq!(resumed.last_notification(), Some(at(100)));

        set_prices(&h.provider, &[("NAV", 3.0)]);
        assert!(matches!(
            resumed.run_cycle(at(200)).await.unwrap(),
            CycleOutcome::Refreshed { digest: None }
        ));
        let nav = resumed.snapshot().unwrap().get("NAV").unwrap();
        assert_eq!(nav.start_price, 1.0);
        assert_eq!(nav.percent_change, Some(200.0));
    }

    #[tokio::test]
    async fn test_reset_baseline_clears_store() {
        let mut h = harness(&["NAV"], &["NAV"]);
        set_prices(&h.provider, &[("NAV", 1.0)]);
        h.tracker.run_cycle(at(0)).await.unwrap();

        let mut config = TrackerConfig::new(strings(&["NAV"]), strings(&["NAV"]));
        config.snapshot_path = h.dir.path().join("dump.json");
        config.reset_baseline = true;
        let mut fresh = PriceTracker::new(
            config,
            Arc::new(h.provider.clone()),
            Arc::new(h.notifier.clone()),
        );
        fresh.start(at(100)).unwrap();
        assert!(fresh.snapshot().is_none());
        assert!(!h.dir.path().join("dump.json").exists());

        set_prices(&h.provider, &[("NAV", 4.0)]);
        fresh.run_cycle(at(100)).await.unwrap();
        assert_eq!(fresh.snapshot().unwrap().get("NAV").unwrap().start_price, 4.0);
    }

    #[tokio::test]
    async fn test_run_until_stops_on_shutdown() {
        let mut h = harness(&["NAV"], &["NAV"]);
        set_prices(&h.provider, &[("NAV", 1.0)]);

        h.tracker.run_until(std::future::ready(())).await;
        assert_eq!(h.provider.call_count(), 1);
        assert!(h.tracker.snapshot().is_some());
    }

    #[tokio::test]
    async fn test_health_check() {
        let mut h = harness(&["NAV"], &["NAV"]);
        set_prices(&h.provider, &[("NAV", 1.0)]);
        h.tracker.run_cycle(at(0)).await.unwrap();

        let health = h.tracker.health_check(at(60));
        assert_eq!(health.status, HealthStatus::Healthy);
        assert_eq!(health.details["snapshot_entries"], serde_json::json!(1));
        assert_eq!(health.details["provider_name"], serde_json::json!("mock"));

        assert_eq!(
            h.tracker.health_check(at(3 * 3600)).status,
            HealthStatus::Degraded
        );
    }

    #[tokio::test]
    async fn test_health_check_with_huge_poll_interval() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = TrackerConfig::new(strings(&["NAV"]), strings(&["NAV"]));
        config.snapshot_path = dir.path().join("dump.json");
        config.poll_interval = std::time::Duration::from_secs(u64::MAX);

        let provider = MockProvider::new();
        provider.set_price("NAV", 1.0);
        let mut tracker = PriceTracker::new(
            config,
            Arc::new(provider),
            Arc::new(MockNotifier::new()),
        );
        tracker.run_cycle(at(0)).await.unwrap();

        let health = tracker.health_check(at(365 * 24 * 3600));
        assert_eq!(health.status, HealthStatus::Healthy);
    }
}
