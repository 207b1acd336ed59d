//! Notifier that writes digests to the tracing log

use crate::{error::NotifyError, notifier::Notifier};
use async_trait::async_trait;

/// Writes every message at `info` level
///
/// Used when no messaging channel is configured.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, messages: &[String]) -> Result<(), NotifyError> {
        for (part, message) in messages.iter().enumerate() {
            tracing::info!(part, "Digest message\n{}", message);
        }
        Ok(())
    }

    fn channel_name(&self) -> &'static str {
        "log"
    }
}
