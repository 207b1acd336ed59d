//! Notification channel abstraction

use crate::error::NotifyError;
use async_trait::async_trait;

/// Trait for digest delivery channels
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers each message as a separate message, in order
    async fn send(&self, messages: &[String]) -> Result<(), NotifyError>;

    /// Returns the name of this channel
    fn channel_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock notifier recording every dispatch
    #[derive(Clone, Default)]
    pub struct MockNotifier {
        sent: Arc<Mutex<Vec<Vec<String>>>>,
        failing: Arc<Mutex<bool>>,
    }

    impl MockNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_failing(&self, failing: bool) {
            *self.failing.lock().unwrap() = failing;
        }

        /// Message batches passed to `send`, in call order
        pub fn sent(&self) -> Vec<Vec<String>> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for MockNotifier {
        async fn send(&self, messages: &[String]) -> Result<(), NotifyError> {
            if *self.failing.lock().unwrap() {
                return Err(NotifyError::ApiError("mock channel down".to_string()));
            }
            self.sent.lock().unwrap().push(messages.to_vec());
            Ok(())
        }

        fn channel_name(&self) -> &'static str {
            "mock"
        }
    }
}
