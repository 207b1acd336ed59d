//! Notifier implementations

pub mod log;
pub mod telegram;

pub use self::log::LogNotifier;
pub use self::telegram::TelegramNotifier;
