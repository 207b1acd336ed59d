//! Default settings for the market digest tracker
//!
//! Every value here can be overridden at runtime through
//! [`TrackerConfig::from_env`](crate::config::TrackerConfig::from_env).

/// LunarCrush API base URL
pub const LUNARCRUSH_API_URL: &str = "https://api.lunarcrush.com/v2";

/// Value of the `data` query parameter selecting asset quotes
pub const LUNARCRUSH_ASSETS_DATA: &str = "assets";

/// Maximum number of symbols the provider accepts per request
pub const DEFAULT_BATCH_SIZE: usize = 150;

/// How often to poll the provider (in seconds)
pub const POLL_INTERVAL_SECS: u64 = 60 * 60;

/// Minimum time between two digests (in seconds)
pub const NOTIFICATION_INTERVAL_SECS: u64 = 60 * 60;

/// Number of top performers listed in a digest
pub const DEFAULT_TOP_N: usize = 5;

/// HTTP request timeout (in seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Where the running snapshot is persisted
pub const DEFAULT_SNAPSHOT_PATH: &str = "data/dump.json";

/// Assets that get direct alerts when nothing else is configured
pub const DEFAULT_TRACKED_ASSETS: &[&str] = &["NAV", "VIA"];

/// Telegram Bot API base URL
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// User agent for HTTP requests
pub const USER_AGENT: &str = "market-digest/0.1.0";
