//! Runtime configuration
//!
//! Defaults come from [`constants`](crate::constants); environment variables
//! override them. Poll cadence and notification interval are independent.

use crate::{
    constants::{
        DEFAULT_BATCH_SIZE, DEFAULT_SNAPSHOT_PATH, DEFAULT_TOP_N, DEFAULT_TRACKED_ASSETS,
        LUNARCRUSH_API_URL, NOTIFICATION_INTERVAL_SECS, POLL_INTERVAL_SECS,
    },
    error::ConfigError,
};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Telegram delivery settings
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

/// Settings for one tracker process
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Provider API key
    pub api_key: String,
    /// Provider base URL
    pub base_url: String,
    /// Every symbol that is polled and ranked
    pub universe: Vec<String>,
    /// Symbols that get direct alerts; always part of `universe`
    pub tracked_assets: Vec<String>,
    pub poll_interval: Duration,
    pub notification_interval: Duration,
    /// Number of top performers per digest
    pub top_n: usize,
    /// Provider per-request symbol cap
    pub batch_size: usize,
    pub snapshot_path: PathBuf,
    /// Discard any persisted snapshot on start
    pub reset_baseline: bool,
    /// Digests go to the log when unset
    pub telegram: Option<TelegramConfig>,
}

impl TrackerConfig {
    /// Creates a config with default settings
    ///
    /// Tracked symbols missing from `universe` are appended to it.
    pub fn new(tracked_assets: Vec<String>, universe: Vec<String>) -> Self {
        let tracked_assets = normalize(tracked_assets);
        let universe = merge_universe(normalize(universe), &tracked_assets);

        Self {
            api_key: String::new(),
            base_url: LUNARCRUSH_API_URL.to_string(),
            universe,
            tracked_assets,
            poll_interval: Duration::from_secs(POLL_INTERVAL_SECS),
            notification_interval: Duration::from_secs(NOTIFICATION_INTERVAL_SECS),
            top_n: DEFAULT_TOP_N,
            batch_size: DEFAULT_BATCH_SIZE,
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
            reset_baseline: false,
            telegram: None,
        }
    }

    /// Loads the config from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the config through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_key = get("LUNARCRUSH_API_KEY").ok_or(ConfigError::Missing("LUNARCRUSH_API_KEY"))?;

        let tracked_assets = match get("TRACKER_ASSETS") {
            Some(list) => list.split(',').map(str::to_string).collect(),
            None => DEFAULT_TRACKED_ASSETS.iter().map(|s| s.to_string()).collect(),
        };

        let universe = match get("TRACKER_UNIVERSE_FILE") {
            Some(path) => parse_symbols(BufReader::new(File::open(path)?))?,
            None => Vec::new(),
        };

        let mut config = Self::new(tracked_assets, universe);
        if config.universe.is_empty() {
            return Err(ConfigError::EmptyUniverse);
        }

        config.api_key = api_key;
        if let Some(url) = get("LUNARCRUSH_BASE_URL") {
            config.base_url = url;
        }
        if let Some(secs) = parse_var::<u64>(&get, "TRACKER_POLL_SECS")? {
            if secs == 0 {
                return Err(ConfigError::invalid("TRACKER_POLL_SECS", "0"));
            }
            config.poll_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64>(&get, "TRACKER_NOTIFY_SECS")? {
            if secs == 0 {
                return Err(ConfigError::invalid("TRACKER_NOTIFY_SECS", "0"));
            }
            config.notification_interval = Duration::from_secs(secs);
        }
        if let Some(n) = parse_var::<usize>(&get, "TRACKER_TOP_N")? {
            config.top_n = n;
        }
        if let Some(size) = parse_var::<usize>(&get, "TRACKER_BATCH_SIZE")? {
            if size == 0 {
                return Err(ConfigError::invalid("TRACKER_BATCH_SIZE", "0"));
            }
            config.batch_size = size;
        }
        if let Some(path) = get("TRACKER_SNAPSHOT_PATH") {
            config.snapshot_path = PathBuf::from(path);
        }
        if let Some(reset) = parse_var::<bool>(&get, "TRACKER_RESET_BASELINE")? {
            config.reset_baseline = reset;
        }

        config.telegram = match (get("TELEGRAM_BOT_TOKEN"), get("TELEGRAM_CHAT_ID")) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramConfig { bot_token, chat_id }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("TELEGRAM_CHAT_ID")),
            (None, Some(_)) => return Err(ConfigError::Missing("TELEGRAM_BOT_TOKEN")),
        };

        Ok(config)
    }
}

fn parse_var<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::invalid(key, raw)),
        None => Ok(None),
    }
}

/// Reads one symbol per line, skipping blank lines
pub fn parse_symbols<R: BufRead>(reader: R) -> Result<Vec<String>, ConfigError> {
    let mut symbols = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            symbols.push(trimmed.to_string());
        }
    }
    Ok(normalize(symbols))
}

/// Trims, upper-cases and de-duplicates, keeping first occurrence order
fn normalize(symbols: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    symbols
        .into_iter()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect()
}

fn merge_universe(mut universe: Vec<String>, tracked: &[String]) -> Vec<String> {
    let known: HashSet<String> = universe.iter().cloned().collect();
    universe.extend(tracked.iter().filter(|s| !known.contains(*s)).cloned());
    universe
}
