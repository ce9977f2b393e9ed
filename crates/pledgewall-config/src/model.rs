// SPDX-FileCopyrightText: 2026 Pledgewall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use pledgewall_core::{DisplayMode, PlaybackRole, TotalMode};
use serde::{Deserialize, Serialize};

/// Top-level Pledgewall configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to the cadences the displays were tuned for.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PledgewallConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    /// Shared store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Settings common to every display instance.
    #[serde(default)]
    pub display: DisplayConfig,

    /// Ticker (bubble) display settings.
    #[serde(default)]
    pub ticker: TickerConfig,

    /// Live wall (banner + grid) display settings.
    #[serde(default)]
    pub live: LiveConfig,
}

impl PledgewallConfig {
    /// Reveal cadence for the given display mode.
    pub fn cadence(&self, mode: DisplayMode) -> Cadence {
        match mode {
            DisplayMode::Ticker => Cadence {
                warmup: Duration::from_millis(self.ticker.warmup_ms),
                interval: Duration::from_millis(self.ticker.reveal_interval_ms),
                total_mode: self.ticker.total_mode,
            },
            DisplayMode::Live => Cadence {
                warmup: Duration::from_millis(self.live.warmup_ms),
                interval: Duration::from_millis(self.live.reveal_interval_ms),
                total_mode: self.live.total_mode,
            },
        }
    }
}

/// Reveal pacing resolved for one display mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    /// One-time delay before the first reveal after activation.
    pub warmup: Duration,
    /// Fixed delay between consecutive reveals.
    pub interval: Duration,
    pub total_mode: TotalMode,
}

/// Process-wide settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Shared store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file shared by admin and displays.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// How long a writer waits for another process's lock before failing.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("pledgewall").join("pledgewall.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("pledgewall.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

/// Settings shared by ticker and live wall displays.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DisplayConfig {
    /// How often the store watcher re-reads the shared store.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// How often projections expire highlights, bubbles and banners.
    #[serde(default = "default_housekeeping_interval_ms")]
    pub housekeeping_interval_ms: u64,

    /// Whether this instance advances the shared cursor.
    #[serde(default)]
    pub role: PlaybackRole,

    /// How long a status message stays on a display.
    #[serde(default = "default_status_message_ms")]
    pub status_message_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            housekeeping_interval_ms: default_housekeeping_interval_ms(),
            role: PlaybackRole::default(),
            status_message_ms: default_status_message_ms(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_housekeeping_interval_ms() -> u64 {
    250
}

fn default_status_message_ms() -> u64 {
    5000
}

/// Ticker display configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TickerConfig {
    #[serde(default = "default_ticker_interval_ms")]
    pub reveal_interval_ms: u64,

    #[serde(default = "default_ticker_warmup_ms")]
    pub warmup_ms: u64,

    #[serde(default = "default_ticker_total_mode")]
    pub total_mode: TotalMode,

    /// Maximum bubbles on screen at once.
    #[serde(default = "default_max_visible")]
    pub max_visible: usize,

    /// How long a bubble stays on screen.
    #[serde(default = "default_lifetime_ms")]
    pub lifetime_ms: u64,

    /// How long a bubble is highlighted as new.
    #[serde(default = "default_highlight_ms")]
    pub highlight_ms: u64,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            reveal_interval_ms: default_ticker_interval_ms(),
            warmup_ms: default_ticker_warmup_ms(),
            total_mode: default_ticker_total_mode(),
            max_visible: default_max_visible(),
            lifetime_ms: default_lifetime_ms(),
            highlight_ms: default_highlight_ms(),
        }
    }
}

fn default_ticker_interval_ms() -> u64 {
    5000
}

fn default_ticker_warmup_ms() -> u64 {
    1000
}

fn default_ticker_total_mode() -> TotalMode {
    TotalMode::Capped
}

fn default_max_visible() -> usize {
    5
}

fn default_lifetime_ms() -> u64 {
    8000
}

fn default_highlight_ms() -> u64 {
    3000
}

/// Live wall display configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LiveConfig {
    #[serde(default = "default_live_interval_ms")]
    pub reveal_interval_ms: u64,

    #[serde(default = "default_live_warmup_ms")]
    pub warmup_ms: u64,

    #[serde(default = "default_live_total_mode")]
    pub total_mode: TotalMode,

    /// How long the latest donation occupies the banner.
    #[serde(default = "default_banner_ms")]
    pub banner_ms: u64,

    /// Maximum donations kept in the grid.
    #[serde(default = "default_grid_size")]
    pub grid_size: usize,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            reveal_interval_ms: default_live_interval_ms(),
            warmup_ms: default_live_warmup_ms(),
            total_mode: default_live_total_mode(),
            banner_ms: default_banner_ms(),
            grid_size: default_grid_size(),
        }
    }
}

fn default_live_interval_ms() -> u64 {
    4000
}

fn default_live_warmup_ms() -> u64 {
    2000
}

fn default_live_total_mode() -> TotalMode {
    TotalMode::Uncapped
}

fn default_banner_ms() -> u64 {
    1500
}

fn default_grid_size() -> usize {
    12
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cadence_defaults_per_mode() {
        let config = PledgewallConfig::default();

        let ticker = config.cadence(DisplayMode::Ticker);
        assert_eq!(ticker.warmup, Duration::from_millis(1000));
        assert_eq!(ticker.interval, Duration::from_millis(5000));
        assert_eq!(ticker.total_mode, TotalMode::Capped);

        let live = config.cadence(DisplayMode::Live);
        assert_eq!(live.warmup, Duration::from_millis(2000));
        assert_eq!(live.interval, Duration::from_millis(4000));
        assert_eq!(live.total_mode, TotalMode::Uncapped);
    }

    #[test]
    fn role_parses_from_toml() {
        let config: PledgewallConfig = toml::from_str("[display]\nrole = \"follower\"\n").unwrap();
        assert_eq!(config.display.role, PlaybackRole::Follower);
        assert_eq!(config.display.poll_interval_ms, 1000);
    }

    #[test]
    fn unknown_total_mode_is_rejected() {
        let result = toml::from_str::<PledgewallConfig>("[ticker]\ntotal_mode = \"clamped\"\n");
        assert!(result.is_err());
    }
}
