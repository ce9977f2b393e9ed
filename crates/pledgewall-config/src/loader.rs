// SPDX-FileCopyrightText: 2026 Pledgewall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./pledgewall.toml` > `~/.config/pledgewall/pledgewall.toml`
//! > `/etc/pledgewall/pledgewall.toml`, with environment variable overrides via the
//! `PLEDGEWALL_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::PledgewallConfig;

/// Config file name looked up in every directory of the hierarchy.
pub const CONFIG_FILE_NAME: &str = "pledgewall.toml";

const SYSTEM_CONFIG_PATH: &str = "/etc/pledgewall/pledgewall.toml";

/// Paths searched by [`load_config`], lowest precedence first.
pub fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(SYSTEM_CONFIG_PATH)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("pledgewall").join(CONFIG_FILE_NAME));
    }
    paths.push(PathBuf::from(CONFIG_FILE_NAME));
    paths
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/pledgewall/pledgewall.toml` (system-wide)
/// 3. `~/.config/pledgewall/pledgewall.toml` (user XDG config)
/// 4. `./pledgewall.toml` (local directory)
/// 5. `PLEDGEWALL_*` environment variables
pub fn load_config() -> Result<PledgewallConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<PledgewallConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PledgewallConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<PledgewallConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PledgewallConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    config_search_paths().into_iter().fold(
        Figment::new().merge(Serialized::defaults(PledgewallConfig::default())),
        |figment, path| figment.merge(Toml::file(path)),
    )
    .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `PLEDGEWALL_STORAGE_DATABASE_PATH` must map to
/// `storage.database_path`, not `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed("PLEDGEWALL_").map(|key| {
        let mapped = key
            .as_str()
            .replacen("general_", "general.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("display_", "display.", 1)
            .replacen("ticker_", "ticker.", 1)
            .replacen("live_", "live.", 1);
        mapped.into()
    })
}
