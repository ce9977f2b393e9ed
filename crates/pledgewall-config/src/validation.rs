// SPDX-FileCopyrightText: 2026 Pledgewall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks constraints serde cannot express: non-empty paths, positive
//! intervals, and the relationship between ticker lifetimes.

use crate::diagnostic::ConfigError;
use crate::model::PledgewallConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &PledgewallConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let level = config.general.log_level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "general.log_level `{}` is not one of {}",
                config.general.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    let positive = [
        ("display.poll_interval_ms", config.display.poll_interval_ms),
        (
            "display.housekeeping_interval_ms",
            config.display.housekeeping_interval_ms,
        ),
        ("ticker.reveal_interval_ms", config.ticker.reveal_interval_ms),
        ("ticker.lifetime_ms", config.ticker.lifetime_ms),
        ("live.reveal_interval_ms", config.live.reveal_interval_ms),
        ("live.banner_ms", config.live.banner_ms),
    ];
    for (key, value) in positive {
        if value == 0 {
            errors.push(ConfigError::Validation {
                message: format!("{key} must be greater than zero"),
            });
        }
    }

    if config.ticker.highlight_ms > config.ticker.lifetime_ms {
        errors.push(ConfigError::Validation {
            message: format!(
                "ticker.highlight_ms ({}) must not exceed ticker.lifetime_ms ({})",
                config.ticker.highlight_ms, config.ticker.lifetime_ms
            ),
        });
    }

    if config.ticker.max_visible < 1 {
        errors.push(ConfigError::Validation {
            message: "ticker.max_visible must be at least 1".to_string(),
        });
    }

    if config.live.grid_size < 1 {
        errors.push(ConfigError::Validation {
            message: "live.grid_size must be at least 1".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
