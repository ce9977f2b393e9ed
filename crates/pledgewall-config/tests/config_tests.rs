// SPDX-FileCopyrightText: 2026 Pledgewall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Pledgewall configuration system.

use pledgewall_config::diagnostic::ConfigError;
use pledgewall_config::model::PledgewallConfig;
use pledgewall_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};
use pledgewall_core::{DisplayMode, PlaybackRole, TotalMode};
use serial_test::serial;

#[test]
fn full_toml_deserializes() {
    let toml = r#"
[general]
log_level = "debug"

[storage]
database_path = "/tmp/wall.db"
wal_mode = false
busy_timeout_ms = 250

[display]
poll_interval_ms = 500
role = "follower"

[ticker]
reveal_interval_ms = 3000
max_visible = 4

[live]
total_mode = "capped"
grid_size = 6
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.general.log_level, "debug");
    assert_eq!(config.storage.database_path, "/tmp/wall.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.storage.busy_timeout_ms, 250);
    assert_eq!(config.display.poll_interval_ms, 500);
    assert_eq!(config.display.role, PlaybackRole::Follower);
    assert_eq!(config.ticker.reveal_interval_ms, 3000);
    assert_eq!(config.ticker.max_visible, 4);
    assert_eq!(config.ticker.lifetime_ms, 8000);
    assert_eq!(config.live.total_mode, TotalMode::Capped);
    assert_eq!(config.live.grid_size, 6);
    assert_eq!(config.live.banner_ms, 1500);
}

#[test]
fn empty_toml_uses_defaults() {
    let config = load_and_validate_str("").expect("defaults should validate");
    assert_eq!(config.display.role, PlaybackRole::Revealer);
    assert_eq!(config.cadence(DisplayMode::Ticker).total_mode, TotalMode::Capped);
    assert_eq!(config.cadence(DisplayMode::Live).total_mode, TotalMode::Uncapped);
}

#[test]
fn unknown_key_gets_suggestion_and_span() {
    let toml = "[live]\nbaner_ms = 1000\n";
    let errors = load_and_validate_str(toml).expect_err("typo should be rejected");
    let unknown = errors
        .iter()
        .find_map(|e| match e {
            ConfigError::UnknownKey {
                key,
                suggestion,
                span,
                ..
            } => Some((key.clone(), suggestion.clone(), *span)),
            _ => None,
        })
        .expect("expected an UnknownKey diagnostic");
    assert_eq!(unknown.0, "baner_ms");
    assert_eq!(unknown.1.as_deref(), Some("banner_ms"));
    assert!(unknown.2.is_some());
}

#[test]
fn unknown_section_is_rejected() {
    let errors = load_and_validate_str("[metrics]\nenabled = true\n").unwrap_err();
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::UnknownKey { key, .. } if key == "metrics"))
    );
}

#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str("[ticker]\nmax_visible = \"five\"\n").unwrap_err();
    assert!(errors.iter().any(|e| {
        matches!(e, ConfigError::InvalidType { .. } | ConfigError::InvalidValue { .. })
    }));
}

#[test]
fn validation_errors_surface_through_loader() {
    let errors = load_and_validate_str("[ticker]\nhighlight_ms = 10000\n").unwrap_err();
    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::Validation { message } if message.contains("highlight_ms"))
    ));
}

#[test]
#[serial]
fn file_values_are_overridden_by_env() {
    let dir = std::env::temp_dir().join(format!("pledgewall-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("pledgewall.toml");
    std::fs::write(&path, "[ticker]\nwarmup_ms = 300\nmax_visible = 2\n").unwrap();

    // SAFETY: serialized with other env-touching tests via #[serial].
    unsafe { std::env::set_var("PLEDGEWALL_TICKER_MAX_VISIBLE", "7") };
    let result = load_and_validate_path(&path);
    unsafe { std::env::remove_var("PLEDGEWALL_TICKER_MAX_VISIBLE") };
    std::fs::remove_dir_all(&dir).ok();

    let config = result.expect("file plus env should validate");
    assert_eq!(config.ticker.warmup_ms, 300);
    assert_eq!(config.ticker.max_visible, 7);
}

#[test]
fn config_serializes_to_json() {
    let json = serde_json::to_value(PledgewallConfig::default()).unwrap();
    assert_eq!(json["ticker"]["total_mode"], "capped");
    assert_eq!(json["display"]["role"], "revealer");
}
