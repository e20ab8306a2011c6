//! Unit tests for config module
//!
//! Tests configuration types, defaults, serialization and validation.
//! No filesystem dependencies - all in-memory.

#![allow(clippy::unwrap_used, clippy::panic)]

use std::time::Duration;

use crate::{
    DockError,
    config::{Config, LogLevel},
    services::mpris::MediaOptions,
};

#[test]
fn config_default() {
    let config = Config::default();

    assert_eq!(config.general.log_level, LogLevel::Info);
    assert!(config.media.ignored_players.is_empty());
    assert_eq!(config.media.enumeration_retry_ms, 2000);
    assert_eq!(config.media.settle_timeout_ms, 1500);
    assert_eq!(config.presentation.min_width, 180);
    assert_eq!(config.presentation.max_width, 300);
    assert_eq!(config.presentation.animation_ms, 300);
}

#[test]
fn config_serialize_toml() {
    let toml_str = toml::to_string(&Config::default()).unwrap();

    assert!(toml_str.contains("[general]"));
    assert!(toml_str.contains("[media]"));
    assert!(toml_str.contains("[presentation]"));
}

#[test]
fn config_serialize_roundtrip() {
    let original = Config::default();

    let toml_str = toml::to_string(&original).unwrap();
    let deserialized: Config = toml::from_str(&toml_str).unwrap();

    assert_eq!(original, deserialized);
}

#[test]
fn config_deserialize_toml() {
    let toml_str = r#"
        [general]
        log_level = "debug"

        [media]
        ignored_players = ["kdeconnect", "chromium"]
        enumeration_retry_ms = 500

        [presentation]
        max_width = 420
    "#;

    let config = Config::from_toml_str(toml_str).unwrap();

    assert_eq!(config.general.log_level, LogLevel::Debug);
    assert_eq!(config.media.ignored_players, vec!["kdeconnect", "chromium"]);
    assert_eq!(config.media.enumeration_retry_ms, 500);
    assert_eq!(config.media.settle_timeout_ms, 1500);
    assert_eq!(config.presentation.min_width, 180);
    assert_eq!(config.presentation.max_width, 420);
}

#[test]
fn config_empty_toml() {
    let config = Config::from_toml_str("").unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn config_unknown_fields() {
    let toml_with_unknown = r#"
        [general]
        log_level = "info"
        unknown_field = "should be ignored"

        [unknown_section]
        some_field = "ignored"
    "#;

    assert!(Config::from_toml_str(toml_with_unknown).is_ok());
}

#[test]
fn config_invalid_toml() {
    let invalid_toml = r#"
        [general
        invalid syntax here
    "#;

    let result = Config::from_toml_str(invalid_toml);
    assert!(matches!(result, Err(DockError::TomlParseError { .. })));
}

#[test]
fn config_invalid_log_level() {
    let result = Config::from_toml_str("[general]\nlog_level = \"loud\"\n");
    assert!(matches!(result, Err(DockError::TomlParseError { .. })));
}

#[test]
fn width_bounds_must_be_ordered() {
    let result = Config::from_toml_str("[presentation]\nmin_width = 400\nmax_width = 300\n");

    match result {
        Err(DockError::ConfigValidation { component, .. }) => assert_eq!(component, "presentation"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn animation_must_take_time() {
    let result = Config::from_toml_str("[presentation]\nanimation_ms = 0\n");
    assert!(matches!(result, Err(DockError::ConfigValidation { .. })));
}

#[test]
fn configs_compare_by_value() {
    fn total_eq<T: Eq>(a: &T, b: &T) -> bool {
        a == b
    }

    let loaded = Config::from_toml_str("[general]\nlog_level = \"info\"\n").unwrap();
    assert!(total_eq(&loaded, &Config::default()));
    assert!(total_eq(&loaded.general, &Config::default().general));
}

#[test]
fn enumeration_retry_must_wait() {
    let result = Config::from_toml_str("[media]\nenumeration_retry_ms = 0\n");

    match result {
        Err(DockError::ConfigValidation { component, .. }) => assert_eq!(component, "media"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn media_options_follow_config() {
    let config = Config::from_toml_str(
        r#"
        [media]
        ignored_players = ["kdeconnect"]
        enumeration_retry_ms = 250

        [presentation]
        min_width = 100
        max_width = 200
        animation_ms = 50
    "#,
    )
    .unwrap();

    assert_eq!(
        config.media_options(),
        MediaOptions {
            ignored_players: vec!["kdeconnect".to_string()],
            enumeration_retry: Duration::from_millis(250),
            animation: Duration::from_millis(50),
            min_width: 100,
            max_width: 200,
        }
    );
    assert_eq!(Config::default().media_options(), MediaOptions::default());
}

#[test]
fn schema_describes_every_section() {
    let schema = serde_json::to_string(&schemars::schema_for!(Config)).unwrap();

    assert!(schema.contains("ignored_players"));
    assert!(schema.contains("animation_ms"));
    assert!(schema.contains("log_level"));
}
