use booking_core::{AppConfig, ConfigError, CorruptPolicy};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
    Some(
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect(),
    )
}

#[test]
fn defaults_apply_without_file_or_env() {
    let config = AppConfig::load_with_env(None, env(&[])).unwrap();

    assert_eq!(config.storage.path, Path::new("bookings.json"));
    assert_eq!(config.storage.timeslots_path, Path::new("timeslots.json"));
    assert_eq!(config.storage.on_corrupt, CorruptPolicy::Fail);
    assert_eq!(config.logging.level, booking_core::default_log_level());
    assert!(config.logging.dir.is_none());
    assert!(!config.notify.enabled);
    assert_eq!(config.notify.service_label, "Haircut - $15");
    assert_eq!(config.notify.smtp.port, 587);
    assert_eq!(config.notify.smtp.timeout_secs, 10);
}

#[test]
fn file_values_override_defaults_and_env_overrides_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("booking.toml");
    fs::write(
        &path,
        r#"
[storage]
path = "/var/lib/shop/bookings.json"
on_corrupt = "reset"

[notify]
enabled = true

[notify.smtp]
host = "smtp.example.com"
username = "alerts@example.com"
to = "5550001111@sms.example.com"
"#,
    )
    .unwrap();

    let config = AppConfig::load_with_env(
        Some(&path),
        env(&[
            ("BOOKING__NOTIFY__SMTP__PASSWORD", "from-env"),
            ("BOOKING__NOTIFY__SMTP__PORT", "2525"),
        ]),
    )
    .unwrap();

    assert_eq!(config.storage.path, Path::new("/var/lib/shop/bookings.json"));
    assert_eq!(config.storage.on_corrupt, CorruptPolicy::Reset);
    assert!(config.notify.enabled);
    assert_eq!(config.notify.smtp.host, "smtp.example.com");
    assert_eq!(config.notify.smtp.port, 2525);
    assert_eq!(config.notify.smtp.password.expose(), "from-env");
}

#[test]
fn enabled_notifications_require_relay_credentials() {
    let err = AppConfig::load_with_env(
        None,
        env(&[
            ("BOOKING__NOTIFY__ENABLED", "true"),
            ("BOOKING__NOTIFY__SMTP__HOST", "smtp.example.com"),
        ]),
    )
    .unwrap_err();

    match err {
        ConfigError::Invalid(message) => {
            assert!(message.contains("notify.smtp.username"));
            assert!(message.contains("notify.smtp.password"));
            assert!(message.contains("notify.smtp.to"));
            assert!(!message.contains("notify.smtp.host"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn slot_schedule_cannot_share_the_booking_file() {
    let err = AppConfig::load_with_env(
        None,
        env(&[
            ("BOOKING__STORAGE__PATH", "/srv/shop/data.json"),
            ("BOOKING__STORAGE__TIMESLOTS_PATH", "/srv/shop/data.json"),
        ]),
    )
    .unwrap_err();

    match err {
        ConfigError::Invalid(message) => assert!(message.contains("timeslots_path")),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn debug_output_never_contains_password() {
    let config = AppConfig::load_with_env(
        None,
        env(&[("BOOKING__NOTIFY__SMTP__PASSWORD", "super-secret")]),
    )
    .unwrap();

    assert!(!format!("{config:?}").contains("super-secret"));
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = AppConfig::load_with_env(Some(&dir.path().join("absent.toml")), env(&[]))
        .unwrap_err();
    assert!(matches!(err, ConfigError::Source(_)));
}
