/*!
 * Tests for application configuration loading and validation
 */

use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;
use wabulk::app_config::{Config, LogLevel};
use crate::common;

#[test]
fn test_default_config_shouldPointAtLocalBackend() {
    let config = Config::default();

    assert_eq!(config.backend.endpoint, "http://localhost:5000");
    assert_eq!(config.backend.timeout_secs, 30);
    assert_eq!(config.session.poll_interval(), Duration::from_millis(1000));
    assert_eq!(config.session.identity_file, None);
    assert_eq!(config.output.qr_image_path, PathBuf::from("qr.png"));
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

#[test]
fn test_loadOrCreate_missingFile_shouldWriteDefaults() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let created = Config::load_or_create(&path)?;
    assert!(path.exists());
    assert_eq!(created, Config::default());

    let reloaded = Config::load_or_create(&path)?;
    assert_eq!(reloaded, created);
    Ok(())
}

#[test]
fn test_loadOrCreate_existingFile_shouldReadValues() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{
            "backend": {"endpoint": "https://wa.internal:8443", "timeout_secs": 5},
            "session": {"poll_interval_ms": 250, "identity_file": "/tmp/wabulk-id"},
            "log_level": "debug"
        }"#,
    )?;

    let config = Config::load_or_create(&path)?;

    assert_eq!(config.backend.endpoint, "https://wa.internal:8443");
    assert_eq!(config.backend.timeout_secs, 5);
    assert_eq!(config.session.poll_interval(), Duration::from_millis(250));
    assert_eq!(config.session.identity_file, Some(PathBuf::from("/tmp/wabulk-id")));
    assert_eq!(config.output.qr_image_path, PathBuf::from("qr.png"));
    assert_eq!(config.log_level, LogLevel::Debug);
    Ok(())
}

#[test]
fn test_loadOrCreate_invalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ backend: ")?;

    let error = Config::load_or_create(&path).unwrap_err();
    assert!(error.to_string().contains("Failed to parse config file"));
    Ok(())
}

#[test]
fn test_save_thenLoad_shouldRoundTripCustomValues() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("custom.json");

    let mut config = common::test_config(temp_dir.path());
    config.backend.endpoint = "http://192.168.1.20:5000".to_string();
    config.log_level = LogLevel::Trace;
    config.save(&path)?;

    assert_eq!(Config::load_or_create(&path)?, config);
    Ok(())
}

#[test]
fn test_validate_badEndpoint_shouldFail() {
    let mut config = Config::default();

    config.backend.endpoint = "localhost:5000 with spaces".to_string();
    assert!(config.validate().is_err());

    config.backend.endpoint = "ftp://files.example.com".to_string();
    let error = config.validate().unwrap_err();
    assert!(error.to_string().contains("http or https"));
}

#[test]
fn test_validate_zeroDurations_shouldFail() {
    let mut config = Config::default();
    config.backend.timeout_secs = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.session.poll_interval_ms = 0;
    let error = config.validate().unwrap_err();
    assert!(error.to_string().contains("poll interval"));
}

#[test]
fn test_validate_emptyQrPath_shouldFail() {
    let mut config = Config::default();
    config.output.qr_image_path = PathBuf::new();
    assert!(config.validate().is_err());
}

#[test]
fn test_logLevel_shouldDeserializeLowercase() -> Result<()> {
    let level: LogLevel = serde_json::from_str("\"warn\"")?;
    assert_eq!(level, LogLevel::Warn);
    assert_eq!(level.to_level_filter(), log::LevelFilter::Warn);
    Ok(())
}
