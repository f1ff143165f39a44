/*!
 * Tests for the persisted session identity
 */

use anyhow::Result;
use std::fs;
use wabulk::app_config::SessionConfig;
use wabulk::identity::IdentityStore;
use crate::common;

#[test]
fn test_load_missingFile_shouldReturnNone() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let store = IdentityStore::new(temp_dir.path().join("user_id"));

    assert_eq!(store.load()?, None);
    Ok(())
}

#[test]
fn test_loadOrCreate_shouldPersistAndReuseIdentity() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let store = IdentityStore::new(temp_dir.path().join("nested").join("dir").join("user_id"));

    let first = store.load_or_create()?;
    assert!(first.starts_with("user_"));
    assert!(store.path().exists());

    let second = IdentityStore::new(store.path()).load_or_create()?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_load_shouldTrimWhitespace() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "user_id", "  user_1700000000000 \n")?;

    assert_eq!(IdentityStore::new(path).load()?, Some("user_1700000000000".to_string()));
    Ok(())
}

#[test]
fn test_loadOrCreate_blankFile_shouldGenerateNewIdentity() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "user_id", "\n\n")?;
    let store = IdentityStore::new(&path);

    let identity = store.load_or_create()?;

    assert!(identity.starts_with("user_"));
    assert_eq!(fs::read_to_string(&path)?.trim(), identity);
    Ok(())
}

#[test]
fn test_fromConfig_shouldPreferConfiguredFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = SessionConfig {
        identity_file: Some(temp_dir.path().join("id")),
        ..SessionConfig::default()
    };

    let store = IdentityStore::from_config(&config)?;
    assert_eq!(store.path(), temp_dir.path().join("id"));
    Ok(())
}

#[test]
fn test_defaultPath_shouldEndWithAppDirectory() -> Result<()> {
    let path = IdentityStore::default_path()?;
    assert!(path.ends_with("wabulk/user_id"));
    Ok(())
}
