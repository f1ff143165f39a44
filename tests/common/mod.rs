/*!
 * Common test utilities for the wabulk test suite
 */

use anyhow::Result;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use wabulk::app_config::Config;
use wabulk::providers::Contact;

/// A one pixel PNG wrapped in a data URL, the way the backend serves QR codes
pub const QR_DATA_URL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

/// Installs a test logger once; later calls are no-ops
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates a small contact CSV file
pub fn create_test_contacts(dir: &Path, filename: &str) -> Result<PathBuf> {
    let content = "name,phone\nAda,+441234567890\nLinus,+358401234567\nGrace,+15551234567\n";
    create_test_file(dir, filename, content)
}

/// Configuration that keeps every file it writes inside `dir`
pub fn test_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.session.identity_file = Some(dir.join("identity").join("user_id"));
    config.output.qr_image_path = dir.join("qr.png");
    config
}

/// Contacts as the backend returns them after a CSV import
pub fn sample_contacts() -> Vec<Contact> {
    vec![
        json!({"name": "Ada", "phone": "+441234567890"}),
        json!({"name": "Linus", "phone": "+358401234567"}),
        json!({"name": "Grace", "phone": "+15551234567"}),
    ]
}
