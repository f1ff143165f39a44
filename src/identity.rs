/*!
 * Persisted session identity.
 *
 * The backend keys sessions by a user identity. Keeping the identity on disk
 * lets a restarted process resume polling the same backend session instead
 * of asking for a new QR scan.
 */

use anyhow::{Context, Result};
use chrono::Utc;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_config::SessionConfig;

const DEFAULT_IDENTITY_DIRNAME: &str = "wabulk";
const DEFAULT_IDENTITY_FILENAME: &str = "user_id";

/// File-backed store for the session identity
#[derive(Debug, Clone)]
pub struct IdentityStore {
    path: PathBuf,
}

impl IdentityStore {
    /// Create a store backed by `path`
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Create a store from the session configuration
    pub fn from_config(config: &SessionConfig) -> Result<Self> {
        match &config.identity_file {
            Some(path) => Ok(Self::new(path.clone())),
            None => Ok(Self::new(Self::default_path()?)),
        }
    }

    /// Get the default identity file path
    pub fn default_path() -> Result<PathBuf> {
        let base_dir = dirs::data_local_dir()
            .or_else(dirs::data_dir)
            .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;

        Ok(base_dir.join(DEFAULT_IDENTITY_DIRNAME).join(DEFAULT_IDENTITY_FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Generate a fresh identity from the current time
    pub fn generate() -> String {
        format!("user_{}", Utc::now().timestamp_millis())
    }

    /// Read the stored identity, if any
    pub fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read identity file: {}", self.path.display()))?;
        let identity = content.trim();

        Ok((!identity.is_empty()).then(|| identity.to_string()))
    }

    /// Persist `identity`, creating parent directories as needed
    pub fn save(&self, identity: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
        }

        fs::write(&self.path, format!("{}\n", identity))
            .with_context(|| format!("Failed to write identity file: {}", self.path.display()))
    }

    /// Return the stored identity, generating and saving one on first use
    pub fn load_or_create(&self) -> Result<String> {
        if let Some(identity) = self.load()? {
            debug!("Using stored identity {}", identity);
            return Ok(identity);
        }

        let identity = Self::generate();
        self.save(&identity)?;
        info!("Created new session identity {}", identity);
        Ok(identity)
    }
}
