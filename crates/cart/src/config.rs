//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `CART_STORAGE_KEY` - Key the cart snapshot is stored under (default: `@GoMarketplace:products`)
//! - `CART_STORAGE_DIR` - Directory for file-backed storage (default: in-memory storage)

use std::path::PathBuf;

use thiserror::Error;

/// Storage key used when `CART_STORAGE_KEY` is not set.
pub const DEFAULT_STORAGE_KEY: &str = "@GoMarketplace:products";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    /// Key the serialized cart lives under in the key-value store
    pub storage_key: String,
    /// Directory for [`FileStore`](crate::FileStore); `None` keeps the cart in memory
    pub storage_dir: Option<PathBuf>,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            storage_dir: None,
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let storage_key = match lookup("CART_STORAGE_KEY") {
            Some(key) => validate_storage_key(key)?,
            None => DEFAULT_STORAGE_KEY.to_string(),
        };

        let storage_dir = lookup("CART_STORAGE_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            storage_key,
            storage_dir,
        })
    }

    /// Use a different storage key.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` for an empty or blank key, the
    /// same as `CART_STORAGE_KEY` would.
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Result<Self, ConfigError> {
        self.storage_key = validate_storage_key(key.into())?;
        Ok(self)
    }

    /// Persist the cart to files under `dir`.
    #[must_use]
    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = Some(dir.into());
        self
    }
}

/// Reject storage keys that would collide on an empty slot.
fn validate_storage_key(key: String) -> Result<String, ConfigError> {
    if key.trim().is_empty() {
        return Err(ConfigError::InvalidEnvVar(
            "CART_STORAGE_KEY".to_string(),
            "must not be empty".to_string(),
        ));
    }
    Ok(key)
}
