//! Configuration module for trovewatch-replay.
//!
//! Handles loading the replay file and applying CLI overrides.

pub mod file;

use crate::config::file::{FileConfig, ScriptStep, WatchEntry};
use rust_decimal::Decimal;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use trovewatch_core::config::ObserverConfig;
use trovewatch_sdk::objects::{Address, ContractAddresses};

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Loaded configuration result containing all parts.
#[derive(Debug)]
pub struct LoadedConfig {
    pub observer: ObserverConfig,
    pub contracts: ContractAddresses,
    pub user_address: Option<Address>,
    pub initial_price: Decimal,
    pub settle: Duration,
    pub watches: Vec<WatchEntry>,
    pub script: Vec<ScriptStep>,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: std::path::PathBuf,
    debounce_override: Option<u64>,
    settle_override: Option<u64>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(
        config_path: impl AsRef<Path>,
        debounce_override: Option<u64>,
        settle_override: Option<u64>,
    ) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            debounce_override,
            settle_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply CLI overrides
    /// 3. Validate the configuration
    /// 4. Build the loaded configuration
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        self.load_str(&config_content)
    }

    fn load_str(&self, config_content: &str) -> Result<LoadedConfig, ConfigError> {
        let mut file_config: FileConfig = toml::from_str(config_content)?;

        if let Some(debounce_ms) = self.debounce_override {
            file_config.observer.debounce_ms = debounce_ms;
        }
        if let Some(settle_ms) = self.settle_override {
            file_config.ledger.settle_ms = settle_ms;
        }

        validate(&file_config)?;

        Ok(LoadedConfig {
            observer: ObserverConfig::new(Duration::from_millis(file_config.observer.debounce_ms)),
            contracts: file_config.contracts,
            user_address: file_config.account.address,
            initial_price: file_config.ledger.initial_price,
            settle: Duration::from_millis(file_config.ledger.settle_ms),
            watches: file_config.watches,
            script: file_config.script,
        })
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    if config.watches.is_empty() {
        return Err(ConfigError::ValidationError(
            "at least one [[watches]] entry is required".to_string(),
        ));
    }

    if config.observer.debounce_ms == 0 {
        return Err(ConfigError::ValidationError(
            "observer.debounce_ms must be positive".to_string(),
        ));
    }

    // Account-scoped watches need an address from somewhere
    for (index, watch) in config.watches.iter().enumerate() {
        if watch.kind.is_account_scoped()
            && watch.address.is_none()
            && config.account.address.is_none()
        {
            return Err(ConfigError::ValidationError(format!(
                "watch #{index} ({:?}) needs an address and [account] has none",
                watch.kind
            )));
        }
    }

    // Snapshots are appended per block, so blocks must not go backwards
    let mut last_block = 0;
    for (index, step) in config.script.iter().enumerate() {
        if let Some(block) = step.block {
            if block < last_block {
                return Err(ConfigError::ValidationError(format!(
                    "script step #{index} goes back to block {block} after block {last_block}"
                )));
            }
            last_block = block;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTRACTS: &str = r#"
[contracts]
active_pool = "0x01"
default_pool = "0x02"
stability_pool = "0x03"
trove_manager = "0x04"
lusd_token = "0x05"
"#;

    #[test]
    fn test_overrides_are_applied() {
        let content = format!("{CONTRACTS}\n[[watches]]\nkind = \"total\"\n");
        let loaded = ConfigLoader::new("unused.toml", Some(120), Some(10))
            .load_str(&content)
            .unwrap();
        assert_eq!(loaded.observer.debounce_window, Duration::from_millis(120));
        assert_eq!(loaded.settle, Duration::from_millis(10));
        assert_eq!(loaded.user_address, None);
    }

    #[test]
    fn test_account_watch_without_address_is_rejected() {
        let content = format!("{CONTRACTS}\n[[watches]]\nkind = \"stability_deposit\"\n");
        let err = ConfigLoader::new("unused.toml", None, None)
            .load_str(&content)
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_script_blocks_must_not_decrease() {
        let content = format!(
            "{CONTRACTS}\n[[watches]]\nkind = \"number_of_troves\"\n\
             [[script]]\nblock = 5\nevent = \"trove_created\"\nborrower = \"0xa1\"\n\
             [[script]]\nblock = 4\nevent = \"trove_created\"\nborrower = \"0xa2\"\n"
        );
        let err = ConfigLoader::new("unused.toml", None, None)
            .load_str(&content)
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ConfigLoader::new("/nonexistent/trovewatch.toml", None, None)
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
