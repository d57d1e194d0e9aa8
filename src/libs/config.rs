//! Configuration management for toolshed.
//!
//! Settings live in `config.json` inside the platform data directory (see
//! [`DataStorage`]). Every section is optional; a missing file or a missing
//! section means "use the defaults", so the application runs without any setup.
//!
//! ## Sections
//!
//! - **storage**: database file name and the quota shown in statistics
//! - **refresh**: periodic statistics refresh interval and post-change debounce
//! - **export**: default contents and compression of export files
//!
//! ```rust,no_run
//! use toolshed::libs::config::Config;
//!
//! let config = Config::read()?;
//! let refresh = config.refresh.clone().unwrap_or_default();
//! println!("refreshing every {}s", refresh.interval_secs);
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::data_storage::DataStorage;
use crate::libs::messages::Message;
use crate::libs::stats::STORAGE_QUOTA_BYTES;
use crate::msg_print;
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, MultiSelect};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};

pub const CONFIG_FILE_NAME: &str = "config.json";

/// Default SQLite file name inside the data directory.
pub const DB_FILE_NAME: &str = "toolshed.db";

const MIB: u64 = 1024 * 1024;

/// Shortest accepted refresh period, in seconds.
pub const MIN_REFRESH_INTERVAL_SECS: u64 = 1;

/// A section offered by the interactive setup wizard.
#[derive(Debug, Clone)]
pub struct ConfigModule {
    pub key: String,
    pub name: String,
}

/// Where data is kept and how much room the statistics view assumes.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StorageConfig {
    /// SQLite file name, resolved inside the data directory.
    pub db_file_name: String,

    /// Quota ceiling used only to display `used / quota`. Exceeding it is not an error.
    pub quota_bytes: u64,
}

/// Timing of the background statistics refresh.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RefreshConfig {
    /// Period of the automatic refresh, in seconds. Values below
    /// [`MIN_REFRESH_INTERVAL_SECS`] are raised to it.
    pub interval_secs: u64,

    /// Quiet time after the last mutation before a refresh fires, in milliseconds.
    pub debounce_millis: u64,
}

/// Defaults applied by the `export` command when no flag overrides them.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ExportConfig {
    pub include_history: bool,
    pub include_preferences: bool,
    pub compress: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh: Option<RefreshConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<ExportConfig>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            db_file_name: DB_FILE_NAME.to_string(),
            quota_bytes: STORAGE_QUOTA_BYTES,
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        RefreshConfig {
            interval_secs: 120,
            debounce_millis: 1000,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            include_history: true,
            include_preferences: true,
            compress: false,
        }
    }
}

impl Config {
    /// Loads the configuration file, or the defaults when it does not exist yet.
    pub fn read() -> Result<Config> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;

        if !config_file_path.exists() {
            return Ok(Config::default());
        }

        let config_str = fs::read_to_string(config_file_path)?;
        let config: Config = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;

        let config_file = File::create(config_file_path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    /// Removes the configuration file. Missing files are not an error.
    pub fn delete() -> Result<()> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        if config_file_path.exists() {
            fs::remove_file(config_file_path)?;
        }
        Ok(())
    }

    pub fn storage_or_default(&self) -> StorageConfig {
        self.storage.clone().unwrap_or_default()
    }

    pub fn refresh_or_default(&self) -> RefreshConfig {
        self.refresh.clone().unwrap_or_default()
    }

    pub fn export_or_default(&self) -> ExportConfig {
        self.export.clone().unwrap_or_default()
    }

    /// Interactive setup wizard. Existing values are offered as defaults.
    pub fn init() -> Result<Self> {
        let mut config = Self::read().unwrap_or_default();

        let modules = vec![
            ConfigModule {
                key: "storage".to_string(),
                name: Message::ConfigModuleStorage.to_string(),
            },
            ConfigModule {
                key: "refresh".to_string(),
                name: Message::ConfigModuleRefresh.to_string(),
            },
            ConfigModule {
                key: "export".to_string(),
                name: Message::ConfigModuleExport.to_string(),
            },
        ];

        let selected = MultiSelect::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptSelectModules.to_string())
            .items(&modules.iter().map(|module| &module.name).collect::<Vec<_>>())
            .interact()?;

        for &selection in &selected {
            match modules[selection].key.as_str() {
                "storage" => {
                    let default = config.storage_or_default();
                    msg_print!(Message::ConfigModuleStorage);
                    let quota_mib: u64 = Input::with_theme(&ColorfulTheme::default())
                        .with_prompt(Message::PromptQuotaMegabytes.to_string())
                        .default(default.quota_bytes / MIB)
                        .interact_text()?;
                    config.storage = Some(StorageConfig {
                        db_file_name: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptDbFileName.to_string())
                            .default(default.db_file_name)
                            .interact_text()?,
                        quota_bytes: quota_mib.max(1) * MIB,
                    });
                }
                "refresh" => {
                    let default = config.refresh_or_default();
                    msg_print!(Message::ConfigModuleRefresh);
                    let interval_secs: u64 = Input::with_theme(&ColorfulTheme::default())
                        .with_prompt(Message::PromptRefreshInterval.to_string())
                        .default(default.interval_secs)
                        .interact_text()?;
                    config.refresh = Some(RefreshConfig {
                        interval_secs: interval_secs.max(MIN_REFRESH_INTERVAL_SECS),
                        debounce_millis: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptDebounceMillis.to_string())
                            .default(default.debounce_millis)
                            .interact_text()?,
                    });
                }
                "export" => {
                    let default = config.export_or_default();
                    msg_print!(Message::ConfigModuleExport);
                    config.export = Some(ExportConfig {
                        include_history: Confirm::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptIncludeHistory.to_string())
                            .default(default.include_history)
                            .interact()?,
                        include_preferences: Confirm::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptIncludePreferences.to_string())
                            .default(default.include_preferences)
                            .interact()?,
                        compress: Confirm::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptCompressExports.to_string())
                            .default(default.compress)
                            .interact()?,
                    });
                }
                _ => {}
            }
        }

        Ok(config)
    }
}
