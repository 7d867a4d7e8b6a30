//! # Configuration Management Module
//!
//! Typed, TOML-backed configuration for the economy ledger and the sign shop
//! builder.
//!
//! ## Configuration Structure
//!
//! - [`EconomyConfig`] - money switch, starting balance, currency symbol
//! - [`StorageConfig`] - where the ledger lives
//! - [`ShopsConfig`] - sign types, item namespace, idle session timeout
//! - [`LoggingConfig`] - log level and optional log files
//!
//! ## Usage
//!
//! ```rust,no_run
//! use shopkeep::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Config::create_default("config.toml").await?;
//!     let config = Config::load("config.toml").await?;
//!     println!("Starting balance: {}", config.economy.starting_balance);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [economy]
//! enabled = true
//! starting_balance = 0
//! currency_symbol = "$"
//!
//! [storage]
//! data_dir = "./data"
//!
//! [shops]
//! enabled = true
//! disabled_signs = ["HEAL"]
//! default_namespace = "minecraft"
//! session_ttl_secs = 300
//!
//! [logging]
//! level = "info"
//! file = "shopkeep.log"
//! ```
//!
//! Every section is optional; missing sections and fields take their defaults.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::shop::SignType;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub economy: EconomyConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub shops: ShopsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconomyConfig {
    /// Master switch for every money command.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Balance given to new accounts and restored by `money reset`.
    #[serde(default)]
    pub starting_balance: i64,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            starting_balance: 0,
            currency_symbol: default_currency_symbol(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Optional override for the ledger's sled path; defaults to `<data_dir>/ledger`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger_path: Option<String>,
}

impl StorageConfig {
    pub fn ledger_path(&self) -> PathBuf {
        match &self.ledger_path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(&self.data_dir).join("ledger"),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            ledger_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Sign types that stay plain signs even when tagged.
    #[serde(default)]
    pub disabled_signs: Vec<SignType>,
    /// Namespace prepended to item names written without one.
    #[serde(default = "default_namespace")]
    pub default_namespace: String,
    /// Seconds an uncommitted sign session may live; 0 keeps them until committed.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u32,
}

impl ShopsConfig {
    pub fn is_enabled(&self, sign: SignType) -> bool {
        self.enabled && !self.disabled_signs.contains(&sign)
    }
}

impl Default for ShopsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            disabled_signs: Vec::new(),
            default_namespace: default_namespace(),
            session_ttl_secs: default_session_ttl(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<String>,
    /// Ledger audit lines (log target `audit`) are also appended here.
    #[serde(default)]
    pub audit_file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: Some("shopkeep.log".to_string()),
            audit_file: Some("shopkeep-audit.log".to_string()),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_data_dir() -> String {
    "./data".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

fn default_namespace() -> String {
    "minecraft".to_string()
}

fn default_session_ttl() -> u32 {
    300
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        Self::from_toml(&content).map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert!(config.economy.enabled);
        assert_eq!(config.economy.currency_symbol, "$");
        assert_eq!(config.shops.default_namespace, "minecraft");
        assert_eq!(config.shops.session_ttl_secs, 300);
        assert_eq!(config.storage.ledger_path(), PathBuf::from("./data").join("ledger"));
    }

    #[test]
    fn test_disabled_signs_parse() {
        let config = Config::from_toml(
            r#"
            [shops]
            disabled_signs = ["HEAL", "FREE"]

            [economy]
            starting_balance = 250
            "#,
        )
        .unwrap();
        assert!(config.shops.is_enabled(SignType::Buy));
        assert!(!config.shops.is_enabled(SignType::Heal));
        assert!(!config.shops.is_enabled(SignType::Free));
        assert_eq!(config.economy.starting_balance, 250);
    }

    #[test]
    fn test_shops_master_switch() {
        let shops = ShopsConfig {
            enabled: false,
            ..ShopsConfig::default()
        };
        for sign in SignType::ALL {
            assert!(!shops.is_enabled(sign));
        }
    }

    #[test]
    fn test_unknown_sign_tag_is_a_parse_error() {
        assert!(Config::from_toml("[shops]\ndisabled_signs = [\"RENT\"]").is_err());
    }

    #[test]
    fn test_default_round_trips_through_toml() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let parsed = Config::from_toml(&text).unwrap();
        assert_eq!(parsed.logging.level, "info");
        assert_eq!(parsed.storage.data_dir, "./data");
        assert!(parsed.storage.ledger_path.is_none());
    }

    #[test]
    fn test_partial_logging_section() {
        let config = Config::from_toml("[logging]\nfile = \"ledger.log\"").unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file.as_deref(), Some("ledger.log"));
        assert!(config.logging.audit_file.is_none());

        let config = Config::from_toml("[storage]\nledger_path = \"/srv/ledger\"").unwrap();
        assert_eq!(config.storage.data_dir, "./data");
    }

    #[tokio::test]
    async fn test_create_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let path = path.to_str().unwrap();
        Config::create_default(path).await.unwrap();
        let config = Config::load(path).await.unwrap();
        assert_eq!(config.economy.starting_balance, 0);
        assert!(Config::load("/nonexistent/config.toml").await.is_err());
    }
}
