//! # Configuration Management Module
//!
//! Centralized configuration for the armory backend: type-safe TOML loading
//! with serde, sensible defaults for every value, and a validation pass that
//! runs before anything opens a socket or a database.
//!
//! ## Configuration Structure
//!
//! - [`ServerConfig`] - HTTP bind address
//! - [`StorageConfig`] - sled data directory
//! - [`GameConfig`] - starting stats, grant amount, sell refund ratio
//! - [`SecurityConfig`] - password rules and session TTL
//! - [`LoggingConfig`] - log level
//!
//! ## Usage
//!
//! ```rust,no_run
//! use armory::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     println!("listening on {}", config.server.bind);
//!     Ok(())
//! }
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::fs;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP listener binds, e.g. "127.0.0.1:3000".
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
        }
    }
}

/// Economy tuning. The defaults are the canonical game rules; deployments
/// rarely touch these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub starting_health: i64,
    pub starting_power: i64,
    pub starting_money: i64,
    /// Amount credited by one currency grant.
    pub currency_grant: i64,
    /// Sell refund as a percentage of catalog price, truncated per unit.
    pub sell_refund_percent: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_health: 500,
            starting_power: 100,
            starting_money: 10000,
            currency_grant: 200,
            sell_refund_percent: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub min_password_length: usize,
    pub session_ttl_minutes: i64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            min_password_length: 6,
            session_ttl_minutes: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;
        config.validate()?;

        Ok(config)
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

    /// Reject configurations that would misbehave at runtime.
    pub fn validate(&self) -> Result<()> {
        self.server
            .bind
            .parse::<SocketAddr>()
            .map_err(|e| anyhow!("Invalid [server].bind address '{}': {}", self.server.bind, e))?;
        if self.storage.data_dir.trim().is_empty() {
            return Err(anyhow!("[storage].data_dir must not be empty"));
        }
        if self.game.sell_refund_percent > 100 {
            return Err(anyhow!(
                "[game].sell_refund_percent must be at most 100, got {}",
                self.game.sell_refund_percent
            ));
        }
        if self.game.starting_money < 0 {
            return Err(anyhow!("[game].starting_money must be non-negative"));
        }
        if self.game.currency_grant < 0 {
            return Err(anyhow!("[game].currency_grant must be non-negative"));
        }
        if self.security.min_password_length == 0 {
            return Err(anyhow!("[security].min_password_length must be at least 1"));
        }
        if self.security.session_ttl_minutes <= 0 {
            return Err(anyhow!("[security].session_ttl_minutes must be positive"));
        }
        Ok(())
    }
}
