//! Configuration Module
//!
//! This module defines all configuration structures for the validation service.
//! Configuration is loaded from TOML files and parsed using serde.

use serde::Deserialize;
use std::fs;

/// Main configuration structure
///
/// Contains all configuration sections for the service.
/// Loaded from a TOML file (e.g., config/default.toml).
///
/// # Example TOML
/// ```toml
/// [api]
/// host = "127.0.0.1"
/// port = 8545
///
/// [ledger]
/// rpc_url = "https://s.altnet.rippletest.net:51234"
/// cache_ttl_secs = 5
///
/// [faucet]
/// url = "https://faucet.altnet.rippletest.net/accounts"
///
/// [database]
/// url = "sqlite://validations.db"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub ledger: LedgerConfig,
    pub faucet: Option<FaucetConfig>,
    pub database: Option<DatabaseConfig>,
}

/// API server configuration
///
/// Controls the JSON-RPC API endpoint settings.
///
/// # Fields
/// - `host`: IP address to bind to (e.g., "127.0.0.1" or "0.0.0.0")
/// - `port`: TCP port to listen on (e.g., 8545)
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

/// XRP Ledger connection configuration
///
/// # Fields
/// - `rpc_url`: JSON-RPC endpoint of a rippled or Clio server
/// - `cache_ttl_secs`: How long fetched account roots are reused (0 disables caching)
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    pub rpc_url: String,
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
}

fn default_cache_ttl() -> u64 {
    5
}

/// Faucet proxy configuration; the `fundAccount` method is disabled without it
#[derive(Debug, Clone, Deserialize)]
pub struct FaucetConfig {
    pub url: String,
}

/// Database configuration
///
/// Settings for the validation log. Validations are not recorded without it.
///
/// # Fields
/// - `url`: Database connection URL (e.g., "sqlite://validations.db")
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the TOML configuration file
    ///
    /// # Returns
    /// * `Ok(Config)` if the file was successfully loaded and parsed
    /// * `Err` if the file couldn't be read or the TOML is invalid
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_sections_may_be_omitted() {
        let config = Config::parse(
            r#"
            [api]
            host = "127.0.0.1"
            port = 8545

            [ledger]
            rpc_url = "http://localhost:5005"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.port, 8545);
        assert_eq!(config.ledger.cache_ttl_secs, 5);
        assert!(config.faucet.is_none());
        assert!(config.database.is_none());
    }

    #[test]
    fn bundled_default_config_parses() {
        let config = Config::parse(include_str!("../config/default.toml")).unwrap();
        assert!(config.faucet.is_some());
        assert!(config.database.is_some());
    }
}
