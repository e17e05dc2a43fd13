//! Configuration management for the skinflip server
//!
//! TOML file loading with environment variable overrides and validation.

use crate::errors::ConfigError;
use crate::ledger::SKIN_CATALOG;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkinflipConfig {
    pub server: ServerConfig,
    pub game: GameConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub listen_address: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Delay between join and resolution, in milliseconds.
    pub flip_delay_ms: u64,
    /// Balance granted at registration.
    pub starting_balance: u64,
    /// Number of catalog skins granted at registration.
    pub starter_skins: usize,
}

impl Default for SkinflipConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            game: GameConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: "0.0.0.0".to_string(),
            port: 3000,
            cors_origins: vec!["*".to_string()],
            request_timeout_secs: 30,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            flip_delay_ms: 5000,
            starting_balance: 1000,
            starter_skins: 3,
        }
    }
}

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> Result<SkinflipConfig, ConfigError> {
        let mut config = if let Some(ref path) = self.config_path {
            self.load_from_file(path)?
        } else {
            SkinflipConfig::default()
        };

        self.apply_env_overrides(&mut config)?;
        self.validate(&config)?;
        Ok(config)
    }

    fn load_from_file(&self, path: &str) -> Result<SkinflipConfig, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed(format!("Failed to read {}: {}", path, e)))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::LoadFailed(format!("Failed to parse TOML: {}", e)))
    }

    fn apply_env_overrides(&self, config: &mut SkinflipConfig) -> Result<(), ConfigError> {
        if let Ok(addr) = env::var("SKINFLIP_LISTEN_ADDRESS") {
            config.server.listen_address = addr;
        }
        if let Ok(port) = env::var("SKINFLIP_PORT") {
            config.server.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                field: "SKINFLIP_PORT".to_string(),
                value: port,
                reason: "Invalid port number".to_string(),
            })?;
        }
        if let Ok(delay) = env::var("SKINFLIP_FLIP_DELAY_MS") {
            config.game.flip_delay_ms = delay.parse().map_err(|_| ConfigError::InvalidValue {
                field: "SKINFLIP_FLIP_DELAY_MS".to_string(),
                value: delay,
                reason: "Invalid delay value".to_string(),
            })?;
        }
        if let Ok(balance) = env::var("SKINFLIP_STARTING_BALANCE") {
            config.game.starting_balance =
                balance.parse().map_err(|_| ConfigError::InvalidValue {
                    field: "SKINFLIP_STARTING_BALANCE".to_string(),
                    value: balance,
                    reason: "Invalid balance value".to_string(),
                })?;
        }
        if let Ok(count) = env::var("SKINFLIP_STARTER_SKINS") {
            config.game.starter_skins = count.parse().map_err(|_| ConfigError::InvalidValue {
                field: "SKINFLIP_STARTER_SKINS".to_string(),
                value: count,
                reason: "Invalid skin count".to_string(),
            })?;
        }
        Ok(())
    }

    fn validate(&self, config: &SkinflipConfig) -> Result<(), ConfigError> {
        if config.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                value: "0".to_string(),
                reason: "Port cannot be zero".to_string(),
            });
        }
        if config.server.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.request_timeout_secs".to_string(),
                value: "0".to_string(),
                reason: "Timeout cannot be zero".to_string(),
            });
        }
        if config.game.flip_delay_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "game.flip_delay_ms".to_string(),
                value: "0".to_string(),
                reason: "Flip delay cannot be zero".to_string(),
            });
        }
        if config.game.starter_skins > SKIN_CATALOG.len() {
            return Err(ConfigError::InvalidValue {
                field: "game.starter_skins".to_string(),
                value: config.game.starter_skins.to_string(),
                reason: format!("Catalog only has {} skins", SKIN_CATALOG.len()),
            });
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, config: &SkinflipConfig, path: &str) -> Result<(), ConfigError> {
        let toml_string = toml::to_string_pretty(config)
            .map_err(|e| ConfigError::SaveFailed(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, toml_string)
            .map_err(|e| ConfigError::SaveFailed(format!("Failed to write to {}: {}", path, e)))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = SkinflipConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.game.flip_delay_ms, 5000);
        assert_eq!(config.game.starting_balance, 1000);
        assert_eq!(config.game.starter_skins, 3);
    }

    #[test]
    fn test_config_validation() {
        let loader = ConfigLoader::new();
        let mut config = SkinflipConfig::default();
        assert!(loader.validate(&config).is_ok());

        config.server.port = 0;
        assert!(loader.validate(&config).is_err());

        config.server.port = 3000;
        config.game.starter_skins = 100;
        assert!(loader.validate(&config).is_err());
    }

    #[test]
    fn test_starter_skins_env_override() {
        env::set_var("SKINFLIP_STARTER_SKINS", "1");
        let loaded = ConfigLoader::new().load();
        env::remove_var("SKINFLIP_STARTER_SKINS");
        assert_eq!(loaded.unwrap().game.starter_skins, 1);

        env::set_var("SKINFLIP_STARTER_SKINS", "not a number");
        let result = ConfigLoader::new().load();
        env::remove_var("SKINFLIP_STARTER_SKINS");
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();

        let mut original = SkinflipConfig::default();
        original.game.flip_delay_ms = 250;

        let loader = ConfigLoader::new();
        loader.save(&original, path).unwrap();

        let loaded = ConfigLoader::new().with_path(path).load().unwrap();
        assert_eq!(loaded.game.flip_delay_ms, 250);
        assert_eq!(loaded.server.port, original.server.port);
    }
}
