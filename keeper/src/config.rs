//! Keeper configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Polling interval in seconds
    pub poll_interval_secs: u64,

    /// Consecutive polls the same ark must lead before capital moves
    pub stability_window: usize,

    /// Positions at or below this size are not worth consolidating
    pub dust_threshold: u64,

    /// Buffer liquidity floor maintained by the fleet
    pub minimum_buffer_balance: u64,

    /// Minimum seconds between rebalance batches
    pub rebalance_cooldown_secs: u64,

    /// Seed deposit credited to the treasury account at startup
    pub initial_deposit: u64,

    /// Simulated arks to register
    pub arks: Vec<ArkConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArkConfig {
    pub name: String,

    /// Per-poll yield in parts per million; doubles as the ranking rate
    pub rate: u64,

    /// Absolute position cap (omit for uncapped)
    pub cap: Option<u64>,
}

impl Config {
    /// Load configuration from TOML file
    pub fn load() -> Result<Self> {
        let config_path =
            std::env::var("KEEPER_CONFIG").unwrap_or_else(|_| "keeper-config.toml".to_string());

        let expanded = shellexpand::tilde(&config_path);
        let config_str = std::fs::read_to_string(expanded.as_ref())
            .context(format!("Failed to read config file: {}", config_path))?;

        let config: Config =
            toml::from_str(&config_str).context("Failed to parse config TOML")?;

        Ok(config)
    }

    /// Create default configuration
    pub fn default_local() -> Self {
        Self {
            poll_interval_secs: 10,
            stability_window: 12,
            dust_threshold: 100,
            minimum_buffer_balance: 10_000,
            rebalance_cooldown_secs: 300,
            initial_deposit: 100_000,
            arks: vec![
                ArkConfig {
                    name: "aave-v3".to_string(),
                    rate: 105,
                    cap: None,
                },
                ArkConfig {
                    name: "compound-v3".to_string(),
                    rate: 110,
                    cap: Some(500_000),
                },
                ArkConfig {
                    name: "morpho".to_string(),
                    rate: 95,
                    cap: Some(250_000),
                },
            ],
        }
    }

    /// Write default config to file
    pub fn write_default(path: &str) -> Result<()> {
        let config = Self::default_local();
        let toml_str = toml::to_string_pretty(&config).context("Failed to serialize config")?;

        std::fs::write(path, toml_str)
            .context(format!("Failed to write config to {}", path))?;

        log::info!("Created default config at {}", path);
        Ok(())
    }
}
