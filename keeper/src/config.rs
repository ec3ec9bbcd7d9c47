//! Keeper configuration

use anyhow::{Context, Result};
use allocator_common::{Address, AllocationEntry, FixedPoint, DEFAULT_TOLERANCE, ONE};
use serde::{Deserialize, Serialize};

/// One basis point in fixed point
const BPS: FixedPoint = ONE / 10_000;

/// Price scale used in config files (millionths of a value unit)
const PRICE_E6: FixedPoint = ONE / 1_000_000;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Polling interval in seconds
    pub poll_interval_secs: u64,

    /// Maximum portfolio syncs per round
    pub max_syncs_per_round: usize,

    /// Stop after this many rounds (0 = run forever)
    pub max_rounds: u64,

    /// Rounding tolerance handed to the engine
    pub tolerance: u64,

    /// Ledger entities to instantiate
    pub deployment: DeploymentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentConfig {
    pub governance: Address,
    pub fee_treasury: Address,
    pub tokens: Vec<TokenConfig>,
    pub strategies: Vec<StrategyConfig>,
    pub portfolios: Vec<PortfolioConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    pub address: Address,
    pub decimals: u8,
    /// Price of one whole token in millionths of a value unit
    pub price_e6: u64,
}

impl TokenConfig {
    pub fn price(&self) -> FixedPoint {
        self.price_e6 as FixedPoint * PRICE_E6
    }
}

/// Allocation entry with the percentage in basis points
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationConfig {
    pub key: Address,
    pub bps: u32,
    #[serde(default = "default_true")]
    pub deposit: bool,
    #[serde(default = "default_true")]
    pub withdraw: bool,
}

impl AllocationConfig {
    pub fn new(key: Address, bps: u32) -> Self {
        Self {
            key,
            bps,
            deposit: true,
            withdraw: true,
        }
    }

    pub fn to_entry(&self) -> AllocationEntry {
        AllocationEntry {
            key: self.key,
            deposit_eligible: self.deposit,
            withdraw_eligible: self.withdraw,
            percentage: self.bps as FixedPoint * BPS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub id: Address,
    pub owner: Address,
    pub allocation: Vec<AllocationConfig>,
    #[serde(default = "default_true")]
    pub deposit_open: bool,
    #[serde(default = "default_true")]
    pub withdraw_open: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioConfig {
    pub id: Address,
    pub manager: Address,
    pub strategies: Vec<AllocationConfig>,
    #[serde(default)]
    pub fee_manager_bps: u32,
    #[serde(default)]
    pub fee_governance_bps: u32,
    #[serde(default)]
    pub withdraw_full_mode: bool,
    #[serde(default = "default_true")]
    pub deposit_open: bool,
    #[serde(default = "default_true")]
    pub withdraw_open: bool,
}

impl PortfolioConfig {
    pub fn fee_rate_manager(&self) -> FixedPoint {
        self.fee_manager_bps as FixedPoint * BPS
    }

    pub fn fee_rate_governance(&self) -> FixedPoint {
        self.fee_governance_bps as FixedPoint * BPS
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("ALLOCATOR_KEEPER_CONFIG")
            .unwrap_or_else(|_| "keeper-config.toml".to_string());
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &str) -> Result<Self> {
        let expanded = shellexpand::tilde(path);
        let config_str = std::fs::read_to_string(expanded.as_ref())
            .context(format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&config_str)
            .context("Failed to parse config TOML")?;

        Ok(config)
    }

    /// Two 50/50 strategies over a stable and a volatile token, one portfolio over both
    pub fn default_local() -> Self {
        let stable = Address::new([0x01; 32]);
        let volatile = Address::new([0x02; 32]);
        let owner = Address::new([0xa0; 32]);
        let strategy_1 = Address::new([0xc1; 32]);
        let strategy_2 = Address::new([0xc2; 32]);

        let strategy = |id| StrategyConfig {
            id,
            owner,
            allocation: vec![
                AllocationConfig::new(stable, 5_000),
                AllocationConfig::new(volatile, 5_000),
            ],
            deposit_open: true,
            withdraw_open: true,
        };

        Self {
            poll_interval_secs: 5,
            max_syncs_per_round: 16,
            max_rounds: 0,
            tolerance: DEFAULT_TOLERANCE as u64,
            deployment: DeploymentConfig {
                governance: Address::new([0xf0; 32]),
                fee_treasury: Address::new([0xf1; 32]),
                tokens: vec![
                    TokenConfig {
                        address: stable,
                        decimals: 6,
                        price_e6: 1_000_000,
                    },
                    TokenConfig {
                        address: volatile,
                        decimals: 18,
                        price_e6: 2_000_000_000,
                    },
                ],
                strategies: vec![strategy(strategy_1), strategy(strategy_2)],
                portfolios: vec![PortfolioConfig {
                    id: Address::new([0xb0; 32]),
                    manager: Address::new([0xa1; 32]),
                    strategies: vec![
                        AllocationConfig::new(strategy_1, 5_000),
                        AllocationConfig::new(strategy_2, 5_000),
                    ],
                    fee_manager_bps: 100,
                    fee_governance_bps: 50,
                    withdraw_full_mode: false,
                    deposit_open: true,
                    withdraw_open: true,
                }],
            },
        }
    }

    /// Write default config to file
    pub fn write_default(path: &str) -> Result<()> {
        let config = Self::default_local();
        let toml_str = toml::to_string_pretty(&config)
            .context("Failed to serialize config")?;

        let expanded = shellexpand::tilde(path);
        std::fs::write(expanded.as_ref(), toml_str)
            .context(format!("Failed to write config to {}", path))?;

        log::info!("Created default config at {}", path);
        Ok(())
    }
}
