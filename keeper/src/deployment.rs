//! Instantiate the ledger described by a keeper config

use std::sync::Arc;

use allocator_common::{Address, AllocationEntry, AllocatorError, Directory, Vault};
use allocator_portfolio::{Engine, EngineConfig};
use allocator_valuation::PriceTable;
use thiserror::Error;

use crate::config::{Config, DeploymentConfig};

#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error("token {0} is listed more than once")]
    DuplicateToken(Address),

    #[error("{entity} references unpriced token {token}")]
    UnpricedToken { entity: Address, token: Address },

    #[error("{step} failed for {entity}: {source}")]
    Ledger {
        step: &'static str,
        entity: Address,
        #[source]
        source: AllocatorError,
    },
}

/// Attach step and entity context to a ledger error
trait LedgerStep<T> {
    fn step(self, step: &'static str, entity: Address) -> Result<T, DeploymentError>;
}

impl<T> LedgerStep<T> for Result<T, AllocatorError> {
    fn step(self, step: &'static str, entity: Address) -> Result<T, DeploymentError> {
        self.map_err(|source| DeploymentError::Ledger { step, entity, source })
    }
}

/// A running ledger plus the price table feeding it
pub struct Deployment {
    pub engine: Engine,
    pub prices: Arc<PriceTable>,
}

fn validate(deployment: &DeploymentConfig) -> Result<(), DeploymentError> {
    let mut seen = std::collections::BTreeSet::new();
    for token in &deployment.tokens {
        if !seen.insert(token.address) {
            return Err(DeploymentError::DuplicateToken(token.address));
        }
    }
    for strategy in &deployment.strategies {
        for entry in strategy.allocation.iter().filter(|e| e.deposit) {
            if !seen.contains(&entry.key) {
                return Err(DeploymentError::UnpricedToken {
                    entity: strategy.id,
                    token: entry.key,
                });
            }
        }
    }
    Ok(())
}

/// Register, create, configure and open every entity in `config`
pub fn build(config: &Config) -> Result<Deployment, DeploymentError> {
    let deployment = &config.deployment;
    validate(deployment)?;

    let prices = Arc::new(PriceTable::new());
    for token in &deployment.tokens {
        prices
            .set_price(token.address, token.decimals, token.price())
            .step("price registration", token.address)?;
    }

    let mut directory = Directory::new(deployment.governance, deployment.fee_treasury);
    for strategy in &deployment.strategies {
        directory.register_strategy(strategy.id, deployment.governance);
    }
    for portfolio in &deployment.portfolios {
        directory.register_portfolio(portfolio.id, deployment.governance);
    }

    let mut engine = Engine::new(
        Arc::new(directory),
        EngineConfig {
            tolerance: config.tolerance as u128,
        },
    );

    for strategy in &deployment.strategies {
        let id = strategy.id;
        engine
            .create_strategy(id, strategy.owner, Box::new(Vault::new()), prices.clone())
            .step("create strategy", id)?;

        let entries: Vec<AllocationEntry> = strategy.allocation.iter().map(|e| e.to_entry()).collect();
        engine
            .strategy_configure(&strategy.owner, &id, &entries)
            .step("configure strategy", id)?;

        if strategy.deposit_open {
            engine
                .strategy_toggle_deposit(&strategy.owner, &id)
                .step("open strategy deposits", id)?;
        }
        if strategy.withdraw_open {
            engine
                .strategy_toggle_withdraw(&strategy.owner, &id)
                .step("open strategy withdrawals", id)?;
        }
    }

    for portfolio in &deployment.portfolios {
        let id = portfolio.id;
        let manager = portfolio.manager;
        engine
            .create_portfolio(id, manager, Box::new(Vault::new()), prices.clone())
            .step("create portfolio", id)?;

        let entries: Vec<AllocationEntry> = portfolio.strategies.iter().map(|e| e.to_entry()).collect();
        engine
            .portfolio_configure(&manager, &id, &entries)
            .step("configure portfolio", id)?;
        engine
            .fee_rate_manager_update(&manager, &id, portfolio.fee_rate_manager())
            .step("set manager fee", id)?;
        engine
            .fee_rate_governance_update(&manager, &id, portfolio.fee_rate_governance())
            .step("set governance fee", id)?;
        engine
            .withdraw_full_mode_update(&manager, &id, portfolio.withdraw_full_mode)
            .step("set withdraw mode", id)?;

        if portfolio.deposit_open {
            engine
                .portfolio_toggle_deposit(&manager, &id)
                .step("open portfolio deposits", id)?;
        }
        if portfolio.withdraw_open {
            engine
                .portfolio_toggle_withdraw(&manager, &id)
                .step("open portfolio withdrawals", id)?;
        }
    }

    log::info!(
        "Deployed {} strategies and {} portfolios over {} tokens",
        deployment.strategies.len(),
        deployment.portfolios.len(),
        deployment.tokens.len()
    );

    Ok(Deployment { engine, prices })
}
