//! Transactional engine owning every strategy and portfolio
//!
//! Each caller-facing operation runs against a draft copy of the entities
//! it may touch. The draft replaces the live state only if the handler
//! succeeds and the post-operation invariant checks pass, so a failed call
//! leaves no trace. Calls are serialized by `&mut self`.

use std::collections::BTreeMap;
use std::sync::Arc;

use allocator_common::{
    Address, AllocationEntry, Amount, AllocatorError, FixedPoint, Interactor, PortfolioId, Registry,
    StrategyId, TokenId, ValuationAdapter, DEFAULT_TOLERANCE,
};
use allocator_strategy::Strategy;

use crate::instructions;
use crate::state::{strategy_fingerprint, Fingerprint, Portfolio, Strategies};

/// Engine tunables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Absolute rounding slack applied per token (per strategy for pushes)
    pub tolerance: u128,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

fn check_strategy(strategy: &Strategy) -> Result<(), AllocatorError> {
    if !strategy.shares_conserved() {
        log::error!("Strategy {}: share conservation broken", strategy.id);
        return Err(AllocatorError::InvariantViolation("strategy shares_total != sum of holdings"));
    }
    Ok(())
}

fn check_portfolio(portfolio: &Portfolio) -> Result<(), AllocatorError> {
    if !portfolio.shares_conserved() {
        log::error!("Portfolio {}: share conservation broken", portfolio.id);
        return Err(AllocatorError::InvariantViolation("portfolio shares_total != sum of holdings"));
    }
    if !portfolio.fees_valid() {
        return Err(AllocatorError::InvariantViolation("portfolio fee rates exceed 100%"));
    }
    Ok(())
}

#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    registry: Arc<dyn Registry>,
    strategies: Strategies,
    portfolios: BTreeMap<PortfolioId, Portfolio>,
}

impl Engine {
    pub fn new(registry: Arc<dyn Registry>, config: EngineConfig) -> Self {
        Self {
            config,
            registry,
            strategies: Strategies::new(),
            portfolios: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &dyn Registry {
        self.registry.as_ref()
    }

    fn transact_strategy<T, F>(&mut self, id: &StrategyId, op: F) -> Result<T, AllocatorError>
    where
        F: FnOnce(&mut Strategy, &dyn Registry, &EngineConfig) -> Result<T, AllocatorError>,
    {
        let mut draft = self
            .strategies
            .get(id)
            .ok_or(AllocatorError::UnknownStrategy(*id))?
            .clone();
        let out = op(&mut draft, self.registry.as_ref(), &self.config)?;
        check_strategy(&draft)?;
        self.strategies.insert(*id, draft);
        Ok(out)
    }

    fn transact_portfolio<T, F>(&mut self, id: &PortfolioId, op: F) -> Result<T, AllocatorError>
    where
        F: FnOnce(&mut Portfolio, &mut Strategies, &dyn Registry, &EngineConfig) -> Result<T, AllocatorError>,
    {
        let mut draft = self
            .portfolios
            .get(id)
            .ok_or(AllocatorError::UnknownPortfolio(*id))?
            .clone();
        let mut strategies = self.strategies.clone();
        let out = op(&mut draft, &mut strategies, self.registry.as_ref(), &self.config)?;
        check_portfolio(&draft)?;
        for strategy in strategies.values() {
            check_strategy(strategy)?;
        }
        self.portfolios.insert(*id, draft);
        self.strategies = strategies;
        Ok(out)
    }

    // ------------------------------------------------------------------
    // Entity creation
    // ------------------------------------------------------------------

    pub fn create_strategy(
        &mut self,
        id: StrategyId,
        owner: Address,
        custody: Box<dyn Interactor>,
        valuation: Arc<dyn ValuationAdapter>,
    ) -> Result<(), AllocatorError> {
        if self.strategies.contains_key(&id) || self.portfolios.contains_key(&id) {
            return Err(AllocatorError::EntityExists(id));
        }
        if !self.registry.is_recognized_strategy(&id) {
            log::warn!("Engine: strategy {} is not in the registry yet", id);
        }
        self.strategies.insert(id, Strategy::new(id, owner, custody, valuation));
        log::info!("Engine: created strategy {} (owner {})", id, owner);
        Ok(())
    }

    pub fn create_portfolio(
        &mut self,
        id: PortfolioId,
        manager: Address,
        custody: Box<dyn Interactor>,
        valuation: Arc<dyn ValuationAdapter>,
    ) -> Result<(), AllocatorError> {
        if self.strategies.contains_key(&id) || self.portfolios.contains_key(&id) {
            return Err(AllocatorError::EntityExists(id));
        }
        if !self.registry.is_recognized_portfolio(&id) {
            log::warn!("Engine: portfolio {} is not in the registry yet", id);
        }
        self.portfolios.insert(id, Portfolio::new(id, manager, custody, valuation));
        log::info!("Engine: created portfolio {} (manager {})", id, manager);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Strategy surface
    // ------------------------------------------------------------------

    pub fn strategy_configure(
        &mut self,
        caller: &Address,
        id: &StrategyId,
        entries: &[AllocationEntry],
    ) -> Result<(), AllocatorError> {
        self.transact_strategy(id, |s, _, _| allocator_strategy::process_configure(s, caller, entries))
    }

    pub fn strategy_set_interactor(
        &mut self,
        caller: &Address,
        id: &StrategyId,
        custody: Box<dyn Interactor>,
    ) -> Result<(), AllocatorError> {
        self.transact_strategy(id, |s, _, _| allocator_strategy::process_set_interactor(s, caller, custody))
    }

    pub fn strategy_set_valuation(
        &mut self,
        caller: &Address,
        id: &StrategyId,
        valuation: Arc<dyn ValuationAdapter>,
    ) -> Result<(), AllocatorError> {
        self.transact_strategy(id, |s, _, _| allocator_strategy::process_set_valuation(s, caller, valuation))
    }

    pub fn strategy_toggle_deposit(&mut self, caller: &Address, id: &StrategyId) -> Result<bool, AllocatorError> {
        self.transact_strategy(id, |s, _, _| allocator_strategy::process_toggle_deposit(s, caller))
    }

    pub fn strategy_toggle_withdraw(&mut self, caller: &Address, id: &StrategyId) -> Result<bool, AllocatorError> {
        self.transact_strategy(id, |s, _, _| allocator_strategy::process_toggle_withdraw(s, caller))
    }

    /// Direct strategy deposit by a recognized portfolio account
    pub fn strategy_deposit(
        &mut self,
        caller: &Address,
        id: &StrategyId,
        amounts: &[Amount],
    ) -> Result<u128, AllocatorError> {
        self.transact_strategy(id, |s, registry, config| {
            allocator_strategy::process_deposit(s, registry, caller, amounts, config.tolerance)
        })
    }

    /// Direct strategy withdrawal by a recognized portfolio account
    pub fn strategy_withdraw(
        &mut self,
        caller: &Address,
        id: &StrategyId,
        shares: u128,
        recipient: &Address,
    ) -> Result<Vec<(TokenId, Amount)>, AllocatorError> {
        self.transact_strategy(id, |s, registry, _| {
            allocator_strategy::process_withdraw(s, registry, caller, shares, recipient)
        })
    }

    /// Custody of a strategy, for balance changes that bypass the ledger (rewards)
    pub fn strategy_custody_mut(&mut self, id: &StrategyId) -> Result<&mut dyn Interactor, AllocatorError> {
        self.strategies
            .get_mut(id)
            .map(|s| s.custody_mut())
            .ok_or(AllocatorError::UnknownStrategy(*id))
    }

    // ------------------------------------------------------------------
    // Portfolio surface
    // ------------------------------------------------------------------

    pub fn portfolio_configure(
        &mut self,
        caller: &Address,
        id: &PortfolioId,
        entries: &[AllocationEntry],
    ) -> Result<(), AllocatorError> {
        self.transact_portfolio(id, |p, strategies, registry, _| {
            instructions::process_configure_strategies(p, strategies, registry, caller, entries)
        })
    }

    pub fn portfolio_sync(&mut self, id: &PortfolioId) -> Result<Fingerprint, AllocatorError> {
        self.transact_portfolio(id, |p, strategies, _, _| instructions::process_sync(p, strategies))
    }

    pub fn portfolio_deposit(
        &mut self,
        caller: &Address,
        id: &PortfolioId,
        amounts: &[Amount],
    ) -> Result<u128, AllocatorError> {
        self.transact_portfolio(id, |p, strategies, registry, config| {
            instructions::process_deposit(p, strategies, registry, caller, amounts, config.tolerance)
        })
    }

    pub fn portfolio_withdraw(
        &mut self,
        caller: &Address,
        id: &PortfolioId,
        shares: u128,
    ) -> Result<Vec<(TokenId, Amount)>, AllocatorError> {
        self.transact_portfolio(id, |p, strategies, registry, config| {
            instructions::process_withdraw(p, strategies, registry, caller, shares, config.tolerance)
        })
    }

    /// Push portfolio-held tokens into strategies (`strategyDeposit`)
    pub fn portfolio_strategy_deposit(
        &mut self,
        caller: &Address,
        id: &PortfolioId,
        per_strategy: &[Vec<Amount>],
    ) -> Result<Vec<(StrategyId, u128)>, AllocatorError> {
        self.transact_portfolio(id, |p, strategies, registry, config| {
            instructions::process_strategy_deposit(p, strategies, registry, caller, per_strategy, config.tolerance)
        })
    }

    /// Pull tokens out of strategies into the portfolio (`strategyWithdraw`)
    pub fn portfolio_strategy_withdraw(
        &mut self,
        caller: &Address,
        id: &PortfolioId,
        shares: &[u128],
    ) -> Result<Vec<(StrategyId, Vec<(TokenId, Amount)>)>, AllocatorError> {
        self.transact_portfolio(id, |p, strategies, registry, _| {
            instructions::process_strategy_withdraw(p, strategies, registry, caller, shares)
        })
    }

    pub fn portfolio_toggle_deposit(&mut self, caller: &Address, id: &PortfolioId) -> Result<bool, AllocatorError> {
        self.transact_portfolio(id, |p, _, _, _| instructions::process_toggle_deposit(p, caller))
    }

    pub fn portfolio_toggle_withdraw(&mut self, caller: &Address, id: &PortfolioId) -> Result<bool, AllocatorError> {
        self.transact_portfolio(id, |p, _, _, _| instructions::process_toggle_withdraw(p, caller))
    }

    pub fn fee_rate_manager_update(
        &mut self,
        caller: &Address,
        id: &PortfolioId,
        rate: FixedPoint,
    ) -> Result<(), AllocatorError> {
        self.transact_portfolio(id, |p, _, _, _| instructions::process_fee_rate_manager_update(p, caller, rate))
    }

    pub fn fee_rate_governance_update(
        &mut self,
        caller: &Address,
        id: &PortfolioId,
        rate: FixedPoint,
    ) -> Result<(), AllocatorError> {
        self.transact_portfolio(id, |p, _, _, _| instructions::process_fee_rate_governance_update(p, caller, rate))
    }

    pub fn fee_recipient_update(
        &mut self,
        caller: &Address,
        id: &PortfolioId,
        recipient: Address,
    ) -> Result<(), AllocatorError> {
        self.transact_portfolio(id, |p, _, _, _| instructions::process_fee_recipient_update(p, caller, recipient))
    }

    pub fn manager_update(
        &mut self,
        caller: &Address,
        id: &PortfolioId,
        new_manager: Address,
    ) -> Result<(), AllocatorError> {
        self.transact_portfolio(id, |p, _, _, _| instructions::process_manager_update(p, caller, new_manager))
    }

    pub fn withdraw_full_mode_update(
        &mut self,
        caller: &Address,
        id: &PortfolioId,
        full_mode: bool,
    ) -> Result<(), AllocatorError> {
        self.transact_portfolio(id, |p, _, _, _| {
            instructions::process_withdraw_full_mode_update(p, caller, full_mode)
        })
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    pub fn strategy(&self, id: &StrategyId) -> Option<&Strategy> {
        self.strategies.get(id)
    }

    pub fn portfolio(&self, id: &PortfolioId) -> Option<&Portfolio> {
        self.portfolios.get(id)
    }

    pub fn strategies(&self) -> &Strategies {
        &self.strategies
    }

    pub fn portfolios(&self) -> impl Iterator<Item = &Portfolio> {
        self.portfolios.values()
    }

    pub fn token_set_fingerprint(&self, id: &StrategyId) -> Result<Fingerprint, AllocatorError> {
        self.strategies
            .get(id)
            .map(strategy_fingerprint)
            .ok_or(AllocatorError::UnknownStrategy(*id))
    }

    pub fn is_stale(&self, id: &PortfolioId) -> Result<bool, AllocatorError> {
        self.portfolios
            .get(id)
            .ok_or(AllocatorError::UnknownPortfolio(*id))?
            .is_stale(&self.strategies)
    }

    /// Every stale portfolio with its number of out-of-date strategy references
    pub fn stale_portfolios(&self) -> Result<Vec<(PortfolioId, usize)>, AllocatorError> {
        let mut stale = Vec::new();
        for portfolio in self.portfolios.values() {
            if portfolio.is_stale(&self.strategies)? {
                stale.push((portfolio.id, portfolio.outdated_references(&self.strategies)?));
            }
        }
        Ok(stale)
    }
}
