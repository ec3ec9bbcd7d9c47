//! Shared test fixtures: two strategies over tokens A and B, one portfolio

use std::sync::Arc;

use allocator_common::{percent, Address, AllocationEntry, Directory, TokenId, Vault, ONE};
use allocator_strategy::{process_configure, process_toggle_deposit, process_toggle_withdraw, Strategy};
use allocator_valuation::PriceTable;

use crate::instructions;
use crate::state::{Portfolio, Strategies};

pub const OWNER: Address = Address::new([0xa0; 32]);
pub const MANAGER: Address = Address::new([0xa1; 32]);
pub const USER: Address = Address::new([0xa2; 32]);
pub const TREASURY: Address = Address::new([0xa3; 32]);
pub const PORTFOLIO: Address = Address::new([0xb0; 32]);
pub const STRATEGY_1: Address = Address::new([0xc1; 32]);
pub const STRATEGY_2: Address = Address::new([0xc2; 32]);

/// 6 decimals, priced at 1.0
pub fn token_a() -> TokenId {
    Address::new([0x01; 32])
}

/// 18 decimals, priced at 2.0
pub fn token_b() -> TokenId {
    Address::new([0x02; 32])
}

/// 18 decimals, priced at 1.0
pub fn reward() -> TokenId {
    Address::new([0x03; 32])
}

pub fn prices() -> Arc<PriceTable> {
    let table = PriceTable::new();
    table.set_price(token_a(), 6, ONE).unwrap();
    table.set_price(token_b(), 18, 2 * ONE).unwrap();
    table.set_price(reward(), 18, ONE).unwrap();
    Arc::new(table)
}

pub fn registry() -> Directory {
    let mut registry = Directory::new(Address::default(), TREASURY);
    registry.register_strategy(STRATEGY_1, OWNER);
    registry.register_strategy(STRATEGY_2, OWNER);
    registry.register_portfolio(PORTFOLIO, OWNER);
    registry
}

pub fn half_half() -> Vec<AllocationEntry> {
    vec![
        AllocationEntry::new(token_a(), percent(50)),
        AllocationEntry::new(token_b(), percent(50)),
    ]
}

pub fn skewed_a_b() -> Vec<AllocationEntry> {
    vec![
        AllocationEntry::new(token_a(), percent(70)),
        AllocationEntry::new(token_b(), percent(30)),
    ]
}

pub fn only_a() -> Vec<AllocationEntry> {
    vec![AllocationEntry::new(token_a(), percent(100))]
}

pub fn b_with_reward() -> Vec<AllocationEntry> {
    vec![
        AllocationEntry::new(token_b(), percent(100)),
        AllocationEntry::withdraw_only(reward()),
    ]
}

pub fn half_half_strategies() -> Vec<AllocationEntry> {
    vec![
        AllocationEntry::new(STRATEGY_1, percent(50)),
        AllocationEntry::new(STRATEGY_2, percent(50)),
    ]
}

/// Amounts worth `value` whole value units split 50/50 across A and B
pub fn half_half_amounts(value: u128) -> Vec<u128> {
    vec![value / 2 * 1_000_000, value / 2 * ONE / 2]
}

/// Both strategies at 50% A / 50% B, open in both directions
pub fn strategies() -> Strategies {
    let mut strategies = Strategies::new();
    for id in [STRATEGY_1, STRATEGY_2] {
        let mut strategy = Strategy::new(id, OWNER, Box::new(Vault::new()), prices());
        process_configure(&mut strategy, &OWNER, &half_half()).unwrap();
        process_toggle_deposit(&mut strategy, &OWNER).unwrap();
        process_toggle_withdraw(&mut strategy, &OWNER).unwrap();
        strategies.insert(id, strategy);
    }
    strategies
}

/// Close, reconfigure and reopen one strategy
pub fn reconfigure(strategies: &mut Strategies, id: Address, entries: &[AllocationEntry]) {
    let strategy = strategies.get_mut(&id).unwrap();
    let deposit_open = strategy.is_deposit_open();
    let withdraw_open = strategy.is_withdraw_open();
    if deposit_open {
        process_toggle_deposit(strategy, &OWNER).unwrap();
    }
    if withdraw_open {
        process_toggle_withdraw(strategy, &OWNER).unwrap();
    }
    process_configure(strategy, &OWNER, entries).unwrap();
    if deposit_open {
        process_toggle_deposit(strategy, &OWNER).unwrap();
    }
    if withdraw_open {
        process_toggle_withdraw(strategy, &OWNER).unwrap();
    }
}

pub fn empty_portfolio() -> Portfolio {
    Portfolio::new(PORTFOLIO, MANAGER, Box::new(Vault::new()), prices())
}

/// 50/50 across both strategies, synced, open in both directions, two-phase withdrawals
pub fn configured_portfolio(strategies: &Strategies) -> Portfolio {
    let mut portfolio = empty_portfolio();
    instructions::process_configure_strategies(
        &mut portfolio,
        strategies,
        &registry(),
        &MANAGER,
        &half_half_strategies(),
    )
    .unwrap();
    instructions::process_toggle_deposit(&mut portfolio, &MANAGER).unwrap();
    instructions::process_toggle_withdraw(&mut portfolio, &MANAGER).unwrap();
    portfolio
}
