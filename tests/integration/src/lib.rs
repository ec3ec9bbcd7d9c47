//! Allocator Integration Tests
//!
//! Cross-crate scenarios driven through the `Engine`. The helpers below
//! build a small deployment: tokens A (6 decimals, price 1.0) and B
//! (18 decimals, price 2.0), two strategies split 50/50 over A and B, and
//! one portfolio split 50/50 over both strategies.

use std::sync::Arc;

use allocator_common::{percent, Address, AllocationEntry, Amount, Directory, TokenId, Vault, ONE};
use allocator_portfolio::{Engine, EngineConfig};
use allocator_valuation::PriceTable;

pub use allocator_common;
pub use allocator_portfolio;
pub use allocator_strategy;
pub use allocator_valuation;

pub const OWNER: Address = Address::new([0xa0; 32]);
pub const MANAGER: Address = Address::new([0xa1; 32]);
pub const ALICE: Address = Address::new([0xa2; 32]);
pub const BOB: Address = Address::new([0xa4; 32]);
pub const TREASURY: Address = Address::new([0xa3; 32]);
pub const PORTFOLIO: Address = Address::new([0xb0; 32]);
pub const STRATEGY_1: Address = Address::new([0xc1; 32]);
pub const STRATEGY_2: Address = Address::new([0xc2; 32]);

pub const TOKEN_A: TokenId = Address::new([0x01; 32]);
pub const TOKEN_B: TokenId = Address::new([0x02; 32]);
pub const REWARD: TokenId = Address::new([0x03; 32]);

pub fn prices() -> Arc<PriceTable> {
    let table = PriceTable::new();
    table.set_price(TOKEN_A, 6, ONE).expect("price A");
    table.set_price(TOKEN_B, 18, 2 * ONE).expect("price B");
    table.set_price(REWARD, 18, ONE).expect("price reward");
    Arc::new(table)
}

pub fn directory() -> Directory {
    let mut directory = Directory::new(OWNER, TREASURY);
    directory.register_strategy(STRATEGY_1, OWNER);
    directory.register_strategy(STRATEGY_2, OWNER);
    directory.register_portfolio(PORTFOLIO, OWNER);
    directory
}

pub fn half_half() -> Vec<AllocationEntry> {
    vec![
        AllocationEntry::new(TOKEN_A, percent(50)),
        AllocationEntry::new(TOKEN_B, percent(50)),
    ]
}

pub fn half_half_strategies() -> Vec<AllocationEntry> {
    vec![
        AllocationEntry::new(STRATEGY_1, percent(50)),
        AllocationEntry::new(STRATEGY_2, percent(50)),
    ]
}

/// Amounts of A and B worth `value` whole value units, split 50/50
pub fn half_half_amounts(value: u128) -> Vec<Amount> {
    vec![value * 1_000_000 / 2, value * ONE / 4]
}

/// Value of `amounts` of A and B in value units
pub fn value_of_a_b(amounts: &[(TokenId, Amount)]) -> u128 {
    amounts
        .iter()
        .map(|(token, amount)| match *token {
            t if t == TOKEN_A => amount * (ONE / 1_000_000),
            t if t == TOKEN_B => amount * 2,
            _ => 0,
        })
        .sum()
}

/// Strategy-only deployment with one strategy open in both directions
pub fn strategy_engine() -> Engine {
    let mut engine = Engine::new(Arc::new(directory()), EngineConfig::default());
    add_strategy(&mut engine, STRATEGY_1, &half_half());
    engine
}

/// Full two-level deployment, open in both directions, no fees
pub fn two_level_engine() -> Engine {
    let mut engine = Engine::new(Arc::new(directory()), EngineConfig::default());
    add_strategy(&mut engine, STRATEGY_1, &half_half());
    add_strategy(&mut engine, STRATEGY_2, &half_half());
    engine
        .create_portfolio(PORTFOLIO, MANAGER, Box::new(Vault::new()), prices())
        .expect("create portfolio");
    engine
        .portfolio_configure(&MANAGER, &PORTFOLIO, &half_half_strategies())
        .expect("configure portfolio");
    engine
        .portfolio_toggle_deposit(&MANAGER, &PORTFOLIO)
        .expect("open deposits");
    engine
        .portfolio_toggle_withdraw(&MANAGER, &PORTFOLIO)
        .expect("open withdrawals");
    engine
}

pub fn add_strategy(engine: &mut Engine, id: Address, entries: &[AllocationEntry]) {
    engine
        .create_strategy(id, OWNER, Box::new(Vault::new()), prices())
        .expect("create strategy");
    engine.strategy_configure(&OWNER, &id, entries).expect("configure strategy");
    engine.strategy_toggle_deposit(&OWNER, &id).expect("open deposits");
    engine.strategy_toggle_withdraw(&OWNER, &id).expect("open withdrawals");
}

/// Close, reconfigure and reopen an open strategy
pub fn reconfigure_strategy(engine: &mut Engine, id: Address, entries: &[AllocationEntry]) {
    engine.strategy_toggle_deposit(&OWNER, &id).expect("close deposits");
    engine.strategy_toggle_withdraw(&OWNER, &id).expect("close withdrawals");
    engine.strategy_configure(&OWNER, &id, entries).expect("reconfigure strategy");
    engine.strategy_toggle_deposit(&OWNER, &id).expect("reopen deposits");
    engine.strategy_toggle_withdraw(&OWNER, &id).expect("reopen withdrawals");
}
