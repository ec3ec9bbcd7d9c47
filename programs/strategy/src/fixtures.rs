//! Shared test fixtures

use std::sync::Arc;

use allocator_common::{percent, Address, AllocationEntry, Directory, TokenId, Vault, ONE};
use allocator_valuation::PriceTable;

use crate::state::Strategy;

pub const OWNER: Address = Address::new([0xa0; 32]);
pub const PORTFOLIO: Address = Address::new([0xb0; 32]);
pub const STRATEGY: Address = Address::new([0xc0; 32]);

/// 6 decimals, priced at 1.0
pub fn token_a() -> TokenId {
    Address::new([0x01; 32])
}

/// 18 decimals, priced at 2.0
pub fn token_b() -> TokenId {
    Address::new([0x02; 32])
}

/// Withdraw-only reward token, 18 decimals, priced at 1.0
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

pub fn half_half() -> Vec<AllocationEntry> {
    vec![
        AllocationEntry::new(token_a(), percent(50)),
        AllocationEntry::new(token_b(), percent(50)),
    ]
}

/// Amounts worth `value` whole value units split 50/50 across A and B
pub fn half_half_amounts(value: u128) -> Vec<u128> {
    vec![value / 2 * 1_000_000, value / 2 * ONE / 2]
}

/// Unconfigured strategy plus a registry recognizing `PORTFOLIO`
pub fn fixture() -> (Strategy, Directory) {
    let strategy = Strategy::new(STRATEGY, OWNER, Box::new(Vault::new()), prices());
    let mut registry = Directory::new(Address::default(), Address::default());
    registry.register_portfolio(PORTFOLIO, OWNER);
    registry.register_strategy(STRATEGY, OWNER);
    (strategy, registry)
}
