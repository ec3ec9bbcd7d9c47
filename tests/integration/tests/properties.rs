//! Property tests over the engine and allocation tables

use std::sync::Arc;

use allocator_common::{
    AllocationEntry, AllocationTable, Address, ValuationAdapter, DEFAULT_TOLERANCE, ONE,
};
use allocator_integration_tests::*;
use allocator_portfolio::{Engine, EngineConfig};
use ledger_model::{book_conserved, redeem_amount, ShareBook};
use proptest::prelude::*;

const BPS: u128 = ONE / 10_000;

fn holders() -> [Address; 3] {
    [PORTFOLIO, Address::new([0xb1; 32]), Address::new([0xb2; 32])]
}

/// One strategy, three recognized portfolio accounts
fn multi_holder_engine() -> Engine {
    let mut directory = directory();
    for holder in holders() {
        directory.register_portfolio(holder, OWNER);
    }
    let mut engine = Engine::new(Arc::new(directory), EngineConfig::default());
    add_strategy(&mut engine, STRATEGY_1, &half_half());
    engine
}

/// A and B amounts of equal value, `a` base units of A
fn matched(a: u128) -> Vec<u128> {
    vec![a, a * 500_000_000_000]
}

fn entry_strategy() -> impl Strategy<Value = AllocationEntry> {
    (0u8..6, 0u128..=ONE, any::<bool>(), any::<bool>()).prop_map(|(key, pct, deposit, withdraw)| {
        AllocationEntry {
            key: Address::new([key; 32]),
            deposit_eligible: deposit,
            withdraw_eligible: withdraw,
            percentage: pct,
        }
    })
}

fn deposit_sum(table: &AllocationTable) -> u128 {
    table
        .entries()
        .iter()
        .filter(|e| e.deposit_eligible)
        .map(|e| e.percentage)
        .sum()
}

proptest! {
    #[test]
    fn allocation_sum_holds_after_any_replace(
        attempts in prop::collection::vec(prop::collection::vec(entry_strategy(), 0..6), 1..8)
    ) {
        let mut table = AllocationTable::new();
        for entries in &attempts {
            let before = table.clone();
            if table.replace(entries).is_err() {
                prop_assert_eq!(&table, &before);
            }
            prop_assert!(table.is_empty() || deposit_sum(&table) == ONE);
        }
    }

    #[test]
    fn normalized_weights_are_accepted(weights in prop::collection::vec(1u128..1_000, 1..6)) {
        let sum: u128 = weights.iter().sum();
        let mut entries: Vec<AllocationEntry> = weights
            .iter()
            .enumerate()
            .map(|(i, w)| AllocationEntry::new(Address::new([i as u8 + 1; 32]), w * ONE / sum))
            .collect();
        let assigned: u128 = entries.iter().map(|e| e.percentage).sum();
        if let Some(last) = entries.last_mut() {
            last.percentage += ONE - assigned;
        }

        let mut table = AllocationTable::new();
        prop_assert!(table.replace(&entries).is_ok());
        prop_assert_eq!(deposit_sum(&table), ONE);
        prop_assert_eq!(table.len(), weights.len());
    }

    #[test]
    fn fee_split_is_exact(
        value in 1u128..1_000_000,
        manager_bps in 0u128..=10_000,
        governance_share in 0u128..=10_000,
    ) {
        let governance_bps = (10_000 - manager_bps) * governance_share / 10_000;
        let mut engine = two_level_engine();
        engine.fee_rate_manager_update(&MANAGER, &PORTFOLIO, manager_bps * BPS).unwrap();
        engine.fee_rate_governance_update(&MANAGER, &PORTFOLIO, governance_bps * BPS).unwrap();

        let minted = engine
            .portfolio_deposit(&ALICE, &PORTFOLIO, &half_half_amounts(2 * value))
            .unwrap();

        let portfolio = engine.portfolio(&PORTFOLIO).unwrap();
        let total = 2 * value * ONE;
        let manager = portfolio.shares_of(&MANAGER);
        let governance = portfolio.shares_of(&TREASURY);
        prop_assert_eq!(manager, total * manager_bps / 10_000);
        prop_assert_eq!(governance, total * governance_bps / 10_000);
        prop_assert_eq!(minted, portfolio.shares_of(&ALICE));
        prop_assert_eq!(minted + manager + governance, total);
        prop_assert_eq!(portfolio.shares_total(), total);
    }

    #[test]
    fn strategy_shares_conserved(
        ops in prop::collection::vec((0usize..3, any::<bool>(), 1u128..1_000_000_000, 1u128..=100), 1..24)
    ) {
        let mut engine = multi_holder_engine();
        let accounts = holders();

        for (idx, is_deposit, amount, pct) in ops {
            let holder = accounts[idx];
            if is_deposit {
                engine.strategy_deposit(&holder, &STRATEGY_1, &matched(amount)).unwrap();
            } else {
                let held = engine.strategy(&STRATEGY_1).unwrap().shares_of(&holder);
                let shares = held * pct / 100;
                if shares > 0 {
                    engine.strategy_withdraw(&holder, &STRATEGY_1, shares, &holder).unwrap();
                }
            }

            let strategy = engine.strategy(&STRATEGY_1).unwrap();
            let sum: u128 = strategy.holders().map(|(_, s)| *s).sum();
            prop_assert!(strategy.shares_conserved());
            prop_assert_eq!(strategy.shares_total(), sum);
        }
    }

    #[test]
    fn strategy_round_trip_returns_value(
        first in 1u128..1_000_000_000,
        second in 1u128..1_000_000_000,
    ) {
        let mut engine = multi_holder_engine();
        let [early, late, _] = holders();
        engine.strategy_deposit(&early, &STRATEGY_1, &matched(first)).unwrap();
        let minted = engine.strategy_deposit(&late, &STRATEGY_1, &matched(second)).unwrap();

        let paid = engine.strategy_withdraw(&late, &STRATEGY_1, minted, &late).unwrap();
        let prices = prices();
        let returned = prices
            .total_value(&[TOKEN_A, TOKEN_B], &[paid[0].1, paid[1].1])
            .unwrap();
        prop_assert!(returned.abs_diff(minted) <= DEFAULT_TOLERANCE);
        prop_assert_eq!(engine.strategy(&STRATEGY_1).unwrap().shares_of(&early), 2 * first * 1_000_000_000_000);
    }

    #[test]
    fn two_level_full_mode_round_trip(value in 1u128..100_000) {
        let mut engine = two_level_engine();
        engine.withdraw_full_mode_update(&MANAGER, &PORTFOLIO, true).unwrap();

        let minted = engine
            .portfolio_deposit(&ALICE, &PORTFOLIO, &half_half_amounts(4 * value))
            .unwrap();
        engine
            .portfolio_strategy_deposit(
                &MANAGER,
                &PORTFOLIO,
                &[half_half_amounts(2 * value), half_half_amounts(2 * value)],
            )
            .unwrap();

        let paid = engine.portfolio_withdraw(&ALICE, &PORTFOLIO, minted).unwrap();
        prop_assert!(value_of_a_b(&paid).abs_diff(4 * value * ONE) <= DEFAULT_TOLERANCE);
        prop_assert_eq!(engine.portfolio(&PORTFOLIO).unwrap().shares_total(), 0);
        prop_assert_eq!(engine.strategy(&STRATEGY_1).unwrap().shares_total(), 0);
    }

    #[test]
    fn strategy_matches_reference_book(
        ops in prop::collection::vec((0usize..3, any::<bool>(), 1u128..1_000_000_000, 1u128..=100), 1..24)
    ) {
        let mut engine = multi_holder_engine();
        let accounts = holders();
        let mut book = ShareBook::default();

        for (idx, is_deposit, amount, pct) in ops {
            let holder = accounts[idx];
            if is_deposit {
                let minted = engine.strategy_deposit(&holder, &STRATEGY_1, &matched(amount)).unwrap();
                book = ledger_model::mint(book, idx as u8, minted);
            } else {
                let shares = book.shares_of(idx as u8) * pct / 100;
                if shares == 0 {
                    continue;
                }
                let strategy = engine.strategy(&STRATEGY_1).unwrap();
                let expected_a = redeem_amount(&book, shares, strategy.balance_of(&TOKEN_A));
                let expected_b = redeem_amount(&book, shares, strategy.balance_of(&TOKEN_B));

                let paid = engine.strategy_withdraw(&holder, &STRATEGY_1, shares, &holder).unwrap();
                prop_assert_eq!(paid, vec![(TOKEN_A, expected_a), (TOKEN_B, expected_b)]);
                book = ledger_model::burn(book, idx as u8, shares);
            }

            let strategy = engine.strategy(&STRATEGY_1).unwrap();
            prop_assert!(book_conserved(&book));
            prop_assert_eq!(strategy.shares_total(), book.shares_total);
            for (i, account) in accounts.iter().enumerate() {
                prop_assert_eq!(strategy.shares_of(account), book.shares_of(i as u8));
            }
        }
    }
}
