//! Two-level deposit, push, pull and withdraw scenarios

use allocator_common::{percent, AllocationEntry, AllocatorError, ErrorKind, Interactor, ONE};
use allocator_integration_tests::*;

#[test]
fn test_strategy_half_half_round_trip() {
    let mut engine = strategy_engine();
    let amounts = half_half_amounts(100);

    let minted = engine.strategy_deposit(&PORTFOLIO, &STRATEGY_1, &amounts).unwrap();
    assert_eq!(minted, 100 * ONE);

    let paid = engine
        .strategy_withdraw(&PORTFOLIO, &STRATEGY_1, 100 * ONE, &PORTFOLIO)
        .unwrap();
    assert_eq!(paid, vec![(TOKEN_A, amounts[0]), (TOKEN_B, amounts[1])]);

    let strategy = engine.strategy(&STRATEGY_1).unwrap();
    assert_eq!(strategy.shares_total(), 0);
    assert_eq!(strategy.balance_of(&TOKEN_A), 0);
    assert_eq!(strategy.balance_of(&TOKEN_B), 0);
}

#[test]
fn test_strategy_rejects_skewed_amounts() {
    let mut engine = strategy_engine();
    // 60 A and 40 B by value
    let skewed = vec![60_000_000, 20 * ONE];
    assert_eq!(
        engine.strategy_deposit(&PORTFOLIO, &STRATEGY_1, &skewed),
        Err(AllocatorError::AllocationMismatch)
    );
    assert_eq!(engine.strategy(&STRATEGY_1).unwrap().shares_total(), 0);
}

#[test]
fn test_push_splits_shares_evenly() {
    let mut engine = two_level_engine();

    let minted = engine
        .portfolio_deposit(&ALICE, &PORTFOLIO, &half_half_amounts(100))
        .unwrap();
    assert_eq!(minted, 100 * ONE);

    let pushed = engine
        .portfolio_strategy_deposit(
            &MANAGER,
            &PORTFOLIO,
            &[half_half_amounts(50), half_half_amounts(50)],
        )
        .unwrap();
    assert_eq!(pushed, vec![(STRATEGY_1, 50 * ONE), (STRATEGY_2, 50 * ONE)]);

    for id in [STRATEGY_1, STRATEGY_2] {
        let strategy = engine.strategy(&id).unwrap();
        assert_eq!(strategy.shares_total(), 50 * ONE);
        assert_eq!(strategy.shares_of(&PORTFOLIO), 50 * ONE);
    }
    let portfolio = engine.portfolio(&PORTFOLIO).unwrap();
    assert_eq!(portfolio.balance_of(&TOKEN_A), 0);
    assert_eq!(portfolio.balance_of(&TOKEN_B), 0);
}

#[test]
fn test_uneven_push_rejected() {
    let mut engine = two_level_engine();
    engine
        .portfolio_deposit(&ALICE, &PORTFOLIO, &half_half_amounts(100))
        .unwrap();

    assert_eq!(
        engine.portfolio_strategy_deposit(
            &MANAGER,
            &PORTFOLIO,
            &[half_half_amounts(70), half_half_amounts(30)],
        ),
        Err(AllocatorError::InvalidStrategyAllocation)
    );
    assert_eq!(
        engine.portfolio_strategy_deposit(&ALICE, &PORTFOLIO, &[half_half_amounts(50), half_half_amounts(50)]),
        Err(AllocatorError::Unauthorized(ALICE))
    );
    assert_eq!(engine.strategy(&STRATEGY_1).unwrap().shares_total(), 0);
}

#[test]
fn test_two_phase_lifecycle() {
    let mut engine = two_level_engine();
    engine
        .portfolio_deposit(&ALICE, &PORTFOLIO, &half_half_amounts(100))
        .unwrap();
    engine
        .portfolio_deposit(&BOB, &PORTFOLIO, &half_half_amounts(50))
        .unwrap();
    engine
        .portfolio_strategy_deposit(
            &MANAGER,
            &PORTFOLIO,
            &[half_half_amounts(75), half_half_amounts(75)],
        )
        .unwrap();

    // Everything is invested; two-phase withdrawal needs a pull first
    let err = engine.portfolio_withdraw(&ALICE, &PORTFOLIO, 100 * ONE).unwrap_err();
    assert!(matches!(err, AllocatorError::TokenNotAvailable(_)));
    assert_eq!(err.kind(), ErrorKind::Precondition);

    let pulled = engine
        .portfolio_strategy_withdraw(&MANAGER, &PORTFOLIO, &[75 * ONE, 75 * ONE])
        .unwrap();
    assert_eq!(pulled.len(), 2);

    let paid = engine.portfolio_withdraw(&ALICE, &PORTFOLIO, 100 * ONE).unwrap();
    assert_eq!(paid, vec![(TOKEN_A, 50_000_000), (TOKEN_B, 25 * ONE)]);
    assert_eq!(value_of_a_b(&paid), 100 * ONE);

    let paid = engine.portfolio_withdraw(&BOB, &PORTFOLIO, 50 * ONE).unwrap();
    assert_eq!(value_of_a_b(&paid), 50 * ONE);

    let portfolio = engine.portfolio(&PORTFOLIO).unwrap();
    assert_eq!(portfolio.shares_total(), 0);
    assert_eq!(portfolio.balance_of(&TOKEN_A), 0);
    assert_eq!(portfolio.balance_of(&TOKEN_B), 0);
}

#[test]
fn test_full_mode_withdraw_pulls_pro_rata() {
    let mut engine = two_level_engine();
    engine.withdraw_full_mode_update(&MANAGER, &PORTFOLIO, true).unwrap();
    engine
        .portfolio_deposit(&ALICE, &PORTFOLIO, &half_half_amounts(100))
        .unwrap();
    engine
        .portfolio_strategy_deposit(
            &MANAGER,
            &PORTFOLIO,
            &[half_half_amounts(50), half_half_amounts(50)],
        )
        .unwrap();

    let paid = engine.portfolio_withdraw(&ALICE, &PORTFOLIO, 40 * ONE).unwrap();
    assert_eq!(value_of_a_b(&paid), 40 * ONE);

    // 40% of each strategy position was burned
    for id in [STRATEGY_1, STRATEGY_2] {
        assert_eq!(engine.strategy(&id).unwrap().shares_of(&PORTFOLIO), 30 * ONE);
    }
    assert_eq!(engine.portfolio(&PORTFOLIO).unwrap().shares_of(&ALICE), 60 * ONE);
}

#[test]
fn test_reward_tokens_reach_portfolio_holders() {
    let mut engine = two_level_engine();
    engine.withdraw_full_mode_update(&MANAGER, &PORTFOLIO, true).unwrap();

    reconfigure_strategy(
        &mut engine,
        STRATEGY_2,
        &[
            AllocationEntry::new(TOKEN_A, percent(50)),
            AllocationEntry::new(TOKEN_B, percent(50)),
            AllocationEntry::withdraw_only(REWARD),
        ],
    );
    engine.portfolio_sync(&PORTFOLIO).unwrap();
    assert!(engine.portfolio(&PORTFOLIO).unwrap().payout_tokens().contains(&REWARD));

    engine
        .portfolio_deposit(&ALICE, &PORTFOLIO, &half_half_amounts(100))
        .unwrap();
    // Strategy 2 amounts also carry an empty reward leg
    let mut with_reward = half_half_amounts(50);
    with_reward.push(0);
    engine
        .portfolio_strategy_deposit(&MANAGER, &PORTFOLIO, &[half_half_amounts(50), with_reward])
        .unwrap();

    engine
        .strategy_custody_mut(&STRATEGY_2)
        .unwrap()
        .receive(REWARD, 7 * ONE, OWNER)
        .unwrap();

    let paid = engine.portfolio_withdraw(&ALICE, &PORTFOLIO, 100 * ONE).unwrap();
    assert!(paid.contains(&(REWARD, 7 * ONE)));
    assert_eq!(engine.strategy(&STRATEGY_2).unwrap().balance_of(&REWARD), 0);
}

#[test]
fn test_fee_rates_cannot_exceed_whole() {
    let mut engine = two_level_engine();
    engine
        .fee_rate_manager_update(&MANAGER, &PORTFOLIO, percent(60))
        .unwrap();

    let err = engine
        .fee_rate_governance_update(&MANAGER, &PORTFOLIO, percent(50))
        .unwrap_err();
    assert_eq!(err, AllocatorError::FeeExceeds100Percent);
    assert_eq!(err.kind(), ErrorKind::Invariant);
    assert_eq!(engine.portfolio(&PORTFOLIO).unwrap().fee_rate_governance(), 0);

    engine
        .fee_rate_governance_update(&MANAGER, &PORTFOLIO, percent(40))
        .unwrap();
    assert_eq!(engine.portfolio(&PORTFOLIO).unwrap().fee_rate_governance(), percent(40));
}

#[test]
fn test_fees_dilute_depositor() {
    let mut engine = two_level_engine();
    engine
        .fee_rate_manager_update(&MANAGER, &PORTFOLIO, percent(2))
        .unwrap();
    engine
        .fee_rate_governance_update(&MANAGER, &PORTFOLIO, percent(1))
        .unwrap();

    let minted = engine
        .portfolio_deposit(&ALICE, &PORTFOLIO, &half_half_amounts(100))
        .unwrap();
    assert_eq!(minted, 97 * ONE);

    let portfolio = engine.portfolio(&PORTFOLIO).unwrap();
    assert_eq!(portfolio.shares_of(&ALICE), 97 * ONE);
    assert_eq!(portfolio.shares_of(&MANAGER), 2 * ONE);
    assert_eq!(portfolio.shares_of(&TREASURY), ONE);
    assert_eq!(portfolio.shares_total(), 100 * ONE);
    // Tokens are not deducted
    assert_eq!(portfolio.balance_of(&TOKEN_A), 50_000_000);
}

#[test]
fn test_fee_recipient_and_manager_handover() {
    let mut engine = two_level_engine();
    engine
        .fee_rate_manager_update(&MANAGER, &PORTFOLIO, percent(10))
        .unwrap();
    engine.fee_recipient_update(&MANAGER, &PORTFOLIO, BOB).unwrap();
    engine.manager_update(&MANAGER, &PORTFOLIO, OWNER).unwrap();

    assert_eq!(
        engine.fee_rate_manager_update(&MANAGER, &PORTFOLIO, 0),
        Err(AllocatorError::Unauthorized(MANAGER))
    );

    engine
        .portfolio_deposit(&ALICE, &PORTFOLIO, &half_half_amounts(100))
        .unwrap();
    let portfolio = engine.portfolio(&PORTFOLIO).unwrap();
    assert_eq!(portfolio.manager(), OWNER);
    assert_eq!(portfolio.shares_of(&BOB), 10 * ONE);
    assert_eq!(portfolio.shares_of(&MANAGER), 0);
}
