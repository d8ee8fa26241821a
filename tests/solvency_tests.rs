//! Solvency invariant tests.
//!
//! These tests verify that every collateral and debt operation either leaves the
//! position healthy or changes nothing at all.

mod common;

use collateral_engine::*;
use common::*;

#[test]
fn mint_at_exact_boundary() {
    let mut engine = setup();
    alice_at_boundary(&mut engine);

    assert_eq!(engine.health_factor(ALICE).unwrap(), hf_wad(1_000_000_000_000_000_000));
    assert_eq!(engine.debt_minted(ALICE), units(10_000));
    assert_eq!(engine.collateral_balance(ALICE, WETH), units(10));

    // tokens actually moved
    assert_eq!(engine.bank().balance_of(DEBT_TOKEN, ALICE), units(10_000));
    assert_eq!(engine.bank().balance_of(WETH, ENGINE), units(10));
    assert_eq!(engine.bank().balance_of(WETH, ALICE), Amount::zero());
}

#[test]
fn one_wei_past_boundary_is_refused() {
    let mut engine = setup();
    alice_at_boundary(&mut engine);
    let events_before = engine.events().len();

    let result = engine.mint_debt(ALICE, wei(1));
    assert!(matches!(result, Err(EngineError::HealthFactorIsBroken { user, .. }) if user == ALICE));

    assert_eq!(engine.debt_minted(ALICE), units(10_000));
    assert_eq!(engine.bank().balance_of(DEBT_TOKEN, ALICE), units(10_000));
    assert_eq!(engine.events().len(), events_before);
}

#[test]
fn mint_without_collateral_is_refused() {
    let mut engine = setup();
    let result = engine.mint_debt(ALICE, units(1));
    assert!(matches!(result, Err(EngineError::HealthFactorIsBroken { .. })));
    assert!(engine.ledger().position(ALICE).is_none());
}

#[test]
fn zero_amounts_rejected() {
    let mut engine = setup();
    alice_at_boundary(&mut engine);

    let zero = Amount::zero();
    assert_eq!(engine.deposit_collateral(ALICE, WETH, zero), Err(EngineError::AmountMustBeMoreThanZero));
    assert_eq!(engine.mint_debt(ALICE, zero), Err(EngineError::AmountMustBeMoreThanZero));
    assert_eq!(engine.redeem_collateral(ALICE, WETH, zero), Err(EngineError::AmountMustBeMoreThanZero));
    assert_eq!(engine.burn_debt(ALICE, zero), Err(EngineError::AmountMustBeMoreThanZero));
    assert_eq!(
        engine.deposit_collateral_and_mint_debt(ALICE, WETH, units(1), zero),
        Err(EngineError::AmountMustBeMoreThanZero)
    );
    assert_eq!(
        engine.liquidate(LIQUIDATOR, ALICE, WETH, zero),
        Err(EngineError::AmountMustBeMoreThanZero)
    );
}

#[test]
fn unregistered_asset_rejected() {
    let mut engine = setup();
    let dai = Address(0x300);
    fund(&mut engine, ALICE, dai, 10);

    assert_eq!(
        engine.deposit_collateral(ALICE, dai, units(1)),
        Err(EngineError::CollateralTokenNotAllowed(dai))
    );
    assert_eq!(
        engine.redeem_collateral(ALICE, dai, units(1)),
        Err(EngineError::CollateralTokenNotAllowed(dai))
    );
    assert_eq!(engine.bank().balance_of(dai, ALICE), units(10));
}

#[test]
fn deposit_and_redeem_without_debt() {
    let mut engine = setup();
    fund(&mut engine, ALICE, WETH, 10);

    engine.deposit_collateral(ALICE, WETH, units(4)).unwrap();
    engine.redeem_collateral(ALICE, WETH, units(4)).unwrap();

    assert_eq!(engine.collateral_balance(ALICE, WETH), Amount::zero());
    assert_eq!(engine.bank().balance_of(WETH, ALICE), units(10));
    assert_eq!(engine.health_factor(ALICE).unwrap(), HealthFactor::MAX);
}

#[test]
fn redeem_down_to_boundary() {
    let mut engine = setup();
    fund(&mut engine, ALICE, WETH, 10);
    engine
        .deposit_collateral_and_mint_debt(ALICE, WETH, units(10), units(5_000))
        .unwrap();

    // 5 WETH left backs 5,000 exactly
    engine.redeem_collateral(ALICE, WETH, units(5)).unwrap();
    assert_eq!(engine.health_factor(ALICE).unwrap(), hf_wad(1_000_000_000_000_000_000));

    let result = engine.redeem_collateral(ALICE, WETH, wei(1));
    assert!(matches!(result, Err(EngineError::HealthFactorIsBroken { .. })));
    assert_eq!(engine.collateral_balance(ALICE, WETH), units(5));
}

#[test]
fn redeem_more_than_deposited() {
    let mut engine = setup();
    fund(&mut engine, ALICE, WETH, 10);
    engine.deposit_collateral(ALICE, WETH, units(2)).unwrap();

    let result = engine.redeem_collateral(ALICE, WETH, units(3));
    assert!(matches!(
        result,
        Err(EngineError::Ledger(LedgerError::InsufficientCollateral { .. }))
    ));
}

#[test]
fn burn_repays_and_destroys() {
    let mut engine = setup();
    alice_at_boundary(&mut engine);

    engine.burn_debt(ALICE, units(4_000)).unwrap();
    assert_eq!(engine.debt_minted(ALICE), units(6_000));
    assert_eq!(engine.bank().balance_of(DEBT_TOKEN, ALICE), units(6_000));
    // burned, not parked in custody
    assert_eq!(engine.bank().balance_of(DEBT_TOKEN, ENGINE), Amount::zero());

    engine.burn_debt(ALICE, units(6_000)).unwrap();
    assert_eq!(engine.health_factor(ALICE).unwrap(), HealthFactor::MAX);
}

#[test]
fn burn_more_than_owed() {
    let mut engine = setup();
    alice_at_boundary(&mut engine);

    let result = engine.burn_debt(ALICE, units(10_001));
    assert!(matches!(result, Err(EngineError::Ledger(LedgerError::InsufficientDebt { .. }))));
}

#[test]
fn redeem_for_debt_burns_then_redeems() {
    let mut engine = setup();
    alice_at_boundary(&mut engine);

    engine
        .redeem_collateral_for_debt(ALICE, WETH, units(5), units(5_000))
        .unwrap();
    assert_eq!(engine.debt_minted(ALICE), units(5_000));
    assert_eq!(engine.collateral_balance(ALICE, WETH), units(5));
    assert_eq!(engine.bank().balance_of(WETH, ALICE), units(5));
    assert_eq!(engine.health_factor(ALICE).unwrap(), hf_wad(1_000_000_000_000_000_000));

    // too much collateral for the debt repaid
    let result = engine.redeem_collateral_for_debt(ALICE, WETH, units(3), units(1_000));
    assert!(matches!(result, Err(EngineError::HealthFactorIsBroken { .. })));
    assert_eq!(engine.debt_minted(ALICE), units(5_000));
}

#[test]
fn events_recorded_in_order() {
    let mut engine = setup();
    alice_at_boundary(&mut engine);

    let events = engine.events();
    assert_eq!(events.len(), 2);
    assert!(matches!(
        &events[0].payload,
        EventPayload::CollateralDeposited(e) if e.user == ALICE && e.asset == WETH && e.amount == units(10)
    ));
    assert!(matches!(
        &events[1].payload,
        EventPayload::DebtMinted(e) if e.user == ALICE && e.amount == units(10_000)
    ));
    assert!(events[0].id < events[1].id);
    assert_eq!(events[0].timestamp, START);
}

#[test]
fn event_log_is_bounded() {
    let mut engine = Engine::new(
        EngineConfig::new(ENGINE, DEBT_TOKEN).with_max_events(1),
        &[WETH, WBTC],
        &[ETH_FEED, BTC_FEED],
        test_bank(),
        test_feeds(2000, 30_000),
    )
    .unwrap();
    engine.set_time(START);
    alice_at_boundary(&mut engine);

    assert_eq!(engine.events().len(), 1);
    assert_eq!(engine.events()[0].id, EventId(2));
    assert_eq!(engine.recent_events(5).len(), 1);
}

// Atomicity: a failed call leaves ledger, wallets and events as they were.

#[test]
fn deposit_without_allowance_changes_nothing() {
    let mut engine = setup();
    engine.bank_mut().credit(WETH, ALICE, units(10));

    let result = engine.deposit_collateral(ALICE, WETH, units(10));
    assert!(matches!(result, Err(EngineError::TransferFailed { token, .. }) if token == WETH));
    assert_eq!(engine.collateral_balance(ALICE, WETH), Amount::zero());
    assert_eq!(engine.bank().balance_of(WETH, ALICE), units(10));
    assert!(engine.events().is_empty());
}

#[test]
fn failed_mint_returns_pulled_collateral() {
    let mut engine = setup();
    fund(&mut engine, ALICE, WETH, 10);
    engine.bank_mut().halt(DEBT_TOKEN);

    let result = engine.deposit_collateral_and_mint_debt(ALICE, WETH, units(10), units(5_000));
    assert!(matches!(result, Err(EngineError::MintFailed { to, .. }) if to == ALICE));

    assert_eq!(engine.collateral_balance(ALICE, WETH), Amount::zero());
    assert_eq!(engine.debt_minted(ALICE), Amount::zero());
    assert_eq!(engine.bank().balance_of(WETH, ALICE), units(10));
    assert_eq!(engine.bank().balance_of(WETH, ENGINE), Amount::zero());
    assert!(engine.events().is_empty());
}

#[test]
fn failed_push_restores_burned_debt() {
    let mut engine = setup();
    alice_at_boundary(&mut engine);
    engine.bank_mut().halt(WETH);

    let result = engine.redeem_collateral_for_debt(ALICE, WETH, units(5), units(5_000));
    assert!(matches!(result, Err(EngineError::TransferFailed { token, .. }) if token == WETH));

    assert_eq!(engine.debt_minted(ALICE), units(10_000));
    assert_eq!(engine.collateral_balance(ALICE, WETH), units(10));
    assert_eq!(engine.bank().balance_of(DEBT_TOKEN, ALICE), units(10_000));
    assert_eq!(engine.bank().balance_of(DEBT_TOKEN, ENGINE), Amount::zero());
    assert_eq!(engine.events().len(), 2);
}

#[test]
fn burn_without_allowance_changes_nothing() {
    let mut engine = setup();
    alice_at_boundary(&mut engine);
    engine.bank_mut().approve(DEBT_TOKEN, ALICE, ENGINE, Amount::zero());

    let result = engine.burn_debt(ALICE, units(1_000));
    assert!(matches!(result, Err(EngineError::TransferFailed { .. })));
    assert_eq!(engine.debt_minted(ALICE), units(10_000));
    assert_eq!(engine.bank().balance_of(DEBT_TOKEN, ALICE), units(10_000));
}

#[test]
fn engine_without_mint_rights_cannot_mint() {
    let mut bank = InMemoryTokenBank::new();
    bank.set_owner(DEBT_TOKEN, Address(0xbad));
    let mut engine = setup_with(bank);
    fund(&mut engine, ALICE, WETH, 10);

    let result = engine.deposit_collateral_and_mint_debt(ALICE, WETH, units(10), units(100));
    assert!(matches!(result, Err(EngineError::MintFailed { .. })));
    assert_eq!(engine.bank().balance_of(WETH, ALICE), units(10));
}

// Oracle failures

#[test]
fn stale_price_blocks_valuation() {
    let mut engine = setup();
    fund(&mut engine, ALICE, WETH, 10);
    engine.deposit_collateral(ALICE, WETH, units(10)).unwrap();

    engine.advance_time((engine.oracle_timeout_secs() as i64 + 1) * 1000);

    let result = engine.mint_debt(ALICE, units(100));
    assert!(matches!(
        result,
        Err(EngineError::Oracle(OracleError::StalePrice { feed, .. })) if feed == ETH_FEED
    ));
    assert_eq!(engine.debt_minted(ALICE), Amount::zero());

    // fresh answer unblocks it
    set_eth_price(&mut engine, 2000);
    let now = engine.time();
    engine
        .feed_source_mut()
        .set_price(BTC_FEED, usd_price(30_000), now);
    engine.mint_debt(ALICE, units(100)).unwrap();
}

#[test]
fn non_positive_price_rejected() {
    let mut engine = setup();
    alice_at_boundary(&mut engine);

    for dollars in [0, -5] {
        set_eth_price(&mut engine, dollars);
        let result = engine.health_factor(ALICE);
        assert!(matches!(result, Err(EngineError::Oracle(OracleError::InvalidPrice { .. }))));
    }
}

#[test]
fn missing_feed_fails_even_for_unheld_asset() {
    let mut engine = setup();
    fund(&mut engine, ALICE, WETH, 10);
    engine.deposit_collateral(ALICE, WETH, units(10)).unwrap();
    engine.feed_source_mut().remove_feed(BTC_FEED);

    let result = engine.mint_debt(ALICE, units(100));
    assert_eq!(
        result,
        Err(EngineError::Oracle(OracleError::PriceUnavailable { feed: BTC_FEED }))
    );
}

#[test]
fn zero_debt_health_factor_skips_the_oracle() {
    let mut engine = setup();
    fund(&mut engine, ALICE, WETH, 10);
    engine.deposit_collateral(ALICE, WETH, units(10)).unwrap();
    engine.feed_source_mut().remove_feed(ETH_FEED);

    assert_eq!(engine.health_factor(ALICE).unwrap(), HealthFactor::MAX);
    engine.redeem_collateral(ALICE, WETH, units(10)).unwrap();
}

// Views and construction

#[test]
fn price_conversions() {
    let engine = setup();
    assert_eq!(engine.usd_value(WETH, units(15)).unwrap(), Usd::from_dollars(30_000));
    assert_eq!(
        engine.token_amount_for_usd(WETH, Usd::from_dollars(100)).unwrap(),
        wei(50_000_000_000_000_000)
    );

    let unknown = Address(0x300);
    assert_eq!(
        engine.usd_value(unknown, units(1)),
        Err(EngineError::Oracle(OracleError::PriceUnavailable { feed: Address::ZERO }))
    );
}

#[test]
fn account_views() {
    let mut engine = setup();
    alice_at_boundary(&mut engine);
    fund(&mut engine, ALICE, WBTC, 1);
    engine.deposit_collateral(ALICE, WBTC, units(1)).unwrap();

    let (debt, value) = engine.account_information(ALICE).unwrap();
    assert_eq!(debt, units(10_000));
    assert_eq!(value, Usd::from_dollars(50_000));
    assert_eq!(engine.account_collateral_value(ALICE).unwrap(), value);
    assert_eq!(
        engine.calculate_health_factor(debt, value),
        hf_wad(2_500_000_000_000_000_000)
    );
}

#[test]
fn protocol_constants() {
    let engine = setup();
    assert_eq!(engine.precision(), primitive_types::U256::exp10(18));
    assert_eq!(engine.additional_feed_precision(), primitive_types::U256::exp10(10));
    assert_eq!(engine.liquidation_threshold(), 50);
    assert_eq!(engine.liquidation_bonus(), 10);
    assert_eq!(engine.liquidation_precision(), 100);
    assert_eq!(engine.min_health_factor(), hf_wad(1_000_000_000_000_000_000));
    assert_eq!(engine.oracle_timeout_secs(), 3 * 60 * 60);
    assert_eq!(engine.collateral_assets(), &[WETH, WBTC]);
    assert_eq!(engine.price_feed(WBTC), Some(BTC_FEED));
    assert_eq!(engine.price_feed(Address(0x300)), None);
    assert_eq!(engine.engine_address(), ENGINE);
    assert_eq!(engine.debt_token(), DEBT_TOKEN);
}

#[test]
fn construction_rejects_bad_setup() {
    let mismatched = Engine::new(
        EngineConfig::new(ENGINE, DEBT_TOKEN),
        &[WETH, WBTC],
        &[ETH_FEED],
        test_bank(),
        InMemoryPriceFeed::new(),
    );
    assert!(matches!(
        mismatched,
        Err(EngineError::Ledger(LedgerError::AssetFeedLengthMismatch { .. }))
    ));

    let duplicate = Engine::new(
        EngineConfig::new(ENGINE, DEBT_TOKEN),
        &[WETH, WETH],
        &[ETH_FEED, BTC_FEED],
        test_bank(),
        InMemoryPriceFeed::new(),
    );
    assert!(matches!(
        duplicate,
        Err(EngineError::Ledger(LedgerError::DuplicateCollateralAsset(_)))
    ));

    let no_custody = Engine::new(
        EngineConfig::new(Address::ZERO, DEBT_TOKEN),
        &[WETH],
        &[ETH_FEED],
        test_bank(),
        InMemoryPriceFeed::new(),
    );
    assert!(matches!(no_custody, Err(EngineError::ZeroAddress)));

    let null_feed = Engine::new(
        EngineConfig::new(ENGINE, DEBT_TOKEN),
        &[WETH],
        &[Address::ZERO],
        test_bank(),
        InMemoryPriceFeed::new(),
    );
    assert!(matches!(null_feed, Err(EngineError::ZeroAddress)));

    let mut params = ProtocolParams::default();
    params.liquidation_threshold = 0;
    let bad_params = Engine::new(
        EngineConfig::new(ENGINE, DEBT_TOKEN).with_params(params),
        &[WETH],
        &[ETH_FEED],
        test_bank(),
        InMemoryPriceFeed::new(),
    );
    assert!(matches!(bad_params, Err(EngineError::Config(_))));
}
