//! Shared fixture for the integration tests.

#![allow(dead_code)]

use collateral_engine::*;

pub const ENGINE: Address = Address(0xe0);
pub const DEBT_TOKEN: Address = Address(0xd5c);
pub const WETH: Address = Address(0x100);
pub const WBTC: Address = Address(0x200);
pub const ETH_FEED: Address = Address(0x1001);
pub const BTC_FEED: Address = Address(0x2001);

pub const ALICE: Address = Address(0xa11ce);
pub const BOB: Address = Address(0xb0b);
pub const LIQUIDATOR: Address = Address(0x11b);

// non-zero: a reading updated at time zero counts as stale
pub const START: Timestamp = Timestamp(1_700_000_000_000);

pub type TestEngine = Engine<InMemoryTokenBank, InMemoryPriceFeed>;

/// 8 decimal feed answer for a whole-dollar price.
pub fn usd_price(dollars: i128) -> i128 {
    dollars * 100_000_000
}

pub fn test_bank() -> InMemoryTokenBank {
    let mut bank = InMemoryTokenBank::new();
    bank.set_owner(DEBT_TOKEN, ENGINE);
    bank
}

pub fn test_feeds(eth_dollars: i128, btc_dollars: i128) -> InMemoryPriceFeed {
    let mut feeds = InMemoryPriceFeed::new();
    feeds.set_price(ETH_FEED, usd_price(eth_dollars), START);
    feeds.set_price(BTC_FEED, usd_price(btc_dollars), START);
    feeds
}

/// WETH at $2000, WBTC at $30,000, clock at START.
pub fn setup() -> TestEngine {
    setup_with(test_bank())
}

pub fn setup_with<B: TokenBank>(bank: B) -> Engine<B, InMemoryPriceFeed> {
    let mut engine = Engine::new(
        EngineConfig::new(ENGINE, DEBT_TOKEN),
        &[WETH, WBTC],
        &[ETH_FEED, BTC_FEED],
        bank,
        test_feeds(2000, 30_000),
    )
    .unwrap();
    engine.set_time(START);
    engine
}

/// Give `user` `units` of `asset` and approve the engine for it and the debt token.
pub fn fund(engine: &mut TestEngine, user: Address, asset: Address, units: u64) {
    fund_bank(engine.bank_mut(), user, asset, units);
}

pub fn fund_bank(bank: &mut InMemoryTokenBank, user: Address, asset: Address, units: u64) {
    bank.credit(asset, user, Amount::from_units(units));
    bank.approve(asset, user, ENGINE, Amount::MAX);
    bank.approve(DEBT_TOKEN, user, ENGINE, Amount::MAX);
}

pub fn set_eth_price<B: TokenBank>(engine: &mut Engine<B, InMemoryPriceFeed>, dollars: i128) {
    let now = engine.time();
    engine.feed_source_mut().set_price(ETH_FEED, usd_price(dollars), now);
}

pub fn units(n: u64) -> Amount {
    Amount::from_units(n)
}

pub fn wei(n: u128) -> Amount {
    Amount::from_wei(n)
}

pub fn hf_wad(raw: u128) -> HealthFactor {
    HealthFactor::from_raw(primitive_types::U256::from(raw))
}

/// Alice: 10 WETH @ $2000 backing 10,000 debt, health factor exactly 1.0.
pub fn alice_at_boundary(engine: &mut TestEngine) {
    fund(engine, ALICE, WETH, 10);
    engine
        .deposit_collateral_and_mint_debt(ALICE, WETH, units(10), units(10_000))
        .unwrap();
}

/// Liquidator: 1 WBTC backing 5,000 debt, so it holds tokens to repay with.
pub fn funded_liquidator(engine: &mut TestEngine) {
    fund(engine, LIQUIDATOR, WBTC, 1);
    engine
        .deposit_collateral_and_mint_debt(LIQUIDATOR, WBTC, units(1), units(5_000))
        .unwrap();
}
