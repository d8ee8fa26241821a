//! Collateral Engine Simulation.
//!
//! Walks the engine through the reference scenarios: minting at the solvency
//! boundary, a price crash followed by liquidation, and the ways a call is refused.

use collateral_engine::*;
use tracing_subscriber::EnvFilter;

const ENGINE: Address = Address(0xe0);
const DEBT_TOKEN: Address = Address(0xd5c);
const WETH: Address = Address(0x100);
const WBTC: Address = Address(0x200);
const ETH_FEED: Address = Address(0x1001);
const BTC_FEED: Address = Address(0x2001);

const ALICE: Address = Address(0xa11ce);
const LIQUIDATOR: Address = Address(0x11b);

type SimEngine = Engine<InMemoryTokenBank, InMemoryPriceFeed>;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "collateral_engine=info".into()),
        )
        .init();

    println!("Collateral Engine Simulation");
    println!("WETH + WBTC collateral, 200% overcollateralized debt token\n");

    scenario_1_mint_at_boundary();
    scenario_2_crash_and_liquidation();
    scenario_3_deep_insolvency();
    scenario_4_failed_settlement_rolls_back();
    scenario_5_stale_oracle();

    println!("\nAll simulations completed successfully.");
}

// feed answers carry 8 decimals
fn usd_price(dollars: i128) -> i128 {
    dollars * 100_000_000
}

fn new_engine() -> SimEngine {
    let mut bank = InMemoryTokenBank::new();
    bank.set_owner(DEBT_TOKEN, ENGINE);

    let now = Timestamp::now();
    let mut feeds = InMemoryPriceFeed::new();
    feeds.set_price(ETH_FEED, usd_price(2000), now);
    feeds.set_price(BTC_FEED, usd_price(30_000), now);

    let mut engine = Engine::new(
        EngineConfig::new(ENGINE, DEBT_TOKEN),
        &[WETH, WBTC],
        &[ETH_FEED, BTC_FEED],
        bank,
        feeds,
    )
    .expect("engine config is valid");
    engine.set_time(now);
    engine
}

fn fund(engine: &mut SimEngine, user: Address, asset: Address, units: u64) {
    let bank = engine.bank_mut();
    bank.credit(asset, user, Amount::from_units(units));
    bank.approve(asset, user, ENGINE, Amount::MAX);
    bank.approve(DEBT_TOKEN, user, ENGINE, Amount::MAX);
}

fn set_eth_price(engine: &mut SimEngine, dollars: i128) {
    let now = engine.time();
    engine.feed_source_mut().set_price(ETH_FEED, usd_price(dollars), now);
}

fn print_position(engine: &SimEngine, user: Address) {
    let (debt, value) = engine.account_information(user).expect("prices are fresh");
    let hf = engine.health_factor(user).expect("prices are fresh");
    println!(
        "  WETH {}, debt {}, collateral {}, health factor {}",
        engine.collateral_balance(user, WETH),
        debt,
        value,
        hf
    );
}

/// 10 WETH at $2000 backs exactly $10,000 of debt.
fn scenario_1_mint_at_boundary() {
    println!("Scenario 1: Minting at the Boundary\n");

    let mut engine = new_engine();
    fund(&mut engine, ALICE, WETH, 10);

    engine
        .deposit_collateral_and_mint_debt(ALICE, WETH, Amount::from_units(10), Amount::from_units(10_000))
        .unwrap();
    println!("  Alice deposits 10 WETH @ $2000 and mints 10,000");
    print_position(&engine, ALICE);

    let result = engine.mint_debt(ALICE, Amount::from_units(1));
    println!("  One more unit of debt: {}", result.unwrap_err());
    println!("  Events recorded: {}\n", engine.events().len());
}

/// ETH falls to $1500 and a liquidator covers half the debt.
fn scenario_2_crash_and_liquidation() {
    println!("Scenario 2: Price Crash and Liquidation\n");

    let mut engine = new_engine();
    fund(&mut engine, ALICE, WETH, 10);
    fund(&mut engine, LIQUIDATOR, WBTC, 1);

    engine
        .deposit_collateral_and_mint_debt(ALICE, WETH, Amount::from_units(10), Amount::from_units(10_000))
        .unwrap();
    engine
        .deposit_collateral_and_mint_debt(LIQUIDATOR, WBTC, Amount::from_units(1), Amount::from_units(5_000))
        .unwrap();

    set_eth_price(&mut engine, 1500);
    println!("  ETH drops to $1500");
    print_position(&engine, ALICE);

    let quote = engine.quote_liquidation(WETH, Amount::from_units(5_000)).unwrap();
    println!(
        "  Quote for covering 5,000: {} WETH + {} bonus = {}",
        quote.seized_base, quote.bonus, quote.total
    );

    let result = engine
        .liquidate(LIQUIDATOR, ALICE, WETH, Amount::from_units(5_000))
        .unwrap();
    println!(
        "  Liquidated: health factor {} -> {}",
        result.starting_health_factor, result.ending_health_factor
    );
    print_position(&engine, ALICE);
    println!(
        "  Liquidator now holds {} WETH\n",
        engine.bank().balance_of(WETH, LIQUIDATOR)
    );
}

/// Below 110% collateralization every liquidation worsens the position.
fn scenario_3_deep_insolvency() {
    println!("Scenario 3: Deep Insolvency\n");

    let mut engine = new_engine();
    fund(&mut engine, ALICE, WETH, 10);
    fund(&mut engine, LIQUIDATOR, WBTC, 1);

    engine
        .deposit_collateral_and_mint_debt(ALICE, WETH, Amount::from_units(10), Amount::from_units(10_000))
        .unwrap();
    engine
        .deposit_collateral_and_mint_debt(LIQUIDATOR, WBTC, Amount::from_units(1), Amount::from_units(5_000))
        .unwrap();

    set_eth_price(&mut engine, 1000);
    println!("  ETH drops to $1000");
    print_position(&engine, ALICE);

    let result = engine.liquidate(LIQUIDATOR, ALICE, WETH, Amount::from_units(1_000));
    println!("  Covering 1,000: {}", result.unwrap_err());
    let result = engine.liquidate(LIQUIDATOR, ALICE, WETH, Amount::from_units(10_000));
    println!("  Covering 10,000: {}\n", result.unwrap_err());
}

/// A mint the token refuses leaves no trace, and the pulled collateral goes back.
fn scenario_4_failed_settlement_rolls_back() {
    println!("Scenario 4: Failed Settlement\n");

    let mut engine = new_engine();
    fund(&mut engine, ALICE, WETH, 10);
    engine.bank_mut().halt(DEBT_TOKEN);

    let result = engine.deposit_collateral_and_mint_debt(
        ALICE,
        WETH,
        Amount::from_units(10),
        Amount::from_units(5_000),
    );
    println!("  Deposit and mint with the debt token halted: {}", result.unwrap_err());
    println!(
        "  Ledger WETH {}, wallet WETH {}, events {}\n",
        engine.collateral_balance(ALICE, WETH),
        engine.bank().balance_of(WETH, ALICE),
        engine.events().len()
    );
}

/// Prices older than the oracle timeout block anything that values collateral.
fn scenario_5_stale_oracle() {
    println!("Scenario 5: Stale Oracle\n");

    let mut engine = new_engine();
    fund(&mut engine, ALICE, WETH, 10);
    engine.deposit_collateral(ALICE, WETH, Amount::from_units(10)).unwrap();

    let timeout_ms = engine.oracle_timeout_secs() as i64 * 1000;
    engine.advance_time(timeout_ms + 1000);
    println!("  {}s pass without a price update", engine.oracle_timeout_secs() + 1);

    let result = engine.mint_debt(ALICE, Amount::from_units(100));
    println!("  Mint: {}", result.unwrap_err());

    // no debt means no valuation is needed
    engine.redeem_collateral(ALICE, WETH, Amount::from_units(10)).unwrap();
    println!("  Redeem without debt still succeeds");
}
