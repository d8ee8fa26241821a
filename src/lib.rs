// collateral-engine: overcollateralized stablecoin engine.
// users lock collateral, mint a USD-pegged debt token against it, and get
// liquidated when their health factor drops below the minimum.
// all computation is deterministic; tokens and prices come in through traits.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: Address, Amount, Usd, HealthFactor, Timestamp
//   2.x  math.rs: 18 decimal fixed point on U256, 512 bit intermediates
//        constants.rs: precision, threshold, bonus, oracle timeout
//   3.x  health.rs: health factor calculation
//   4.x  oracle.rs: feed validation and USD normalization (mocked feed)
//   5.x  ledger.rs: asset registry, per-user collateral and debt
//   7.x  config.rs: protocol parameters and validation
//   8.x  engine/: core engine: positions, liquidations, read views
//   9.0  token.rs: ERC20 side of the world (mocked)
//   9.1  settlement.rs: token calls with compensation
//   10.x guard.rs: shared handle, call serialization, re-entry refusal
//   11.x events.rs: state transition events for audit

// core modules
pub mod constants;
pub mod engine;
pub mod events;
pub mod health;
pub mod ledger;
pub mod math;
pub mod types;

// integration modules
pub mod config;
pub mod guard;
pub mod oracle;
pub mod settlement;
pub mod token;

// re exports for convenience
pub use config::{ConfigError, ProtocolParams};
pub use engine::*;
pub use events::*;
pub use guard::{SharedEngine, WeakEngine};
pub use health::calculate_health_factor;
pub use ledger::{CollateralLedger, LedgerError, UserPosition};
pub use math::MathError;
pub use oracle::{InMemoryPriceFeed, OracleError, PriceFeed, PriceOracleAdapter, PriceReading};
pub use settlement::{SettlementBatch, SettlementError, SettlementInstruction};
pub use token::{InMemoryTokenBank, TokenBank};
pub use types::*;
